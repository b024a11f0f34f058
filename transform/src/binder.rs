use crate::{
    host::{
        InteractionEvents,
        ListenerId,
        MediaSurface,
        SharedSurface,
    },
    source::StreamHandle,
};
use std::{
    cell::{
        Cell,
        RefCell,
    },
    rc::{
        Rc,
        Weak,
    },
};
use strum::Display;

#[derive(Debug, Clone, Copy, Display, PartialEq, Eq)]
pub enum BindOutcome {
    /// The requested stream is already attached, or nothing was attached and
    /// nothing was requested.
    Unchanged,
    Attached,
    /// The previous stream was detached before the new one was attached.
    Replaced,
    Detached,
}

/// Attaches stream handles to a surface and recovers from blocked autoplay.
///
/// When playback is rejected the binder arms a single retry on the next user
/// interaction. While that retry is pending further rejections do not register
/// another listener, and a retry that is rejected again is not re-armed.
pub struct MediaBinder {
    interactions: Rc<dyn InteractionEvents>,
    pending_retry: Rc<Cell<Option<ListenerId>>>,
}

impl MediaBinder {
    pub fn new(interactions: Rc<dyn InteractionEvents>) -> Self {
        Self {
            interactions,
            pending_retry: Default::default(),
        }
    }

    pub fn bind(&mut self, surface: &SharedSurface, stream: Option<&StreamHandle>) -> BindOutcome {
        let Some(stream) = stream else {
            return self.unbind(surface);
        };

        let mut target = surface.borrow_mut();
        let outcome = match target.attached() {
            Some(current) if current.same_stream(stream) => return BindOutcome::Unchanged,
            Some(current) => {
                debug!(surface = %target.id(), old = current.label(), new = stream.label(), "Replacing stream");
                target.detach();
                BindOutcome::Replaced
            }
            None => {
                debug!(surface = %target.id(), stream = stream.label(), "Attaching stream");
                BindOutcome::Attached
            }
        };
        target.attach(stream.clone());

        let played = target.play();
        drop(target);

        if let Err(err) = played {
            warn!(stream = stream.label(), "Playback rejected, retrying on next interaction: {err}");
            self.arm_retry(Rc::downgrade(surface));
        }

        outcome
    }

    /// Clears the attached stream and any pending retry. Safe to call when
    /// nothing is attached.
    pub fn unbind(&mut self, surface: &SharedSurface) -> BindOutcome {
        self.cancel_retry();

        let mut target = surface.borrow_mut();
        if target.attached().is_none() {
            return BindOutcome::Unchanged;
        }
        debug!(surface = %target.id(), "Detaching stream");
        target.detach();
        BindOutcome::Detached
    }

    pub fn set_volume(&self, surface: &SharedSurface, volume: f64) {
        surface.borrow_mut().set_volume(volume);
    }

    pub fn has_pending_retry(&self) -> bool {
        self.pending_retry.get().is_some()
    }

    pub fn cancel_retry(&mut self) {
        if let Some(listener) = self.pending_retry.take() {
            debug!(%listener, "Cancelling deferred playback retry");
            self.interactions.remove(listener);
        }
    }

    fn arm_retry(&mut self, surface: Weak<RefCell<dyn MediaSurface>>) {
        if self.has_pending_retry() {
            trace!("Deferred playback retry already pending");
            return;
        }

        let pending = Rc::clone(&self.pending_retry);
        let listener = self.interactions.once(Box::new(move || {
            pending.set(None);
            let Some(surface) = surface.upgrade() else {
                return;
            };
            let mut surface = surface.borrow_mut();
            if surface.attached().is_none() {
                return;
            }
            match surface.play() {
                Ok(()) => debug!(surface = %surface.id(), "Deferred playback started"),
                Err(err) => warn!(surface = %surface.id(), "Deferred playback rejected again: {err}"),
            }
        }));
        self.pending_retry.set(Some(listener));
    }
}

impl Drop for MediaBinder {
    fn drop(&mut self) {
        self.cancel_retry();
    }
}
