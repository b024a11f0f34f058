use crate::{
    binder::MediaBinder,
    host::{
        HostContext,
        LifecycleCallbacks,
        SharedSurface,
        SurfaceId,
    },
    label_size::LabelSize,
    props::Props,
    render_state::RenderState,
    source::{
        ParticipantId,
        Source,
    },
    subscription::ResizeSubscription,
    view,
};
use std::{
    cell::RefCell,
    rc::{
        Rc,
        Weak,
    },
    sync::Arc,
};
use strum::Display;

#[derive(Debug, Clone, Copy, Display, PartialEq, Eq)]
pub enum TransformPhase {
    /// Surface allocated, no lifecycle event seen yet.
    Created,
    Bound,
    /// Terminal. Lifecycle events are ignored from here on.
    Removed,
}

/// One placed participant element.
///
/// Owns the rendering surface, the current props and source, and the resize
/// subscription. Every lifecycle entry point re-renders synchronously before
/// returning. Cloning yields another handle to the same instance.
#[derive(Clone)]
pub struct TransformInstance {
    surface_id: SurfaceId,
    inner: Rc<RefCell<TransformInner>>,
}

struct TransformInner {
    context: HostContext,
    phase: TransformPhase,
    props: Option<Props>,
    source: Option<Arc<Source>>,
    local_participant: Option<ParticipantId>,
    surface: SharedSurface,
    binder: MediaBinder,
    resize: Option<ResizeSubscription>,
    label_size: LabelSize,
    render_state: RenderState,
}

impl TransformInstance {
    pub fn new(context: HostContext, initial_props: Props) -> Self {
        let surface = context.surfaces.create_surface();
        let surface_id = surface.borrow().id();
        let local_participant = context.rooms.local_participant_id(&context.project_id);
        debug!(surface = %surface_id, project = %context.project_id, ?local_participant, "Created participant transform");

        let binder = MediaBinder::new(context.interactions.clone());
        let inner = TransformInner {
            context,
            phase: TransformPhase::Created,
            props: Some(initial_props),
            source: None,
            local_participant,
            surface,
            binder,
            resize: None,
            label_size: LabelSize::default(),
            render_state: RenderState::default(),
        };

        Self {
            surface_id,
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// Creates the instance and hooks it into the host's lifecycle events.
    pub fn create(context: HostContext, lifecycle: &mut dyn LifecycleCallbacks, initial_props: Props) -> Self {
        let instance = Self::new(context, initial_props);
        instance.register(lifecycle);
        instance
    }

    /// Registers one handler per lifecycle event. The handlers keep the
    /// instance alive for as long as the host keeps them.
    fn register(&self, lifecycle: &mut dyn LifecycleCallbacks) {
        let instance = self.clone();
        lifecycle.on_update(Box::new(move |props| instance.update_props(props)));

        let instance = self.clone();
        lifecycle.on_new_source(Box::new(move |source| instance.attach_source(source)));

        let instance = self.clone();
        lifecycle.on_remove(Box::new(move |props| instance.remove(props)));
    }

    /// Replaces the props. `None` clears them: the stream is released and the
    /// placeholder shows until props arrive again.
    #[instrument(level = "debug", skip_all, fields(surface = %self.surface_id))]
    pub fn update_props(&self, props: Option<Props>) {
        let mut inner = self.inner.borrow_mut();
        if inner.phase == TransformPhase::Removed {
            warn!("Ignoring props update for a removed transform");
            return;
        }
        debug!(?props, "Updating props");
        inner.props = props;
        inner.phase = TransformPhase::Bound;
        inner.rerender(Rc::downgrade(&self.inner));
    }

    #[instrument(level = "debug", skip_all, fields(surface = %self.surface_id))]
    pub fn attach_source(&self, source: Option<Arc<Source>>) {
        let mut inner = self.inner.borrow_mut();
        if inner.phase == TransformPhase::Removed {
            warn!("Ignoring new source for a removed transform");
            return;
        }
        debug!(source = ?source.as_ref().map(|source| &source.id), "Attaching source");
        inner.source = source;
        inner.phase = TransformPhase::Bound;
        inner.rerender(Rc::downgrade(&self.inner));
    }

    /// Tears the instance down. `None` clears the props entirely. Calling this
    /// again afterwards does nothing.
    #[instrument(level = "debug", skip_all, fields(surface = %self.surface_id))]
    pub fn remove(&self, final_props: Option<Props>) {
        let mut inner = self.inner.borrow_mut();
        if inner.phase == TransformPhase::Removed {
            debug!("Transform already removed");
            return;
        }
        debug!(?final_props, "Removing transform");
        inner.props = final_props;
        inner.source = None;
        inner.teardown();
        inner.phase = TransformPhase::Removed;
        inner.rerender(Rc::downgrade(&self.inner));
    }

    pub fn root(&self) -> SharedSurface {
        self.inner.borrow().surface.clone()
    }

    pub fn surface_id(&self) -> SurfaceId {
        self.surface_id
    }

    pub fn phase(&self) -> TransformPhase {
        self.inner.borrow().phase
    }

    pub fn props(&self) -> Option<Props> {
        self.inner.borrow().props.clone()
    }

    pub fn source(&self) -> Option<Arc<Source>> {
        self.inner.borrow().source.clone()
    }

    /// State used by the most recent render.
    pub fn render_state(&self) -> RenderState {
        self.inner.borrow().render_state
    }

    pub fn label_size(&self) -> LabelSize {
        self.inner.borrow().label_size
    }

    pub fn is_observing_resize(&self) -> bool {
        self.inner
            .borrow()
            .resize
            .as_ref()
            .is_some_and(ResizeSubscription::is_active)
    }

    pub fn has_pending_retry(&self) -> bool {
        self.inner.borrow().binder.has_pending_retry()
    }
}

impl TransformInner {
    fn rerender(&mut self, this: Weak<RefCell<TransformInner>>) {
        if self.phase != TransformPhase::Removed {
            match self.props.as_ref().map(|props| props.volume) {
                Some(volume) => {
                    let stream = self.source.as_ref().and_then(|source| source.value.clone());
                    self.binder.bind(&self.surface, stream.as_ref());
                    self.binder.set_volume(&self.surface, volume);
                    self.observe_resize(this);
                }
                None => self.teardown(),
            }
        }

        let state = RenderState::derive(
            self.props.as_ref(),
            self.source.as_deref(),
            self.local_participant.as_ref(),
        )
        .with_label_size(self.label_size);
        let view = view::render(self.props.as_ref(), self.source.as_deref(), &state);
        trace!(?state, "Rendering surface");

        self.render_state = state;
        self.surface.borrow_mut().present(view);
    }

    /// Subscribes to size changes once the surface sits in a document, and
    /// reclassifies the label size against the current geometry.
    fn observe_resize(&mut self, this: Weak<RefCell<TransformInner>>) {
        self.label_size = self.classify();

        if !self.surface.borrow().is_connected() {
            self.release_resize();
            return;
        }

        if self.resize.is_none() {
            let surface_id = self.surface.borrow().id();
            let callback = Box::new(move || {
                if let Some(inner) = this.upgrade() {
                    TransformInner::on_resize(&inner);
                }
            });
            self.resize = Some(ResizeSubscription::observe(
                self.context.resize.clone(),
                surface_id,
                callback,
            ));
        }
    }

    fn on_resize(this: &Rc<RefCell<TransformInner>>) {
        let Ok(mut inner) = this.try_borrow_mut() else {
            warn!("Resize notification arrived while rendering, skipping");
            return;
        };
        if inner.phase == TransformPhase::Removed {
            return;
        }
        if !inner.surface.borrow().is_connected() {
            debug!("Surface left the document");
            inner.release_resize();
            return;
        }

        let label_size = inner.classify();
        trace!(%label_size, "Surface resized");
        if label_size != inner.label_size {
            inner.label_size = label_size;
            inner.rerender(Rc::downgrade(this));
        }
    }

    fn classify(&self) -> LabelSize {
        let width = self.surface.borrow().client_width();
        let canvas_width = self
            .context
            .canvas
            .canvas_size(&self.context.project_id)
            .map(|canvas| canvas.width)
            .unwrap_or_default();
        LabelSize::classify(width, canvas_width)
    }

    fn release_resize(&mut self) {
        if let Some(mut subscription) = self.resize.take() {
            subscription.release();
        }
    }

    fn teardown(&mut self) {
        self.binder.unbind(&self.surface);
        self.release_resize();
    }
}
