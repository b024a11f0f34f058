use crate::host::{
    ResizeCallback,
    ResizeObserver,
    SurfaceId,
};
use std::{
    fmt,
    rc::Rc,
};

/// Live resize observation of one surface.
///
/// Released exactly once, either explicitly or on drop. Releasing again is a
/// no-op.
pub struct ResizeSubscription {
    surface: SurfaceId,
    observer: Rc<dyn ResizeObserver>,
    active: bool,
}

impl ResizeSubscription {
    pub fn observe(observer: Rc<dyn ResizeObserver>, surface: SurfaceId, callback: ResizeCallback) -> Self {
        observer.observe(surface, callback);
        debug!(%surface, "Observing surface size");
        Self {
            surface,
            observer,
            active: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.observer.unobserve(self.surface);
        debug!(surface = %self.surface, "Stopped observing surface size");
    }
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ResizeSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResizeSubscription")
            .field("surface", &self.surface)
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryHost;

    #[test]
    fn release_is_idempotent() {
        let host = MemoryHost::new();
        let surface = SurfaceId(7);
        let mut subscription = ResizeSubscription::observe(host.clone(), surface, Box::new(|| {}));
        assert!(host.is_observed(surface));

        subscription.release();
        subscription.release();
        assert!(!subscription.is_active());
        assert!(!host.is_observed(surface));
        assert_eq!(host.unobserve_calls(), 1);
    }

    #[test]
    fn dropping_releases() {
        let host = MemoryHost::new();
        let surface = SurfaceId(3);
        drop(ResizeSubscription::observe(host.clone(), surface, Box::new(|| {})));
        assert!(!host.is_observed(surface));
        assert_eq!(host.unobserve_calls(), 1);
    }
}
