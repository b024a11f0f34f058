//! Capabilities the host compositor provides to a transform.
//!
//! Everything the transform touches outside of its own state goes through one
//! of these traits: creating the rendering surface, observing its size,
//! listening for the next user interaction, and looking up the local
//! participant and the canvas geometry of a project.

use crate::{
    props::Props,
    source::{
        ParticipantId,
        Source,
        StreamHandle,
    },
    view::SurfaceView,
};
use derive_more::{
    Deref,
    Display,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    cell::RefCell,
    fmt,
    rc::Rc,
    sync::Arc,
};

pub mod memory;

#[derive(Debug, Clone, Copy, Display, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[display("surface-{_0}")]
pub struct SurfaceId(pub u64);

#[derive(Debug, Clone, Copy, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("listener-{_0}")]
pub struct ListenerId(pub u64);

#[derive(Debug, Clone, Display, Deref, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: impl ToString) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("Playback was blocked until the user interacts with the document")]
    Blocked,
    #[error("Playback was aborted: {0}")]
    Aborted(String),
}

/// The video element a transform renders into.
pub trait MediaSurface {
    fn id(&self) -> SurfaceId;

    /// Stream currently attached as the element's source object.
    fn attached(&self) -> Option<&StreamHandle>;

    fn attach(&mut self, stream: StreamHandle);

    fn detach(&mut self);

    fn play(&mut self) -> Result<(), PlaybackError>;

    fn set_volume(&mut self, volume: f64);

    fn client_width(&self) -> f64;

    /// False once the host has taken the surface out of its document.
    fn is_connected(&self) -> bool;

    /// Redraws the surface from a freshly rendered view.
    fn present(&mut self, view: SurfaceView);
}

pub type SharedSurface = Rc<RefCell<dyn MediaSurface>>;

pub trait SurfaceFactory {
    fn create_surface(&self) -> SharedSurface;
}

pub type ResizeCallback = Box<dyn FnMut()>;

pub trait ResizeObserver {
    fn observe(&self, surface: SurfaceId, callback: ResizeCallback);
    fn unobserve(&self, surface: SurfaceId);
}

/// Document-wide user interaction events (clicks, key presses).
pub trait InteractionEvents {
    /// Registers a listener that runs on the next interaction and is dropped
    /// afterwards.
    fn once(&self, callback: Box<dyn FnOnce()>) -> ListenerId;
    fn remove(&self, listener: ListenerId);
}

pub trait RoomDirectory {
    fn local_participant_id(&self, project: &ProjectId) -> Option<ParticipantId>;
}

pub trait CanvasGeometry {
    fn canvas_size(&self, project: &ProjectId) -> Option<CanvasSize>;
}

/// Everything a transform needs from its host, passed in at creation.
#[derive(Clone)]
pub struct HostContext {
    pub project_id: ProjectId,
    pub surfaces: Rc<dyn SurfaceFactory>,
    pub resize: Rc<dyn ResizeObserver>,
    pub interactions: Rc<dyn InteractionEvents>,
    pub rooms: Rc<dyn RoomDirectory>,
    pub canvas: Rc<dyn CanvasGeometry>,
}

impl fmt::Debug for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostContext")
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

pub type UpdateHandler = Box<dyn FnMut(Option<Props>)>;
pub type NewSourceHandler = Box<dyn FnMut(Option<Arc<Source>>)>;
pub type RemoveHandler = Box<dyn FnMut(Option<Props>)>;

/// Registration side of the host's per-element lifecycle events.
pub trait LifecycleCallbacks {
    fn on_update(&mut self, handler: UpdateHandler);
    fn on_new_source(&mut self, handler: NewSourceHandler);
    fn on_remove(&mut self, handler: RemoveHandler);
}
