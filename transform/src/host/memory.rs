//! In-memory host for driving transforms without a real document.
//!
//! One [`MemoryHost`] plays every host role at once: it creates surfaces,
//! delivers resize notifications and user interactions on demand, and answers
//! room and canvas lookups from tables filled in by the caller.

use super::{
    CanvasGeometry,
    CanvasSize,
    HostContext,
    InteractionEvents,
    LifecycleCallbacks,
    ListenerId,
    MediaSurface,
    NewSourceHandler,
    PlaybackError,
    ProjectId,
    RemoveHandler,
    ResizeCallback,
    ResizeObserver,
    RoomDirectory,
    SharedSurface,
    SurfaceFactory,
    SurfaceId,
    UpdateHandler,
};
use crate::{
    props::Props,
    source::{
        ParticipantId,
        Source,
        StreamHandle,
    },
    view::SurfaceView,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    cell::{
        Cell,
        RefCell,
    },
    collections::{
        BTreeMap,
        HashMap,
    },
    rc::Rc,
    sync::Arc,
};
use strum::{
    Display,
    EnumString,
};

pub const DEFAULT_SURFACE_WIDTH: f64 = 640.0;

#[derive(Debug, Default, Clone, Copy, Display, EnumString, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AutoplayPolicy {
    #[default]
    Allowed,
    /// Playback is rejected until the document saw a user interaction.
    Blocked,
}

/// Primitive operations a surface received, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceOp {
    Attach(String),
    Detach,
    Play(Result<(), PlaybackError>),
}

#[derive(Debug, Default)]
struct DocumentState {
    autoplay: Cell<AutoplayPolicy>,
    activated: Cell<bool>,
    keep_activation: Cell<bool>,
}

#[derive(Debug)]
pub struct MemorySurface {
    id: SurfaceId,
    document: Rc<DocumentState>,
    attached: Option<StreamHandle>,
    volume: f64,
    width: f64,
    connected: bool,
    ops: Vec<SurfaceOp>,
    views: Vec<SurfaceView>,
}

impl MemorySurface {
    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    pub fn views(&self) -> &[SurfaceView] {
        &self.views
    }

    pub fn last_view(&self) -> Option<&SurfaceView> {
        self.views.last()
    }
}

impl MediaSurface for MemorySurface {
    fn id(&self) -> SurfaceId {
        self.id
    }

    fn attached(&self) -> Option<&StreamHandle> {
        self.attached.as_ref()
    }

    fn attach(&mut self, stream: StreamHandle) {
        self.ops.push(SurfaceOp::Attach(stream.label().to_string()));
        self.attached = Some(stream);
    }

    fn detach(&mut self) {
        self.ops.push(SurfaceOp::Detach);
        self.attached = None;
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let result = match self.document.autoplay.get() {
            AutoplayPolicy::Blocked if !self.document.activated.get() => Err(PlaybackError::Blocked),
            _ => Ok(()),
        };
        self.ops.push(SurfaceOp::Play(result.clone()));
        result
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    fn client_width(&self) -> f64 {
        self.width
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn present(&mut self, view: SurfaceView) {
        self.views.push(view);
    }
}

pub struct MemoryHost {
    document: Rc<DocumentState>,
    next_id: Cell<u64>,
    surface_width: Cell<f64>,
    surfaces: RefCell<HashMap<SurfaceId, Rc<RefCell<MemorySurface>>>>,
    observers: RefCell<HashMap<SurfaceId, Rc<RefCell<ResizeCallback>>>>,
    observe_calls: Cell<usize>,
    unobserve_calls: Cell<usize>,
    listeners: RefCell<BTreeMap<ListenerId, Box<dyn FnOnce()>>>,
    registered_listeners: Cell<usize>,
    participants: RefCell<HashMap<ProjectId, ParticipantId>>,
    canvases: RefCell<HashMap<ProjectId, CanvasSize>>,
}

impl MemoryHost {
    pub fn new() -> Rc<Self> {
        let document = DocumentState::default();
        document.keep_activation.set(true);
        Rc::new(Self {
            document: Rc::new(document),
            next_id: Cell::new(1),
            surface_width: Cell::new(DEFAULT_SURFACE_WIDTH),
            surfaces: Default::default(),
            observers: Default::default(),
            observe_calls: Cell::new(0),
            unobserve_calls: Cell::new(0),
            listeners: Default::default(),
            registered_listeners: Cell::new(0),
            participants: Default::default(),
            canvases: Default::default(),
        })
    }

    /// Bundles this host into the context a transform is created with.
    pub fn context(self: &Rc<Self>, project_id: ProjectId) -> HostContext {
        HostContext {
            project_id,
            surfaces: self.clone(),
            resize: self.clone(),
            interactions: self.clone(),
            rooms: self.clone(),
            canvas: self.clone(),
        }
    }

    pub fn set_autoplay(&self, policy: AutoplayPolicy) {
        self.document.autoplay.set(policy);
    }

    /// Whether an interaction unlocks playback for the rest of the session.
    /// Defaults to true, like a browser's sticky user activation.
    pub fn set_activation_on_interaction(&self, keep: bool) {
        self.document.keep_activation.set(keep);
    }

    /// Width new surfaces start out with.
    pub fn set_surface_width(&self, width: f64) {
        self.surface_width.set(width);
    }

    pub fn set_local_participant(&self, project: ProjectId, participant: ParticipantId) {
        self.participants.borrow_mut().insert(project, participant);
    }

    pub fn set_canvas(&self, project: ProjectId, size: CanvasSize) {
        self.canvases.borrow_mut().insert(project, size);
    }

    pub fn create_memory_surface(&self) -> SharedSurface {
        let id = SurfaceId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        let surface = Rc::new(RefCell::new(MemorySurface {
            id,
            document: self.document.clone(),
            attached: None,
            volume: 1.0,
            width: self.surface_width.get(),
            connected: true,
            ops: Vec::new(),
            views: Vec::new(),
        }));
        self.surfaces.borrow_mut().insert(id, surface.clone());
        surface
    }

    pub fn memory_surface(&self, id: SurfaceId) -> Option<Rc<RefCell<MemorySurface>>> {
        self.surfaces.borrow().get(&id).cloned()
    }

    pub fn surface_ops(&self, id: SurfaceId) -> Vec<SurfaceOp> {
        self.memory_surface(id)
            .map(|surface| surface.borrow().ops().to_vec())
            .unwrap_or_default()
    }

    pub fn last_view(&self, id: SurfaceId) -> Option<SurfaceView> {
        self.memory_surface(id)
            .and_then(|surface| surface.borrow().last_view().cloned())
    }

    /// Changes the surface width and notifies its observer, if any.
    pub fn resize(&self, id: SurfaceId, width: f64) {
        if let Some(surface) = self.memory_surface(id) {
            surface.borrow_mut().width = width;
        }
        self.notify_resize(id);
    }

    /// Takes the surface out of the document. Observers see a final
    /// notification with a zero width.
    pub fn detach_from_document(&self, id: SurfaceId) {
        if let Some(surface) = self.memory_surface(id) {
            let mut surface = surface.borrow_mut();
            surface.connected = false;
            surface.width = 0.0;
        }
        self.notify_resize(id);
    }

    /// Puts a detached surface back into the document. No notification is
    /// delivered; the transform picks the surface up on its next render.
    pub fn reattach_to_document(&self, id: SurfaceId, width: f64) {
        if let Some(surface) = self.memory_surface(id) {
            let mut surface = surface.borrow_mut();
            surface.connected = true;
            surface.width = width;
        }
    }

    fn notify_resize(&self, id: SurfaceId) {
        let callback = self.observers.borrow().get(&id).cloned();
        if let Some(callback) = callback {
            trace!(surface = %id, "Delivering resize notification");
            let mut notify = callback.borrow_mut();
            (*notify)();
        }
    }

    pub fn is_observed(&self, id: SurfaceId) -> bool {
        self.observers.borrow().contains_key(&id)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    pub fn observe_calls(&self) -> usize {
        self.observe_calls.get()
    }

    pub fn unobserve_calls(&self) -> usize {
        self.unobserve_calls.get()
    }

    /// A click anywhere in the document: grants user activation and runs every
    /// pending one-shot listener.
    pub fn interact(&self) {
        if self.document.keep_activation.get() {
            self.document.activated.set(true);
        }
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        for (_, listener) in listeners {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Total number of listeners ever registered.
    pub fn registered_listeners(&self) -> usize {
        self.registered_listeners.get()
    }
}

impl SurfaceFactory for MemoryHost {
    fn create_surface(&self) -> SharedSurface {
        self.create_memory_surface()
    }
}

impl ResizeObserver for MemoryHost {
    fn observe(&self, surface: SurfaceId, callback: ResizeCallback) {
        self.observe_calls.set(self.observe_calls.get() + 1);
        self.observers
            .borrow_mut()
            .insert(surface, Rc::new(RefCell::new(callback)));
    }

    fn unobserve(&self, surface: SurfaceId) {
        self.unobserve_calls.set(self.unobserve_calls.get() + 1);
        self.observers.borrow_mut().remove(&surface);
    }
}

impl InteractionEvents for MemoryHost {
    fn once(&self, callback: Box<dyn FnOnce()>) -> ListenerId {
        let count = self.registered_listeners.get() + 1;
        self.registered_listeners.set(count);
        let id = ListenerId(count as u64);
        self.listeners.borrow_mut().insert(id, callback);
        id
    }

    fn remove(&self, listener: ListenerId) {
        self.listeners.borrow_mut().remove(&listener);
    }
}

impl RoomDirectory for MemoryHost {
    fn local_participant_id(&self, project: &ProjectId) -> Option<ParticipantId> {
        self.participants.borrow().get(project).cloned()
    }
}

impl CanvasGeometry for MemoryHost {
    fn canvas_size(&self, project: &ProjectId) -> Option<CanvasSize> {
        self.canvases.borrow().get(project).copied()
    }
}

/// Host side of one element's lifecycle: stores the handlers a transform
/// registers during creation and dispatches events to them.
#[derive(Default)]
pub struct MemoryLifecycle {
    on_update: Option<UpdateHandler>,
    on_new_source: Option<NewSourceHandler>,
    on_remove: Option<RemoveHandler>,
    registrations: [usize; 3],
}

impl MemoryLifecycle {
    /// `None` clears the element's props without removing it.
    pub fn update(&mut self, props: Option<Props>) {
        if let Some(handler) = self.on_update.as_mut() {
            handler(props);
        }
    }

    pub fn new_source(&mut self, source: Option<Arc<Source>>) {
        if let Some(handler) = self.on_new_source.as_mut() {
            handler(source);
        }
    }

    pub fn remove(&mut self, props: Option<Props>) {
        if let Some(handler) = self.on_remove.as_mut() {
            handler(props);
        }
    }

    /// How often `on_update`, `on_new_source` and `on_remove` were called.
    pub fn registrations(&self) -> [usize; 3] {
        self.registrations
    }
}

impl LifecycleCallbacks for MemoryLifecycle {
    fn on_update(&mut self, handler: UpdateHandler) {
        self.registrations[0] += 1;
        self.on_update = Some(handler);
    }

    fn on_new_source(&mut self, handler: NewSourceHandler) {
        self.registrations[1] += 1;
        self.on_new_source = Some(handler);
    }

    fn on_remove(&mut self, handler: RemoveHandler) {
        self.registrations[2] += 1;
        self.on_remove = Some(handler);
    }
}
