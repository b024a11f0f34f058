//! Room participant transform.
//!
//! Binds one matched participant [`Source`] (stream plus metadata) to a
//! rendering surface provided by the host compositor, and keeps that surface in
//! sync with host props, source changes and layout resizes.

#[macro_use]
extern crate tracing;

mod binder;
mod declaration;
pub mod host;
mod instance;
mod label_size;
mod props;
mod render_state;
mod source;
mod subscription;
pub mod view;

pub use binder::{
    BindOutcome,
    MediaBinder,
};
pub use declaration::{
    RoomParticipant,
    TransformDeclaration,
    TransformRegistry,
    TransformRoot,
};
pub use host::{
    CanvasSize,
    HostContext,
    LifecycleCallbacks,
    ListenerId,
    MediaSurface,
    PlaybackError,
    ProjectId,
    SharedSurface,
    SurfaceId,
};
pub use instance::{
    TransformInstance,
    TransformPhase,
};
pub use label_size::LabelSize;
pub use props::{
    PropSpec,
    PropValueType,
    Props,
    PropsSchema,
};
pub use render_state::RenderState;
pub use source::{
    find_source,
    is_match,
    ParticipantId,
    Source,
    SourceId,
    SourceKind,
    SourceProps,
    SourceQuery,
    StreamHandle,
};
pub use subscription::ResizeSubscription;
pub use view::SurfaceView;
