#[macro_use]
extern crate tracing;

mod app;
mod logging;
pub mod scenario;

pub use app::{
    App,
    StepReport,
};
pub use logging::init_logging;
pub use participant_transform_config::{
    Args,
    Config,
};
