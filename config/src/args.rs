use crate::Autoplay;
use clap::Parser;
use std::path::PathBuf;

/// Replays a host compositor scenario against a room participant transform and
/// prints every rendered surface as a JSON line.
#[derive(Parser, Debug, Clone)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// Scenario file (YAML) to replay.
    #[clap(value_name = "SCENARIO")]
    pub scenario: Option<PathBuf>,

    /// Project the transform is placed in.
    #[clap(long, value_name = "ID")]
    pub project: Option<String>,

    /// Identity of the local participant in the room.
    #[clap(long = "local-participant", value_name = "ID")]
    pub local_participant: Option<String>,

    /// Width of the compositor canvas in pixels.
    #[clap(long = "canvas-width", value_name = "PX")]
    pub canvas_width: Option<f64>,

    /// Height of the compositor canvas in pixels.
    #[clap(long = "canvas-height", value_name = "PX")]
    pub canvas_height: Option<f64>,

    /// Initial width of the participant surface in pixels.
    #[clap(long = "surface-width", value_name = "PX")]
    pub surface_width: Option<f64>,

    /// Autoplay policy of the simulated document (`allowed` or `blocked`).
    #[clap(long, value_name = "POLICY")]
    pub autoplay: Option<Autoplay>,

    /// Logs lifecycle details at debug level.
    #[clap(long = "verbose", action)]
    pub verbose: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(scenario) = &self.scenario {
                cache.insert("scenario".to_string(), scenario.display().to_string().into());
            }
            if let Some(project) = &self.project {
                cache.insert("project_id".to_string(), project.clone().into());
            }
            if let Some(local_participant) = &self.local_participant {
                cache.insert("local_participant_id".to_string(), local_participant.clone().into());
            }
            if let Some(canvas_width) = self.canvas_width {
                cache.insert("canvas_width".to_string(), canvas_width.into());
            }
            if let Some(canvas_height) = self.canvas_height {
                cache.insert("canvas_height".to_string(), canvas_height.into());
            }
            if let Some(surface_width) = self.surface_width {
                cache.insert("surface_width".to_string(), surface_width.into());
            }
            if let Some(autoplay) = &self.autoplay {
                cache.insert("autoplay".to_string(), autoplay.to_string().into());
            }
            if self.verbose {
                cache.insert("verbose".to_string(), true.into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let version = clap::crate_version!();
    let config_dir_path = crate::get_config_dir().display().to_string();

    format!(
        "\
{version}
Authors: {author}

Config directory: {config_dir_path}"
    )
}
