#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod host_config;

pub use app_config::get_config_dir;
pub use args::Args;
pub use host_config::Autoplay;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::HashMap,
    path::PathBuf,
};

/// Settings of the simulated host a scenario is replayed against.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_participant_id: Option<String>,
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Width every simulated surface starts out with.
    pub surface_width: f64,
    #[serde(default)]
    pub autoplay: Autoplay,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenario: Option<PathBuf>,
    #[serde(default)]
    pub verbose: bool,
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl config::Source for Config {
    fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> {
        Box::new((*self).clone())
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        let mut cache = HashMap::<String, config::Value>::new();
        cache.insert("project_id".to_string(), self.project_id.clone().into());
        if let Some(local_participant_id) = &self.local_participant_id {
            cache.insert("local_participant_id".to_string(), local_participant_id.clone().into());
        }
        cache.insert("canvas_width".to_string(), self.canvas_width.into());
        cache.insert("canvas_height".to_string(), self.canvas_height.into());
        cache.insert("surface_width".to_string(), self.surface_width.into());
        cache.insert("autoplay".to_string(), self.autoplay.to_string().into());
        if let Some(scenario) = &self.scenario {
            cache.insert("scenario".to_string(), scenario.display().to_string().into());
        }
        cache.insert("verbose".to_string(), self.verbose.into());
        Ok(cache)
    }
}

impl Config {
    /// Layers the embedded defaults, `config.yaml` from the config directory
    /// and the command line, in that order.
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        let config_dir = get_config_dir();
        let mut builder = config::Config::builder().add_source(Config::default());

        let config_files = [("config.yaml", config::FileFormat::Yaml)];

        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
        }

        builder = builder.add_source(args);

        let cfg: Self = builder.build()?.try_deserialize()?;
        debug!(?cfg, "Loaded configuration");

        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn embedded_defaults_parse() {
        let config = Config::default();
        assert_eq!(config.project_id, "default");
        assert_eq!(config.local_participant_id.as_deref(), Some("local"));
        assert_eq!(config.canvas_width, 1920.0);
        assert_eq!(config.surface_width, 640.0);
        assert_eq!(config.autoplay, Autoplay::Allowed);
        assert_eq!(config.scenario, None);
    }

    #[test]
    fn serialized_config_skips_unset_paths() {
        let yaml = serde_yml::to_string(&Config::default()).unwrap();
        assert!(!yaml.contains("scenario"));
        assert!(yaml.contains("autoplay: allowed"));
    }
}
