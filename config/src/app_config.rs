use directories::ProjectDirs;
use std::{
    env,
    path::PathBuf,
};

lazy_static::lazy_static! {
    static ref CONFIG_DIR_OVERRIDE: Option<PathBuf> =
        env::var_os(format!("{}_CONFIG", env!("CARGO_CRATE_NAME").to_uppercase())).map(PathBuf::from);
}

/// Where `config.yaml` is looked up: the env override first, then the
/// platform config directory, then `.config` in the working directory.
pub fn get_config_dir() -> PathBuf {
    if let Some(dir) = CONFIG_DIR_OVERRIDE.as_ref() {
        return dir.clone();
    }
    ProjectDirs::from("video", "hyper", "participant-transform")
        .map(|dirs| dirs.config_local_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".").join(".config"))
}
