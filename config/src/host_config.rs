use serde::{
    Deserialize,
    Serialize,
};
use strum::{
    Display,
    EnumString,
};

/// Autoplay policy of the simulated document.
#[derive(Debug, Default, Clone, Copy, Display, EnumString, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Autoplay {
    #[default]
    Allowed,
    /// Playback needs a user interaction first.
    Blocked,
}
