use serde_repr::{
    Deserialize_repr,
    Serialize_repr,
};
use strum::Display;

/// Discrete scale of the name banner, chosen from the surface width relative to
/// the compositor canvas. Serialized as its tier number (`0..=3`).
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    Display,
    Serialize_repr,
    Deserialize_repr,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[repr(u8)]
#[strum(serialize_all = "lowercase")]
pub enum LabelSize {
    #[default]
    Tiny = 0,
    Small = 1,
    Medium = 2,
    Large = 3,
}

impl LabelSize {
    /// Maps `surface_width / container_width` onto a tier.
    ///
    /// The bands are `[0.5, ∞) → Large`, `(0.25, 0.5) → Medium`,
    /// `(0.15, 0.25] → Small` and everything else `Tiny`. A container without a
    /// positive width has no meaningful ratio and yields `Tiny`.
    pub fn classify(surface_width: f64, container_width: f64) -> Self {
        if container_width.is_nan() || container_width <= 0.0 {
            return LabelSize::Tiny;
        }

        let ratio = surface_width / container_width;
        if ratio >= 0.5 {
            LabelSize::Large
        } else if ratio > 0.25 {
            LabelSize::Medium
        } else if ratio > 0.15 {
            LabelSize::Small
        } else {
            LabelSize::Tiny
        }
    }

    pub fn tier(self) -> u8 {
        self as u8
    }
}
