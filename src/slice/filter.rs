use std::str::FromStr;

use clap::ValueEnum;

use crate::error::SlicerError;
use crate::geometry::Rect;

/// How new slices treat regions that already exist on the texture
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum PreservationPolicy {
    /// Keep every slice, even when it overlaps an existing region
    #[default]
    #[value(name = "ignore-existing")]
    IgnoreExisting,
    /// Drop slices that overlap an existing region
    #[value(name = "avoid-existing")]
    AvoidExisting,
}

impl FromStr for PreservationPolicy {
    type Err = SlicerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ignore-existing" => Ok(PreservationPolicy::IgnoreExisting),
            "avoid-existing" => Ok(PreservationPolicy::AvoidExisting),
            _ => Err(SlicerError::InvalidConfiguration(format!(
                "unknown preservation policy '{}'. Valid values: ignore-existing, avoid-existing",
                s
            ))),
        }
    }
}

/// Apply the preservation policy to freshly computed slices.
///
/// Surviving candidates keep their relative order.
pub fn filter_existing(
    candidates: Vec<Rect>,
    existing: &[Rect],
    policy: PreservationPolicy,
) -> Vec<Rect> {
    match policy {
        PreservationPolicy::IgnoreExisting => candidates,
        PreservationPolicy::AvoidExisting => candidates
            .into_iter()
            .filter(|candidate| !existing.iter().any(|region| region.intersects(candidate)))
            .collect(),
    }
}
