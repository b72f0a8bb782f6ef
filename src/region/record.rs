use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// One atlas region carved out of a source texture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    /// Resource name, unique per texture
    pub name: String,
    /// Area of the source texture covered by this region
    pub region: Rect,
    /// Extra space around the region when drawn (left, top, right, bottom
    /// packed as x, y, width, height)
    #[serde(default)]
    pub margin: Rect,
    /// Clip sampling to the region to avoid bleeding from neighbours
    #[serde(default)]
    pub filter_clip: bool,
}

impl RegionRecord {
    pub fn new(name: impl Into<String>, region: Rect, margin: Rect, filter_clip: bool) -> Self {
        Self {
            name: name.into(),
            region,
            margin,
            filter_clip,
        }
    }
}
