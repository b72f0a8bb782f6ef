use serde::{Deserialize, Serialize};

/// Slicing configuration file structure.
///
/// All paths in the config are relative to the config file location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlicerConfig {
    /// Config file version (currently 1)
    pub version: u32,
    /// Input file paths or glob patterns
    pub input: Vec<String>,
    /// Output directory for region files
    pub output_dir: String,
    /// Slice mode: "automatic", "grid-by-cell-size" or "grid-by-cell-count"
    pub mode: String,
    /// Preservation policy: "ignore-existing" or "avoid-existing"
    pub preservation: String,
    /// Regions file to treat as already existing
    pub existing: Option<String>,
    /// Cell width and height for grid-by-cell-size
    pub cell_size: (u32, u32),
    /// Columns and rows for grid-by-cell-count
    pub columns_rows: (u32, u32),
    /// Position of the first grid cell
    pub offset: (f32, f32),
    /// Gap between grid cells
    pub padding: (f32, f32),
    /// Keep grid cells without opaque pixels
    pub keep_empty: bool,
    /// Gap in pixels still merged by automatic slicing
    pub merge_tolerance: f32,
    /// Alpha (0-1) a pixel must exceed to count as opaque
    pub alpha_threshold: f32,
    /// Limit for the longest side of the opacity mask
    pub max_mask_resolution: Option<u32>,
    /// Margin applied to created regions (x, y, width, height)
    pub margin: [f32; 4],
    /// Enable filter clip on created regions
    pub filter_clip: bool,
}

impl Default for SlicerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            input: Vec::new(),
            output_dir: ".".to_string(),
            mode: "automatic".to_string(),
            preservation: "ignore-existing".to_string(),
            existing: None,
            cell_size: (8, 8),
            columns_rows: (1, 1),
            offset: (0.0, 0.0),
            padding: (0.0, 0.0),
            keep_empty: false,
            merge_tolerance: 1.5,
            alpha_threshold: 0.1,
            max_mask_resolution: None,
            margin: [0.0; 4],
            filter_clip: false,
        }
    }
}
