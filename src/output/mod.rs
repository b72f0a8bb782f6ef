mod json;
mod plan;

pub use json::{SourceInfo, Size, read_regions, write_regions};
pub use plan::plan_outputs;

/// File name of the regions document for a texture stem
pub fn regions_filename(stem: &str) -> String {
    format!("{}.regions.json", stem)
}
