mod naming;
mod record;

pub use naming::{create_regions, sanitize_name, unique_region_name};
pub use record::RegionRecord;
