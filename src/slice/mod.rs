mod automatic;
mod filter;
mod grid;
mod slicer;

pub use automatic::{DEFAULT_MERGE_TOLERANCE, merge_rects, slice_automatic};
pub use filter::{PreservationPolicy, filter_existing};
pub use grid::{GridLayout, cell_size_for_count, slice_by_cell_count, slice_by_cell_size};
pub use slicer::{SliceConfig, SliceMode, Slicer};
