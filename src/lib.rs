pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod mask;
pub mod output;
pub mod region;
pub mod slice;

pub use cli::{CliArgs, Command, CommonArgs};
pub use error::SlicerError;
pub use geometry::Rect;
pub use mask::{MaskCache, MaskOptions, OpacityMask, SourceImage};
pub use region::RegionRecord;
pub use slice::{PreservationPolicy, SliceConfig, SliceMode, Slicer};
