mod cache;
mod loader;
mod opacity;
mod source;

pub use cache::MaskCache;
pub use loader::load_sources;
pub use opacity::{MaskOptions, OpacityMask};
pub use source::{ImageId, SourceImage};
