use std::str::FromStr;

use clap::ValueEnum;
use log::debug;

use super::{
    DEFAULT_MERGE_TOLERANCE, GridLayout, PreservationPolicy, filter_existing, slice_automatic,
    slice_by_cell_count, slice_by_cell_size,
};
use crate::error::SlicerError;
use crate::geometry::Rect;
use crate::mask::{MaskCache, MaskOptions, OpacityMask, SourceImage};

/// Region detection strategy
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum SliceMode {
    /// One rectangle per connected opaque area
    #[default]
    #[value(name = "automatic")]
    Automatic,
    /// Regular grid of fixed-size cells
    #[value(name = "grid-by-cell-size")]
    GridByCellSize,
    /// Regular grid with a fixed number of columns and rows
    #[value(name = "grid-by-cell-count")]
    GridByCellCount,
}

impl FromStr for SliceMode {
    type Err = SlicerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "automatic" => Ok(SliceMode::Automatic),
            "grid-by-cell-size" => Ok(SliceMode::GridByCellSize),
            "grid-by-cell-count" => Ok(SliceMode::GridByCellCount),
            _ => Err(SlicerError::InvalidConfiguration(format!(
                "unknown slice mode '{}'. Valid values: automatic, grid-by-cell-size, \
                 grid-by-cell-count",
                s
            ))),
        }
    }
}

/// Everything that shapes one slicing pass
#[derive(Debug, Clone, PartialEq)]
pub struct SliceConfig {
    pub mode: SliceMode,
    pub preservation: PreservationPolicy,
    /// Cell size for [`SliceMode::GridByCellSize`]
    pub cell_size: (u32, u32),
    /// Columns and rows for [`SliceMode::GridByCellCount`]
    pub columns_rows: (u32, u32),
    pub layout: GridLayout,
    /// Gap bridged by [`SliceMode::Automatic`]
    pub merge_tolerance: f32,
}

impl Default for SliceConfig {
    fn default() -> Self {
        Self {
            mode: SliceMode::Automatic,
            preservation: PreservationPolicy::IgnoreExisting,
            cell_size: (8, 8),
            columns_rows: (1, 1),
            layout: GridLayout::default(),
            merge_tolerance: DEFAULT_MERGE_TOLERANCE,
        }
    }
}

impl SliceConfig {
    pub fn new(mode: SliceMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn preservation(mut self, preservation: PreservationPolicy) -> Self {
        self.preservation = preservation;
        self
    }

    pub fn cell_size(mut self, width: u32, height: u32) -> Self {
        self.cell_size = (width, height);
        self
    }

    pub fn columns_rows(mut self, columns: u32, rows: u32) -> Self {
        self.columns_rows = (columns, rows);
        self
    }

    pub fn offset(mut self, x: f32, y: f32) -> Self {
        self.layout.offset = (x, y);
        self
    }

    pub fn padding(mut self, x: f32, y: f32) -> Self {
        self.layout.padding = (x, y);
        self
    }

    pub fn keep_empty(mut self, keep_empty: bool) -> Self {
        self.layout.keep_empty = keep_empty;
        self
    }

    pub fn merge_tolerance(mut self, tolerance: f32) -> Self {
        self.merge_tolerance = tolerance;
        self
    }
}

/// Runs slicing passes against source images, caching the opacity mask
/// of the last image it saw.
#[derive(Debug, Default)]
pub struct Slicer {
    config: SliceConfig,
    cache: MaskCache,
}

impl Slicer {
    pub fn new(config: SliceConfig, mask_options: MaskOptions) -> Self {
        Self {
            config,
            cache: MaskCache::new(mask_options),
        }
    }

    pub fn cache(&self) -> &MaskCache {
        &self.cache
    }

    /// Compute the slices for `image` and apply the preservation policy
    /// against `existing` regions.
    ///
    /// No image means nothing to slice and yields no rectangles. An image
    /// that fails to decode is sliced as if it were fully opaque.
    pub fn slice(&mut self, image: Option<&SourceImage>, existing: &[Rect]) -> Vec<Rect> {
        let Some(image) = image else {
            return Vec::new();
        };

        let mask = self.cache.mask_for(image);
        let candidates = run_mode(mask, &self.config, self.config.layout.keep_empty);
        let candidate_count = candidates.len();
        let slices = filter_existing(candidates, existing, self.config.preservation);

        debug!(
            "{:?} slice produced {} candidates, {} after {:?}",
            self.config.mode,
            candidate_count,
            slices.len(),
            self.config.preservation
        );

        slices
    }

    /// Cheap outline of what [`Slicer::slice`] would cut, for display.
    ///
    /// Grid modes show every cell, including empty ones, and automatic
    /// detection is skipped entirely. Existing regions are not considered.
    pub fn preview(&mut self, image: Option<&SourceImage>) -> Vec<Rect> {
        let Some(image) = image else {
            return Vec::new();
        };

        match self.config.mode {
            SliceMode::Automatic => Vec::new(),
            SliceMode::GridByCellSize | SliceMode::GridByCellCount => {
                run_mode(self.cache.mask_for(image), &self.config, true)
            }
        }
    }
}

fn run_mode(mask: &OpacityMask, config: &SliceConfig, keep_empty: bool) -> Vec<Rect> {
    let layout = GridLayout {
        keep_empty,
        ..config.layout
    };

    match config.mode {
        SliceMode::Automatic => slice_automatic(mask, config.merge_tolerance),
        SliceMode::GridByCellSize => slice_by_cell_size(mask, config.cell_size, &layout),
        SliceMode::GridByCellCount => slice_by_cell_count(mask, config.columns_rows, &layout),
    }
}
