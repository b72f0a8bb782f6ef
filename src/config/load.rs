use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::types::SlicerConfig;
use crate::geometry::Rect;
use crate::mask::MaskOptions;
use crate::slice::{GridLayout, PreservationPolicy, SliceConfig, SliceMode};

/// A loaded configuration file with its associated directory.
///
/// Paths in the config are relative to the config file location,
/// so we need to track where the config was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// The parsed configuration
    pub config: SlicerConfig,
    /// The directory containing the config file
    pub config_dir: PathBuf,
}

impl LoadedConfig {
    /// Load a config file from the given path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        let config: SlicerConfig = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        let config_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self { config, config_dir })
    }

    /// Resolve input patterns to actual file paths.
    ///
    /// Glob patterns are expanded, and all paths are resolved relative
    /// to the config file directory.
    pub fn resolve_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut results = Vec::new();

        for pattern in &self.config.input {
            if is_glob_pattern(pattern) {
                let full_pattern = self.config_dir.join(pattern);
                let pattern_str = full_pattern.to_string_lossy();

                let paths = glob::glob(&pattern_str)
                    .with_context(|| format!("invalid glob pattern: {}", pattern))?;

                for entry in paths {
                    let path =
                        entry.with_context(|| format!("failed to read glob entry: {}", pattern))?;
                    results.push(path);
                }
            } else {
                results.push(self.config_dir.join(pattern));
            }
        }

        Ok(results)
    }

    /// Resolve the output directory relative to the config file directory.
    pub fn resolve_output_dir(&self) -> PathBuf {
        self.config_dir.join(&self.config.output_dir)
    }

    /// Resolve the existing-regions file, if one is configured.
    pub fn resolve_existing(&self) -> Option<PathBuf> {
        self.config
            .existing
            .as_ref()
            .map(|existing| self.config_dir.join(existing))
    }
}

impl SlicerConfig {
    /// Slicing settings described by this file.
    ///
    /// Fails with an invalid-configuration error when `mode` or
    /// `preservation` is not a known value.
    pub fn slice_config(&self) -> Result<SliceConfig> {
        let mode: SliceMode = self.mode.parse()?;
        let preservation: PreservationPolicy = self.preservation.parse()?;

        Ok(SliceConfig {
            mode,
            preservation,
            cell_size: self.cell_size,
            columns_rows: self.columns_rows,
            layout: GridLayout {
                offset: self.offset,
                padding: self.padding,
                keep_empty: self.keep_empty,
            },
            merge_tolerance: self.merge_tolerance,
        })
    }

    pub fn mask_options(&self) -> MaskOptions {
        MaskOptions {
            alpha_threshold: self.alpha_threshold,
            max_resolution: self.max_mask_resolution,
        }
    }

    pub fn margin_rect(&self) -> Rect {
        let [x, y, width, height] = self.margin;
        Rect::new(x, y, width, height)
    }
}

/// Check if a pattern contains glob characters.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?') || pattern.contains('[')
}
