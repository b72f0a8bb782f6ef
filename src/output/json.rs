use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::SlicerError;
use crate::region::RegionRecord;

#[derive(Serialize, Deserialize)]
struct RegionDocument {
    #[serde(default)]
    meta: Meta,
    source: SourceInfo,
    regions: Vec<RegionRecord>,
}

#[derive(Serialize, Deserialize, Default)]
struct Meta {
    app: String,
    version: String,
}

/// The texture a set of regions was cut from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Image path as given on the command line
    pub image: String,
    pub size: Size,
}

impl SourceInfo {
    /// Whether this document was cut from the image at `path`.
    ///
    /// Paths are compared as written first, then after resolving both on
    /// disk, so `./sheet.png` and `/abs/sheet.png` name the same image.
    pub fn describes(&self, path: &Path) -> bool {
        if self.image.is_empty() {
            return false;
        }

        let recorded = Path::new(&self.image);
        if recorded == path {
            return true;
        }

        match (fs::canonicalize(recorded), fs::canonicalize(path)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

/// Write region records for one texture as pretty-printed JSON
pub fn write_regions(path: &Path, source: &SourceInfo, regions: &[RegionRecord]) -> Result<()> {
    let document = RegionDocument {
        meta: Meta {
            app: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        source: source.clone(),
        regions: regions.to_vec(),
    };

    let content = serde_json::to_string_pretty(&document)?;

    fs::write(path, content).map_err(|e| SlicerError::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Read region records written by [`write_regions`]
pub fn read_regions(path: &Path) -> Result<(SourceInfo, Vec<RegionRecord>)> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read regions file: {}", path.display()))?;

    let document: RegionDocument = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse regions file: {}", path.display()))?;

    Ok((document.source, document.regions))
}
