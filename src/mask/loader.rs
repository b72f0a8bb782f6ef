use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use rayon::prelude::*;

use super::SourceImage;
use crate::error::SlicerError;

const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tga"];

/// Open source images from input paths (files or directories).
///
/// Images are read and their headers parsed, but pixel data stays
/// compressed until a mask is built. Sources are returned sorted by path.
pub fn load_sources(inputs: &[impl AsRef<Path>]) -> Result<Vec<SourceImage>> {
    let mut image_paths = collect_image_paths(inputs)?;

    if image_paths.is_empty() {
        return Err(SlicerError::NoImages.into());
    }
    image_paths.sort();

    info!("Opening {} images...", image_paths.len());

    let sources: Result<Vec<_>, SlicerError> = image_paths
        .par_iter()
        .map(|path| SourceImage::open(path))
        .collect();

    Ok(sources?)
}

fn collect_image_paths(inputs: &[impl AsRef<Path>]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for input in inputs {
        let path = input.as_ref();
        if !path.exists() {
            return Err(SlicerError::InputNotFound(path.to_path_buf()).into());
        }

        if path.is_file() {
            if is_supported_image(path) {
                paths.push(path.to_path_buf());
            }
        } else if path.is_dir() {
            collect_from_directory(path, &mut paths)?;
        }
    }

    Ok(paths)
}

fn collect_from_directory(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();

        if path.is_file() && is_supported_image(&path) {
            paths.push(path);
        } else if path.is_dir() {
            collect_from_directory(&path, paths)?;
        }
    }

    Ok(())
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
