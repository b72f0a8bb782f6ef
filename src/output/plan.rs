use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::SlicerError;
use crate::mask::SourceImage;

use super::regions_filename;

/// Regions file path for every source, in input order.
///
/// Two inputs with the same stem (e.g. `a/sheet.png` and `b/sheet.png`)
/// would write the same file, so that is rejected before any slicing.
pub fn plan_outputs(
    sources: &[SourceImage],
    output_dir: &Path,
) -> Result<Vec<PathBuf>, SlicerError> {
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    let mut paths = Vec::with_capacity(sources.len());

    for source in sources {
        let path = output_dir.join(regions_filename(&source.stem()));
        let input = source.path().map(Path::to_path_buf).unwrap_or_default();

        if let Some(first) = claimed.get(&path) {
            return Err(SlicerError::DuplicateOutput {
                path,
                first: first.clone(),
                second: input,
            });
        }

        claimed.insert(path.clone(), input);
        paths.push(path);
    }

    Ok(paths)
}
