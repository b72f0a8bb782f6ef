use std::collections::HashSet;

use crate::geometry::Rect;

use super::RegionRecord;

const INVALID_NAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Remove characters that cannot appear in a file name
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control() && !INVALID_NAME_CHARS.contains(c))
        .collect()
}

/// First `"{stem}_{n}"` (lowercased stem, n counting from 0) that no
/// existing name uses, compared case-insensitively.
pub fn unique_region_name<'a>(
    texture_stem: &str,
    existing_names: impl IntoIterator<Item = &'a str>,
) -> String {
    let taken: HashSet<String> = existing_names
        .into_iter()
        .map(str::to_lowercase)
        .collect();
    next_free_name(&sanitize_name(&texture_stem.to_lowercase()), &taken, 0).0
}

fn next_free_name(stem: &str, taken: &HashSet<String>, start: usize) -> (String, usize) {
    let mut counter = start;
    loop {
        let candidate = format!("{}_{}", stem, counter);
        counter += 1;
        if !taken.contains(&candidate) {
            return (candidate, counter);
        }
    }
}

/// Turn slices into named region records.
///
/// Names follow [`unique_region_name`] against the existing records and
/// the records created earlier in the same call.
pub fn create_regions(
    slices: &[Rect],
    texture_stem: &str,
    margin: Rect,
    filter_clip: bool,
    existing: &[RegionRecord],
) -> Vec<RegionRecord> {
    let stem = sanitize_name(&texture_stem.to_lowercase());
    let mut taken: HashSet<String> = existing.iter().map(|r| r.name.to_lowercase()).collect();
    let mut counter = 0;

    slices
        .iter()
        .map(|slice| {
            let (name, next) = next_free_name(&stem, &taken, counter);
            counter = next;
            taken.insert(name.clone());
            RegionRecord::new(name, *slice, margin, filter_clip)
        })
        .collect()
}
