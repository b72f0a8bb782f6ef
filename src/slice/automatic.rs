use std::collections::{HashMap, VecDeque};

use log::debug;

use crate::geometry::Rect;
use crate::mask::OpacityMask;

/// Default gap (in pixels) still bridged between two opaque areas
pub const DEFAULT_MERGE_TOLERANCE: f32 = 1.5;

/// Smallest usable tolerance: pixels that touch, including diagonally,
/// always belong to the same region.
const MIN_MERGE_TOLERANCE: f32 = 0.5;

/// Bounding rectangles of the opaque regions of `mask`.
///
/// Opaque areas closer than `merge_tolerance` pixels end up in the same
/// rectangle. The returned rectangles lie inside the image, each covers at
/// least one opaque pixel, and no two of them are within the tolerance of
/// each other (so they never overlap).
pub fn slice_automatic(mask: &OpacityMask, merge_tolerance: f32) -> Vec<Rect> {
    let runs = collect_runs(mask);
    let run_count = runs.len();
    let regions = merge_rects(runs, merge_tolerance);

    debug!(
        "Automatic slice merged {} opaque runs into {} regions",
        run_count,
        regions.len()
    );

    regions
}

/// One rectangle per horizontal run of opaque pixels, scanned row-major
fn collect_runs(mask: &OpacityMask) -> Vec<Rect> {
    let (width, height) = (mask.image_width(), mask.image_height());
    let mut runs = Vec::new();

    for y in 0..height {
        let mut run_start = None;
        for x in 0..width {
            let opaque = mask.is_opaque(i64::from(x), i64::from(y));
            match (opaque, run_start) {
                (true, None) => run_start = Some(x),
                (false, Some(start)) => {
                    runs.push(run_rect(start, x, y));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            runs.push(run_rect(start, width, y));
        }
    }

    runs
}

fn run_rect(start: u32, end: u32, y: u32) -> Rect {
    Rect::new(start as f32, y as f32, (end - start) as f32, 1.0)
}

/// Union rectangles until no two are within `tolerance` of each other.
///
/// Rectangles live in an index-addressed arena; absorbed entries are
/// tombstoned rather than removed, and a worklist holds the indices whose
/// neighbourhood still has to be checked. An entry that grows goes back on
/// the worklist, so the loop stops exactly at the fixed point. Neighbours
/// are looked up through a bucket grid instead of scanning the arena.
pub fn merge_rects(rects: Vec<Rect>, tolerance: f32) -> Vec<Rect> {
    let tolerance = tolerance.max(MIN_MERGE_TOLERANCE).min(f32::MAX);
    let mut arena: Vec<Option<Rect>> = rects.into_iter().map(Some).collect();
    let mut pending: VecDeque<usize> = (0..arena.len()).collect();

    let mut index = BucketIndex::default();
    for (i, rect) in arena.iter().enumerate() {
        if let Some(rect) = rect {
            index.insert(i, rect);
        }
    }

    let mut candidates = Vec::new();
    while let Some(current_index) = pending.pop_front() {
        let Some(mut current) = arena[current_index] else {
            continue;
        };

        let reach = current.grow(tolerance);
        if !index.query(&reach, &mut candidates) {
            candidates.clear();
            candidates.extend(0..arena.len());
        }

        let mut grew = false;
        for &other_index in &candidates {
            if other_index == current_index {
                continue;
            }
            let Some(other) = arena[other_index] else {
                continue;
            };

            if reach.intersects(&other) {
                current = current.merge(&other);
                arena[other_index] = None;
                grew = true;
            }
        }

        arena[current_index] = Some(current);
        if grew {
            index.insert(current_index, &current);
            pending.push_back(current_index);
        }
    }

    arena.into_iter().flatten().collect()
}

/// Side length of one bucket, in pixels
const BUCKET_SIZE: f32 = 32.0;

/// Rectangles covering more buckets than this are kept in a flat list
const MAX_BUCKETS_PER_RECT: i64 = 4096;

/// Uniform grid from bucket to the arena indices overlapping it.
///
/// Entries are only ever added: an index stays in the buckets of its old,
/// smaller extent, and tombstoned indices are skipped by the caller.
#[derive(Default)]
struct BucketIndex {
    buckets: HashMap<(i64, i64), Vec<usize>>,
    oversized: Vec<usize>,
}

impl BucketIndex {
    fn insert(&mut self, arena_index: usize, rect: &Rect) {
        let Some((xs, ys)) = bucket_span(rect) else {
            self.oversized.push(arena_index);
            return;
        };

        for by in ys.0..=ys.1 {
            for bx in xs.0..=xs.1 {
                self.buckets.entry((bx, by)).or_default().push(arena_index);
            }
        }
    }

    /// Sorted, deduplicated indices that may overlap `area`.
    /// Returns false when `area` is too large to look up bucket by bucket.
    fn query(&self, area: &Rect, out: &mut Vec<usize>) -> bool {
        out.clear();
        let Some((xs, ys)) = bucket_span(area) else {
            return false;
        };

        for by in ys.0..=ys.1 {
            for bx in xs.0..=xs.1 {
                if let Some(entries) = self.buckets.get(&(bx, by)) {
                    out.extend_from_slice(entries);
                }
            }
        }
        out.extend_from_slice(&self.oversized);
        out.sort_unstable();
        out.dedup();
        true
    }
}

/// Inclusive bucket ranges covered by `rect`, or `None` when it cannot be
/// looked up bucket by bucket
#[allow(clippy::cast_possible_truncation)]
fn bucket_span(rect: &Rect) -> Option<((i64, i64), (i64, i64))> {
    let x0 = (rect.x / BUCKET_SIZE).floor();
    let y0 = (rect.y / BUCKET_SIZE).floor();
    let x1 = (rect.end_x() / BUCKET_SIZE).floor();
    let y1 = (rect.end_y() / BUCKET_SIZE).floor();

    if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) || x1 < x0 || y1 < y0 {
        return None;
    }

    let columns = f64::from(x1 - x0) + 1.0;
    let rows = f64::from(y1 - y0) + 1.0;
    if columns * rows > MAX_BUCKETS_PER_RECT as f64 {
        return None;
    }

    // Saturating casts keep the mapping monotonic, so overlapping extents
    // still share a bucket
    Some(((x0 as i64, x1 as i64), (y0 as i64, y1 as i64)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::MaskOptions;
    use image::{Rgba, RgbaImage};

    fn mask_from(width: u32, height: u32, blocks: &[(u32, u32, u32, u32)]) -> OpacityMask {
        let mut img = RgbaImage::new(width, height);
        for &(bx, by, bw, bh) in blocks {
            for y in by..by + bh {
                for x in bx..bx + bw {
                    img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
                }
            }
        }
        OpacityMask::from_rgba(&img, &MaskOptions::default())
    }

    fn sorted(mut rects: Vec<Rect>) -> Vec<Rect> {
        rects.sort_by(|a, b| a.y.total_cmp(&b.y).then(a.x.total_cmp(&b.x)));
        rects
    }

    #[test]
    fn test_fully_transparent() {
        let mask = mask_from(8, 8, &[]);
        assert!(slice_automatic(&mask, DEFAULT_MERGE_TOLERANCE).is_empty());
    }

    #[test]
    fn test_fully_opaque() {
        let mask = mask_from(8, 6, &[(0, 0, 8, 6)]);
        let rects = slice_automatic(&mask, DEFAULT_MERGE_TOLERANCE);
        assert_eq!(rects, vec![Rect::new(0.0, 0.0, 8.0, 6.0)]);
    }

    #[test]
    fn test_one_pixel_gap_merges() {
        let mask = mask_from(8, 4, &[(0, 0, 2, 2), (3, 0, 2, 2)]);
        let rects = slice_automatic(&mask, DEFAULT_MERGE_TOLERANCE);
        assert_eq!(rects, vec![Rect::new(0.0, 0.0, 5.0, 2.0)]);
    }

    #[test]
    fn test_wide_gap_stays_separate() {
        let mask = mask_from(10, 4, &[(0, 0, 2, 2), (5, 0, 2, 2)]);
        let rects = sorted(slice_automatic(&mask, DEFAULT_MERGE_TOLERANCE));
        assert_eq!(
            rects,
            vec![Rect::new(0.0, 0.0, 2.0, 2.0), Rect::new(5.0, 0.0, 2.0, 2.0)]
        );
    }

    #[test]
    fn test_two_pixel_gap_stays_separate() {
        let mask = mask_from(10, 4, &[(0, 0, 2, 2), (4, 0, 2, 2)]);
        assert_eq!(slice_automatic(&mask, DEFAULT_MERGE_TOLERANCE).len(), 2);
    }

    #[test]
    fn test_vertical_gap_merges() {
        let mask = mask_from(4, 8, &[(0, 0, 2, 2), (1, 3, 2, 2)]);
        let rects = slice_automatic(&mask, DEFAULT_MERGE_TOLERANCE);
        assert_eq!(rects, vec![Rect::new(0.0, 0.0, 3.0, 5.0)]);
    }

    #[test]
    fn test_diagonal_neighbours_merge() {
        let mask = mask_from(4, 4, &[(0, 0, 1, 1), (1, 1, 1, 1), (2, 2, 1, 1)]);
        let rects = slice_automatic(&mask, 0.0);
        assert_eq!(rects, vec![Rect::new(0.0, 0.0, 3.0, 3.0)]);
    }

    #[test]
    fn test_ring_is_one_region() {
        // Hollow square: all four sides connect through the corners
        let mask = mask_from(
            12,
            12,
            &[(2, 2, 8, 1), (2, 9, 8, 1), (2, 2, 1, 8), (9, 2, 1, 8)],
        );
        let rects = slice_automatic(&mask, DEFAULT_MERGE_TOLERANCE);
        assert_eq!(rects, vec![Rect::new(2.0, 2.0, 8.0, 8.0)]);
    }

    #[test]
    fn test_u_shape_joins_late() {
        // Two columns only connected by the bottom row
        let mask = mask_from(10, 10, &[(0, 0, 2, 9), (7, 0, 2, 9), (0, 8, 9, 1)]);
        let rects = slice_automatic(&mask, DEFAULT_MERGE_TOLERANCE);
        assert_eq!(rects, vec![Rect::new(0.0, 0.0, 9.0, 9.0)]);
    }

    #[test]
    fn test_bounding_box_merge_is_transitive() {
        // The L's bounding box reaches the lone pixel even though the
        // pixel itself is far from any opaque pixel of the L.
        let mask = mask_from(
            12,
            12,
            &[(0, 0, 10, 1), (0, 0, 1, 10), (8, 8, 1, 1)],
        );
        let rects = slice_automatic(&mask, DEFAULT_MERGE_TOLERANCE);
        assert_eq!(rects, vec![Rect::new(0.0, 0.0, 10.0, 10.0)]);
    }

    #[test]
    fn test_degenerate_mask_gives_full_image() {
        let mask = OpacityMask::solid(7, 5);
        let rects = slice_automatic(&mask, DEFAULT_MERGE_TOLERANCE);
        assert_eq!(rects, vec![Rect::new(0.0, 0.0, 7.0, 5.0)]);
    }

    #[test]
    fn test_zero_sized_image() {
        let mask = OpacityMask::solid(0, 5);
        assert!(slice_automatic(&mask, DEFAULT_MERGE_TOLERANCE).is_empty());
    }

    #[test]
    fn test_idempotent() {
        let mask = mask_from(
            20,
            20,
            &[(1, 1, 3, 3), (10, 2, 4, 1), (2, 12, 6, 6), (15, 15, 2, 2)],
        );
        let first = sorted(slice_automatic(&mask, DEFAULT_MERGE_TOLERANCE));
        let second = sorted(slice_automatic(&mask, DEFAULT_MERGE_TOLERANCE));
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_coverage_and_disjointness_on_scattered_pixels() {
        let (width, height) = (40u32, 30u32);
        let mut img = RgbaImage::new(width, height);
        let mut seed: u32 = 99;
        for pixel in img.pixels_mut() {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
            if (seed >> 16) % 11 == 0 {
                *pixel = Rgba([0, 0, 0, 255]);
            }
        }
        let mask = OpacityMask::from_rgba(&img, &MaskOptions::default());
        let rects = slice_automatic(&mask, DEFAULT_MERGE_TOLERANCE);

        let bounds = Rect::new(0.0, 0.0, width as f32, height as f32);
        for rect in &rects {
            assert!(rect.has_area());
            assert!(bounds.contains(rect));
        }

        for (i, a) in rects.iter().enumerate() {
            for b in rects.iter().skip(i + 1) {
                assert!(!a.intersects(b), "{:?} overlaps {:?}", a, b);
            }
        }

        for y in 0..height {
            for x in 0..width {
                if mask.is_opaque(i64::from(x), i64::from(y)) {
                    let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                    assert!(
                        rects.iter().any(|r| r.has_point(px, py)),
                        "pixel ({}, {}) not covered",
                        x,
                        y
                    );
                }
            }
        }
    }

    #[test]
    fn test_merge_rects_fixed_point() {
        let rects = vec![
            Rect::new(0.0, 0.0, 1.0, 1.0),
            Rect::new(10.0, 0.0, 1.0, 1.0),
            Rect::new(5.0, 0.0, 1.0, 1.0),
            Rect::new(1.0, 0.0, 4.0, 1.0),
        ];
        // The last rect bridges the first and third; the second stays apart
        let merged = sorted(merge_rects(rects, DEFAULT_MERGE_TOLERANCE));
        assert_eq!(
            merged,
            vec![Rect::new(0.0, 0.0, 6.0, 1.0), Rect::new(10.0, 0.0, 1.0, 1.0)]
        );
    }

    #[test]
    fn test_wider_tolerance_bridges_wider_gap() {
        let mask = mask_from(10, 4, &[(0, 0, 2, 2), (4, 0, 2, 2)]);
        let rects = slice_automatic(&mask, 3.0);
        assert_eq!(rects, vec![Rect::new(0.0, 0.0, 6.0, 2.0)]);
    }

    #[test]
    fn test_gap_equal_to_tolerance_stays_separate() {
        let mask = mask_from(12, 4, &[(0, 0, 2, 2), (5, 0, 2, 2)]);
        assert_eq!(slice_automatic(&mask, 3.0).len(), 2);

        let mask = mask_from(10, 4, &[(0, 0, 2, 2), (4, 0, 2, 2)]);
        assert_eq!(slice_automatic(&mask, 2.0).len(), 2);
        assert_eq!(slice_automatic(&mask, 2.5).len(), 1);
    }

    #[test]
    fn test_large_sheet_of_sprites() {
        // 32x32 sprites of 10x10 pixels, 6 pixels apart
        let (columns, rows) = (32u32, 32u32);
        let blocks: Vec<(u32, u32, u32, u32)> = (0..rows)
            .flat_map(|r| (0..columns).map(move |c| (c * 16 + 3, r * 16 + 3, 10, 10)))
            .collect();
        let mask = mask_from(columns * 16, rows * 16, &blocks);

        let rects = sorted(slice_automatic(&mask, DEFAULT_MERGE_TOLERANCE));
        let expected: Vec<Rect> = blocks
            .iter()
            .map(|&(x, y, w, h)| Rect::new(x as f32, y as f32, w as f32, h as f32))
            .collect();
        assert_eq!(rects, sorted(expected));
    }

    #[test]
    fn test_long_rect_bridges_distant_buckets() {
        let rects = vec![
            Rect::new(0.0, 0.0, 1.0, 1.0),
            Rect::new(300.0, 200.0, 1.0, 1.0),
            Rect::new(150.0, 100.0, 1.0, 1.0),
            Rect::new(1.0, 0.0, 300.0, 1.0),
            Rect::new(300.0, 1.0, 1.0, 199.0),
        ];
        let merged = merge_rects(rects, DEFAULT_MERGE_TOLERANCE);
        assert_eq!(merged, vec![Rect::new(0.0, 0.0, 301.0, 201.0)]);
    }

    #[test]
    fn test_infinite_tolerance_merges_everything() {
        let rects = vec![
            Rect::new(0.0, 0.0, 1.0, 1.0),
            Rect::new(1000.0, 5.0, 2.0, 2.0),
            Rect::new(-50.0, 400.0, 1.0, 1.0),
        ];
        let merged = merge_rects(rects, f32::INFINITY);
        assert_eq!(merged, vec![Rect::new(-50.0, 0.0, 1052.0, 401.0)]);
    }
}
