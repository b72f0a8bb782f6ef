use log::debug;

use crate::geometry::Rect;
use crate::mask::OpacityMask;

/// Placement of the grid lattice, shared by both grid modes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridLayout {
    /// Top-left corner of the first cell
    pub offset: (f32, f32),
    /// Gap between neighbouring cells along each axis
    pub padding: (f32, f32),
    /// Keep cells that contain no opaque pixel
    pub keep_empty: bool,
}

/// Cut the image into `cell_size` cells laid out on `layout`'s lattice.
///
/// Cell size components below 1 are raised to 1 and negative padding is
/// treated as 0, so every step advances by at least one pixel. Cells are not
/// clipped to the image; with `keep_empty` off, cells without an opaque
/// in-bounds pixel are dropped.
pub fn slice_by_cell_size(
    mask: &OpacityMask,
    cell_size: (u32, u32),
    layout: &GridLayout,
) -> Vec<Rect> {
    let cell_w = cell_size.0.max(1);
    let cell_h = cell_size.1.max(1);
    let step_x = cell_w as f32 + layout.padding.0.max(0.0);
    let step_y = cell_h as f32 + layout.padding.1.max(0.0);
    let image_w = mask.image_width() as f32;
    let image_h = mask.image_height() as f32;

    let mut cells = Vec::new();
    if !layout.offset.0.is_finite() || !layout.offset.1.is_finite() {
        return cells;
    }

    // Positions come from the lattice index, not an accumulated sum
    let mut row = 0u32;
    loop {
        let y = lattice_position(layout.offset.1, step_y, row);
        if y.is_nan() || y >= image_h {
            break;
        }

        let mut column = 0u32;
        loop {
            let x = lattice_position(layout.offset.0, step_x, column);
            if x.is_nan() || x >= image_w {
                break;
            }
            cells.push(Rect::new(x, y, cell_w as f32, cell_h as f32));
            column += 1;
        }
        row += 1;
    }

    let total = cells.len();
    if !layout.keep_empty {
        cells.retain(|cell| has_opaque_pixel(mask, cell, cell_w, cell_h));
    }

    debug!(
        "Grid slice with {}x{} cells kept {} of {} cells",
        cell_w,
        cell_h,
        cells.len(),
        total
    );

    cells
}

/// Position of the `index`-th cell along one axis. The first cell sits at
/// `offset` even when `step` is infinite.
fn lattice_position(offset: f32, step: f32, index: u32) -> f32 {
    if index == 0 {
        offset
    } else {
        offset + index as f32 * step
    }
}

/// Cut the image into `columns_rows` equal cells (sizes floored).
///
/// Counts below 1 are raised to 1.
pub fn slice_by_cell_count(
    mask: &OpacityMask,
    columns_rows: (u32, u32),
    layout: &GridLayout,
) -> Vec<Rect> {
    slice_by_cell_size(mask, cell_size_for_count(mask, columns_rows), layout)
}

/// Cell size giving `columns_rows` cells across the mask's image
pub fn cell_size_for_count(mask: &OpacityMask, columns_rows: (u32, u32)) -> (u32, u32) {
    (
        mask.image_width() / columns_rows.0.max(1),
        mask.image_height() / columns_rows.1.max(1),
    )
}

#[allow(clippy::cast_possible_truncation)]
fn has_opaque_pixel(mask: &OpacityMask, cell: &Rect, cell_w: u32, cell_h: u32) -> bool {
    let image_w = mask.image_width() as f32;
    let image_h = mask.image_height() as f32;

    for dy in 0..cell_h {
        let y = (cell.y + dy as f32).round();
        if y < 0.0 || y >= image_h {
            continue;
        }
        for dx in 0..cell_w {
            let x = (cell.x + dx as f32).round();
            if x < 0.0 || x >= image_w {
                continue;
            }
            // Both coordinates are in-bounds integers at this point
            if mask.is_opaque(x as i64, y as i64) {
                return true;
            }
        }
    }

    false
}
