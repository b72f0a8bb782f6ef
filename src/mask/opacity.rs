use image::{DynamicImage, RgbaImage};

/// Settings controlling how an opacity mask is built
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskOptions {
    /// A pixel is opaque when `alpha / 255` is strictly above this value
    pub alpha_threshold: f32,
    /// Limit for the longest mask side. `None` keeps one mask cell per pixel.
    pub max_resolution: Option<u32>,
}

impl Default for MaskOptions {
    fn default() -> Self {
        Self {
            alpha_threshold: 0.1,
            max_resolution: None,
        }
    }
}

/// Boolean opaque/transparent grid built from an image's alpha channel.
///
/// The mask may be coarser than the image it was built from; queries are
/// always made in image coordinates and mapped onto the mask. A mask with
/// zero width or height reports every pixel as opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct OpacityMask {
    image_width: u32,
    image_height: u32,
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl OpacityMask {
    /// Degenerate mask for an image of the given size: everything is opaque
    pub fn solid(image_width: u32, image_height: u32) -> Self {
        Self {
            image_width,
            image_height,
            width: 0,
            height: 0,
            bits: Vec::new(),
        }
    }

    /// Build a mask from any decoded image. Images without an alpha
    /// channel convert to fully opaque RGBA.
    pub fn from_image(image: &DynamicImage, options: &MaskOptions) -> Self {
        match image {
            DynamicImage::ImageRgba8(rgba) => Self::from_rgba(rgba, options),
            other => Self::from_rgba(&other.to_rgba8(), options),
        }
    }

    /// Mark every pixel whose alpha clears `options.alpha_threshold`,
    /// downsampled to `options.max_resolution` when set.
    pub fn from_rgba(image: &RgbaImage, options: &MaskOptions) -> Self {
        let (image_width, image_height) = image.dimensions();
        let (width, height) = mask_dimensions(image_width, image_height, options.max_resolution);

        let mut bits = vec![false; width as usize * height as usize];
        if width > 0 && height > 0 {
            for (x, y, pixel) in image.enumerate_pixels() {
                if f32::from(pixel[3]) / 255.0 > options.alpha_threshold {
                    let mx = scale_down(x, width, image_width);
                    let my = scale_down(y, height, image_height);
                    bits[my as usize * width as usize + mx as usize] = true;
                }
            }
        }

        Self {
            image_width,
            image_height,
            width,
            height,
            bits,
        }
    }

    /// Width of the image this mask describes
    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    /// Height of the image this mask describes
    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    /// Mask resolution, which may be smaller than the image's
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Opacity at image coordinate (x, y).
    ///
    /// Coordinates map to `floor(x * mask_w / image_w)` clamped into the
    /// mask, so out-of-range input resolves to an edge cell.
    pub fn is_opaque(&self, x: i64, y: i64) -> bool {
        if self.is_degenerate() {
            return true;
        }

        let mx = map_coordinate(x, self.width, self.image_width);
        let my = map_coordinate(y, self.height, self.image_height);
        self.bits[my * self.width as usize + mx]
    }

    /// Number of opaque mask cells
    pub fn opaque_count(&self) -> usize {
        self.bits.iter().filter(|&&bit| bit).count()
    }
}

fn mask_dimensions(image_width: u32, image_height: u32, max_resolution: Option<u32>) -> (u32, u32) {
    let longest = image_width.max(image_height);
    match max_resolution {
        Some(limit) if limit == 0 || longest == 0 => (0, 0),
        Some(limit) if longest > limit => (
            shrink(image_width, limit, longest),
            shrink(image_height, limit, longest),
        ),
        _ => (image_width, image_height),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn shrink(side: u32, limit: u32, longest: u32) -> u32 {
    // side <= longest, so the result fits back into u32
    let scaled = u64::from(side) * u64::from(limit) / u64::from(longest);
    (scaled as u32).max(1)
}

#[allow(clippy::cast_possible_truncation)]
fn scale_down(v: u32, mask_len: u32, image_len: u32) -> u32 {
    (u64::from(v) * u64::from(mask_len) / u64::from(image_len)) as u32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn map_coordinate(v: i64, mask_len: u32, image_len: u32) -> usize {
    let last = i64::from(mask_len) - 1;
    if image_len == 0 {
        return 0;
    }
    let scaled = v
        .saturating_mul(i64::from(mask_len))
        .div_euclid(i64::from(image_len));
    // Clamped into [0, mask_len - 1], so the cast cannot lose anything
    scaled.clamp(0, last) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba};

    fn image_with_opaque(width: u32, height: u32, opaque: &[(u32, u32)]) -> RgbaImage {
        let mut img = RgbaImage::new(width, height);
        for &(x, y) in opaque {
            img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        }
        img
    }

    #[test]
    fn test_full_resolution_mask() {
        let img = image_with_opaque(4, 3, &[(0, 0), (3, 2)]);
        let mask = OpacityMask::from_rgba(&img, &MaskOptions::default());

        assert_eq!(mask.resolution(), (4, 3));
        assert!(mask.is_opaque(0, 0));
        assert!(mask.is_opaque(3, 2));
        assert!(!mask.is_opaque(1, 1));
        assert_eq!(mask.opaque_count(), 2);
    }

    #[test]
    fn test_alpha_threshold() {
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 25]));
        img.put_pixel(1, 0, Rgba([0, 0, 0, 26]));
        img.put_pixel(2, 0, Rgba([0, 0, 0, 255]));

        let mask = OpacityMask::from_rgba(&img, &MaskOptions::default());

        // 25 / 255 is just below 0.1, 26 / 255 is just above
        assert!(!mask.is_opaque(0, 0));
        assert!(mask.is_opaque(1, 0));
        assert!(mask.is_opaque(2, 0));
    }

    #[test]
    fn test_image_without_alpha_is_opaque() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(5, 5, Rgb([0, 0, 0])));
        let mask = OpacityMask::from_image(&img, &MaskOptions::default());

        assert_eq!(mask.opaque_count(), 25);
    }

    #[test]
    fn test_out_of_range_queries_clamp() {
        let img = image_with_opaque(4, 4, &[(0, 0), (3, 3)]);
        let mask = OpacityMask::from_rgba(&img, &MaskOptions::default());

        assert!(mask.is_opaque(-5, -5));
        assert!(mask.is_opaque(100, 100));
        assert!(!mask.is_opaque(100, -1));
    }

    #[test]
    fn test_downsampled_mask() {
        // 8x4 image limited to 4 cells on the longest side -> 4x2 mask
        let img = image_with_opaque(8, 4, &[(7, 3)]);
        let options = MaskOptions {
            max_resolution: Some(4),
            ..MaskOptions::default()
        };
        let mask = OpacityMask::from_rgba(&img, &options);

        assert_eq!(mask.resolution(), (4, 2));
        // Pixel (7, 3) lands in mask cell (3, 1), shared with (6, 2)
        assert!(mask.is_opaque(7, 3));
        assert!(mask.is_opaque(6, 2));
        assert!(!mask.is_opaque(5, 3));
        assert!(!mask.is_opaque(0, 0));
    }

    #[test]
    fn test_degenerate_mask_is_opaque_everywhere() {
        let mask = OpacityMask::solid(16, 16);

        assert!(mask.is_degenerate());
        assert!(mask.is_opaque(0, 0));
        assert!(mask.is_opaque(15, 15));
        assert!(mask.is_opaque(-3, 99));
    }

    #[test]
    fn test_zero_resolution_limit_is_degenerate() {
        let img = image_with_opaque(4, 4, &[]);
        let options = MaskOptions {
            max_resolution: Some(0),
            ..MaskOptions::default()
        };
        let mask = OpacityMask::from_rgba(&img, &options);

        assert!(mask.is_degenerate());
        assert!(mask.is_opaque(2, 2));
    }
}
