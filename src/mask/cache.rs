use log::{debug, warn};

use super::{ImageId, MaskOptions, OpacityMask, SourceImage};
use crate::error::SlicerError;

/// Keeps the opacity mask of the most recently queried image.
///
/// Asking for a different image (by identity) throws the old mask away.
/// The cache is owned and mutated through `&mut self`, so sharing one
/// across threads needs a lock around it.
#[derive(Debug, Default)]
pub struct MaskCache {
    options: MaskOptions,
    entry: Option<(ImageId, OpacityMask)>,
}

impl MaskCache {
    pub fn new(options: MaskOptions) -> Self {
        Self {
            options,
            entry: None,
        }
    }

    /// Change mask options, dropping the cached mask if they differ
    pub fn set_options(&mut self, options: MaskOptions) {
        if self.options != options {
            self.options = options;
            self.invalidate();
        }
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Identity of the image whose mask is currently cached
    pub fn cached_id(&self) -> Option<ImageId> {
        self.entry.as_ref().map(|(id, _)| *id)
    }

    /// Mask for `image`, falling back to an all-opaque mask when the image
    /// cannot be decoded.
    pub fn mask_for(&mut self, image: &SourceImage) -> &OpacityMask {
        let entry = match self.entry.take() {
            Some(entry) if entry.0 == image.id() => entry,
            _ => {
                let mask = self.build(image).unwrap_or_else(|e| {
                    warn!("{}; treating the whole image as opaque", e);
                    let (width, height) = image.dimensions();
                    OpacityMask::solid(width, height)
                });
                (image.id(), mask)
            }
        };

        &self.entry.insert(entry).1
    }

    /// Mask for `image`, reporting decode failures to the caller
    pub fn try_mask_for(&mut self, image: &SourceImage) -> Result<&OpacityMask, SlicerError> {
        let entry = match self.entry.take() {
            Some(entry) if entry.0 == image.id() => entry,
            _ => (image.id(), self.build(image)?),
        };

        Ok(&self.entry.insert(entry).1)
    }

    fn build(&self, image: &SourceImage) -> Result<OpacityMask, SlicerError> {
        let decoded = image.decompress()?;
        let mask = OpacityMask::from_image(&decoded, &self.options);

        let (width, height) = mask.resolution();
        debug!(
            "Built {}x{} opacity mask for {}x{} image ({} opaque cells)",
            width,
            height,
            decoded.width(),
            decoded.height(),
            mask.opaque_count()
        );

        Ok(mask)
    }
}
