use std::borrow::Cow;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use image::{DynamicImage, ImageReader};

use crate::error::SlicerError;

static NEXT_IMAGE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a source image. Clones of a `SourceImage` share it,
/// every newly constructed image gets a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(u64);

impl ImageId {
    fn next() -> Self {
        Self(NEXT_IMAGE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone)]
enum ImageData {
    /// Still in its on-disk encoding (PNG, WebP, ...)
    Encoded(Arc<[u8]>),
    Decoded(Arc<DynamicImage>),
}

/// A raster image to slice, either compressed or already decoded
#[derive(Debug, Clone)]
pub struct SourceImage {
    id: ImageId,
    path: Option<PathBuf>,
    width: u32,
    height: u32,
    data: ImageData,
}

impl SourceImage {
    /// Read an image file without decoding its pixels.
    ///
    /// Only the header is parsed here, to learn the dimensions. Pixel data
    /// is decoded lazily by [`SourceImage::decompress`].
    pub fn open(path: &Path) -> Result<Self, SlicerError> {
        let bytes = std::fs::read(path).map_err(|e| SlicerError::ImageLoad {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

        let (width, height) = probe_dimensions(&bytes).map_err(|e| SlicerError::ImageLoad {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(Self {
            id: ImageId::next(),
            path: Some(path.to_path_buf()),
            width,
            height,
            data: ImageData::Encoded(bytes.into()),
        })
    }

    /// Wrap encoded image bytes held in memory
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, SlicerError> {
        let (width, height) = probe_dimensions(&bytes).map_err(SlicerError::ImageDecode)?;

        Ok(Self {
            id: ImageId::next(),
            path: None,
            width,
            height,
            data: ImageData::Encoded(bytes.into()),
        })
    }

    /// Wrap an already decoded image
    pub fn from_image(image: DynamicImage) -> Self {
        Self {
            id: ImageId::next(),
            path: None,
            width: image.width(),
            height: image.height(),
            data: ImageData::Decoded(Arc::new(image)),
        }
    }

    pub fn id(&self) -> ImageId {
        self.id
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// File stem used for naming regions, "texture" for in-memory images
    pub fn stem(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_stem)
            .and_then(|s| s.to_str())
            .unwrap_or("texture")
            .to_string()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self.data, ImageData::Encoded(_))
    }

    /// Decoded pixels of this image. The source itself is left untouched,
    /// so calling this repeatedly always yields the same result.
    pub fn decompress(&self) -> Result<Cow<'_, DynamicImage>, SlicerError> {
        match &self.data {
            ImageData::Decoded(image) => Ok(Cow::Borrowed(image.as_ref())),
            ImageData::Encoded(bytes) => {
                let image = ImageReader::new(Cursor::new(&bytes[..]))
                    .with_guessed_format()
                    .map_err(|e| SlicerError::ImageDecode(e.into()))?
                    .decode()
                    .map_err(SlicerError::ImageDecode)?;
                Ok(Cow::Owned(image))
            }
        }
    }
}

fn probe_dimensions(bytes: &[u8]) -> image::ImageResult<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()
}
