use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::error::{AtlasError, Result};

/// A decoded input image, always held as RGBA8.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub id: PathBuf,
    pub pixels: RgbaImage,
}

impl SourceImage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let pixels = image::open(path)
            .map_err(|source| AtlasError::Decode { path: path.to_path_buf(), source })?
            .to_rgba8();
        tracing::debug!(path = %path.display(), width = pixels.width(), height = pixels.height(), "decoded source");
        Ok(Self { id: path.to_path_buf(), pixels })
    }

    pub fn width(&self) -> u32 { self.pixels.width() }
    pub fn height(&self) -> u32 { self.pixels.height() }
    pub fn size(&self) -> (u32, u32) { self.pixels.dimensions() }
}

/// Decodes every path in order. The first failure aborts the whole batch.
pub fn load_all<I, P>(paths: I) -> Result<Vec<SourceImage>>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths.into_iter().map(SourceImage::open).collect()
}

/// Reads only the header of `path` to get its dimensions.
pub fn probe_size<P: AsRef<Path>>(path: P) -> Result<(u32, u32)> {
    let path = path.as_ref();
    image::image_dimensions(path).map_err(|source| AtlasError::Decode { path: path.to_path_buf(), source })
}
