use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use image::RgbaImage;

use crate::foundation::error::{GifcaptionError, GifcaptionResult};

/// Encode one raster as PNG bytes.
pub fn encode_png(raster: &RgbaImage) -> GifcaptionResult<Vec<u8>> {
    let mut buf = Vec::new();
    raster
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| GifcaptionError::codec(format!("encode png: {e}")))?;
    Ok(buf)
}

/// Write `rasters` into `dir` as `000.png`, `001.png`, ... and return the written paths.
///
/// `dir` is created if missing.
pub fn write_png_sequence(rasters: &[RgbaImage], dir: &Path) -> GifcaptionResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output dir '{}'", dir.display()))?;

    let mut written = Vec::with_capacity(rasters.len());
    for (i, raster) in rasters.iter().enumerate() {
        let path = dir.join(format!("{i:03}.png"));
        image::save_buffer_with_format(
            &path,
            raster.as_raw(),
            raster.width(),
            raster.height(),
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        written.push(path);
    }
    tracing::debug!(count = written.len(), dir = %dir.display(), "wrote png sequence");
    Ok(written)
}

#[cfg(test)]
#[path = "../../tests/unit/codec/png.rs"]
mod tests;
