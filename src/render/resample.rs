use image::imageops::{self, FilterType};
use image::{Rgba32FImage, RgbaImage};

/// Resize `src` to `width x height` with bilinear (triangle) filtering.
///
/// An unchanged size is an exact copy. Filtering runs on premultiplied values so transparent
/// neighbours do not darken edges.
pub fn resize_bilinear(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (sw, sh) = src.dimensions();
    if width == 0 || height == 0 || sw == 0 || sh == 0 {
        return RgbaImage::new(width, height);
    }
    if (sw, sh) == (width, height) {
        return src.clone();
    }

    let premultiplied =
        Rgba32FImage::from_fn(sw, sh, |x, y| image::Rgba(premul(src.get_pixel(x, y).0)));
    let resized = imageops::resize(&premultiplied, width, height, FilterType::Triangle);
    RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba(unpremul(resized.get_pixel(x, y).0))
    })
}

fn premul(px: [u8; 4]) -> [f32; 4] {
    let a = f32::from(px[3]) / 255.0;
    [
        f32::from(px[0]) / 255.0 * a,
        f32::from(px[1]) / 255.0 * a,
        f32::from(px[2]) / 255.0 * a,
        a,
    ]
}

fn unpremul(px: [f32; 4]) -> [u8; 4] {
    let a = px[3].clamp(0.0, 1.0);
    let alpha = (a * 255.0).round() as u8;
    if alpha == 0 {
        return [0, 0, 0, 0];
    }
    let ch = |v: f32| (v / a * 255.0).round().clamp(0.0, 255.0) as u8;
    [ch(px[0]), ch(px[1]), ch(px[2]), alpha]
}

#[cfg(test)]
#[path = "../../tests/unit/render/resample.rs"]
mod tests;
