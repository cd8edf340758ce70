use image::RgbaImage;

use crate::foundation::color::Rgba8;
use crate::model::options::Placement;
use crate::text::font::GlyphFace;
use crate::text::wrap::WrappedText;

/// Extra gap between caption lines as a fraction of the font size.
pub const LINE_SPACING: f32 = 0.0;

/// Vertical placement of the content and caption boxes on the output canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptionLayout {
    /// Output canvas height.
    pub canvas_height: u32,
    /// Top of the resized content.
    pub content_y: u32,
    /// Top of the caption box. May be negative when an overlay caption is taller than the
    /// content; the overflow is clipped.
    pub caption_y: i64,
}

impl CaptionLayout {
    /// Place a `caption_height` box against `content_height` content according to `placement`.
    pub fn new(placement: Placement, content_height: u32, caption_height: u32) -> Self {
        let h = i64::from(content_height);
        let c = i64::from(caption_height);
        match placement {
            Placement::Above => Self {
                canvas_height: content_height + caption_height,
                content_y: caption_height,
                caption_y: 0,
            },
            Placement::Below => Self {
                canvas_height: content_height + caption_height,
                content_y: 0,
                caption_y: h,
            },
            Placement::Top => Self {
                canvas_height: content_height,
                content_y: 0,
                caption_y: 0,
            },
            Placement::Middle => Self {
                canvas_height: content_height,
                content_y: 0,
                caption_y: (h - c) / 2,
            },
            Placement::Bottom => Self {
                canvas_height: content_height,
                content_y: 0,
                caption_y: h - c,
            },
        }
    }
}

/// Height of a caption box holding `line_count` lines. No lines means no box.
pub fn caption_height(line_count: usize, font_px: f32, padding: u32) -> u32 {
    if line_count == 0 {
        return 0;
    }
    let lines = u32::try_from(line_count).unwrap_or(u32::MAX);
    let gaps = ((lines - 1) as f32 * LINE_SPACING * font_px) as u32;
    (2 * padding)
        .saturating_add(lines.saturating_mul(font_px as u32))
        .saturating_add(gaps)
}

/// Rasterize the caption box: `background` fill with each line centered horizontally.
pub fn render_caption<F: GlyphFace + ?Sized>(
    text: &WrappedText,
    face: &F,
    width: u32,
    padding: u32,
    text_color: Rgba8,
    background: Rgba8,
) -> RgbaImage {
    let font_px = face.size_px();
    let height = caption_height(text.len(), font_px, padding);
    let mut img = RgbaImage::from_pixel(width, height, background.into());

    let line_step = font_px as u32;
    let gap = (LINE_SPACING * font_px) as u32;
    for (i, (line, &line_w)) in text.lines.iter().zip(&text.widths).enumerate() {
        let x = (i64::from(width) - i64::from(line_w)) / 2;
        let baseline = padding + (i as u32 + 1) * line_step + i as u32 * gap;
        face.draw_str(line, x as f32, baseline as f32, text_color, &mut img);
    }
    img
}

#[cfg(test)]
#[path = "../../tests/unit/render/caption.rs"]
mod tests;
