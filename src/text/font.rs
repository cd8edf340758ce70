use ab_glyph::{Font as _, FontArc, PxScale, PxScaleFont, ScaleFont};
use anyhow::Context as _;
use image::RgbaImage;

use crate::foundation::color::Rgba8;
use crate::render::composite::blend_coverage;

/// A font instantiated at a fixed pixel size that can measure and rasterize glyphs.
pub trait GlyphFace {
    /// Em size in pixels this face was built for.
    fn size_px(&self) -> f32;

    /// Horizontal advance of `ch` in pixels.
    fn advance(&self, ch: char) -> f32;

    /// Draw `text` with its baseline starting at `(origin_x, baseline_y)`, blending `color`
    /// by glyph coverage into `target`. Pixels outside `target` are clipped.
    fn draw_str(
        &self,
        text: &str,
        origin_x: f32,
        baseline_y: f32,
        color: Rgba8,
        target: &mut RgbaImage,
    );
}

/// A parsed outline font that can produce sized faces.
pub trait OutlineFont: Clone + Send + Sync + 'static {
    /// Face type produced by [`OutlineFont::face`].
    type Face: GlyphFace;

    /// Instantiate a face whose em size is `size_px` pixels.
    fn face(&self, size_px: f32) -> Self::Face;
}

/// Turns raw font file bytes into an [`OutlineFont`].
pub trait FontParser: Send + Sync {
    /// Parsed font handle type.
    type Font: OutlineFont;

    /// Parse `bytes`.
    fn parse(&self, bytes: Vec<u8>) -> anyhow::Result<Self::Font>;
}

#[derive(Clone, Copy, Debug, Default)]
/// [`FontParser`] backed by `ab_glyph` (TrueType and OpenType outlines).
pub struct AbGlyphParser;

impl FontParser for AbGlyphParser {
    type Font = AbGlyphFont;

    fn parse(&self, bytes: Vec<u8>) -> anyhow::Result<Self::Font> {
        let font = FontArc::try_from_vec(bytes).context("parse outline font")?;
        Ok(AbGlyphFont { font })
    }
}

#[derive(Clone)]
/// Shared `ab_glyph` font handle.
pub struct AbGlyphFont {
    font: FontArc,
}

impl std::fmt::Debug for AbGlyphFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbGlyphFont")
            .field("glyph_count", &self.font.glyph_count())
            .finish()
    }
}

impl OutlineFont for AbGlyphFont {
    type Face = AbGlyphFace;

    fn face(&self, size_px: f32) -> Self::Face {
        // Points equal pixels at 72 DPI, so the em size maps straight onto the point size.
        let scale = self
            .font
            .pt_to_px_scale(size_px)
            .unwrap_or_else(|| PxScale::from(size_px));
        AbGlyphFace {
            font: self.font.clone().into_scaled(scale),
            size_px,
        }
    }
}

/// `ab_glyph` font bound to a pixel scale.
pub struct AbGlyphFace {
    font: PxScaleFont<FontArc>,
    size_px: f32,
}

impl GlyphFace for AbGlyphFace {
    fn size_px(&self) -> f32 {
        self.size_px
    }

    fn advance(&self, ch: char) -> f32 {
        ScaleFont::h_advance(&self.font, ScaleFont::glyph_id(&self.font, ch))
    }

    fn draw_str(
        &self,
        text: &str,
        origin_x: f32,
        baseline_y: f32,
        color: Rgba8,
        target: &mut RgbaImage,
    ) {
        let scale = self.font.scale;
        let mut caret = origin_x;
        for ch in text.chars() {
            let id = ScaleFont::glyph_id(&self.font, ch);
            let glyph = id.with_scale_and_position(scale, ab_glyph::point(caret, baseline_y));
            caret += ScaleFont::h_advance(&self.font, id);

            let Some(outlined) = self.font.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            let (left, top) = (bounds.min.x as i64, bounds.min.y as i64);
            outlined.draw(|gx, gy, coverage| {
                blend_coverage(
                    target,
                    left + i64::from(gx),
                    top + i64::from(gy),
                    color,
                    coverage,
                );
            });
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/font.rs"]
mod tests;
