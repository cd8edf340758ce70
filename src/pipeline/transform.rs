use std::collections::HashMap;
use std::ops::Range;

use image::RgbaImage;
use rayon::prelude::*;

use crate::foundation::color::Rgba8;
use crate::foundation::core::{Canvas, PixelRect};
use crate::foundation::error::{GifcaptionError, GifcaptionResult};
use crate::model::animation::{Animation, Frame};
use crate::model::options::{NormalizedOptions, Options};
use crate::render::caption::{CaptionLayout, caption_height, render_caption};
use crate::render::composite::{copy_into, draw_over};
use crate::render::resample::resize_bilinear;
use crate::text::cache::FontCache;
use crate::text::font::{FontParser, GlyphFace, OutlineFont};
use crate::text::wrap::wrap;

/// Caption font em size as a fraction of the destination width.
pub const TEXT_TO_WIDTH_RATIO: f64 = 0.1;
/// Caption padding as a fraction of the mean destination side.
pub const PADDING_RATIO: f64 = 0.035;
/// A caption box taller than this many destination heights is rejected.
pub const MAX_CAPTION_HEIGHT_RATIO: u32 = 2;

/// Composited pixels with alpha below this map to the transparent index.
const ALPHA_CUTOFF: u8 = 128;

/// Geometry shared by every output frame of one [`transform`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransformPlan {
    /// Region of the source canvas that survives cropping.
    pub crop: PixelRect,
    /// Content size after scaling.
    pub dest_width: u32,
    /// Content size after scaling.
    pub dest_height: u32,
    /// Caption placement against the content.
    pub layout: CaptionLayout,
}

impl TransformPlan {
    /// Output canvas size.
    pub fn canvas(&self) -> GifcaptionResult<Canvas> {
        Canvas::new(self.dest_width, self.layout.canvas_height)
    }
}

/// Crop, rescale, time-resample and caption `animation`.
///
/// Every output frame covers the whole output canvas and keeps its source frame's palette and
/// transparent index. Fails without producing output on invalid options, an unknown or
/// unparsable font, or a caption too tall for the destination.
#[tracing::instrument(skip_all, fields(frames = animation.len(), placement = %options.placement))]
pub fn transform<P: FontParser>(
    animation: &Animation,
    options: &Options,
    fonts: &FontCache<P>,
) -> GifcaptionResult<Animation> {
    let opts = options.normalize()?;
    if animation.is_empty() {
        return Err(GifcaptionError::validation("animation has no frames"));
    }

    let order = visit_order(animation.len(), &opts)?;
    let crop = crop_rect(animation.canvas(), &opts);
    let (dest_width, dest_height) = dest_size(crop, &opts);
    tracing::debug!(
        visited = order.len(),
        reverse = opts.reverse,
        ?crop,
        dest_width,
        dest_height,
        "transform geometry"
    );

    let font_px = (TEXT_TO_WIDTH_RATIO * opts.font_size * f64::from(dest_width)) as f32;
    let face = fonts.load(&opts.font)?.face(font_px);

    let padding = ((f64::from(dest_width) + f64::from(dest_height)) / 2.0 * PADDING_RATIO) as u32;
    let lines = wrap(
        &opts.caption,
        dest_width.saturating_sub(2 * padding),
        &face,
    );
    let box_height = caption_height(lines.len(), face.size_px(), padding);
    let max_height = MAX_CAPTION_HEIGHT_RATIO.saturating_mul(dest_height);
    if box_height > max_height {
        return Err(GifcaptionError::layout(format!(
            "caption needs {box_height} px but at most {max_height} px fit a \
             {dest_width}x{dest_height} destination"
        )));
    }
    let caption = render_caption(
        &lines,
        &face,
        dest_width,
        padding,
        opts.text_color,
        opts.background_color,
    );

    let plan = TransformPlan {
        crop,
        dest_width,
        dest_height,
        layout: CaptionLayout::new(opts.placement, dest_height, caption.height()),
    };
    let canvas = plan.canvas()?;

    let frames = order
        .par_iter()
        .map(|&i| render_frame(&animation.frames()[i], &plan, &caption, opts.speed))
        .collect::<GifcaptionResult<Vec<_>>>()?;

    Ok(Animation::new(canvas, frames, animation.background_index()))
}

/// Source frame indices in output order: the trimmed range, reversed for negative speeds.
pub fn visit_order(len: usize, opts: &NormalizedOptions) -> GifcaptionResult<Vec<usize>> {
    let range = trim_range(len, opts.start, opts.end);
    if range.is_empty() {
        return Err(GifcaptionError::validation(format!(
            "start {} and end {} leave no frames out of {len}",
            opts.start, opts.end
        )));
    }
    let mut order = range.collect::<Vec<_>>();
    if opts.reverse {
        order.reverse();
    }
    Ok(order)
}

fn trim_range(len: usize, start: f64, end: f64) -> Range<usize> {
    let n = len as f64;
    let first = (start * n).floor() as usize;
    let last = (((1.0 - end) * n).ceil() as usize).min(len);
    first..last.max(first)
}

/// Region of `canvas` left after applying the four crop fractions.
///
/// Every edge truncates its fractional position; the region keeps at least one pixel per side.
pub fn crop_rect(canvas: Canvas, opts: &NormalizedOptions) -> PixelRect {
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    let x0 = ((w * opts.crop_left) as u32).min(canvas.width.saturating_sub(1));
    let y0 = ((h * opts.crop_top) as u32).min(canvas.height.saturating_sub(1));
    let x1 = ((w * (1.0 - opts.crop_right)) as u32)
        .min(canvas.width)
        .max(x0 + 1);
    let y1 = ((h * (1.0 - opts.crop_bottom)) as u32)
        .min(canvas.height)
        .max(y0 + 1);
    PixelRect::from_corners(x0, y0, x1, y1)
}

fn dest_size(crop: PixelRect, opts: &NormalizedOptions) -> (u32, u32) {
    let w = (f64::from(crop.width) * opts.scale_width) as u32;
    let h = (f64::from(crop.height) * opts.scale_height) as u32;
    (w.max(1), h.max(1))
}

/// Output delay for a source delay at `speed` (hundredths of a second).
pub fn scaled_delay(delay: u16, speed: f64) -> u16 {
    (f64::from(delay) / speed.abs())
        .round()
        .clamp(0.0, f64::from(u16::MAX)) as u16
}

fn render_frame(
    frame: &Frame,
    plan: &TransformPlan,
    caption: &RgbaImage,
    speed: f64,
) -> GifcaptionResult<Frame> {
    let transparent = frame.transparent();
    let crop = plan.crop;
    let src = RgbaImage::from_fn(crop.width, crop.height, |x, y| {
        frame.sample(crop.x + x, crop.y + y, transparent).into()
    });
    let content = resize_bilinear(&src, plan.dest_width, plan.dest_height);

    let mut composed = RgbaImage::new(plan.dest_width, plan.layout.canvas_height);
    copy_into(&mut composed, &content, 0, plan.layout.content_y);
    draw_over(&mut composed, caption, 0, plan.layout.caption_y);

    let indices = quantize(&composed, frame);
    Frame::new(
        PixelRect::new(0, 0, composed.width(), composed.height()),
        indices,
        frame.palette().clone(),
        transparent,
        scaled_delay(frame.delay, speed),
    )
}

/// Map composited pixels back onto `frame`'s palette.
fn quantize(img: &RgbaImage, frame: &Frame) -> Vec<u8> {
    let palette = frame.palette();
    let transparent = frame.transparent();
    let mut memo = HashMap::<[u8; 4], u8>::new();
    img.pixels()
        .map(|px| {
            *memo.entry(px.0).or_insert_with(|| {
                let color = Rgba8::from(*px);
                match transparent {
                    Some(tp) if color.a < ALPHA_CUTOFF => tp,
                    _ => palette.nearest_excluding(color, transparent),
                }
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/transform.rs"]
mod tests;
