use std::borrow::Cow;
use std::io::Cursor;
use std::sync::Arc;

use crate::foundation::core::{Canvas, PixelRect};
use crate::foundation::error::{GifcaptionError, GifcaptionResult};
use crate::model::animation::{Animation, Frame, Palette};

/// Decode a GIF byte stream into indexed frames.
///
/// Frames keep their own rectangle, palette (local, else global), delay and transparent index.
/// The declared background index is the logical screen background color, falling back to the
/// first frame's transparent index and then `0`.
pub fn decode_gif(bytes: &[u8]) -> GifcaptionResult<Animation> {
    let mut options = ::gif::DecodeOptions::new();
    options.set_color_output(::gif::ColorOutput::Indexed);
    let mut decoder = options
        .read_info(Cursor::new(bytes))
        .map_err(|e| GifcaptionError::codec(format!("read gif header: {e}")))?;

    let canvas = Canvas::new(u32::from(decoder.width()), u32::from(decoder.height()))
        .map_err(|e| GifcaptionError::codec(format!("gif logical screen: {e}")))?;
    let global = decoder
        .global_palette()
        .map(Palette::from_rgb_triples)
        .transpose()?
        .map(Arc::new);
    let declared_bg = decoder
        .bg_color()
        .and_then(|i| u8::try_from(i).ok());

    let mut frames = Vec::new();
    while let Some(raw) = decoder
        .read_next_frame()
        .map_err(|e| GifcaptionError::codec(format!("decode gif frame {}: {e}", frames.len())))?
    {
        let palette = match (&raw.palette, &global) {
            (Some(local), _) => Arc::new(Palette::from_rgb_triples(local)?),
            (None, Some(global)) => global.clone(),
            (None, None) => {
                return Err(GifcaptionError::codec(format!(
                    "gif frame {} has no palette",
                    frames.len()
                )));
            }
        };
        let transparent = raw
            .transparent
            .filter(|&t| usize::from(t) < palette.len());
        let rect = PixelRect::new(
            u32::from(raw.left),
            u32::from(raw.top),
            u32::from(raw.width),
            u32::from(raw.height),
        );
        frames.push(Frame::new(
            rect,
            raw.buffer.to_vec(),
            palette,
            transparent,
            raw.delay,
        )?);
    }

    let background_index = declared_bg
        .or_else(|| frames.first().and_then(Frame::transparent))
        .unwrap_or(0);
    tracing::debug!(
        width = canvas.width,
        height = canvas.height,
        frames = frames.len(),
        background_index,
        "decoded gif"
    );
    Ok(Animation::new(canvas, frames, background_index))
}

/// Encode `animation` as a GIF that loops forever.
///
/// Each frame carries its own palette as a local color table and keeps its rectangle,
/// transparent index and delay. Frames are composited over the previous one.
pub fn encode_gif(animation: &Animation) -> GifcaptionResult<Vec<u8>> {
    let canvas = animation.canvas();
    let width = gif_dim(canvas.width)?;
    let height = gif_dim(canvas.height)?;

    let mut encoder = ::gif::Encoder::new(Vec::new(), width, height, &[])
        .map_err(|e| GifcaptionError::codec(format!("create gif encoder: {e}")))?;
    encoder
        .set_repeat(::gif::Repeat::Infinite)
        .map_err(|e| GifcaptionError::codec(format!("set gif repeat: {e}")))?;

    for (i, frame) in animation.frames().iter().enumerate() {
        let rect = frame.rect();
        let rgb = frame
            .palette()
            .colors()
            .iter()
            .flat_map(|c| [c.r, c.g, c.b])
            .collect::<Vec<_>>();
        let out = ::gif::Frame {
            left: gif_dim(rect.x)?,
            top: gif_dim(rect.y)?,
            width: gif_dim(rect.width)?,
            height: gif_dim(rect.height)?,
            delay: frame.delay,
            dispose: ::gif::DisposalMethod::Keep,
            transparent: frame.transparent(),
            palette: Some(rgb),
            buffer: Cow::Borrowed(frame.indices()),
            ..::gif::Frame::default()
        };
        encoder
            .write_frame(&out)
            .map_err(|e| GifcaptionError::codec(format!("write gif frame {i}: {e}")))?;
    }

    encoder
        .into_inner()
        .map_err(|e| GifcaptionError::codec(format!("finish gif stream: {e}")))
}

fn gif_dim(v: u32) -> GifcaptionResult<u16> {
    u16::try_from(v)
        .map_err(|_| GifcaptionError::codec(format!("{v} exceeds the gif limit of 65535 px")))
}

#[cfg(test)]
#[path = "../../tests/unit/codec/gif.rs"]
mod tests;
