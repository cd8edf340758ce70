use std::sync::Arc;

use crate::foundation::color::Rgba8;
use crate::foundation::core::{Canvas, PixelRect};
use crate::foundation::error::{GifcaptionError, GifcaptionResult};

/// Maximum number of entries an indexed-color palette may hold.
pub const MAX_PALETTE_LEN: usize = 256;

#[derive(Clone, Debug, PartialEq, Eq)]
/// Ordered, index-addressable set of colors shared by one or more frames.
pub struct Palette {
    colors: Vec<Rgba8>,
}

impl Palette {
    /// Build a palette of 1..=256 colors.
    pub fn new(colors: Vec<Rgba8>) -> GifcaptionResult<Self> {
        if colors.is_empty() || colors.len() > MAX_PALETTE_LEN {
            return Err(GifcaptionError::validation(format!(
                "palette must hold 1..={MAX_PALETTE_LEN} colors, got {}",
                colors.len()
            )));
        }
        Ok(Self { colors })
    }

    /// Build a palette from packed `RGB` triples (the GIF color-table layout).
    pub fn from_rgb_triples(rgb: &[u8]) -> GifcaptionResult<Self> {
        if !rgb.len().is_multiple_of(3) {
            return Err(GifcaptionError::validation(
                "rgb color table length must be a multiple of 3",
            ));
        }
        Self::new(
            rgb.chunks_exact(3)
                .map(|c| Rgba8::rgba(c[0], c[1], c[2], 255))
                .collect(),
        )
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always `false`; palettes hold at least one color.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `index`, if in range.
    pub fn get(&self, index: u8) -> Option<Rgba8> {
        self.colors.get(usize::from(index)).copied()
    }

    /// All entries in index order.
    pub fn colors(&self) -> &[Rgba8] {
        &self.colors
    }

    /// Index of the entry closest to `color` (squared RGBA distance, lowest index on ties).
    pub fn nearest(&self, color: Rgba8) -> u8 {
        self.nearest_excluding(color, None)
    }

    /// Like [`Palette::nearest`] but never picks `skip` unless it is the only entry.
    pub fn nearest_excluding(&self, color: Rgba8, skip: Option<u8>) -> u8 {
        let target = color.to_array();
        let mut best = None;
        let mut best_dist = u32::MAX;
        for (i, c) in self.colors.iter().enumerate() {
            if skip.is_some_and(|s| usize::from(s) == i) {
                continue;
            }
            let dist: u32 = c
                .to_array()
                .iter()
                .zip(target.iter())
                .map(|(&a, &b)| {
                    let d = i32::from(a) - i32::from(b);
                    (d * d) as u32
                })
                .sum();
            if dist < best_dist {
                best = Some(i);
                best_dist = dist;
                if dist == 0 {
                    break;
                }
            }
        }
        best.map_or(skip.unwrap_or(0), |i| i as u8)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Indexed-color raster covering a bounding rectangle of the canvas.
pub struct Frame {
    rect: PixelRect,
    indices: Vec<u8>,
    palette: Arc<Palette>,
    transparent: Option<u8>,
    /// Display delay in hundredths of a second.
    pub delay: u16,
}

impl Frame {
    /// Build a frame; `indices` is row-major over `rect` and every value must address `palette`.
    pub fn new(
        rect: PixelRect,
        indices: Vec<u8>,
        palette: Arc<Palette>,
        transparent: Option<u8>,
        delay: u16,
    ) -> GifcaptionResult<Self> {
        if indices.len() != rect.area() {
            return Err(GifcaptionError::validation(format!(
                "frame expects {} indices for {}x{}, got {}",
                rect.area(),
                rect.width,
                rect.height,
                indices.len()
            )));
        }
        if let Some(bad) = indices
            .iter()
            .copied()
            .find(|&i| usize::from(i) >= palette.len())
        {
            return Err(GifcaptionError::validation(format!(
                "pixel index {bad} out of range for palette of {} colors",
                palette.len()
            )));
        }
        if let Some(tp) = transparent
            && usize::from(tp) >= palette.len()
        {
            return Err(GifcaptionError::validation(format!(
                "transparent index {tp} out of range for palette of {} colors",
                palette.len()
            )));
        }
        Ok(Self {
            rect,
            indices,
            palette,
            transparent,
            delay,
        })
    }

    /// Bounding rectangle in canvas coordinates.
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    /// Row-major palette indices over [`Frame::rect`].
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Shared palette handle.
    pub fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    /// Transparent index carried by the container for this frame, if any.
    pub fn transparent(&self) -> Option<u8> {
        self.transparent
    }

    /// Palette index at canvas coordinate `(x, y)`, or `None` outside the frame rectangle.
    pub fn index_at(&self, x: u32, y: u32) -> Option<u8> {
        if !self.rect.contains(x, y) {
            return None;
        }
        let lx = (x - self.rect.x) as usize;
        let ly = (y - self.rect.y) as usize;
        self.indices
            .get(ly * self.rect.width as usize + lx)
            .copied()
    }

    /// Resolved color at canvas coordinate `(x, y)`.
    ///
    /// Coordinates outside the rectangle and pixels at `transparent` resolve to
    /// [`Rgba8::TRANSPARENT`].
    pub fn sample(&self, x: u32, y: u32, transparent: Option<u8>) -> Rgba8 {
        match self.index_at(x, y) {
            Some(i) if Some(i) != transparent => {
                self.palette.get(i).unwrap_or(Rgba8::TRANSPARENT)
            }
            _ => Rgba8::TRANSPARENT,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Ordered frames on a fixed canvas.
pub struct Animation {
    canvas: Canvas,
    frames: Vec<Frame>,
    background_index: u8,
}

impl Animation {
    /// Build an animation; `background_index` is the palette index designated as
    /// "show background" for every frame.
    pub fn new(canvas: Canvas, frames: Vec<Frame>, background_index: u8) -> Self {
        Self {
            canvas,
            frames,
            background_index,
        }
    }

    /// Logical canvas.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Frames in display order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frame count.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when there are no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Declared background palette index.
    pub fn background_index(&self) -> u8 {
        self.background_index
    }

    /// Transparent index used to resolve frame `_frame`.
    ///
    /// This is the single declared background index; palette alpha is not inspected.
    pub fn transparent_index_for(&self, _frame: usize) -> u8 {
        self.background_index
    }

    /// Per-frame delays in hundredths of a second.
    pub fn delays(&self) -> Vec<u16> {
        self.frames.iter().map(|f| f.delay).collect()
    }

    /// Consume into frames.
    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/animation.rs"]
mod tests;
