//! gifcaption edits indexed-color animations: crop, rescale, retime and caption them, or flatten
//! them into opaque true-color rasters.
//!
//! # Pipelines
//!
//! - [`transform`]: `Animation + Options -> Animation`. Crops the canvas, resamples it
//!   bilinearly, visits frames in (optionally trimmed and reversed) order, scales delays by the
//!   playback speed and composites a word-wrapped caption rendered through a [`FontCache`].
//! - [`flatten`]: `Animation -> Vec<RgbaImage>`. Resolves transparent pixels against a running
//!   background raster, splitting each large frame into regions processed with rayon.
//!
//! Both pipelines only consume in-memory data. [`decode_gif`], [`encode_gif`] and
//! [`write_png_sequence`] adapt them to files; [`FontRegistry`] discovers font files on disk.
//!
//! # Fonts
//!
//! Text goes through the [`FontParser`] / [`OutlineFont`] / [`GlyphFace`] traits so layout and
//! caching can run against any outline backend. [`AbGlyphParser`] is the `ab_glyph`
//! implementation used by the CLI.
//!
//! `unsafe` is forbidden in this crate.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod codec;
mod foundation;
mod model;
mod pipeline;
mod render;
mod text;

/// Tracing subscriber configuration.
pub mod logging;

/// `image` raster type used for true-color output.
pub use image::RgbaImage;

pub use codec::gif::{decode_gif, encode_gif};
pub use codec::png::{encode_png, write_png_sequence};
pub use foundation::color::Rgba8;
pub use foundation::core::{Canvas, PixelRect};
pub use foundation::error::{GifcaptionError, GifcaptionResult};
pub use logging::{LoggingConfig, init_logging};
pub use model::animation::{Animation, Frame, MAX_PALETTE_LEN, Palette};
pub use model::options::{
    MAX_AREA_MULTIPLIER, MAX_CROP_SUM, MAX_SCALING, MIN_SCALE, NormalizedOptions, Options,
    Placement, SPEED_EPSILON, clamp_scale,
};
pub use pipeline::flatten::{
    DEFAULT_FLATTEN_WORKERS, DEFAULT_MIN_PARALLEL_SIDE, FlattenOpts, flatten, flatten_with,
};
pub use pipeline::transform::{
    MAX_CAPTION_HEIGHT_RATIO, PADDING_RATIO, TEXT_TO_WIDTH_RATIO, TransformPlan, crop_rect,
    scaled_delay, transform, visit_order,
};
pub use render::caption::{CaptionLayout, LINE_SPACING, caption_height, render_caption};
pub use render::composite::{blend_coverage, copy_into, draw_over, over};
pub use render::partition::{TileGrid, TileMut, fork_join, partition, split_tiles};
pub use render::resample::resize_bilinear;
pub use text::cache::{DEFAULT_FONT_CACHE_CAPACITY, FontCache, FontCacheConfig};
pub use text::font::{AbGlyphFace, AbGlyphFont, AbGlyphParser, FontParser, GlyphFace, OutlineFont};
pub use text::registry::{FONT_EXTENSIONS, FontRegistry, default_search_paths, font_name};
pub use text::wrap::{WrappedText, wrap};
