use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{GifcaptionError, GifcaptionResult};
use crate::model::animation::{Animation, Frame};
use crate::render::partition::{TileGrid, TileMut, fork_join, split_tiles};

/// Default number of regions a large frame is split into.
pub const DEFAULT_FLATTEN_WORKERS: usize = 4;
/// Frames narrower or shorter than this are resolved on the calling thread.
pub const DEFAULT_MIN_PARALLEL_SIDE: u32 = 8;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
/// Tuning for [`flatten_with`].
pub struct FlattenOpts {
    /// Regions per frame; `0` is treated as `1`.
    pub workers: usize,
    /// Minimum frame width and height for region parallelism.
    pub min_parallel_side: u32,
    /// Dedicated pool size. `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl Default for FlattenOpts {
    fn default() -> Self {
        Self {
            workers: DEFAULT_FLATTEN_WORKERS,
            min_parallel_side: DEFAULT_MIN_PARALLEL_SIDE,
            threads: None,
        }
    }
}

/// Resolve every frame to an opaque canvas-sized raster with default tuning.
pub fn flatten(animation: &Animation) -> GifcaptionResult<Vec<RgbaImage>> {
    flatten_with(animation, &FlattenOpts::default())
}

/// Resolve every frame of `animation` against a running background raster.
///
/// Output `i` starts as a copy of the background. Inside frame `i`'s rectangle, pixels at the
/// animation's declared transparent index show the background; every other pixel is written to
/// both the output and the background. Frames are processed strictly in order.
#[tracing::instrument(skip(animation), fields(frames = animation.len()))]
pub fn flatten_with(
    animation: &Animation,
    opts: &FlattenOpts,
) -> GifcaptionResult<Vec<RgbaImage>> {
    let pool = match opts.threads {
        Some(_) => Some(build_thread_pool(opts.threads)?),
        None => None,
    };
    let grid = TileGrid::for_workers(opts.workers);
    let canvas = animation.canvas();

    let mut background = RgbaImage::new(canvas.width, canvas.height);
    let mut out = Vec::with_capacity(animation.len());
    for (i, frame) in animation.frames().iter().enumerate() {
        let transparent = animation.transparent_index_for(i);
        let region = frame.rect().intersect(canvas.rect());
        let mut raster = background.clone();

        let parallel = region.width >= opts.min_parallel_side
            && region.height >= opts.min_parallel_side
            && grid.cells() > 1;
        let frame_grid = if parallel {
            grid
        } else {
            TileGrid::for_workers(1)
        };

        let out_tiles = split_tiles(&mut raster, canvas.width, region, frame_grid);
        let bg_tiles = split_tiles(&mut background, canvas.width, region, frame_grid);
        let parts = out_tiles.into_iter().zip(bg_tiles).collect::<Vec<_>>();
        if parallel {
            fork_join(parts, pool.as_ref(), |(mut o, mut b)| {
                resolve_tile(frame, transparent, &mut o, &mut b)
            });
        } else {
            for (mut o, mut b) in parts {
                resolve_tile(frame, transparent, &mut o, &mut b);
            }
        }

        tracing::trace!(frame = i, ?region, parallel, "flattened frame");
        out.push(raster);
    }
    Ok(out)
}

fn resolve_tile(frame: &Frame, transparent: u8, out: &mut TileMut<'_>, bg: &mut TileMut<'_>) {
    let rect = out.rect();
    let palette = frame.palette();
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            let Some(index) = frame.index_at(x, y) else {
                continue;
            };
            if index == transparent {
                out.set(x, y, bg.get(x, y));
                continue;
            }
            let Some(color) = palette.get(index) else {
                continue;
            };
            let px = color.to_array();
            out.set(x, y, px);
            bg.set(x, y, px);
        }
    }
}

fn build_thread_pool(threads: Option<usize>) -> GifcaptionResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(GifcaptionError::validation(
            "flatten 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        GifcaptionError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/flatten.rs"]
mod tests;
