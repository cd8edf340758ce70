use rayon::prelude::*;

use crate::foundation::core::PixelRect;

const BYTES_PER_PIXEL: usize = 4;

/// Column/row split used to partition a rectangle between workers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileGrid {
    /// Horizontal divisions, at least 1.
    pub columns: u32,
    /// Vertical divisions, at least 1.
    pub rows: u32,
}

impl TileGrid {
    /// The most square grid with exactly `workers` cells (`0` is treated as `1`).
    pub fn for_workers(workers: usize) -> Self {
        let n = u32::try_from(workers.max(1)).unwrap_or(u32::MAX);
        let mut rows = n.isqrt();
        while n % rows != 0 {
            rows -= 1;
        }
        Self {
            columns: n / rows,
            rows,
        }
    }

    /// Number of cells.
    pub fn cells(self) -> usize {
        self.columns as usize * self.rows as usize
    }
}

/// Split `[start, start + len)` into `parts` contiguous spans whose lengths differ by at most 1.
fn spans(start: u32, len: u32, parts: u32) -> Vec<(u32, u32)> {
    let parts = u64::from(parts.max(1));
    (0..parts)
        .map(|i| {
            let lo = u64::from(len) * i / parts;
            let hi = u64::from(len) * (i + 1) / parts;
            (start + lo as u32, start + hi as u32)
        })
        .collect()
}

/// Partition `rect` into disjoint non-empty sub-rectangles, row-major, that exactly cover it.
pub fn partition(rect: PixelRect, grid: TileGrid) -> Vec<PixelRect> {
    let xs = spans(rect.x, rect.width, grid.columns);
    let ys = spans(rect.y, rect.height, grid.rows);
    ys.iter()
        .flat_map(|&(y0, y1)| {
            xs.iter()
                .map(move |&(x0, x1)| PixelRect::from_corners(x0, y0, x1, y1))
        })
        .filter(|r| !r.is_empty())
        .collect()
}

/// Mutable view of one tile of an RGBA8 buffer, addressed in canvas coordinates.
#[derive(Debug)]
pub struct TileMut<'a> {
    rect: PixelRect,
    rows: Vec<&'a mut [u8]>,
}

impl TileMut<'_> {
    /// Canvas-space rectangle this view covers.
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    /// Pixel at canvas coordinate `(x, y)`, which must lie inside [`TileMut::rect`].
    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        let (row, off) = self.locate(x, y);
        let px = &self.rows[row][off..off + BYTES_PER_PIXEL];
        [px[0], px[1], px[2], px[3]]
    }

    /// Overwrite the pixel at canvas coordinate `(x, y)`.
    pub fn set(&mut self, x: u32, y: u32, px: [u8; 4]) {
        let (row, off) = self.locate(x, y);
        self.rows[row][off..off + BYTES_PER_PIXEL].copy_from_slice(&px);
    }

    fn locate(&self, x: u32, y: u32) -> (usize, usize) {
        debug_assert!(self.rect.contains(x, y), "({x}, {y}) outside {:?}", self.rect);
        (
            (y - self.rect.y) as usize,
            (x - self.rect.x) as usize * BYTES_PER_PIXEL,
        )
    }
}

/// Carve `buf` (row-major RGBA8, `stride_px` pixels per row) into disjoint mutable tiles over
/// `rect`, in the same order [`partition`] returns rectangles for the same grid.
///
/// `rect` must lie within the buffer.
pub fn split_tiles<'a>(
    buf: &'a mut [u8],
    stride_px: u32,
    rect: PixelRect,
    grid: TileGrid,
) -> Vec<TileMut<'a>> {
    let xs = spans(rect.x, rect.width, grid.columns);
    let ys = spans(rect.y, rect.height, grid.rows);

    let mut tiles = ys
        .iter()
        .flat_map(|&(y0, y1)| {
            xs.iter().map(move |&(x0, x1)| TileMut {
                rect: PixelRect::from_corners(x0, y0, x1, y1),
                rows: Vec::with_capacity((y1 - y0) as usize),
            })
        })
        .collect::<Vec<_>>();

    let stride = stride_px as usize * BYTES_PER_PIXEL;
    let row_start = rect.x as usize * BYTES_PER_PIXEL;
    let row_end = rect.right() as usize * BYTES_PER_PIXEL;
    let mut band = 0usize;
    for (y, row) in buf
        .chunks_exact_mut(stride)
        .enumerate()
        .skip(rect.y as usize)
        .take(rect.height as usize)
    {
        while y as u32 >= ys[band].1 {
            band += 1;
        }
        let mut rest = &mut row[row_start..row_end];
        for (c, &(x0, x1)) in xs.iter().enumerate() {
            let (head, tail) =
                std::mem::take(&mut rest).split_at_mut((x1 - x0) as usize * BYTES_PER_PIXEL);
            rest = tail;
            tiles[band * xs.len() + c].rows.push(head);
        }
    }

    tiles.retain(|t| !t.rect.is_empty());
    tiles
}

/// Run `job` once per part concurrently and return when every part has finished.
///
/// Runs on `pool` when given, otherwise on the global rayon pool.
pub fn fork_join<T, F>(parts: Vec<T>, pool: Option<&rayon::ThreadPool>, job: F)
where
    T: Send,
    F: Fn(T) + Send + Sync,
{
    match pool {
        Some(pool) => pool.install(|| parts.into_par_iter().for_each(&job)),
        None => parts.into_par_iter().for_each(job),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/partition.rs"]
mod tests;
