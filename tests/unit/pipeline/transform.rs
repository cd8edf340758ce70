use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::model::animation::Palette;
use crate::model::options::Placement;
use crate::text::mock::{BlockFace, BlockParser};
use crate::text::registry::FontRegistry;

const RED: u8 = 0;
const BLUE: u8 = 1;
const BLACK: u8 = 2;
const WHITE: u8 = 3;

fn palette() -> Arc<Palette> {
    Arc::new(
        Palette::new(vec![
            Rgba8::rgba(255, 0, 0, 255),
            Rgba8::rgba(0, 0, 255, 255),
            Rgba8::BLACK,
            Rgba8::WHITE,
        ])
        .unwrap(),
    )
}

fn fonts(dir: &tempfile::TempDir) -> FontCache<BlockParser> {
    let path = dir.path().join("mock.ttf");
    std::fs::write(&path, b"mock font").unwrap();
    let mut registry = FontRegistry::new();
    registry.register("mock", path);
    let cache = FontCache::new(BlockParser::default(), registry, 4).unwrap();
    cache.set_default("mock").unwrap();
    cache
}

/// Full-canvas frames; frame `i` is striped: left half `fills[i]`, right half `BLUE`.
fn striped(width: u32, height: u32, fills: &[u8], delays: &[u16]) -> Animation {
    let rect = PixelRect::new(0, 0, width, height);
    let frames = fills
        .iter()
        .zip(delays)
        .map(|(&fill, &delay)| {
            let indices = (0..height)
                .flat_map(|_| (0..width).map(move |x| if x < width / 2 { fill } else { BLUE }))
                .collect();
            Frame::new(rect, indices, palette(), None, delay).unwrap()
        })
        .collect();
    Animation::new(Canvas::new(width, height).unwrap(), frames, 0)
}

fn caption_opts(caption: &str, placement: Placement) -> Options {
    Options {
        caption: caption.to_string(),
        placement,
        ..Options::default()
    }
}

fn index(frame: &Frame, x: u32, y: u32) -> u8 {
    frame.index_at(x, y).unwrap()
}

#[test]
fn below_extends_canvas_and_keeps_content_rows() {
    let dir = tempfile::tempdir().unwrap();
    let src = striped(100, 50, &[RED, WHITE], &[4, 4]);
    let out = transform(&src, &caption_opts("hi", Placement::Below), &fonts(&dir)).unwrap();

    // font 10 px, padding 2, one line: 2 * 2 + 10.
    assert_eq!(out.canvas(), Canvas::new(100, 64).unwrap());
    assert_eq!(out.len(), 2);

    let f0 = &out.frames()[0];
    assert_eq!(f0.rect(), PixelRect::new(0, 0, 100, 64));
    assert_eq!(&f0.indices()[..100 * 50], src.frames()[0].indices());

    assert_eq!(index(f0, 0, 50), BLACK);
    assert_eq!(index(f0, 46, 50 + 8), WHITE);
    assert_eq!(index(f0, 44, 50 + 8), BLACK);
}

#[test]
fn above_shifts_content_down_by_caption_height() {
    let dir = tempfile::tempdir().unwrap();
    let src = striped(100, 50, &[RED], &[4]);
    let out = transform(&src, &caption_opts("hi", Placement::Above), &fonts(&dir)).unwrap();

    assert_eq!(out.canvas().height, 64);
    let f0 = &out.frames()[0];
    assert_eq!(index(f0, 0, 13), BLACK);
    assert_eq!(index(f0, 0, 14), RED);
    assert_eq!(index(f0, 99, 63), BLUE);
}

#[test]
fn overlay_keeps_canvas_and_content_outside_glyphs() {
    let dir = tempfile::tempdir().unwrap();
    let src = striped(100, 50, &[RED], &[4]);
    let mut opts = caption_opts("hi", Placement::Bottom);
    opts.background_color = Some(Rgba8::WHITE);
    let out = transform(&src, &opts, &fonts(&dir)).unwrap();

    assert_eq!(out.canvas(), Canvas::new(100, 50).unwrap());
    let f0 = &out.frames()[0];
    // Caption box spans rows 36..50; the forced transparent background shows content.
    assert_eq!(index(f0, 0, 40), RED);
    assert_eq!(index(f0, 99, 49), BLUE);
    assert_eq!(index(f0, 46, 36 + 8), WHITE);
}

#[test]
fn empty_caption_adds_no_box() {
    let dir = tempfile::tempdir().unwrap();
    let src = striped(40, 20, &[RED], &[4]);
    let out = transform(&src, &caption_opts(" \t ", Placement::Above), &fonts(&dir)).unwrap();
    assert_eq!(out.canvas(), Canvas::new(40, 20).unwrap());
    assert_eq!(out.frames()[0].indices(), src.frames()[0].indices());
}

#[test]
fn negative_speed_reverses_frames_and_scales_delays() {
    let dir = tempfile::tempdir().unwrap();
    let src = striped(20, 10, &[RED, BLACK, WHITE], &[10, 20, 30]);

    let forward = transform(
        &src,
        &Options {
            speed: 2.0,
            ..Options::default()
        },
        &fonts(&dir),
    )
    .unwrap();
    let backward = transform(
        &src,
        &Options {
            speed: -2.0,
            ..Options::default()
        },
        &fonts(&dir),
    )
    .unwrap();

    assert_eq!(forward.delays(), vec![5, 10, 15]);
    assert_eq!(backward.delays(), vec![15, 10, 5]);
    let reversed = forward.frames().iter().rev().cloned().collect::<Vec<_>>();
    assert_eq!(backward.frames(), reversed.as_slice());
}

#[test]
fn near_zero_speed_keeps_delays() {
    let dir = tempfile::tempdir().unwrap();
    let src = striped(20, 10, &[RED], &[7]);
    let out = transform(
        &src,
        &Options {
            speed: 0.0005,
            ..Options::default()
        },
        &fonts(&dir),
    )
    .unwrap();
    assert_eq!(out.delays(), vec![7]);
}

#[test]
fn trim_narrows_visited_frames_before_reversing() {
    let opts = Options {
        start: 0.25,
        end: 0.25,
        speed: -1.0,
        ..Options::default()
    }
    .normalize()
    .unwrap();
    assert_eq!(visit_order(4, &opts).unwrap(), vec![2, 1]);

    let opts = Options {
        start: 0.2,
        end: 0.2,
        ..Options::default()
    }
    .normalize()
    .unwrap();
    assert_eq!(visit_order(3, &opts).unwrap(), vec![0, 1, 2]);
}

#[test]
fn trim_leaving_nothing_is_a_validation_error() {
    let opts = Options {
        start: 1.0,
        ..Options::default()
    }
    .normalize()
    .unwrap();
    let err = visit_order(5, &opts).unwrap_err();
    assert!(matches!(err, GifcaptionError::Validation(_)));
}

#[test]
fn crop_selects_the_source_region() {
    let dir = tempfile::tempdir().unwrap();
    let src = striped(100, 50, &[RED], &[4]);
    let opts = Options {
        crop_left: 0.5,
        crop_top: 0.2,
        ..Options::default()
    };
    let out = transform(&src, &opts, &fonts(&dir)).unwrap();
    assert_eq!(out.canvas(), Canvas::new(50, 40).unwrap());
    assert!(out.frames()[0].indices().iter().all(|&i| i == BLUE));
}

#[test]
fn crop_rect_truncates_fractions() {
    let opts = Options {
        crop_left: 0.25,
        crop_right: 0.1,
        crop_top: 0.33,
        crop_bottom: 0.0,
        ..Options::default()
    }
    .normalize()
    .unwrap();
    let rect = crop_rect(Canvas::new(10, 10).unwrap(), &opts);
    assert_eq!(rect, PixelRect::from_corners(2, 3, 9, 10));
}

#[test]
fn crop_rect_truncates_the_far_edges_from_the_kept_fraction() {
    let opts = Options {
        crop_right: 0.15,
        crop_bottom: 0.15,
        ..Options::default()
    }
    .normalize()
    .unwrap();
    let rect = crop_rect(Canvas::new(10, 10).unwrap(), &opts);
    assert_eq!(rect, PixelRect::new(0, 0, 8, 8));
}

#[test]
fn crop_rect_keeps_at_least_one_pixel() {
    let opts = Options {
        crop_left: 0.5,
        crop_right: 0.44,
        ..Options::default()
    }
    .normalize()
    .unwrap();
    let rect = crop_rect(Canvas::new(1, 1).unwrap(), &opts);
    assert_eq!(rect, PixelRect::new(0, 0, 1, 1));
}

#[test]
fn scale_multiplies_destination_size() {
    let dir = tempfile::tempdir().unwrap();
    let src = striped(20, 10, &[RED], &[4]);
    let opts = Options {
        scale_width: 2.0,
        scale_height: 3.0,
        ..Options::default()
    };
    let out = transform(&src, &opts, &fonts(&dir)).unwrap();
    assert_eq!(out.canvas(), Canvas::new(40, 30).unwrap());
    let f0 = &out.frames()[0];
    assert_eq!(index(f0, 0, 0), RED);
    assert_eq!(index(f0, 39, 29), BLUE);
}

#[test]
fn transparent_source_pixels_keep_the_transparent_index() {
    let dir = tempfile::tempdir().unwrap();
    let rect = PixelRect::new(0, 0, 4, 2);
    let frame = Frame::new(
        rect,
        vec![RED, BLACK, BLACK, RED, RED, RED, BLACK, RED],
        palette(),
        Some(BLACK),
        4,
    )
    .unwrap();
    let src = Animation::new(Canvas::new(4, 2).unwrap(), vec![frame], 0);
    let out = transform(&src, &Options::default(), &fonts(&dir)).unwrap();
    assert_eq!(out.frames()[0].transparent(), Some(BLACK));
    assert_eq!(
        out.frames()[0].indices(),
        &[RED, BLACK, BLACK, RED, RED, RED, BLACK, RED]
    );
}

#[test]
fn sub_rect_frames_are_transparent_outside_their_rect() {
    let dir = tempfile::tempdir().unwrap();
    let frame = Frame::new(PixelRect::new(1, 0, 1, 1), vec![RED], palette(), Some(WHITE), 4)
        .unwrap();
    let src = Animation::new(Canvas::new(3, 1).unwrap(), vec![frame], 0);
    let out = transform(&src, &Options::default(), &fonts(&dir)).unwrap();
    assert_eq!(out.frames()[0].indices(), &[WHITE, RED, WHITE]);
}

#[test]
fn unknown_font_is_a_font_error() {
    let dir = tempfile::tempdir().unwrap();
    let src = striped(20, 10, &[RED], &[4]);
    let opts = Options {
        font: "missing".to_string(),
        ..Options::default()
    };
    let err = transform(&src, &opts, &fonts(&dir)).unwrap_err();
    assert!(matches!(err, GifcaptionError::Font(_)));
}

#[test]
fn caption_taller_than_twice_the_destination_fails() {
    let dir = tempfile::tempdir().unwrap();
    let src = striped(100, 5, &[RED], &[4]);
    let err = transform(&src, &caption_opts("hi", Placement::Below), &fonts(&dir)).unwrap_err();
    assert!(matches!(err, GifcaptionError::Layout(_)));
}

/// Block parser whose faces count `draw_str` calls.
#[derive(Clone, Debug, Default)]
struct CountingParser {
    draws: Arc<AtomicUsize>,
}

#[derive(Clone, Debug)]
struct CountingFont {
    draws: Arc<AtomicUsize>,
}

struct CountingFace {
    inner: BlockFace,
    draws: Arc<AtomicUsize>,
}

impl FontParser for CountingParser {
    type Font = CountingFont;

    fn parse(&self, _bytes: Vec<u8>) -> anyhow::Result<Self::Font> {
        Ok(CountingFont {
            draws: Arc::clone(&self.draws),
        })
    }
}

impl OutlineFont for CountingFont {
    type Face = CountingFace;

    fn face(&self, size_px: f32) -> Self::Face {
        CountingFace {
            inner: BlockFace { size_px },
            draws: Arc::clone(&self.draws),
        }
    }
}

impl GlyphFace for CountingFace {
    fn size_px(&self) -> f32 {
        self.inner.size_px()
    }

    fn advance(&self, ch: char) -> f32 {
        self.inner.advance(ch)
    }

    fn draw_str(
        &self,
        text: &str,
        origin_x: f32,
        baseline_y: f32,
        color: Rgba8,
        target: &mut RgbaImage,
    ) {
        self.draws.fetch_add(1, Ordering::SeqCst);
        self.inner
            .draw_str(text, origin_x, baseline_y, color, target);
    }
}

fn counting_fonts(dir: &tempfile::TempDir) -> FontCache<CountingParser> {
    let path = dir.path().join("counting.ttf");
    std::fs::write(&path, b"counting font").unwrap();
    let mut registry = FontRegistry::new();
    registry.register("counting", path);
    let cache = FontCache::new(CountingParser::default(), registry, 1).unwrap();
    cache.set_default("counting").unwrap();
    cache
}

#[test]
fn oversized_caption_is_rejected_before_drawing() {
    let dir = tempfile::tempdir().unwrap();
    let cache = counting_fonts(&dir);
    let src = striped(100, 100, &[RED], &[4]);
    // Each word is wider than the line budget, so every word gets its own line.
    let caption = vec!["wwwwwwwwwwwwwwwwwwww"; 2_000].join(" ");
    let err = transform(&src, &caption_opts(&caption, Placement::Below), &cache).unwrap_err();

    assert!(matches!(err, GifcaptionError::Layout(_)));
    assert_eq!(cache.parser().draws.load(Ordering::SeqCst), 0);
}

#[test]
fn fitting_caption_is_drawn_once_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let cache = counting_fonts(&dir);
    let src = striped(100, 100, &[RED, WHITE, RED], &[4, 4, 4]);
    transform(&src, &caption_opts("hi", Placement::Above), &cache).unwrap();
    assert_eq!(cache.parser().draws.load(Ordering::SeqCst), 1);
}

#[test]
fn invalid_options_fail_before_any_work() {
    let dir = tempfile::tempdir().unwrap();
    let cache = fonts(&dir);
    let src = striped(20, 10, &[RED], &[4]);
    let opts = Options {
        crop_top: 0.5,
        crop_bottom: 0.5,
        ..Options::default()
    };
    let err = transform(&src, &opts, &cache).unwrap_err();
    assert!(matches!(err, GifcaptionError::Validation(_)));
    assert_eq!(cache.parser().calls(), 0);
}

#[test]
fn empty_animation_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let src = Animation::new(Canvas::new(4, 4).unwrap(), Vec::new(), 0);
    let err = transform(&src, &Options::default(), &fonts(&dir)).unwrap_err();
    assert!(matches!(err, GifcaptionError::Validation(_)));
}

#[test]
fn scaled_delay_rounds_and_saturates() {
    assert_eq!(scaled_delay(5, 2.0), 3);
    assert_eq!(scaled_delay(10, -4.0), 3);
    assert_eq!(scaled_delay(60_000, 0.01), u16::MAX);
    assert_eq!(scaled_delay(0, 0.5), 0);
}
