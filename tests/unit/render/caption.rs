use super::*;
use crate::text::mock::BlockFace;
use crate::text::wrap::wrap;

#[test]
fn caption_height_counts_lines_and_padding() {
    assert_eq!(caption_height(0, 20.0, 3), 0);
    assert_eq!(caption_height(1, 20.0, 3), 26);
    assert_eq!(caption_height(2, 20.7, 3), 46);
}

#[test]
fn layout_extends_canvas_only_for_above_and_below() {
    let above = CaptionLayout::new(Placement::Above, 100, 30);
    assert_eq!((above.canvas_height, above.content_y, above.caption_y), (130, 30, 0));

    let below = CaptionLayout::new(Placement::Below, 100, 30);
    assert_eq!((below.canvas_height, below.content_y, below.caption_y), (130, 0, 100));

    let top = CaptionLayout::new(Placement::Top, 100, 30);
    assert_eq!((top.canvas_height, top.caption_y), (100, 0));

    let middle = CaptionLayout::new(Placement::Middle, 100, 30);
    assert_eq!((middle.canvas_height, middle.caption_y), (100, 35));

    let bottom = CaptionLayout::new(Placement::Bottom, 100, 30);
    assert_eq!((bottom.canvas_height, bottom.caption_y), (100, 70));
}

#[test]
fn overlay_taller_than_content_starts_above_the_canvas() {
    let bottom = CaptionLayout::new(Placement::Bottom, 40, 60);
    assert_eq!(bottom.caption_y, -20);
    let middle = CaptionLayout::new(Placement::Middle, 40, 60);
    assert_eq!(middle.caption_y, -10);
}

#[test]
fn render_fills_background_and_centers_lines() {
    let face = BlockFace { size_px: 20.0 };
    let text = wrap("hi", 100, &face);
    let img = render_caption(&text, &face, 60, 2, Rgba8::WHITE, Rgba8::BLACK);
    assert_eq!(img.dimensions(), (60, 24));

    // "hi" is 20px wide, so it starts at x = 20; the baseline sits at y = 22.
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
    assert_eq!(img.get_pixel(19, 20).0, [0, 0, 0, 255]);
    assert_eq!(img.get_pixel(20, 20).0, [255, 255, 255, 255]);
    assert_eq!(img.get_pixel(20, 22).0, [0, 0, 0, 255]);
}

#[test]
fn empty_caption_renders_nothing() {
    let face = BlockFace { size_px: 20.0 };
    let img = render_caption(&wrap("", 100, &face), &face, 60, 5, Rgba8::WHITE, Rgba8::BLACK);
    assert_eq!(img.dimensions(), (60, 0));
}

#[test]
fn transparent_background_keeps_gaps_clear() {
    let face = BlockFace { size_px: 10.0 };
    let text = wrap("a b", 100, &face);
    let img = render_caption(&text, &face, 40, 0, Rgba8::WHITE, Rgba8::TRANSPARENT);
    assert_eq!(img.get_pixel(0, 0).0[3], 0);
    assert!(img.pixels().any(|p| p.0 == [255, 255, 255, 255]));
}
