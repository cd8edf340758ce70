use super::*;

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = Rgba8::rgba(10, 20, 30, 40);
    assert_eq!(over(dst, Rgba8::rgba(255, 255, 255, 0)), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let src = Rgba8::rgba(255, 0, 0, 255);
    assert_eq!(over(Rgba8::BLACK, src), src);
}

#[test]
fn over_onto_transparent_keeps_straight_src() {
    let src = Rgba8::rgba(100, 110, 120, 77);
    assert_eq!(over(Rgba8::TRANSPARENT, src), src);
}

#[test]
fn over_half_white_on_black_is_mid_grey() {
    let out = over(Rgba8::BLACK, Rgba8::rgba(255, 255, 255, 128));
    assert_eq!(out.a, 255);
    assert!((127..=129).contains(&out.r));
    assert_eq!(out.r, out.g);
    assert_eq!(out.g, out.b);
}

#[test]
fn blend_coverage_clips_and_scales_alpha() {
    let mut img = RgbaImage::new(2, 2);
    blend_coverage(&mut img, -1, 0, Rgba8::WHITE, 1.0);
    blend_coverage(&mut img, 2, 0, Rgba8::WHITE, 1.0);
    assert!(img.pixels().all(|p| p.0 == [0, 0, 0, 0]));

    blend_coverage(&mut img, 1, 1, Rgba8::WHITE, 0.5);
    assert_eq!(img.get_pixel(1, 1).0, [255, 255, 255, 128]);
}

#[test]
fn draw_over_handles_negative_offsets() {
    let mut dst = RgbaImage::from_pixel(3, 3, image::Rgba([0, 0, 0, 255]));
    let src = RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
    draw_over(&mut dst, &src, -1, 2);
    assert_eq!(dst.get_pixel(0, 2).0, [255, 0, 0, 255]);
    assert_eq!(dst.get_pixel(1, 2).0, [0, 0, 0, 255]);
    assert_eq!(dst.get_pixel(0, 1).0, [0, 0, 0, 255]);
}

#[test]
fn copy_into_replaces_including_transparent() {
    let mut dst = RgbaImage::from_pixel(2, 2, image::Rgba([9, 9, 9, 255]));
    let src = RgbaImage::new(1, 1);
    copy_into(&mut dst, &src, 1, 1);
    assert_eq!(dst.get_pixel(1, 1).0, [0, 0, 0, 0]);
    assert_eq!(dst.get_pixel(0, 0).0, [9, 9, 9, 255]);
}
