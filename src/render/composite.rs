use image::RgbaImage;

use crate::foundation::color::Rgba8;

/// Straight-alpha source-over: `src` drawn on top of `dst`.
pub fn over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    if src.a == 0 {
        return dst;
    }
    if src.a == 255 || dst.a == 0 {
        return src;
    }

    let sa = u32::from(src.a);
    let da = mul_div255(u32::from(dst.a), 255 - sa);
    let out_a = sa + da;

    let channel = |s: u8, d: u8| -> u8 {
        let v = (u32::from(s) * sa + u32::from(d) * da + out_a / 2) / out_a;
        v.min(255) as u8
    };

    Rgba8::rgba(
        channel(src.r, dst.r),
        channel(src.g, dst.g),
        channel(src.b, dst.b),
        out_a.min(255) as u8,
    )
}

/// Blend `color` into `target` at `(x, y)` with its alpha scaled by `coverage` in `[0, 1]`.
/// Out-of-bounds coordinates are ignored.
pub fn blend_coverage(target: &mut RgbaImage, x: i64, y: i64, color: Rgba8, coverage: f32) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    if x >= target.width() || y >= target.height() {
        return;
    }
    let coverage = coverage.clamp(0.0, 1.0);
    let a = (f32::from(color.a) * coverage).round() as u8;
    if a == 0 {
        return;
    }
    let px = target.get_pixel_mut(x, y);
    let out = over(Rgba8::from(*px), Rgba8 { a, ..color });
    *px = out.into();
}

/// Draw `src` over `dst` with its top-left corner at `(offset_x, offset_y)`, clipping to `dst`.
pub fn draw_over(dst: &mut RgbaImage, src: &RgbaImage, offset_x: i64, offset_y: i64) {
    let x0 = offset_x.max(0);
    let y0 = offset_y.max(0);
    let x1 = (offset_x + i64::from(src.width())).min(i64::from(dst.width()));
    let y1 = (offset_y + i64::from(src.height())).min(i64::from(dst.height()));
    for y in y0..y1 {
        for x in x0..x1 {
            let s = Rgba8::from(*src.get_pixel((x - offset_x) as u32, (y - offset_y) as u32));
            if s.a == 0 {
                continue;
            }
            let d = dst.get_pixel_mut(x as u32, y as u32);
            *d = over(Rgba8::from(*d), s).into();
        }
    }
}

/// Copy `src` into `dst` at `(offset_x, offset_y)` replacing existing pixels, clipping to `dst`.
pub fn copy_into(dst: &mut RgbaImage, src: &RgbaImage, offset_x: u32, offset_y: u32) {
    let width = src.width().min(dst.width().saturating_sub(offset_x));
    let height = src.height().min(dst.height().saturating_sub(offset_y));
    for y in 0..height {
        for x in 0..width {
            dst.put_pixel(offset_x + x, offset_y + y, *src.get_pixel(x, y));
        }
    }
}

fn mul_div255(x: u32, y: u32) -> u32 {
    (x * y + 127) / 255
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
