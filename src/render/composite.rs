//! Pure pixel operations over premultiplied RGBA8 buffers.
//!
//! Everything here is deterministic integer/float math with no IO and no
//! drawing context; surfaces hand their byte buffers in and get them mutated
//! in place.

use crate::foundation::error::{StatcardError, StatcardResult};
use crate::foundation::math::{luma_u8, mul_div255_u8};

pub type PremulRgba8 = [u8; 4];

/// Source-over blend of one premultiplied pixel, with extra opacity.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Source-over an equal-sized buffer in place.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> StatcardResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(StatcardError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Source-over `src` onto `dst` at an integer offset, clipping as needed.
pub fn over_at(
    dst: &mut [u8],
    dst_size: (u32, u32),
    src: &[u8],
    src_size: (u32, u32),
    x: i64,
    y: i64,
) -> StatcardResult<()> {
    let (dw, dh) = dst_size;
    let (sw, sh) = src_size;
    check_len(dst, dw, dh, "over_at dst")?;
    check_len(src, sw, sh, "over_at src")?;

    for sy in 0..i64::from(sh) {
        let dy = y + sy;
        if dy < 0 || dy >= i64::from(dh) {
            continue;
        }
        for sx in 0..i64::from(sw) {
            let dx = x + sx;
            if dx < 0 || dx >= i64::from(dw) {
                continue;
            }
            let di = ((dy as usize) * (dw as usize) + (dx as usize)) * 4;
            let si = ((sy as usize) * (sw as usize) + (sx as usize)) * 4;
            let out = over(
                [dst[di], dst[di + 1], dst[di + 2], dst[di + 3]],
                [src[si], src[si + 1], src[si + 2], src[si + 3]],
                1.0,
            );
            dst[di..di + 4].copy_from_slice(&out);
        }
    }
    Ok(())
}

/// Overlay-blend an equal-sized layer onto an in-place destination.
///
/// The classic overlay curve (screen above mid-grey, multiply below) is
/// applied per channel in straight-alpha space and mixed in by the source's
/// alpha; destination alpha is kept.
pub fn overlay_in_place(dst: &mut [u8], src: &[u8]) -> StatcardResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(StatcardError::render(
            "overlay_in_place expects equal-length rgba8 buffers",
        ));
    }

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let da = d[3];
        let sa = s[3];
        if da == 0 || sa == 0 {
            continue;
        }

        for i in 0..3 {
            let cb = f32::from(d[i]) / f32::from(da);
            let cs = f32::from(s[i]) / f32::from(sa);
            let blended = if cb <= 0.5 {
                2.0 * cb * cs
            } else {
                1.0 - 2.0 * (1.0 - cb) * (1.0 - cs)
            };
            let t = f32::from(sa) / 255.0;
            let mixed = cb + (blended - cb) * t;
            d[i] = (mixed.clamp(0.0, 1.0) * f32::from(da)).round() as u8;
        }
    }
    Ok(())
}

/// Destination-in by mask luma: keep `dst` only where the mask allows.
///
/// The mask buffer covers a `(w, h)` region placed at `(x, y)` over the
/// destination; per-pixel mask alpha is `luma` when `invert` is set, else
/// `255 - luma`. Destination pixels outside the placed region are erased,
/// matching destination-in semantics.
pub fn mask_in_place(
    dst: &mut [u8],
    dst_size: (u32, u32),
    mask: &[u8],
    mask_size: (u32, u32),
    x: i64,
    y: i64,
    invert: bool,
) -> StatcardResult<()> {
    let (dw, dh) = dst_size;
    let (mw, mh) = mask_size;
    check_len(dst, dw, dh, "mask_in_place dst")?;
    check_len(mask, mw, mh, "mask_in_place mask")?;

    for dy in 0..i64::from(dh) {
        for dx in 0..i64::from(dw) {
            let di = ((dy as usize) * (dw as usize) + (dx as usize)) * 4;

            let mx = dx - x;
            let my = dy - y;
            let inside = mx >= 0 && mx < i64::from(mw) && my >= 0 && my < i64::from(mh);
            let alpha = if inside {
                let mi = ((my as usize) * (mw as usize) + (mx as usize)) * 4;
                let luma = luma_u8(mask[mi], mask[mi + 1], mask[mi + 2]);
                if invert { luma } else { 255 - luma }
            } else {
                0
            };

            for c in 0..4 {
                dst[di + c] = mul_div255_u8(u16::from(dst[di + c]), u16::from(alpha));
            }
        }
    }
    Ok(())
}

/// Brightness-scaled copy of a premultiplied buffer.
///
/// Color channels scale by `factor` and saturate at the pixel's alpha, which
/// keeps the buffer premultiplied; alpha is untouched.
pub fn brighten(src: &[u8], factor: f32) -> Vec<u8> {
    if factor == 1.0 {
        return src.to_vec();
    }
    let factor = factor.max(0.0);

    let mut out = src.to_vec();
    for px in out.chunks_exact_mut(4) {
        let a = px[3];
        for c in px.iter_mut().take(3) {
            let scaled = (f32::from(*c) * factor).round();
            *c = scaled.clamp(0.0, f32::from(a)) as u8;
        }
    }
    out
}

/// Bottom-up linear shade over a destination region.
///
/// Alpha runs 0.9 at the bottom edge, 0.3 at 60% height, 0 at the top, in
/// the given color; the shaded pixels source-over the destination.
pub fn vertical_shade(
    dst: &mut [u8],
    dst_size: (u32, u32),
    region: (i64, i64, u32, u32),
    rgb: [u8; 3],
) -> StatcardResult<()> {
    let (dw, dh) = dst_size;
    check_len(dst, dw, dh, "vertical_shade dst")?;

    let (rx, ry, rw, rh) = region;
    if rh == 0 || rw == 0 {
        return Ok(());
    }

    for row in 0..i64::from(rh) {
        let dy = ry + row;
        if dy < 0 || dy >= i64::from(dh) {
            continue;
        }

        // 0 at the top edge of the region, 1 at the bottom.
        let t = (row as f32 + 0.5) / rh as f32;
        let alpha = shade_alpha(1.0 - t);
        if alpha <= 0.0 {
            continue;
        }
        let a8 = (alpha * 255.0).round().clamp(0.0, 255.0) as u8;
        let src = [
            mul_div255_u8(u16::from(rgb[0]), u16::from(a8)),
            mul_div255_u8(u16::from(rgb[1]), u16::from(a8)),
            mul_div255_u8(u16::from(rgb[2]), u16::from(a8)),
            a8,
        ];

        for col in 0..i64::from(rw) {
            let dx = rx + col;
            if dx < 0 || dx >= i64::from(dw) {
                continue;
            }
            let di = ((dy as usize) * (dw as usize) + (dx as usize)) * 4;
            let out = over([dst[di], dst[di + 1], dst[di + 2], dst[di + 3]], src, 1.0);
            dst[di..di + 4].copy_from_slice(&out);
        }
    }
    Ok(())
}

// Gradient stops: 0.9 at t=0 (bottom), 0.3 at t=0.6, 0 at t=1 (top).
fn shade_alpha(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t <= 0.6 {
        0.9 + (0.3 - 0.9) * (t / 0.6)
    } else {
        0.3 + (0.0 - 0.3) * ((t - 0.6) / 0.4)
    }
}

fn check_len(buf: &[u8], w: u32, h: u32, what: &str) -> StatcardResult<()> {
    let expected = (w as usize)
        .checked_mul(h as usize)
        .and_then(|v| v.checked_mul(4));
    if expected != Some(buf.len()) {
        return Err(StatcardError::render(format!(
            "{what} buffer does not match {w}x{h} rgba8"
        )));
    }
    Ok(())
}
