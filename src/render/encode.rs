//! Final serialization of the finished surface.

use image::ImageEncoder;

use crate::foundation::error::{StatcardError, StatcardResult};

/// Encode a premultiplied RGBA8 buffer as a PNG.
///
/// PNG carries straight alpha, so channels are un-premultiplied first. A
/// failure here is fatal to the render: there is nothing meaningful to return
/// without the encoded buffer.
pub fn encode_png(rgba8_premul: &[u8], width: u32, height: u32) -> StatcardResult<Vec<u8>> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4));
    if expected != Some(rgba8_premul.len()) {
        return Err(StatcardError::encode(format!(
            "pixel buffer does not match {width}x{height} rgba8"
        )));
    }

    let mut straight = rgba8_premul.to_vec();
    unpremultiply_rgba8_in_place(&mut straight);

    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(&straight, width, height, image::ExtendedColorType::Rgba8)
        .map_err(|e| StatcardError::encode(format!("png encode failed: {e}")))?;
    Ok(out)
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in px.iter_mut().take(3) {
            let v = (u16::from(*c) * 255 + a / 2) / a;
            *c = v.min(255) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_round_trips_through_decode() {
        // 2x2: opaque red, half-transparent green, transparent, opaque white.
        let premul = vec![
            255, 0, 0, 255, //
            0, 128, 0, 128, //
            0, 0, 0, 0, //
            255, 255, 255, 255,
        ];
        let png = encode_png(&premul, 2, 2).unwrap();
        let decoded = crate::assets::decode_image(&png).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 2));
        // Re-premultiplied pixels match the input.
        assert_eq!(decoded.rgba8_premul.as_slice(), premul.as_slice());
    }

    #[test]
    fn size_mismatch_is_an_encode_error() {
        let err = encode_png(&[0u8; 4], 2, 2).unwrap_err();
        assert!(err.to_string().contains("encode"));
    }

    #[test]
    fn deterministic_for_identical_input() {
        let premul = vec![10u8; 4 * 4 * 4];
        assert_eq!(encode_png(&premul, 4, 4).unwrap(), encode_png(&premul, 4, 4).unwrap());
    }
}
