use statcard::{PreparedImage, Rgba8, Surface, encode_png};

fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn digest_u64(bytes: &[u8]) -> u64 {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    for chunk in bytes.chunks(8) {
        let mut v = 0u64;
        for (i, &b) in chunk.iter().enumerate() {
            v |= (b as u64) << (i * 8);
        }
        state = mix64(state ^ v);
    }
    state
}

fn gradient_image(width: u32, height: u32) -> PreparedImage {
    let mut bytes = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let v = ((x * 255) / width.max(1)) as u8;
            let w = ((y * 255) / height.max(1)) as u8;
            bytes.extend_from_slice(&[v, w, 128, 255]);
        }
    }
    PreparedImage::from_premul_bytes(width, height, bytes)
}

fn compose_layers() -> Vec<u8> {
    let mut surface = Surface::new(64, 48).unwrap();
    surface.fill(Rgba8::opaque(132, 161, 198));

    // Masked art layer composited over the tinted base.
    let art = gradient_image(32, 32);
    let mut layer = Surface::new(64, 48).unwrap();
    layer
        .draw_image(&art, kurbo::Rect::new(-8.0, -4.0, 56.0, 44.0), 1.0, 1.0)
        .unwrap();
    let mask = gradient_image(16, 16);
    layer.apply_luma_mask(&mask, -4, 0, 64, 48, false).unwrap();
    surface.over_surface(layer, 1.0).unwrap();

    // Panel chrome.
    surface.fill_rounded_rect(
        kurbo::Rect::new(4.0, 30.0, 60.0, 44.0),
        5.0,
        Rgba8::new(0, 0, 0, 61),
    );
    surface
        .draw_image(&gradient_image(8, 8), kurbo::Rect::new(6.0, 32.0, 18.0, 44.0), 1.0, 2.0)
        .unwrap();
    surface
        .shade_rect(kurbo::Rect::new(4.0, 38.0, 60.0, 44.0), [245, 185, 65])
        .unwrap();

    let (w, h, pixels) = surface.into_premul_bytes();
    encode_png(&pixels, w, h).unwrap()
}

#[test]
fn layered_composition_is_deterministic() {
    let a = compose_layers();
    let b = compose_layers();
    assert_eq!(digest_u64(&a), digest_u64(&b));
    assert_eq!(a, b);
}

#[test]
fn output_is_a_png() {
    let bytes = compose_layers();
    assert_eq!(&bytes[0..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
}

#[test]
fn masked_layer_keeps_the_base_visible_where_erased() {
    let mut surface = Surface::new(8, 8).unwrap();
    surface.fill(Rgba8::opaque(10, 20, 30));

    // A fully white mask with invert=false erases the whole layer, so the
    // composite must equal the base.
    let mut layer = Surface::new(8, 8).unwrap();
    layer
        .draw_image(
            &gradient_image(8, 8),
            kurbo::Rect::new(0.0, 0.0, 8.0, 8.0),
            1.0,
            1.0,
        )
        .unwrap();
    let white = PreparedImage::from_premul_bytes(2, 2, vec![255u8; 16]);
    layer.apply_luma_mask(&white, 0, 0, 8, 8, false).unwrap();
    surface.over_surface(layer, 1.0).unwrap();

    let (_, _, pixels) = surface.into_premul_bytes();
    assert_eq!(&pixels[0..4], &[10, 20, 30, 255]);
}
