//! Image decoding and the asset-resolution capability.
//!
//! All IO lives behind [`AssetResolver`]; the renderer itself never touches
//! the network or filesystem. Resolution is infallible by contract: a missing
//! or undecodable image is `None`, and every call site degrades its own layer
//! instead of failing the render.

use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::StatcardResult;
use crate::model::ImageRef;

/// Prepared raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl PreparedImage {
    /// Build an image from raw premultiplied RGBA8 bytes.
    pub fn from_premul_bytes(width: u32, height: u32, rgba8_premul: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        }
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> StatcardResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Whether a resolved image is large enough to draw.
///
/// The upstream store hands back 1x1 placeholders for dead links; anything
/// narrower or shorter than 2 px is treated as unavailable.
pub fn is_usable(img: &PreparedImage) -> bool {
    img.width >= 2 && img.height >= 2
}

/// Capability that turns an [`ImageRef`] into a decoded image.
///
/// Implementations must never panic or return errors; failures of any kind
/// (network, missing file, zero-byte decode) collapse to `None`.
pub trait AssetResolver {
    /// Resolve one reference, or `None` if the image is unavailable.
    fn resolve(&self, r: &ImageRef) -> Option<PreparedImage>;

    /// Resolve the first usable candidate of an ordered fallback chain.
    fn resolve_first(&self, candidates: &[ImageRef]) -> Option<PreparedImage> {
        candidates
            .iter()
            .filter_map(|r| self.resolve(r))
            .find(is_usable)
    }
}

/// Resolve `r` and discard unusable (placeholder-sized) results.
pub(crate) fn resolve_usable(
    assets: &dyn AssetResolver,
    r: &ImageRef,
) -> Option<PreparedImage> {
    match assets.resolve(r) {
        Some(img) if is_usable(&img) => Some(img),
        Some(_) => {
            tracing::warn!(?r, "resolved image below usable size, skipping layer");
            None
        }
        None => {
            tracing::warn!(?r, "image unavailable, skipping layer");
            None
        }
    }
}
