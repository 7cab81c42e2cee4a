use std::io::Write;

#[cfg(feature = "webp")]
use image::codecs::webp::WebPEncoder;
use image::DynamicImage;
use webp::{Encoder, WebPMemory};

#[cfg(feature = "webp")]
use crate::encoders::pixel_format::optimize_pixel_format;
use crate::encoders::pixel_format::to_8bit_rgb_maybe_a;
use crate::{backend_err, backend_try, error::IiifError};

/// Lossless WebP through the pure-Rust encoder in `image`.
#[cfg(feature = "webp")]
pub fn encode_lossless<W: Write>(image: &DynamicImage, writer: &mut W) -> Result<(), IiifError> {
    let encoder = WebPEncoder::new_lossless(writer);
    let pixels_to_write = optimize_pixel_format(image);
    Ok(backend_try!(pixels_to_write.write_with_encoder(encoder)))
}

/// Lossy WebP through libwebp.
pub fn encode_lossy<W: Write>(
    image: &DynamicImage,
    writer: &mut W,
    quality: f32,
) -> Result<(), IiifError> {
    // libwebp only accepts RGB(A) input
    let pixels = to_8bit_rgb_maybe_a(image);
    let encoder = Encoder::from_image(&pixels)
        .map_err(|e| backend_err!("WebP encoder rejected the image: {e}"))?;
    let webp: WebPMemory = encoder
        .encode_simple(false, quality)
        .map_err(|e| backend_err!("WebP encoding failed: {e:?}"))?;
    Ok(backend_try!(writer.write_all(&webp)))
}

/// Encodes a single pixel to confirm libwebp is linked and working.
pub fn probe_libwebp() -> Result<(), String> {
    Encoder::from_rgba(&[0, 0, 0, 255], 1, 1)
        .encode_simple(false, 75.0)
        .map(|_| ())
        .map_err(|e| format!("{e:?}"))
}
