use std::io::Write;

use image::codecs::gif::GifEncoder;
use image::{DynamicImage, ExtendedColorType};

use crate::encoders::pixel_format::to_8bit_rgb_maybe_a;
use crate::{backend_try, error::IiifError};

pub fn encode<W: Write>(image: &DynamicImage, writer: &mut W) -> Result<(), IiifError> {
    let mut encoder = GifEncoder::new_with_speed(writer, 10);
    // GifEncoder only accepts raw RGB(A) buffers:
    // https://github.com/image-rs/image/issues/2497
    let (width, height) = (image.width(), image.height());
    let pixels = to_8bit_rgb_maybe_a(image);
    let color = match pixels.as_ref() {
        DynamicImage::ImageRgb8(_) => ExtendedColorType::Rgb8,
        _ => ExtendedColorType::Rgba8,
    };
    Ok(backend_try!(encoder.encode(
        pixels.as_bytes(),
        width,
        height,
        color
    )))
}
