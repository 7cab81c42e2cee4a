use std::io::Write;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

use crate::encoders::EncodeOptions;
use crate::{backend_try, error::IiifError};

pub fn encode<W: Write>(
    image: &DynamicImage,
    writer: &mut W,
    options: &EncodeOptions,
) -> Result<(), IiifError> {
    let encoder = JpegEncoder::new_with_quality(writer, options.jpeg_quality);
    // JPEG has no alpha channel. Rotation corners are transparent black, so dropping alpha
    // leaves them black.
    let pixels = if image.color().has_color() {
        DynamicImage::ImageRgb8(image.to_rgb8())
    } else {
        DynamicImage::ImageLuma8(image.to_luma8())
    };
    Ok(backend_try!(pixels.write_with_encoder(encoder)))
}
