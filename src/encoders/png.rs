use std::io::Write;

use image::codecs::png::PngEncoder;
use image::DynamicImage;

use crate::encoders::pixel_format::optimize_pixel_format;
use crate::{backend_try, error::IiifError};

pub fn encode<W: Write>(image: &DynamicImage, writer: &mut W) -> Result<(), IiifError> {
    let encoder = PngEncoder::new(writer);
    let pixels_to_write = optimize_pixel_format(image);
    Ok(backend_try!(pixels_to_write.write_with_encoder(encoder)))
}
