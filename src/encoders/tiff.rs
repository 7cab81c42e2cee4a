use std::io::{Seek, Write};

use image::codecs::tiff::TiffEncoder;
use image::DynamicImage;

use crate::encoders::pixel_format::optimize_pixel_format;
use crate::{backend_try, error::IiifError};

pub fn encode<W: Write + Seek>(image: &DynamicImage, writer: &mut W) -> Result<(), IiifError> {
    let encoder = TiffEncoder::new(writer);
    // the TIFF encoder has no gray+alpha layout
    let pixels = match optimize_pixel_format(image).into_owned() {
        DynamicImage::ImageLumaA8(pixels) => {
            DynamicImage::ImageRgba8(DynamicImage::ImageLumaA8(pixels).to_rgba8())
        }
        other => other,
    };
    backend_try!(pixels.write_with_encoder(encoder));
    Ok(())
}
