//! Writers for the output formats the backends can produce.

#[cfg(feature = "gif")]
mod gif;
#[cfg(feature = "jpeg")]
mod jpeg;
mod pixel_format;
#[cfg(feature = "png")]
mod png;
#[cfg(feature = "tiff")]
mod tiff;
pub(crate) mod webp;

use std::io::{Seek, Write};

use image::DynamicImage;

use crate::{backend_err, error::IiifError, request::OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeOptions {
    /// 1..=100
    pub jpeg_quality: u8,
    /// 0.0..=100.0, only used by lossy WebP
    pub webp_quality: f32,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            jpeg_quality: 90,
            webp_quality: 80.0,
        }
    }
}

/// Encodes through the codecs built into `image`. WebP output is lossless.
pub fn encode_with_image<W: Write + Seek>(
    image: &DynamicImage,
    format: OutputFormat,
    writer: &mut W,
    options: &EncodeOptions,
) -> Result<(), IiifError> {
    match format {
        #[cfg(feature = "jpeg")]
        OutputFormat::Jpg => jpeg::encode(image, writer, options),
        #[cfg(feature = "png")]
        OutputFormat::Png => png::encode(image, writer),
        #[cfg(feature = "gif")]
        OutputFormat::Gif => gif::encode(image, writer),
        #[cfg(feature = "tiff")]
        OutputFormat::Tif => tiff::encode(image, writer),
        #[cfg(feature = "webp")]
        OutputFormat::Webp => webp::encode_lossless(image, writer),
        _ => Err(backend_err!(
            "no encoder for {} in this build",
            format.media_type()
        )),
    }
}
