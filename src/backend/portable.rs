use std::fs::File;
use std::io::BufWriter;

use image::{DynamicImage, ImageFormat, RgbaImage};

use super::{BackendContext, BackendKind, Capabilities, RenderBackend};
use crate::encoders::encode_with_image;
use crate::error::IiifError;
use crate::operations::{resize::resize_portable, rotate::rotate_counterclockwise};
use crate::request::OutputFormat;

pub(super) const INPUTS: &[(&str, ImageFormat)] = &[
    ("image/jpeg", ImageFormat::Jpeg),
    ("image/png", ImageFormat::Png),
    ("image/gif", ImageFormat::Gif),
    ("image/tiff", ImageFormat::Tiff),
    ("image/webp", ImageFormat::WebP),
    ("image/bmp", ImageFormat::Bmp),
];

const OUTPUTS: &[(OutputFormat, ImageFormat)] = &[
    (OutputFormat::Jpg, ImageFormat::Jpeg),
    (OutputFormat::Png, ImageFormat::Png),
    (OutputFormat::Gif, ImageFormat::Gif),
    (OutputFormat::Tif, ImageFormat::Tiff),
    (OutputFormat::Webp, ImageFormat::WebP),
];

/// Everything through the `image` crate; no native code involved.
pub struct PortableRaster {
    capabilities: Capabilities,
    context: BackendContext,
}

impl PortableRaster {
    pub fn new(context: BackendContext) -> Result<Self, IiifError> {
        let mut capabilities = Capabilities::from_tables(INPUTS, OUTPUTS);
        capabilities.retain_readable(|format| format.reading_enabled());
        capabilities.retain_writable(|_, format| format.writing_enabled());
        if capabilities.input_media_types().next().is_none() {
            return Err(IiifError::missing_capability(
                BackendKind::Portable,
                "no image decoders were compiled in",
            ));
        }
        if capabilities.output_formats().next().is_none() {
            return Err(IiifError::missing_capability(
                BackendKind::Portable,
                "no image encoders were compiled in",
            ));
        }
        Ok(Self {
            capabilities,
            context,
        })
    }
}

impl RenderBackend for PortableRaster {
    fn kind(&self) -> BackendKind {
        BackendKind::Portable
    }

    fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn capabilities_mut(&mut self) -> &mut Capabilities {
        &mut self.capabilities
    }

    fn context(&self) -> &BackendContext {
        &self.context
    }

    fn resample(
        &self,
        canvas: RgbaImage,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, IiifError> {
        Ok(resize_portable(canvas, width, height))
    }

    fn rotate_arbitrary(&self, canvas: RgbaImage, degrees: f64) -> Result<RgbaImage, IiifError> {
        // the primitive turns counter-clockwise
        Ok(rotate_counterclockwise(&canvas, -degrees))
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        writer: &mut BufWriter<File>,
    ) -> Result<(), IiifError> {
        encode_with_image(image, format, writer, &self.context.encode)
    }
}
