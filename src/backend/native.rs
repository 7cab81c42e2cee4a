use std::fs::File;
use std::io::BufWriter;

use image::{DynamicImage, ImageFormat, RgbaImage};
use log::debug;

use super::{portable::INPUTS, BackendContext, BackendKind, Capabilities, RenderBackend};
use crate::encoders::{encode_with_image, webp};
use crate::error::IiifError;
use crate::operations::{resize::resize_lanczos, rotate::rotate_clockwise_imageproc};
use crate::request::OutputFormat;

const OUTPUTS: &[(OutputFormat, ImageFormat)] = &[
    (OutputFormat::Jpg, ImageFormat::Jpeg),
    (OutputFormat::Png, ImageFormat::Png),
    (OutputFormat::Gif, ImageFormat::Gif),
    (OutputFormat::Tif, ImageFormat::Tiff),
    (OutputFormat::Webp, ImageFormat::WebP),
];

/// Lanczos resampling, `imageproc` rotation and lossy WebP through libwebp.
pub struct NativeImageLib {
    capabilities: Capabilities,
    context: BackendContext,
}

impl NativeImageLib {
    /// Fails if libwebp cannot encode a single pixel.
    pub fn new(context: BackendContext) -> Result<Self, IiifError> {
        webp::probe_libwebp().map_err(|e| {
            IiifError::missing_capability(BackendKind::Native, format!("libwebp probe failed: {e}"))
        })?;
        debug!("libwebp probe succeeded");

        let mut capabilities = Capabilities::from_tables(INPUTS, OUTPUTS);
        capabilities.retain_readable(|format| format.reading_enabled());
        // WebP is written by libwebp regardless of the `image` features
        capabilities.retain_writable(|output, format| {
            output == OutputFormat::Webp || format.writing_enabled()
        });
        if capabilities.input_media_types().next().is_none() {
            return Err(IiifError::missing_capability(
                BackendKind::Native,
                "no image decoders were compiled in",
            ));
        }
        Ok(Self {
            capabilities,
            context,
        })
    }
}

impl RenderBackend for NativeImageLib {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
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
        resize_lanczos(canvas, width, height)
    }

    fn rotate_arbitrary(&self, canvas: RgbaImage, degrees: f64) -> Result<RgbaImage, IiifError> {
        Ok(rotate_clockwise_imageproc(&canvas, degrees))
    }

    fn encode(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        writer: &mut BufWriter<File>,
    ) -> Result<(), IiifError> {
        match format {
            OutputFormat::Webp => webp::encode_lossy(image, writer, self.context.encode.webp_quality),
            other => encode_with_image(image, other, writer, &self.context.encode),
        }
    }
}
