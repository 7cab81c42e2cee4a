//! Media type tables describing what a backend can read and write in this build.

use std::collections::BTreeMap;

use image::ImageFormat;
use log::warn;

use crate::error::IiifError;
use crate::request::OutputFormat;

/// `media_type -> codec` for inputs and `format -> codec` for outputs.
///
/// Entries that the running build cannot honor are removed, never merely flagged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    inputs: BTreeMap<&'static str, ImageFormat>,
    outputs: BTreeMap<OutputFormat, ImageFormat>,
}

impl Capabilities {
    pub(crate) fn from_tables(
        inputs: &[(&'static str, ImageFormat)],
        outputs: &[(OutputFormat, ImageFormat)],
    ) -> Self {
        Self {
            inputs: inputs.iter().copied().collect(),
            outputs: outputs.iter().copied().collect(),
        }
    }

    /// Drops inputs whose decoder was compiled out.
    pub(crate) fn retain_readable(&mut self, mut probe: impl FnMut(ImageFormat) -> bool) {
        self.inputs.retain(|media_type, format| {
            let available = probe(*format);
            if !available {
                warn!("decoder for {media_type} is not available in this build");
            }
            available
        });
    }

    /// Drops outputs whose encoder is unavailable.
    pub(crate) fn retain_writable(&mut self, mut probe: impl FnMut(OutputFormat, ImageFormat) -> bool) {
        self.outputs.retain(|output, format| {
            let available = probe(*output, *format);
            if !available {
                warn!("encoder for {output} is not available in this build");
            }
            available
        });
    }

    /// Keeps only the outputs that were asked for. An empty request keeps everything.
    pub fn narrow_outputs(&mut self, requested: &[OutputFormat]) {
        if requested.is_empty() {
            return;
        }
        self.outputs.retain(|output, _| requested.contains(output));
    }

    pub fn input_format(&self, media_type: &str) -> Option<ImageFormat> {
        self.inputs
            .get(media_type.trim().to_ascii_lowercase().as_str())
            .copied()
    }

    pub fn output_format(&self, format: OutputFormat) -> Option<ImageFormat> {
        self.outputs.get(&format).copied()
    }

    pub fn require_input(&self, media_type: &str) -> Result<ImageFormat, IiifError> {
        self.input_format(media_type)
            .ok_or_else(|| IiifError::UnsupportedMediaType(media_type.to_string()))
    }

    pub fn require_output(&self, format: OutputFormat) -> Result<ImageFormat, IiifError> {
        self.output_format(format)
            .ok_or_else(|| IiifError::UnsupportedFormat(format.media_type().to_string()))
    }

    pub fn input_media_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inputs.keys().copied()
    }

    pub fn output_formats(&self) -> impl Iterator<Item = OutputFormat> + '_ {
        self.outputs.keys().copied()
    }
}
