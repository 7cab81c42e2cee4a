//! Rendering backends.
//!
//! A backend turns a decoded source and an [`ExtractionPlan`] into a derivative file. The order
//! of the pipeline is fixed and lives in [`RenderBackend::render`]; backends only supply the
//! primitives that differ between them.

mod capabilities;
mod native;
mod portable;

pub use capabilities::Capabilities;
pub use native::NativeImageLib;
pub use portable::PortableRaster;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use image::{DynamicImage, RgbaImage};
use log::{debug, info};
use serde::Deserialize;
use strum::{EnumString, IntoStaticStr, VariantArray};

use crate::encoders::EncodeOptions;
use crate::error::IiifError;
use crate::operations::{apply_quality, crop::crop_onto_black, flip::mirror, rotate::rotate_quarter};
use crate::plan::ExtractionPlan;
use crate::request::{ImageRequest, OutputFormat, RotationSpec, SourceDescriptor};
use crate::source::{self, SourceStore};
use crate::{backend_err, backend_try};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, VariantArray, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Pure `image` pipeline
    Portable,
    /// `pic-scale-safe`, `imageproc` and libwebp
    Native,
}

impl BackendKind {
    pub fn name(self) -> &'static str {
        self.into()
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Everything a backend needs besides its own capability table.
#[derive(Clone)]
pub struct BackendContext {
    pub scratch_dir: PathBuf,
    pub store: Option<Arc<dyn SourceStore>>,
    pub encode: EncodeOptions,
}

impl BackendContext {
    pub fn new(scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            scratch_dir: scratch_dir.into(),
            store: None,
            encode: EncodeOptions::default(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SourceStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_encode_options(mut self, encode: EncodeOptions) -> Self {
        self.encode = encode;
        self
    }

    fn store(&self) -> Option<&dyn SourceStore> {
        self.store.as_deref()
    }
}

impl std::fmt::Debug for BackendContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendContext")
            .field("scratch_dir", &self.scratch_dir)
            .field("store", &self.store.is_some())
            .field("encode", &self.encode)
            .finish()
    }
}

pub trait RenderBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    fn capabilities(&self) -> &Capabilities;

    fn capabilities_mut(&mut self) -> &mut Capabilities;

    fn context(&self) -> &BackendContext;

    /// Resamples the cropped canvas to exactly `width`x`height`.
    fn resample(&self, canvas: RgbaImage, width: u32, height: u32)
        -> Result<RgbaImage, IiifError>;

    /// Rotates clockwise by `degrees`, growing the canvas to the rotated bounding box.
    fn rotate_arbitrary(&self, canvas: RgbaImage, degrees: f64) -> Result<RgbaImage, IiifError>;

    fn encode(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        writer: &mut BufWriter<File>,
    ) -> Result<(), IiifError>;

    /// Reads the source dimensions from its header.
    fn probe_dimensions(&self, source: &SourceDescriptor) -> Result<(u32, u32), IiifError> {
        let format = self.capabilities().require_input(&source.media_type)?;
        let context = self.context();
        source::probe_dimensions(source, format, context.store(), &context.scratch_dir)
    }

    /// Runs the whole pipeline and returns the path of the new derivative.
    ///
    /// On error nothing is left behind in the scratch directory.
    fn render(
        &self,
        source: &SourceDescriptor,
        plan: &ExtractionPlan,
        request: &ImageRequest,
    ) -> Result<PathBuf, IiifError> {
        let capabilities = self.capabilities();
        capabilities.require_output(request.format)?;
        let input = capabilities.require_input(&source.media_type)?;
        let context = self.context();

        let decoded = source::decode(source, input, context.store(), &context.scratch_dir)?;
        debug!(
            "{}: decoded {} ({}x{})",
            self.kind(),
            source.location,
            decoded.width(),
            decoded.height()
        );
        let canvas = crop_onto_black(&decoded, plan)?;
        drop(decoded);

        let canvas = if plan.is_resampled() {
            debug!("{}: resampling to {}x{}", self.kind(), plan.dst_w, plan.dst_h);
            self.resample(canvas, plan.dst_w, plan.dst_h)?
        } else {
            canvas
        };
        let canvas = mirror(canvas, request.mirror);
        let canvas = match request.rotation {
            RotationSpec::None => canvas,
            RotationSpec::Right90Multiple(turn) => rotate_quarter(canvas, turn),
            RotationSpec::Arbitrary { degrees } => self.rotate_arbitrary(canvas, degrees)?,
        };
        let image = apply_quality(canvas, request.quality);

        let path = write_derivative(&context.scratch_dir, request.format, |writer| {
            self.encode(&image, request.format, writer)
        })?;
        info!(
            "{}: wrote {}x{} {} to {}",
            self.kind(),
            image.width(),
            image.height(),
            request.format.media_type(),
            path.display()
        );
        Ok(path)
    }
}

/// Encodes into a fresh uniquely named file in `scratch_dir` and keeps it only on success.
fn write_derivative(
    scratch_dir: &Path,
    format: OutputFormat,
    encode: impl FnOnce(&mut BufWriter<File>) -> Result<(), IiifError>,
) -> Result<PathBuf, IiifError> {
    let suffix = format!(".{}", format.extension());
    let file = tempfile::Builder::new()
        .prefix("iiif-")
        .suffix(&suffix)
        .tempfile_in(scratch_dir)
        .map_err(|e| {
            backend_err!(
                "unable to create a derivative in '{}': {e}",
                scratch_dir.display()
            )
        })?;
    let (file, temp_path) = file.into_parts();
    let mut writer = BufWriter::new(file);
    encode(&mut writer)?;
    backend_try!(writer.flush());
    temp_path
        .keep()
        .map_err(|e| backend_err!("unable to keep the derivative: {e}"))
}

/// Constructs the backend named `name` and narrows its outputs to `requested_formats`.
///
/// An empty `requested_formats` keeps every output the backend supports.
pub fn select_backend(
    name: &str,
    requested_formats: &[OutputFormat],
    context: BackendContext,
) -> Result<Box<dyn RenderBackend>, IiifError> {
    let kind = BackendKind::from_str(name.trim())
        .map_err(|_| IiifError::missing_capability(name, "no backend by that name"))?;
    let mut backend: Box<dyn RenderBackend> = match kind {
        BackendKind::Portable => Box::new(PortableRaster::new(context)?),
        BackendKind::Native => Box::new(NativeImageLib::new(context)?),
    };
    backend.capabilities_mut().narrow_outputs(requested_formats);
    info!(
        "selected the {kind} backend, writing {:?}",
        backend
            .capabilities()
            .output_formats()
            .map(|f| f.extension())
            .collect::<Vec<_>>()
    );
    Ok(backend)
}

#[cfg(all(test, feature = "default-formats"))]
mod tests {
    use super::*;

    fn context() -> (tempfile::TempDir, BackendContext) {
        let dir = tempfile::tempdir().unwrap();
        let context = BackendContext::new(dir.path());
        (dir, context)
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(BackendKind::from_str("Native").unwrap(), BackendKind::Native);
        assert_eq!(BackendKind::from_str("PORTABLE").unwrap(), BackendKind::Portable);
        assert_eq!(BackendKind::Native.to_string(), "native");
    }

    #[test]
    fn unknown_backend_is_a_missing_capability() {
        let (_dir, context) = context();
        let result = select_backend("vips", &[], context);
        assert!(matches!(result, Err(IiifError::MissingCapability { .. })));
    }

    #[test]
    fn outputs_are_narrowed_to_the_request() {
        for name in BackendKind::VARIANTS {
            let (_dir, context) = context();
            let backend =
                select_backend(name.name(), &[OutputFormat::Png, OutputFormat::Pdf], context)
                    .unwrap();
            assert_eq!(backend.kind(), *name);
            let outputs: Vec<_> = backend.capabilities().output_formats().collect();
            assert_eq!(outputs, vec![OutputFormat::Png]);
        }
    }

    #[test]
    fn failed_encode_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let result = write_derivative(dir.path(), OutputFormat::Png, |_| {
            Err(backend_err!("encoder exploded"))
        });
        assert!(result.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn derivative_extension_matches_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_derivative(dir.path(), OutputFormat::Webp, |writer| {
            Ok(backend_try!(writer.write_all(b"RIFF")))
        })
        .unwrap();
        assert_eq!(path.extension().unwrap(), "webp");
        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("iiif-"));
        assert_eq!(path.parent().unwrap(), dir.path());
    }
}
