//! Entry point of the derivative pipeline.

use std::path::PathBuf;

use log::{debug, info};

use crate::backend::{select_backend, RenderBackend};
use crate::config::ServiceConfig;
use crate::error::IiifError;
use crate::operations::rotate::rotated_bounds;
use crate::plan::{check_area, plan_with_max_area, DEFAULT_MAX_AREA};
use crate::request::{ImageRequest, RotationSpec, SourceDescriptor};

/// Validates a request against the configured backend, plans it and hands it over for rendering.
///
/// Holds no per-request state, so a single coordinator can serve concurrent requests.
pub struct TransformCoordinator {
    backend: Box<dyn RenderBackend>,
    max_area: u64,
}

impl TransformCoordinator {
    pub fn new(backend: Box<dyn RenderBackend>) -> Self {
        Self {
            backend,
            max_area: DEFAULT_MAX_AREA,
        }
    }

    /// Caps the output canvas, including the growth from arbitrary rotation, at `max_area` pixels.
    pub fn with_max_area(mut self, max_area: u64) -> Self {
        self.max_area = max_area;
        self
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, IiifError> {
        let backend = select_backend(
            config.backend.name(),
            &config.formats,
            config.backend_context(),
        )?;
        Ok(Self::new(backend).with_max_area(config.max_area))
    }

    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    /// Produces a derivative and returns its path. The caller owns the file afterwards.
    pub fn transform(
        &self,
        source: &SourceDescriptor,
        request: &ImageRequest,
    ) -> Result<PathBuf, IiifError> {
        let capabilities = self.backend.capabilities();
        capabilities.require_input(&source.media_type)?;
        capabilities.require_output(request.format)?;

        let probed;
        let source = if source.dimensions_known() {
            source
        } else {
            let (width, height) = self.backend.probe_dimensions(source)?;
            probed = source.with_dimensions(width, height);
            &probed
        };

        let extraction =
            plan_with_max_area(source, &request.region, &request.size, self.max_area)?;
        if let RotationSpec::Arbitrary { degrees } = request.rotation {
            let (width, height) = rotated_bounds(extraction.dst_w, extraction.dst_h, degrees);
            check_area(width, height, self.max_area)?;
        }
        if extraction.is_full_region(source) {
            debug!("planned a full-region {extraction:?} for {}", source.location);
        } else {
            debug!("planned {extraction:?} for {}", source.location);
        }
        let path = self.backend.render(source, &extraction, request)?;
        info!("derived {} from {}", path.display(), source.location);
        Ok(path)
    }
}
