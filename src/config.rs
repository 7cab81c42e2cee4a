//! Service configuration, read from a TOML file.
//!
//! ```toml
//! backend = "native"
//! formats = ["jpg", "png", "webp"]
//! tile_size = 512
//! scratch_dir = "/var/cache/iiif"
//! jpeg_quality = 85
//! webp_quality = 75.0
//! store_root = "/srv/images"
//! max_area = 50000000
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::backend::{BackendContext, BackendKind};
use crate::encoders::EncodeOptions;
use crate::plan::DEFAULT_MAX_AREA;
use crate::request::OutputFormat;
use crate::source::DirectoryStore;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Value(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    pub backend: BackendKind,
    /// Output formats to offer. Empty offers everything the backend can write.
    pub formats: Vec<OutputFormat>,
    pub tile_size: u32,
    /// Where derivatives and temporary copies of remote sources are created.
    pub scratch_dir: PathBuf,
    pub jpeg_quality: u8,
    pub webp_quality: f32,
    /// Root directory serving remote source keys.
    pub store_root: Option<PathBuf>,
    /// Largest output canvas in pixels, after rotation.
    pub max_area: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        let encode = EncodeOptions::default();
        Self {
            backend: BackendKind::Portable,
            formats: Vec::new(),
            tile_size: 256,
            scratch_dir: std::env::temp_dir(),
            jpeg_quality: encode.jpeg_quality,
            webp_quality: encode.webp_quality,
            store_root: None,
            max_area: DEFAULT_MAX_AREA,
        }
    }
}

impl ServiceConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Value(format!(
                "jpeg_quality must be within 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        if !(0.0..=100.0).contains(&self.webp_quality) {
            return Err(ConfigError::Value(format!(
                "webp_quality must be within 0..=100, got {}",
                self.webp_quality
            )));
        }
        if self.max_area == 0 {
            return Err(ConfigError::Value("max_area must be positive".to_string()));
        }
        Ok(())
    }

    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions {
            jpeg_quality: self.jpeg_quality,
            webp_quality: self.webp_quality,
        }
    }

    pub fn backend_context(&self) -> BackendContext {
        let context = BackendContext::new(&self.scratch_dir)
            .with_encode_options(self.encode_options());
        match &self.store_root {
            Some(root) => context.with_store(Arc::new(DirectoryStore::new(root))),
            None => context,
        }
    }
}
