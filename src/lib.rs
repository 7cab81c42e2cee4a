//! Geometry engine and pluggable rendering backends for IIIF Image API derivatives.
//!
//! A request flows through [`coordinator::TransformCoordinator`]: the
//! [planner](plan::plan) turns region and size into pixel coordinates, then a
//! [`backend::RenderBackend`] decodes, crops, scales, mirrors, rotates, filters and encodes
//! into a fresh file in the scratch directory.

#![forbid(unsafe_code)]

#[cfg(feature = "hardened_malloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod backend;
pub mod config;
pub mod coordinator;
mod encoders;
pub mod error;
mod operations;
mod param_parse_err;
pub mod param_parsers;
pub mod plan;
pub mod request;
pub mod source;
pub mod tiles;
pub mod version;

pub use encoders::EncodeOptions;
pub use param_parse_err::ParamParseErr;
