//! Pixel operations shared by the rendering backends.
//!
//! The working canvas is always 8-bit RGBA: the crop flattens the source onto black and
//! arbitrary rotation reintroduces transparency.

pub mod crop;
pub mod flip;
pub mod grayscale;
pub mod monochrome;
pub mod resize;
pub mod rotate;

use image::{DynamicImage, RgbaImage};

use crate::request::QualitySpec;

pub fn apply_quality(canvas: RgbaImage, quality: QualitySpec) -> DynamicImage {
    match quality {
        QualitySpec::Default | QualitySpec::Color => DynamicImage::ImageRgba8(canvas),
        QualitySpec::Gray => grayscale::grayscale(canvas),
        QualitySpec::Bitonal => monochrome::bitonal(canvas),
    }
}
