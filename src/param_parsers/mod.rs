//! Parsers for the IIIF Image API path parameters,
//! e.g. <https://iiif.io/api/image/3.0/#4-image-requests>
//!
//! These only check syntax. Whether a region or size makes sense for a given source is decided
//! by the planner.

pub mod numbers;
mod quality_format;
mod region;
mod rotation;
mod size;

pub use quality_format::QualityFormat;
pub use rotation::RotationParam;

use crate::request::{ImageRequest, RegionSpec, SizeSpec};

/// Parses the four path parameters into a request.
///
/// The error is ready to be shown to the caller.
pub fn parse_request(
    region: &str,
    size: &str,
    rotation: &str,
    quality_format: &str,
) -> Result<ImageRequest, String> {
    let region = region
        .parse::<RegionSpec>()
        .map_err(|e| e.display_with_param("region", region))?;
    let size = size
        .parse::<SizeSpec>()
        .map_err(|e| e.display_with_param("size", size))?;
    let RotationParam { mirror, rotation } = rotation
        .parse::<RotationParam>()
        .map_err(|e| e.display_with_param("rotation", rotation))?;
    let QualityFormat { quality, format } = quality_format
        .parse::<QualityFormat>()
        .map_err(|e| e.display_with_param("quality", quality_format))?;
    Ok(ImageRequest {
        region,
        size,
        mirror,
        rotation,
        quality,
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{MirrorSpec, OutputFormat, QualitySpec, RotationSpec};

    #[test]
    fn full_request() {
        let request = parse_request("pct:0,0,50,50", "!200,200", "!180", "gray.png").unwrap();
        assert_eq!(
            request.region,
            RegionSpec::ByPercent { x: 0.0, y: 0.0, w: 50.0, h: 50.0 }
        );
        assert_eq!(request.size, SizeSpec::ByWidthHeightBestFit { w: 200, h: 200 });
        assert_eq!(request.mirror, MirrorSpec::Horizontal);
        assert_eq!(request.rotation.degrees(), 180.0);
        assert_eq!(request.quality, QualitySpec::Gray);
        assert_eq!(request.format, OutputFormat::Png);
    }

    #[test]
    fn defaults() {
        assert_eq!(
            parse_request("full", "max", "0", "default.jpg").unwrap(),
            ImageRequest::default()
        );
        let request = parse_request("full", "full", "0", "color.jpg").unwrap();
        assert_eq!(request.rotation, RotationSpec::None);
    }

    #[test]
    fn names_the_offending_parameter() {
        let err = parse_request("full", "full", "400", "default.jpg").unwrap_err();
        assert_eq!(
            err,
            "invalid rotation parameter `400': degrees must be within [0, 360)"
        );
    }
}
