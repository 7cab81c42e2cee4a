//! The structured request vocabulary handed to the core by the request parser.

use std::fmt::Display;
use std::path::PathBuf;

use serde::Deserialize;
use strum::{EnumString, IntoStaticStr, VariantArray};

/// Where the source bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Addressable on the local filesystem.
    Path(PathBuf),
    /// A key that has to be fetched through a [`SourceStore`](crate::source::SourceStore).
    Remote(String),
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Path(path) => write!(f, "{}", path.display()),
            Location::Remote(key) => write!(f, "remote:{key}"),
        }
    }
}

/// A source image as known to the caller.
///
/// `width` and `height` are zero when unknown; use [`SourceDescriptor::with_dimensions`]
/// to obtain a copy with the probed values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    pub width: u32,
    pub height: u32,
    pub media_type: String,
    pub location: Location,
}

impl SourceDescriptor {
    pub fn new(location: Location, media_type: impl Into<String>) -> Self {
        Self {
            width: 0,
            height: 0,
            media_type: media_type.into(),
            location,
        }
    }

    pub fn dimensions_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    #[must_use]
    pub fn with_dimensions(&self, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RegionSpec {
    #[default]
    Full,
    /// Centered square with the side of the shorter source dimension.
    Square,
    ByPixel { x: u32, y: u32, w: u32, h: u32 },
    ByPercent { x: f64, y: f64, w: f64, h: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SizeSpec {
    #[default]
    Full,
    ByPercent { pct: f64 },
    ByWidth { w: u32 },
    ByHeight { h: u32 },
    /// Forces the box, ignoring the aspect ratio.
    ByWidthHeightExact { w: u32, h: u32 },
    /// Keeps the aspect ratio and never exceeds either dimension.
    ByWidthHeightBestFit { w: u32, h: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MirrorSpec {
    #[default]
    None,
    Horizontal,
    Vertical,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarterTurn {
    Cw90,
    Cw180,
    Cw270,
}

impl QuarterTurn {
    pub fn degrees(self) -> u32 {
        match self {
            QuarterTurn::Cw90 => 90,
            QuarterTurn::Cw180 => 180,
            QuarterTurn::Cw270 => 270,
        }
    }
}

/// Clockwise rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RotationSpec {
    #[default]
    None,
    Right90Multiple(QuarterTurn),
    Arbitrary { degrees: f64 },
}

impl RotationSpec {
    /// Classifies a clockwise angle. Returns `None` outside of `[0, 360)`.
    pub fn from_degrees(degrees: f64) -> Option<Self> {
        if !degrees.is_finite() || !(0.0..360.0).contains(&degrees) {
            return None;
        }
        let spec = match degrees {
            d if d == 0.0 => RotationSpec::None,
            d if d == 90.0 => RotationSpec::Right90Multiple(QuarterTurn::Cw90),
            d if d == 180.0 => RotationSpec::Right90Multiple(QuarterTurn::Cw180),
            d if d == 270.0 => RotationSpec::Right90Multiple(QuarterTurn::Cw270),
            degrees => RotationSpec::Arbitrary { degrees },
        };
        Some(spec)
    }

    pub fn degrees(&self) -> f64 {
        match self {
            RotationSpec::None => 0.0,
            RotationSpec::Right90Multiple(turn) => turn.degrees() as f64,
            RotationSpec::Arbitrary { degrees } => *degrees,
        }
    }
}

#[derive(
    EnumString, IntoStaticStr, VariantArray, Debug, Clone, Copy, PartialEq, Eq, Default,
)]
#[strum(serialize_all = "lowercase")]
pub enum QualitySpec {
    #[default]
    Default,
    /// No-op: a single-image source has no separate color variant.
    Color,
    Gray,
    Bitonal,
}

/// Output format, named by its IIIF extension.
#[derive(
    EnumString,
    IntoStaticStr,
    VariantArray,
    Deserialize,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpg,
    Tif,
    Png,
    Gif,
    Jp2,
    Pdf,
    Webp,
}

impl OutputFormat {
    pub fn media_type(self) -> &'static str {
        match self {
            OutputFormat::Jpg => "image/jpeg",
            OutputFormat::Tif => "image/tiff",
            OutputFormat::Png => "image/png",
            OutputFormat::Gif => "image/gif",
            OutputFormat::Jp2 => "image/jp2",
            OutputFormat::Pdf => "application/pdf",
            OutputFormat::Webp => "image/webp",
        }
    }

    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let media_type = media_type.trim().to_ascii_lowercase();
        OutputFormat::VARIANTS
            .iter()
            .copied()
            .find(|format| format.media_type() == media_type)
    }

    pub fn extension(self) -> &'static str {
        self.into()
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.media_type())
    }
}

/// A fully parsed derivative request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageRequest {
    pub region: RegionSpec,
    pub size: SizeSpec,
    pub mirror: MirrorSpec,
    pub rotation: RotationSpec,
    pub quality: QualitySpec,
    pub format: OutputFormat,
}

impl Default for ImageRequest {
    fn default() -> Self {
        Self {
            region: RegionSpec::Full,
            size: SizeSpec::Full,
            mirror: MirrorSpec::None,
            rotation: RotationSpec::None,
            quality: QualitySpec::Default,
            format: OutputFormat::Jpg,
        }
    }
}
