//! Scale factors and the tile description handed to pyramid-aware viewers.

use serde::Serialize;

/// Power-of-two downsampling levels for a pyramid of `tile_size` tiles.
///
/// Returns an empty list when the image is not worth tiling: it fits into a single tile,
/// or fewer than two levels come out.
pub fn scale_factors(width: u32, height: u32, tile_size: u32) -> Vec<u32> {
    if tile_size == 0 {
        return Vec::new();
    }
    let total = width.max(height).div_ceil(tile_size) as u64;
    if total <= 1 {
        return Vec::new();
    }

    let mut factors = Vec::new();
    let mut factor: u64 = 1;
    // keep going while the previous factor has not exceeded the tile count
    while factor / 2 <= total {
        let Ok(level) = u32::try_from(factor) else {
            break;
        };
        factors.push(level);
        factor *= 2;
    }

    if factors.len() < 2 {
        return Vec::new();
    }
    factors
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLevel {
    pub width: u32,
    pub scale_factors: Vec<u32>,
}

/// `{ width, height, tiles: [{ width, scaleFactors }] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileDescription {
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tiles: Vec<TileLevel>,
}

impl TileDescription {
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        let factors = scale_factors(width, height, tile_size);
        let tiles = if factors.is_empty() {
            Vec::new()
        } else {
            vec![TileLevel {
                width: tile_size,
                scale_factors: factors,
            }]
        };
        Self {
            width,
            height,
            tiles,
        }
    }

    pub fn is_tiled(&self) -> bool {
        !self.tiles.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
