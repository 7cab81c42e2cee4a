use image::{DynamicImage, LumaA, RgbaImage};

use super::grayscale::grayscale;

/// Fraction of the maximum channel value at or below which a pixel turns black.
pub const BITONAL_CUTOFF: f32 = 0.77;

const BACKGROUND: u8 = u8::MAX;
const FOREGROUND: u8 = 0;

pub fn bitonal(canvas: RgbaImage) -> DynamicImage {
    let cutoff = BITONAL_CUTOFF * u8::MAX as f32;
    let mut gray = grayscale(canvas).into_luma_alpha8();
    for pixel in gray.pixels_mut() {
        let LumaA([luma, alpha]) = *pixel;
        let value = if luma as f32 > cutoff {
            BACKGROUND
        } else {
            FOREGROUND
        };
        *pixel = LumaA([value, alpha]);
    }
    DynamicImage::ImageLumaA8(gray)
}
