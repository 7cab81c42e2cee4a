use image::{DynamicImage, RgbaImage};

pub fn grayscale(canvas: RgbaImage) -> DynamicImage {
    // image-rs desaturates with Rec. 709 luma coefficients and keeps the alpha channel:
    // https://github.com/image-rs/image/issues/598
    DynamicImage::ImageRgba8(canvas).grayscale()
}
