use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbImage, RgbaImage};
use pic_scale_safe::{ImageSize, ResamplingFunction};

use crate::{backend_err, error::IiifError};

/// Catmull-Rom resampling through `image` itself.
pub fn resize_portable(canvas: RgbaImage, dst_width: u32, dst_height: u32) -> RgbaImage {
    if canvas.dimensions() == (dst_width, dst_height) {
        return canvas;
    }
    imageops::resize(&canvas, dst_width, dst_height, FilterType::CatmullRom)
}

/// Lanczos3 resampling through `pic-scale-safe`.
///
/// The canvas is fully opaque at this point of the pipeline, so only the color channels are
/// resampled and alpha comes back as opaque.
pub fn resize_lanczos(
    canvas: RgbaImage,
    dst_width: u32,
    dst_height: u32,
) -> Result<RgbaImage, IiifError> {
    if canvas.dimensions() == (dst_width, dst_height) {
        return Ok(canvas);
    }
    let src_size = ImageSize::new(canvas.width() as usize, canvas.height() as usize);
    let dst_size = ImageSize::new(dst_width as usize, dst_height as usize);
    let rgb = DynamicImage::ImageRgba8(canvas).into_rgb8();
    let resized = pic_scale_safe::resize_rgb8(
        rgb.as_raw(),
        src_size,
        dst_size,
        ResamplingFunction::Lanczos3,
    )
    .map_err(|e| backend_err!("resampling to {dst_width}x{dst_height} failed: {e:?}"))?;
    let resized = RgbImage::from_raw(dst_width, dst_height, resized)
        .ok_or_else(|| backend_err!("resampler returned a buffer of the wrong size"))?;
    Ok(DynamicImage::ImageRgb8(resized).into_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn checkerboard(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        })
    }

    #[test]
    fn both_resamplers_hit_the_target_size() {
        let portable = resize_portable(checkerboard(40, 30), 17, 9);
        assert_eq!(portable.dimensions(), (17, 9));
        let native = resize_lanczos(checkerboard(40, 30), 17, 9).unwrap();
        assert_eq!(native.dimensions(), (17, 9));
        let upscaled = resize_lanczos(checkerboard(4, 3), 40, 30).unwrap();
        assert_eq!(upscaled.dimensions(), (40, 30));
    }

    #[test]
    fn lanczos_output_is_opaque() {
        let resized = resize_lanczos(checkerboard(40, 30), 13, 7).unwrap();
        assert!(resized.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn same_size_is_untouched() {
        let canvas = checkerboard(8, 8);
        assert_eq!(resize_portable(canvas.clone(), 8, 8), canvas);
        assert_eq!(resize_lanczos(canvas.clone(), 8, 8).unwrap(), canvas);
    }
}
