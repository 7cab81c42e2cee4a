use image::{DynamicImage, GenericImageView, RgbaImage};

use crate::{backend_err, error::IiifError, plan::ExtractionPlan};

/// Cuts the planned region out of the decoded source and flattens it onto opaque black.
///
/// Fails instead of panicking when the decoded image is smaller than the plan assumed,
/// which happens when the caller supplied wrong dimensions.
pub fn crop_onto_black(image: &DynamicImage, plan: &ExtractionPlan) -> Result<RgbaImage, IiifError> {
    let (width, height) = image.dimensions();
    let fits = plan.src_x as u64 + plan.src_w as u64 <= width as u64
        && plan.src_y as u64 + plan.src_h as u64 <= height as u64;
    if !fits {
        return Err(backend_err!(
            "region {}x{}+{}+{} exceeds the decoded {width}x{height} image",
            plan.src_w,
            plan.src_h,
            plan.src_x,
            plan.src_y
        ));
    }

    let mut canvas = image
        .crop_imm(plan.src_x, plan.src_y, plan.src_w, plan.src_h)
        .to_rgba8();
    for pixel in canvas.pixels_mut() {
        let alpha = pixel[3] as u32;
        if alpha == 255 {
            continue;
        }
        for channel in &mut pixel.0[..3] {
            *channel = ((*channel as u32 * alpha + 127) / 255) as u8;
        }
        pixel[3] = 255;
    }
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn plan(x: u32, y: u32, w: u32, h: u32) -> ExtractionPlan {
        ExtractionPlan {
            src_x: x,
            src_y: y,
            src_w: w,
            src_h: h,
            dst_w: w,
            dst_h: h,
        }
    }

    #[test]
    fn crops_the_requested_window() {
        let source = RgbaImage::from_fn(10, 10, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let cropped = crop_onto_black(&DynamicImage::ImageRgba8(source), &plan(2, 3, 4, 5)).unwrap();
        assert_eq!(cropped.dimensions(), (4, 5));
        assert_eq!(cropped.get_pixel(0, 0), &Rgba([2, 3, 0, 255]));
        assert_eq!(cropped.get_pixel(3, 4), &Rgba([5, 7, 0, 255]));
    }

    #[test]
    fn transparency_becomes_black() {
        let mut source = RgbaImage::from_pixel(2, 1, Rgba([200, 100, 50, 0]));
        source.put_pixel(1, 0, Rgba([200, 100, 50, 128]));
        let cropped = crop_onto_black(&DynamicImage::ImageRgba8(source), &plan(0, 0, 2, 1)).unwrap();
        assert_eq!(cropped.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(cropped.get_pixel(1, 0), &Rgba([100, 50, 25, 255]));
    }

    #[test]
    fn oversized_plan_is_an_error() {
        let source = DynamicImage::new_rgb8(10, 10);
        let result = crop_onto_black(&source, &plan(5, 5, 6, 5));
        assert!(matches!(result, Err(IiifError::BackendExecution(_))));
    }
}
