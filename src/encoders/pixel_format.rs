use std::borrow::Cow;

use image::{DynamicImage, ImageBuffer, Pixel};

/// Losslessly narrows the pixel format of a rendered derivative.
///
/// If the entire image is opaque, the alpha channel is removed.
/// If every pixel is neutral gray, the color channels collapse into one luma channel.
pub(crate) fn optimize_pixel_format(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    use DynamicImage::*;
    let transforms = match image {
        ImageLumaA8(pixels) => find_pixel_optimizations(pixels),
        ImageRgb8(pixels) => find_pixel_optimizations(pixels),
        ImageRgba8(pixels) => find_pixel_optimizations(pixels),
        _ => return Cow::Borrowed(image),
    };

    let has_color = image.color().has_color() && !transforms.grayscale;
    let has_alpha = image.color().has_alpha() && !transforms.strip_alpha;
    let converted = match (has_color, has_alpha) {
        (true, true) => ImageRgba8(image.to_rgba8()),
        (true, false) => ImageRgb8(image.to_rgb8()),
        (false, true) => ImageLumaA8(image.to_luma_alpha8()),
        (false, false) => ImageLuma8(image.to_luma8()),
    };
    if converted.color() == image.color() {
        Cow::Borrowed(image)
    } else {
        Cow::Owned(converted)
    }
}

/// Converts to Rgba8 or Rgb8, depending on whether any pixel is transparent.
pub(crate) fn to_8bit_rgb_maybe_a(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image {
        DynamicImage::ImageRgb8(_) => Cow::Borrowed(image),
        DynamicImage::ImageRgba8(pixels) if !is_opaque(pixels) => Cow::Borrowed(image),
        _ if image.color().has_alpha() && !is_opaque(&image.to_rgba8()) => {
            Cow::Owned(DynamicImage::ImageRgba8(image.to_rgba8()))
        }
        _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
    }
}

fn is_opaque<P: Pixel<Subpixel = u8>>(image: &ImageBuffer<P, Vec<u8>>) -> bool {
    !P::HAS_ALPHA || image.pixels().all(|p| can_remove_alpha(*p))
}

#[derive(Debug, Clone, Copy, Default)]
struct PixelFormatTransforms {
    strip_alpha: bool,
    grayscale: bool,
}

fn find_pixel_optimizations<P: Pixel<Subpixel = u8>>(
    image: &ImageBuffer<P, Vec<u8>>,
) -> PixelFormatTransforms {
    let mut strip_alpha = P::HAS_ALPHA;
    let mut grayscale = P::CHANNEL_COUNT >= 3;
    for pixel in image.pixels() {
        strip_alpha &= can_remove_alpha(*pixel);
        grayscale &= can_convert_to_grayscale(*pixel);
        if !strip_alpha && !grayscale {
            break;
        }
    }
    PixelFormatTransforms {
        strip_alpha,
        grayscale,
    }
}

#[inline]
fn can_remove_alpha<P: Pixel<Subpixel = u8>>(pixel: P) -> bool {
    if P::HAS_ALPHA {
        pixel.channels()[P::CHANNEL_COUNT as usize - 1] == u8::MAX
    } else {
        true
    }
}

#[inline]
fn can_convert_to_grayscale<P: Pixel<Subpixel = u8>>(pixel: P) -> bool {
    if P::CHANNEL_COUNT < 3 {
        false // already grayscale
    } else {
        let c = pixel.channels();
        (c[0] == c[1]) & (c[0] == c[2])
    }
}
