//! Image rotation operations.
//!
//! Quarter turns are exact pixel permutations. Everything else resamples onto a canvas grown to
//! the rotated bounding box, leaving the exposed corners transparent.

use image::imageops;
use image::{Rgba, RgbaImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

use crate::request::QuarterTurn;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Keeps exact multiples of 90 degrees from growing the canvas through rounding noise.
const BOUNDS_EPSILON: f64 = 1e-6;

pub fn rotate_quarter(mut canvas: RgbaImage, turn: QuarterTurn) -> RgbaImage {
    match turn {
        QuarterTurn::Cw90 => imageops::rotate90(&canvas),
        QuarterTurn::Cw180 => {
            imageops::rotate180_in_place(&mut canvas);
            canvas
        }
        QuarterTurn::Cw270 => imageops::rotate270(&canvas),
    }
}

/// Size of the smallest canvas that holds a `width`x`height` image rotated by `degrees`.
pub fn rotated_bounds(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let (width, height) = (width as f64, height as f64);
    let bound = |extent: f64| (extent - BOUNDS_EPSILON).ceil().max(1.0) as u32;
    (
        bound(width * cos + height * sin),
        bound(width * sin + height * cos),
    )
}

/// Rotates counter-clockwise by `degrees`, the mathematical convention.
///
/// Bilinear sampling on premultiplied alpha; whatever falls outside of the source is transparent.
pub fn rotate_counterclockwise(canvas: &RgbaImage, degrees: f64) -> RgbaImage {
    let (width, height) = canvas.dimensions();
    let (dst_width, dst_height) = rotated_bounds(width, height, degrees);
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (src_cx, src_cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let (dst_cx, dst_cy) = (dst_width as f64 / 2.0, dst_height as f64 / 2.0);

    RgbaImage::from_fn(dst_width, dst_height, |x, y| {
        let rx = x as f64 + 0.5 - dst_cx;
        let ry = y as f64 + 0.5 - dst_cy;
        // inverse of x' = x cos + y sin, y' = -x sin + y cos (y axis points down)
        let sx = rx * cos - ry * sin + src_cx - 0.5;
        let sy = rx * sin + ry * cos + src_cy - 0.5;
        sample_bilinear(canvas, sx, sy)
    })
}

fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (x - x0, y - y0);
    let (x0, y0) = (x0 as i64, y0 as i64);
    let (width, height) = (image.width() as i64, image.height() as i64);

    let taps = [
        (0, 0, (1.0 - fx) * (1.0 - fy)),
        (1, 0, fx * (1.0 - fy)),
        (0, 1, (1.0 - fx) * fy),
        (1, 1, fx * fy),
    ];
    let mut acc = [0.0f64; 4];
    for (dx, dy, weight) in taps {
        let (px, py) = (x0 + dx, y0 + dy);
        if weight <= 0.0 || px < 0 || py < 0 || px >= width || py >= height {
            continue;
        }
        let pixel = image.get_pixel(px as u32, py as u32);
        let alpha = pixel[3] as f64 * weight;
        for c in 0..3 {
            acc[c] += pixel[c] as f64 * alpha;
        }
        acc[3] += alpha;
    }

    if acc[3] <= 0.0 {
        return TRANSPARENT;
    }
    let channel = |value: f64| value.round().clamp(0.0, 255.0) as u8;
    Rgba([
        channel(acc[0] / acc[3]),
        channel(acc[1] / acc[3]),
        channel(acc[2] / acc[3]),
        channel(acc[3]),
    ])
}

/// Rotates clockwise by `degrees` with `imageproc`, whose rotation is natively clockwise.
pub fn rotate_clockwise_imageproc(canvas: &RgbaImage, degrees: f64) -> RgbaImage {
    let (width, height) = canvas.dimensions();
    let (dst_width, dst_height) = rotated_bounds(width, height, degrees);

    // imageproc rotates within the input bounds, so pad to the rotated size first
    let canvas_width = dst_width.max(width);
    let canvas_height = dst_height.max(height);
    let mut padded = RgbaImage::from_pixel(canvas_width, canvas_height, TRANSPARENT);
    imageops::replace(
        &mut padded,
        canvas,
        (canvas_width - width) as i64 / 2,
        (canvas_height - height) as i64 / 2,
    );

    // imageproc blends straight alpha against the transparent-black fill, which darkens the edges
    premultiply(&mut padded);
    let mut rotated = rotate_about_center(
        &padded,
        degrees.to_radians() as f32,
        Interpolation::Bilinear,
        TRANSPARENT,
    );
    unpremultiply(&mut rotated);

    imageops::crop_imm(
        &rotated,
        (canvas_width - dst_width) / 2,
        (canvas_height - dst_height) / 2,
        dst_width,
        dst_height,
    )
    .to_image()
}

fn premultiply(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let alpha = pixel[3] as u32;
        for c in 0..3 {
            pixel[c] = ((pixel[c] as u32 * alpha + 127) / 255) as u8;
        }
    }
}

fn unpremultiply(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let alpha = pixel[3] as u32;
        if alpha == 0 || alpha == 255 {
            continue;
        }
        for c in 0..3 {
            pixel[c] = ((pixel[c] as u32 * 255 + alpha / 2) / alpha).min(255) as u8;
        }
    }
}
