use image::imageops::{flip_horizontal_in_place, flip_vertical_in_place};
use image::RgbaImage;

use crate::request::MirrorSpec;

pub fn mirror(mut canvas: RgbaImage, mirror: MirrorSpec) -> RgbaImage {
    match mirror {
        MirrorSpec::None => {}
        MirrorSpec::Horizontal => flip_horizontal_in_place(&mut canvas),
        MirrorSpec::Vertical => flip_vertical_in_place(&mut canvas),
        MirrorSpec::Both => {
            flip_horizontal_in_place(&mut canvas);
            flip_vertical_in_place(&mut canvas);
        }
    };
    canvas
}
