#![no_main]

use std::num::NonZeroU8;
use std::path::Path;

use arbitrary::Unstructured;
use image::GenericImageView;
use libfuzzer_sys::fuzz_target;

use iiifmagick::backend::{select_backend, BackendContext};
use iiifmagick::coordinator::TransformCoordinator;
use iiifmagick::request::{
    ImageRequest, Location, OutputFormat, RotationSpec, SizeSpec, SourceDescriptor,
};

#[derive(Debug)]
struct StructuredImage {
    width: NonZeroU8,
    height: NonZeroU8,
    rgb_data: Vec<u8>,
}

impl StructuredImage {
    fn save_as_png(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        let (width, height) = (self.width.get() as u32, self.height.get() as u32);
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            let idx = (y * width + x) as usize * 3;
            image::Rgb([
                self.rgb_data[idx],
                self.rgb_data[idx + 1],
                self.rgb_data[idx + 2],
            ])
        });
        img.save(path)
    }
}

impl<'a> arbitrary::Arbitrary<'a> for StructuredImage {
    fn arbitrary(unstructured: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let width: NonZeroU8 = unstructured.arbitrary()?;
        let height: NonZeroU8 = unstructured.arbitrary()?;
        let rgb_data_len = width.get() as usize * height.get() as usize * 3;
        let rgb_data = unstructured.bytes(rgb_data_len)?;

        Ok(Self {
            width,
            height,
            rgb_data: rgb_data.to_vec(),
        })
    }
}

fuzz_target!(|input: (StructuredImage, NonZeroU8, NonZeroU8, u16, bool)| {
    let (image, new_width, new_height, degrees, native) = input;
    let new_width = new_width.get() as u32;
    let new_height = new_height.get() as u32;

    let temp_directory = tempfile::tempdir().expect("failed to create temporary directory");
    let input_path = temp_directory.path().join("input_image.png");
    image
        .save_as_png(&input_path)
        .expect("failed to save image as PNG");

    let backend = select_backend(
        if native { "native" } else { "portable" },
        &[],
        BackendContext::new(temp_directory.path()),
    )
    .expect("backend must be available");
    let coordinator = TransformCoordinator::new(backend);
    let source = SourceDescriptor::new(Location::Path(input_path), "image/png");
    let rotation = RotationSpec::from_degrees((degrees % 360) as f64).expect("within range");
    let request = ImageRequest {
        size: SizeSpec::ByWidthHeightExact {
            w: new_width,
            h: new_height,
        },
        rotation,
        format: OutputFormat::Png,
        ..ImageRequest::default()
    };

    let output = coordinator
        .transform(&source, &request)
        .expect("a valid request must render");
    let (width, height) = image::open(&output)
        .expect("could not open the derivative")
        .dimensions();
    if matches!(rotation, RotationSpec::None) {
        assert_eq!((width, height), (new_width, new_height));
    }
    assert!(width >= new_width.min(new_height) && height >= new_width.min(new_height));
});
