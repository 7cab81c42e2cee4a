#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use iiifmagick::plan::plan;
use iiifmagick::request::{Location, RegionSpec, SizeSpec, SourceDescriptor};

#[derive(Debug, Arbitrary)]
enum Region {
    Full,
    Square,
    ByPixel(u32, u32, u32, u32),
    ByPercent(f64, f64, f64, f64),
}

#[derive(Debug, Arbitrary)]
enum Size {
    Full,
    ByPercent(f64),
    ByWidth(u32),
    ByHeight(u32),
    Exact(u32, u32),
    BestFit(u32, u32),
}

fuzz_target!(|input: (u32, u32, Region, Size)| {
    let (width, height, region, size) = input;
    if width == 0 || height == 0 {
        return;
    }
    let source = SourceDescriptor::new(Location::Path("fuzz.png".into()), "image/png")
        .with_dimensions(width, height);
    let region = match region {
        Region::Full => RegionSpec::Full,
        Region::Square => RegionSpec::Square,
        Region::ByPixel(x, y, w, h) => RegionSpec::ByPixel { x, y, w, h },
        Region::ByPercent(x, y, w, h) => RegionSpec::ByPercent { x, y, w, h },
    };
    let size = match size {
        Size::Full => SizeSpec::Full,
        Size::ByPercent(pct) => SizeSpec::ByPercent { pct },
        Size::ByWidth(w) => SizeSpec::ByWidth { w },
        Size::ByHeight(h) => SizeSpec::ByHeight { h },
        Size::Exact(w, h) => SizeSpec::ByWidthHeightExact { w, h },
        Size::BestFit(w, h) => SizeSpec::ByWidthHeightBestFit { w, h },
    };

    // rejection is fine, panics and out-of-bounds plans are not
    let Ok(plan) = plan(&source, &region, &size) else {
        return;
    };
    assert!(plan.src_w > 0 && plan.src_h > 0, "{plan:?}");
    assert!(plan.src_x < width && plan.src_y < height, "{plan:?}");
    assert!(plan.src_w <= width - plan.src_x, "{plan:?}");
    assert!(plan.src_h <= height - plan.src_y, "{plan:?}");
    assert!(plan.dst_w > 0 && plan.dst_h > 0, "{plan:?}");
    if let SizeSpec::ByWidthHeightBestFit { w, h } = size {
        assert!(plan.dst_w <= w && plan.dst_h <= h, "{plan:?}");
    }
});
