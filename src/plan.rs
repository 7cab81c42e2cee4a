//! Translation of a region and a size into concrete pixel operations.
//!
//! Everything here is plain arithmetic over the source dimensions: no I/O happens and
//! no pixel buffer exists yet, so a rejected request costs nothing.

use crate::error::IiifError;
use crate::request::{RegionSpec, SizeSpec, SourceDescriptor};

/// Pixel extraction plan for a single request.
///
/// `src_*` are in source pixels and always lie inside the source image;
/// `dst_*` are the dimensions of the output canvas before rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionPlan {
    pub src_x: u32,
    pub src_y: u32,
    pub src_w: u32,
    pub src_h: u32,
    pub dst_w: u32,
    pub dst_h: u32,
}

impl ExtractionPlan {
    /// Whether the crop covers the whole source.
    pub fn is_full_region(&self, source: &SourceDescriptor) -> bool {
        self.src_x == 0
            && self.src_y == 0
            && self.src_w == source.width
            && self.src_h == source.height
    }

    pub fn is_resampled(&self) -> bool {
        self.src_w != self.dst_w || self.src_h != self.dst_h
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Rect {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

/// Largest output canvas accepted by default, in pixels. At 4 bytes per pixel that is 400 MB.
pub const DEFAULT_MAX_AREA: u64 = 100_000_000;

/// Plans a request, capping the output at [`DEFAULT_MAX_AREA`].
pub fn plan(
    source: &SourceDescriptor,
    region: &RegionSpec,
    size: &SizeSpec,
) -> Result<ExtractionPlan, IiifError> {
    plan_with_max_area(source, region, size, DEFAULT_MAX_AREA)
}

/// Like [`plan`], but rejects any output canvas larger than `max_area` pixels.
pub fn plan_with_max_area(
    source: &SourceDescriptor,
    region: &RegionSpec,
    size: &SizeSpec,
    max_area: u64,
) -> Result<ExtractionPlan, IiifError> {
    let rect = resolve_region(source.width, source.height, region)?;
    let (dst_w, dst_h) = resolve_size(rect.w, rect.h, size)?;
    check_area(dst_w, dst_h, max_area)?;
    Ok(ExtractionPlan {
        src_x: rect.x,
        src_y: rect.y,
        src_w: rect.w,
        src_h: rect.h,
        dst_w,
        dst_h,
    })
}

fn resolve_region(width: u32, height: u32, region: &RegionSpec) -> Result<Rect, IiifError> {
    let rect = match *region {
        RegionSpec::Full => Rect {
            x: 0,
            y: 0,
            w: width,
            h: height,
        },
        RegionSpec::Square => {
            let side = width.min(height);
            Rect {
                x: (width - side) / 2,
                y: (height - side) / 2,
                w: side,
                h: side,
            }
        }
        RegionSpec::ByPixel { x, y, w, h } => {
            if x >= width || y >= height {
                return Err(IiifError::InvalidRegion(format!(
                    "offset {x},{y} lies outside of the {width}x{height} source"
                )));
            }
            Rect {
                x,
                y,
                w: w.min(width - x),
                h: h.min(height - y),
            }
        }
        RegionSpec::ByPercent { x, y, w, h } => {
            if ![x, y, w, h].iter().all(|v| v.is_finite() && *v >= 0.0) {
                return Err(IiifError::InvalidRegion(
                    "percentages must be finite and non-negative".to_string(),
                ));
            }
            if x >= 100.0 || y >= 100.0 {
                return Err(IiifError::InvalidRegion(format!(
                    "percent offset {x},{y} starts outside of the source"
                )));
            }
            let (px, pw) = percent_span(width, x, w);
            let (py, ph) = percent_span(height, y, h);
            Rect {
                x: px,
                y: py,
                w: pw,
                h: ph,
            }
        }
    };

    let inside = rect.x < width
        && rect.y < height
        && rect.w > 0
        && rect.h > 0
        && rect.w <= width - rect.x
        && rect.h <= height - rect.y;
    if !inside {
        return Err(IiifError::InvalidRegion(format!(
            "{},{},{},{} does not select any pixels of the {width}x{height} source",
            rect.x, rect.y, rect.w, rect.h
        )));
    }
    Ok(rect)
}

/// Converts one axis of a percent region into an offset and a length in pixels.
fn percent_span(extent: u32, offset_pct: f64, length_pct: f64) -> (u32, u32) {
    let extent_f = extent as f64;
    let offset = ((extent_f * offset_pct / 100.0) as u32).min(extent);
    let remaining = extent - offset;
    let length = if offset_pct + length_pct <= 100.0 {
        ((extent_f * length_pct / 100.0) as u32).min(remaining)
    } else {
        remaining
    };
    (offset, length)
}

fn resolve_size(src_w: u32, src_h: u32, size: &SizeSpec) -> Result<(u32, u32), IiifError> {
    let (dst_w, dst_h) = match *size {
        SizeSpec::Full => (src_w, src_h),
        SizeSpec::ByPercent { pct } => {
            if !pct.is_finite() || pct < 0.0 {
                return Err(IiifError::InvalidSize(format!(
                    "percentage {pct} is not a valid scale"
                )));
            }
            (scale_pct(src_w, pct)?, scale_pct(src_h, pct)?)
        }
        SizeSpec::ByWidthHeightExact { w, h } => (w, h),
        SizeSpec::ByWidth { w } => (w, proportional(w, src_h, src_w)?),
        SizeSpec::ByHeight { h } => (proportional(h, src_w, src_h)?, h),
        SizeSpec::ByWidthHeightBestFit { w, h } => {
            // width-driven fit wins unless it overflows the height bound
            let w = w.min(src_w);
            let h = h.min(src_h);
            let candidate_h = proportional(w, src_h, src_w)?;
            if candidate_h > h {
                (proportional(h, src_w, src_h)?, h)
            } else {
                (w, candidate_h)
            }
        }
    };

    if dst_w == 0 || dst_h == 0 {
        return Err(IiifError::InvalidSize(format!(
            "{size:?} resolves to an empty {dst_w}x{dst_h} image"
        )));
    }
    Ok((dst_w, dst_h))
}

/// Fails with `InvalidSize` when a `width`x`height` canvas exceeds `max_area` pixels.
pub fn check_area(width: u32, height: u32, max_area: u64) -> Result<(), IiifError> {
    let area = width as u64 * height as u64;
    if area > max_area {
        return Err(IiifError::InvalidSize(format!(
            "{width}x{height} exceeds the limit of {max_area} pixels"
        )));
    }
    Ok(())
}

fn scale_pct(extent: u32, pct: f64) -> Result<u32, IiifError> {
    let scaled = (extent as f64 * pct / 100.0).trunc();
    if scaled > u32::MAX as f64 {
        return Err(IiifError::InvalidSize(format!("{pct}% is too large")));
    }
    Ok(scaled as u32)
}

/// `value * numerator / denominator` in integer arithmetic, truncating.
fn proportional(value: u32, numerator: u32, denominator: u32) -> Result<u32, IiifError> {
    let scaled = value as u64 * numerator as u64 / denominator as u64;
    u32::try_from(scaled)
        .map_err(|_| IiifError::InvalidSize(format!("{value} scales beyond {}", u32::MAX)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Location;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    fn source(width: u32, height: u32) -> SourceDescriptor {
        SourceDescriptor::new(Location::Path("source.png".into()), "image/png")
            .with_dimensions(width, height)
    }

    fn plan_of(width: u32, height: u32, region: RegionSpec, size: SizeSpec) -> ExtractionPlan {
        plan(&source(width, height), &region, &size).unwrap()
    }

    #[test]
    fn full_region_full_size() {
        let plan = plan_of(400, 300, RegionSpec::Full, SizeSpec::Full);
        assert_eq!(
            plan,
            ExtractionPlan {
                src_x: 0,
                src_y: 0,
                src_w: 400,
                src_h: 300,
                dst_w: 400,
                dst_h: 300
            }
        );
        assert!(plan.is_full_region(&source(400, 300)));
        assert!(!plan.is_resampled());
    }

    #[test]
    fn pixel_region_is_clamped_to_source() {
        let region = RegionSpec::ByPixel {
            x: 350,
            y: 250,
            w: 100,
            h: 100,
        };
        let plan = plan_of(400, 300, region, SizeSpec::Full);
        assert_eq!((plan.src_x, plan.src_y), (350, 250));
        assert_eq!((plan.src_w, plan.src_h), (50, 50));
    }

    #[test]
    fn pixel_region_outside_is_rejected() {
        let region = RegionSpec::ByPixel {
            x: 500,
            y: 0,
            w: 10,
            h: 10,
        };
        let result = plan(&source(400, 400), &region, &SizeSpec::Full);
        assert!(matches!(result, Err(IiifError::InvalidRegion(_))));

        let region = RegionSpec::ByPixel {
            x: 0,
            y: 400,
            w: 10,
            h: 10,
        };
        let result = plan(&source(400, 400), &region, &SizeSpec::Full);
        assert!(matches!(result, Err(IiifError::InvalidRegion(_))));
    }

    #[test]
    fn zero_sized_pixel_region_is_rejected() {
        let region = RegionSpec::ByPixel {
            x: 10,
            y: 10,
            w: 0,
            h: 10,
        };
        let result = plan(&source(400, 400), &region, &SizeSpec::Full);
        assert!(matches!(result, Err(IiifError::InvalidRegion(_))));
    }

    #[test]
    fn percent_region() {
        let region = RegionSpec::ByPercent {
            x: 10.0,
            y: 20.0,
            w: 50.0,
            h: 50.0,
        };
        let plan = plan_of(200, 100, region, SizeSpec::Full);
        assert_eq!(
            (plan.src_x, plan.src_y, plan.src_w, plan.src_h),
            (20, 20, 100, 50)
        );
    }

    #[test]
    fn percent_region_overflow_is_clamped() {
        let region = RegionSpec::ByPercent {
            x: 75.0,
            y: 50.0,
            w: 50.0,
            h: 90.0,
        };
        let plan = plan_of(200, 100, region, SizeSpec::Full);
        assert_eq!(
            (plan.src_x, plan.src_y, plan.src_w, plan.src_h),
            (150, 50, 50, 50)
        );
    }

    #[test]
    fn percent_offset_of_hundred_is_rejected() {
        let region = RegionSpec::ByPercent {
            x: 100.0,
            y: 0.0,
            w: 10.0,
            h: 10.0,
        };
        let result = plan(&source(200, 100), &region, &SizeSpec::Full);
        assert!(matches!(result, Err(IiifError::InvalidRegion(_))));

        let region = RegionSpec::ByPercent {
            x: 0.0,
            y: -5.0,
            w: 10.0,
            h: 10.0,
        };
        let result = plan(&source(200, 100), &region, &SizeSpec::Full);
        assert!(matches!(result, Err(IiifError::InvalidRegion(_))));
    }

    #[test]
    fn tiny_percent_region_is_rejected() {
        let region = RegionSpec::ByPercent {
            x: 0.0,
            y: 0.0,
            w: 0.1,
            h: 50.0,
        };
        let result = plan(&source(200, 100), &region, &SizeSpec::Full);
        assert!(matches!(result, Err(IiifError::InvalidRegion(_))));
    }

    #[test]
    fn square_region_is_centered() {
        let plan = plan_of(300, 100, RegionSpec::Square, SizeSpec::Full);
        assert_eq!(
            (plan.src_x, plan.src_y, plan.src_w, plan.src_h),
            (100, 0, 100, 100)
        );
        let plan = plan_of(100, 301, RegionSpec::Square, SizeSpec::Full);
        assert_eq!(
            (plan.src_x, plan.src_y, plan.src_w, plan.src_h),
            (0, 100, 100, 100)
        );
    }

    #[test]
    fn sizes_apply_to_the_region_not_the_source() {
        let region = RegionSpec::ByPixel {
            x: 0,
            y: 0,
            w: 200,
            h: 100,
        };
        let plan = plan_of(1000, 1000, region, SizeSpec::ByWidth { w: 50 });
        assert_eq!((plan.dst_w, plan.dst_h), (50, 25));
    }

    #[test]
    fn size_variants() {
        let full = RegionSpec::Full;
        let sized = |size| {
            let plan = plan_of(400, 300, full, size);
            (plan.dst_w, plan.dst_h)
        };
        assert_eq!(sized(SizeSpec::ByPercent { pct: 50.0 }), (200, 150));
        assert_eq!(sized(SizeSpec::ByPercent { pct: 150.0 }), (600, 450));
        assert_eq!(sized(SizeSpec::ByWidth { w: 200 }), (200, 150));
        assert_eq!(sized(SizeSpec::ByHeight { h: 100 }), (133, 100));
        assert_eq!(
            sized(SizeSpec::ByWidthHeightExact { w: 50, h: 50 }),
            (50, 50)
        );
    }

    #[test]
    fn best_fit_prefers_width() {
        let plan = plan_of(
            400,
            300,
            RegionSpec::Full,
            SizeSpec::ByWidthHeightBestFit { w: 200, h: 200 },
        );
        assert_eq!((plan.dst_w, plan.dst_h), (200, 150));
    }

    #[test]
    fn best_fit_falls_back_to_height() {
        let plan = plan_of(
            300,
            400,
            RegionSpec::Full,
            SizeSpec::ByWidthHeightBestFit { w: 200, h: 200 },
        );
        assert_eq!((plan.dst_w, plan.dst_h), (150, 200));
    }

    #[test]
    fn best_fit_never_upscales() {
        let plan = plan_of(
            40,
            30,
            RegionSpec::Full,
            SizeSpec::ByWidthHeightBestFit { w: 400, h: 400 },
        );
        assert_eq!((plan.dst_w, plan.dst_h), (40, 30));
    }

    #[test]
    fn zero_sized_output_is_rejected() {
        let result = plan(&source(1000, 10), &RegionSpec::Full, &SizeSpec::ByWidth { w: 50 });
        assert!(matches!(result, Err(IiifError::InvalidSize(_))));

        let result = plan(
            &source(100, 100),
            &RegionSpec::Full,
            &SizeSpec::ByPercent { pct: 0.5 },
        );
        assert!(matches!(result, Err(IiifError::InvalidSize(_))));

        let result = plan(
            &source(100, 100),
            &RegionSpec::Full,
            &SizeSpec::ByWidthHeightExact { w: 0, h: 10 },
        );
        assert!(matches!(result, Err(IiifError::InvalidSize(_))));
    }

    #[test]
    fn oversized_output_is_rejected() {
        let tiny = source(4, 4);
        let huge = SizeSpec::ByWidthHeightExact {
            w: u32::MAX,
            h: u32::MAX,
        };
        let result = plan(&tiny, &RegionSpec::Full, &huge);
        assert!(matches!(result, Err(IiifError::InvalidSize(_))));

        let result = plan(&tiny, &RegionSpec::Full, &SizeSpec::ByWidth { w: u32::MAX });
        assert!(matches!(result, Err(IiifError::InvalidSize(_))));

        let result = plan(&tiny, &RegionSpec::Full, &SizeSpec::ByPercent { pct: 1e9 });
        assert!(matches!(result, Err(IiifError::InvalidSize(_))));
    }

    #[test]
    fn max_area_is_inclusive() {
        let exact = SizeSpec::ByWidthHeightExact { w: 100, h: 50 };
        let result = plan_with_max_area(&source(10, 10), &RegionSpec::Full, &exact, 5000);
        assert_eq!(result.unwrap().dst_w, 100);
        let result = plan_with_max_area(&source(10, 10), &RegionSpec::Full, &exact, 4999);
        assert!(matches!(result, Err(IiifError::InvalidSize(_))));
    }

    #[test]
    fn unknown_dimensions_reject_every_region() {
        let unknown = SourceDescriptor::new(Location::Path("a.png".into()), "image/png");
        let result = plan(&unknown, &RegionSpec::Full, &SizeSpec::Full);
        assert!(matches!(result, Err(IiifError::InvalidRegion(_))));
    }

    #[quickcheck]
    fn pixel_region_stays_inside(width: u16, height: u16, x: u16, y: u16, w: u16, h: u16) -> TestResult {
        let (width, height) = (width as u32, height as u32);
        let (x, y) = (x as u32, y as u32);
        if x >= width || y >= height || w == 0 || h == 0 {
            return TestResult::discard();
        }
        let region = RegionSpec::ByPixel {
            x,
            y,
            w: w as u32,
            h: h as u32,
        };
        let plan = plan_with_max_area(&source(width, height), &region, &SizeSpec::Full, u64::MAX)
            .unwrap();
        TestResult::from_bool(plan.src_w <= width - x && plan.src_h <= height - y)
    }

    #[quickcheck]
    fn percent_region_stays_inside(width: u16, height: u16, x: u8, y: u8, w: u8, h: u8) -> TestResult {
        let (width, height) = (width as u32 + 1, height as u32 + 1);
        let region = RegionSpec::ByPercent {
            x: (x % 100) as f64 * 0.99,
            y: (y % 100) as f64 * 0.99,
            w: w as f64 * 0.7,
            h: h as f64 * 0.7,
        };
        match plan_with_max_area(&source(width, height), &region, &SizeSpec::Full, u64::MAX) {
            Ok(plan) => TestResult::from_bool(
                plan.src_x < width
                    && plan.src_y < height
                    && plan.src_x + plan.src_w <= width
                    && plan.src_y + plan.src_h <= height,
            ),
            Err(IiifError::InvalidRegion(_)) => TestResult::passed(),
            Err(_) => TestResult::failed(),
        }
    }

    #[quickcheck]
    fn best_fit_stays_in_the_box(width: u16, height: u16, w: u16, h: u16) -> TestResult {
        if width == 0 || height == 0 {
            return TestResult::discard();
        }
        let size = SizeSpec::ByWidthHeightBestFit {
            w: w as u32,
            h: h as u32,
        };
        match plan(
            &source(width as u32, height as u32),
            &RegionSpec::Full,
            &size,
        ) {
            Ok(plan) => TestResult::from_bool(plan.dst_w <= w as u32 && plan.dst_h <= h as u32),
            Err(IiifError::InvalidSize(_)) => TestResult::passed(),
            Err(_) => TestResult::failed(),
        }
    }
}
