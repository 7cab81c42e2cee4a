//! Parser for the size parameter: `full`, `max`, `pct:n`, `w,`, `,h`, `w,h` or `!w,h`.
//!
//! Zero sizes are syntactically fine here and get rejected by the planner.

use std::str::FromStr;

use crate::param_parse_err::ParamParseErr;
use crate::param_parsers::numbers::{parse_list, strip_and_parse_number};
use crate::request::SizeSpec;

impl FromStr for SizeSpec {
    type Err = ParamParseErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "full" || s == "max" {
            return Ok(SizeSpec::Full);
        }
        if let Some(pct) = s.strip_prefix("pct:") {
            let pct: f64 = strip_and_parse_number(pct)?;
            return Ok(SizeSpec::ByPercent { pct });
        }
        if let Some(best_fit) = s.strip_prefix('!') {
            let [w, h] = parse_list::<u32, 2>(best_fit)
                .ok_or_else(|| ParamParseErr::with_msg("expected !w,h"))?;
            return Ok(SizeSpec::ByWidthHeightBestFit { w, h });
        }

        let (w, h) = s
            .split_once(',')
            .ok_or_else(|| ParamParseErr::with_msg("expected w, or ,h or w,h"))?;
        match (w.is_empty(), h.is_empty()) {
            (false, true) => Ok(SizeSpec::ByWidth {
                w: strip_and_parse_number(w)?,
            }),
            (true, false) => Ok(SizeSpec::ByHeight {
                h: strip_and_parse_number(h)?,
            }),
            (false, false) => Ok(SizeSpec::ByWidthHeightExact {
                w: strip_and_parse_number(w)?,
                h: strip_and_parse_number(h)?,
            }),
            (true, true) => Err(ParamParseErr::with_msg("width or height is required")),
        }
    }
}
