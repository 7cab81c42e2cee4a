//! Parser for the region parameter: `full`, `square`, `x,y,w,h` or `pct:x,y,w,h`.

use std::str::FromStr;

use crate::param_parse_err::ParamParseErr;
use crate::param_parsers::numbers::parse_list;
use crate::request::RegionSpec;

impl FromStr for RegionSpec {
    type Err = ParamParseErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(RegionSpec::Full),
            "square" => Ok(RegionSpec::Square),
            _ => {
                if let Some(percentages) = s.strip_prefix("pct:") {
                    let [x, y, w, h] = parse_list::<f64, 4>(percentages)
                        .ok_or_else(|| ParamParseErr::with_msg("expected pct:x,y,w,h"))?;
                    Ok(RegionSpec::ByPercent { x, y, w, h })
                } else {
                    let [x, y, w, h] =
                        parse_list::<u32, 4>(s).ok_or_else(|| ParamParseErr::with_msg("expected x,y,w,h"))?;
                    Ok(RegionSpec::ByPixel { x, y, w, h })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords() {
        assert_eq!("full".parse(), Ok(RegionSpec::Full));
        assert_eq!("square".parse(), Ok(RegionSpec::Square));
        assert!("Full".parse::<RegionSpec>().is_err());
    }

    #[test]
    fn pixels_and_percentages() {
        assert_eq!(
            "10,20,300,400".parse(),
            Ok(RegionSpec::ByPixel { x: 10, y: 20, w: 300, h: 400 })
        );
        assert_eq!(
            "pct:10,20.5,50,50".parse(),
            Ok(RegionSpec::ByPercent { x: 10.0, y: 20.5, w: 50.0, h: 50.0 })
        );
    }

    #[test]
    fn malformed() {
        for input in ["", "1,2,3", "1,2,3,4,5", "-1,0,10,10", "pct:1,2,3", "px:1,2,3,4"] {
            assert!(input.parse::<RegionSpec>().is_err(), "{input}");
        }
    }
}
