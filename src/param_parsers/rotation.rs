//! Parser for the rotation parameter: `[!]degrees`, where `!` mirrors before rotating.

use std::str::FromStr;

use crate::param_parse_err::ParamParseErr;
use crate::param_parsers::numbers::strip_and_parse_number;
use crate::request::{MirrorSpec, RotationSpec};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RotationParam {
    pub mirror: MirrorSpec,
    pub rotation: RotationSpec,
}

impl FromStr for RotationParam {
    type Err = ParamParseErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mirror, degrees) = match s.strip_prefix('!') {
            Some(rest) => (MirrorSpec::Horizontal, rest),
            None => (MirrorSpec::None, s),
        };
        let degrees: f64 = strip_and_parse_number(degrees)?;
        let rotation = RotationSpec::from_degrees(degrees)
            .ok_or_else(|| ParamParseErr::with_msg("degrees must be within [0, 360)"))?;
        Ok(RotationParam { mirror, rotation })
    }
}
