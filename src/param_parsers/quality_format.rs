//! Parser for the trailing `quality.format` segment, e.g. `default.jpg`.

use std::str::FromStr;

use crate::param_parse_err::ParamParseErr;
use crate::request::{OutputFormat, QualitySpec};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QualityFormat {
    pub quality: QualitySpec,
    pub format: OutputFormat,
}

impl FromStr for QualityFormat {
    type Err = ParamParseErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (quality, format) = s
            .rsplit_once('.')
            .ok_or_else(|| ParamParseErr::with_msg("expected quality.format"))?;
        let quality = QualitySpec::from_str(quality)
            .map_err(|_| ParamParseErr::with_msg(format!("unknown quality `{quality}'")))?;
        let format = OutputFormat::from_str(format)
            .map_err(|_| ParamParseErr::with_msg(format!("unknown format `{format}'")))?;
        Ok(QualityFormat { quality, format })
    }
}
