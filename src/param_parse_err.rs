use std::fmt::Display;
use std::num::{ParseFloatError, ParseIntError};

/// Error reporting for IIIF path parameters.
/// Use `.display_with_param()` to properly present this error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamParseErr {
    pub message: Option<String>,
}

impl ParamParseErr {
    pub fn display_with_param(&self, param_name: &str, value: &str) -> String {
        // a specific message wins, otherwise simply echo the value the caller passed
        let message = if let Some(msg) = &self.message {
            msg.as_str()
        } else {
            value
        };

        format!("invalid {param_name} parameter `{value}': {message}")
    }

    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_msg(str: impl ToString) -> Self {
        Self {
            message: Some(str.to_string()),
        }
    }
}

impl Display for ParamParseErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message.as_deref().unwrap_or("malformed parameter"))
    }
}

impl std::error::Error for ParamParseErr {}

impl From<ParseFloatError> for ParamParseErr {
    fn from(_value: ParseFloatError) -> Self {
        Self::new()
    }
}

impl From<ParseIntError> for ParamParseErr {
    fn from(_value: ParseIntError) -> Self {
        Self::new()
    }
}
