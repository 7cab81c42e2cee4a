use std::io;

use thiserror::Error;

/// Every way a derivative request can be rejected.
///
/// None of these are fatal to the process: they travel back through
/// [`TransformCoordinator`](crate::coordinator::TransformCoordinator) to the caller,
/// which decides how to present them.
#[derive(Debug, Error)]
pub enum IiifError {
    /// The region resolves to an empty or out-of-bounds extraction.
    #[error("invalid region: {0}")]
    InvalidRegion(String),

    /// The size resolves to a zero-sized output.
    #[error("invalid size: {0}")]
    InvalidSize(String),

    #[error("unsupported source media type `{0}'")]
    UnsupportedMediaType(String),

    #[error("unsupported output format `{0}'")]
    UnsupportedFormat(String),

    /// The backend could not be constructed in this runtime.
    #[error("backend `{backend}' is unavailable: {detail}")]
    MissingCapability { backend: String, detail: String },

    #[error("source `{location}' is unreadable: {source}")]
    SourceUnreadable {
        location: String,
        #[source]
        source: io::Error,
    },

    /// A pixel primitive (decode, crop, resample, flip, rotate, filter, encode) failed.
    #[error("backend execution failed: {0}")]
    BackendExecution(String),
}

impl IiifError {
    pub fn missing_capability(backend: impl ToString, detail: impl ToString) -> Self {
        Self::MissingCapability {
            backend: backend.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn source_unreadable(location: impl ToString, source: io::Error) -> Self {
        Self::SourceUnreadable {
            location: location.to_string(),
            source,
        }
    }

    /// True when the request itself was at fault, as opposed to the service or its inputs.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            IiifError::InvalidRegion(_)
                | IiifError::InvalidSize(_)
                | IiifError::UnsupportedMediaType(_)
                | IiifError::UnsupportedFormat(_)
        )
    }
}

#[macro_export]
macro_rules! backend_err {
    ($($arg:tt)+) => {
        $crate::error::IiifError::BackendExecution(format!(
            "{} @ {}:{}:{}",
            format_args!($($arg)+),
            file!(),
            line!(),
            column!()
        ))
    };
}

#[macro_export]
macro_rules! backend_try {
    ($expr:expr $(,)?) => {
        match $expr {
            std::result::Result::Ok(val) => val,
            std::result::Result::Err(err) => {
                return std::result::Result::Err($crate::backend_err!("{}", err));
            }
        }
    };
}
