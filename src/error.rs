//! Unified error type.

use http::StatusCode;

/// The error type returned by resourceful's fallible operations.
///
/// Actions, renderers and collaborators all fail with this type. The route
/// layer turns it into a response through
/// [`IntoResponse`](crate::IntoResponse); see [`Error::status`] for the
/// mapping.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An action was called on a resource that does not override it.
    #[error("{method} should be implemented by an inheriting resource")]
    NotImplemented { method: &'static str },

    /// No renderer is registered for the requested or negotiated media type.
    #[error("unsupported media type `{media_type}`")]
    UnsupportedMediaType { media_type: String },

    /// A wiring defect: missing view engine, empty resource name, bad address.
    #[error("configuration: {0}")]
    Configuration(String),

    /// An action asking for a specific HTTP failure, e.g. not found.
    #[error("{status}: {message}")]
    Http { status: StatusCode, message: String },

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn not_implemented(method: &'static str) -> Self {
        Self::NotImplemented { method }
    }

    pub fn unsupported_media_type(media_type: impl Into<String>) -> Self {
        Self::UnsupportedMediaType { media_type: media_type.into() }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// An HTTP failure carrying `status` through to the client unchanged.
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http { status, message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::http(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::http(StatusCode::BAD_REQUEST, message)
    }

    /// The status the route layer answers with when this error escapes.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedMediaType { .. } => StatusCode::NOT_ACCEPTABLE,
            Self::Http { status, .. } => *status,
            Self::NotImplemented { .. }
            | Self::Configuration(_)
            | Self::Json(_)
            | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
