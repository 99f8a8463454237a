//! Failure modes of a single HTTP fetch.

use thiserror::Error;

use super::ErrorKind;

/// Classified outcome of a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum FetchError {
    #[error("host {host} is not reachable")]
    HostUnreachable { host: String },

    #[error("network unreachable: {message}")]
    Unreachable { message: String },

    #[error("access forbidden, the API rate limit may have been reached")]
    Forbidden,

    #[error("HTTP error: {code}")]
    HttpError { code: u16 },

    #[error("response is not an image (content type {content_type:?})")]
    NotAnImage { content_type: String },

    #[error("failed to decode image: {message}")]
    Decode { message: String },
}

impl FetchError {
    /// Creates host unreachable error.
    #[must_use]
    pub fn host_unreachable(host: impl Into<String>) -> Self {
        Self::HostUnreachable { host: host.into() }
    }

    /// Creates unreachable error.
    #[must_use]
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    /// Creates not-an-image error.
    #[must_use]
    pub fn not_an_image(content_type: impl Into<String>) -> Self {
        Self::NotAnImage {
            content_type: content_type.into(),
        }
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Category of this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::HostUnreachable { .. } | Self::Unreachable { .. } => ErrorKind::Transport,
            Self::Forbidden | Self::HttpError { .. } => ErrorKind::Protocol,
            Self::NotAnImage { .. } | Self::Decode { .. } => ErrorKind::Content,
        }
    }
}
