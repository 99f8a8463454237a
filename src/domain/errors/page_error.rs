//! Failure modes of a page load.

use thiserror::Error;

use super::{ErrorKind, FetchError};

/// Reason a page of the photo list could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum PageError {
    #[error("no internet connection")]
    NoConnectivity,

    #[error("server unreachable: {message}")]
    Unreachable { message: String },

    #[error("access forbidden by the photo API")]
    Forbidden,

    #[error("HTTP error: {code}")]
    HttpError { code: u16 },

    #[error("failed to parse photo list: {message}")]
    ParseError { message: String },
}

impl PageError {
    /// Creates unreachable error.
    #[must_use]
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    /// Creates parse error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseError {
            message: message.into(),
        }
    }

    /// Category of this failure.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoConnectivity => ErrorKind::Connectivity,
            Self::Unreachable { .. } => ErrorKind::Transport,
            Self::Forbidden | Self::HttpError { .. } => ErrorKind::Protocol,
            Self::ParseError { .. } => ErrorKind::Format,
        }
    }

    /// Returns whether the caller should wait before retrying.
    #[must_use]
    pub const fn should_back_off(&self) -> bool {
        matches!(self, Self::Forbidden)
    }

    /// Text suitable for a transient user notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NoConnectivity => "No internet connection".to_string(),
            Self::Forbidden => "The Unsplash API is free to use but demo keys are limited to \
                                50 requests per hour. Try again later."
                .to_string(),
            other => other.to_string(),
        }
    }
}

impl From<FetchError> for PageError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::HostUnreachable { host } => {
                Self::unreachable(format!("host {host} is not reachable"))
            }
            FetchError::Unreachable { message } => Self::Unreachable { message },
            FetchError::Forbidden => Self::Forbidden,
            FetchError::HttpError { code } => Self::HttpError { code },
            FetchError::NotAnImage { .. } | FetchError::Decode { .. } => {
                Self::parse(error.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(FetchError::host_unreachable("api.unsplash.com"), ErrorKind::Transport ; "host_unreachable")]
    #[test_case(FetchError::unreachable("dns"), ErrorKind::Transport ; "unreachable")]
    #[test_case(FetchError::Forbidden, ErrorKind::Protocol ; "forbidden")]
    #[test_case(FetchError::HttpError { code: 500 }, ErrorKind::Protocol ; "http_error")]
    fn test_fetch_error_maps_to_page_error_kind(error: FetchError, kind: ErrorKind) {
        assert_eq!(PageError::from(error).kind(), kind);
    }

    #[test]
    fn test_forbidden_message_mentions_rate_limit() {
        assert!(PageError::Forbidden.user_message().contains("50 requests per hour"));
        assert!(PageError::Forbidden.should_back_off());
        assert!(!PageError::NoConnectivity.should_back_off());
    }

    #[test]
    fn test_http_error_preserves_code() {
        let error = PageError::from(FetchError::HttpError { code: 502 });
        assert_eq!(error, PageError::HttpError { code: 502 });
        assert_eq!(error.user_message(), "HTTP error: 502");
    }
}
