//! Domain error types.

mod cache_error;
mod fetch_error;
mod page_error;

pub use cache_error::{CacheError, CacheResult};
pub use fetch_error::FetchError;
pub use page_error::PageError;

/// Broad failure category shared by fetch and page errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The device has no usable network.
    Connectivity,
    /// The host could not be resolved, reached or connected to.
    Transport,
    /// The server answered with a non-success status.
    Protocol,
    /// The response body is not a usable image.
    Content,
    /// The page JSON lacks the expected structure.
    Format,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connectivity => write!(f, "connectivity"),
            Self::Transport => write!(f, "transport"),
            Self::Protocol => write!(f, "protocol"),
            Self::Content => write!(f, "content"),
            Self::Format => write!(f, "format"),
        }
    }
}
