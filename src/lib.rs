//! Photogrid - a paginated photo feed backed by a two-tier image cache.
//!
//! Pages of photo URLs are pulled from the Unsplash list endpoint, each
//! image is resolved through a memory tier, a disk tier, the network and
//! finally a placeholder, and the results accumulate into an ordered feed
//! that observers read as snapshots.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the page cursor and feed loader.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "photogrid";
