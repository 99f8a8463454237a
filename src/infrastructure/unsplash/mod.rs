//! Unsplash photo list API.

pub mod client;
pub mod dto;

pub use client::{UNSPLASH_API_BASE, UnsplashClient};
pub use dto::parse_photo_list;
