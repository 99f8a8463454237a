mod connectivity_port;
mod image_cache_port;
mod image_fetch_port;
mod photo_list_port;

pub use connectivity_port::ConnectivityPort;
pub use image_cache_port::ImageCachePort;
pub use image_fetch_port::ImageFetchPort;
pub use photo_list_port::PhotoListPort;
