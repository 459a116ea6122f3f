pub mod client;
pub mod error;
pub mod image;
pub mod normalize;
pub mod types;

pub use client::{CmsClient, CmsSettings};
pub use error::CmsError;
pub use image::{Fit, ImageTransform, ImageUrlBuilder};
pub use normalize::{normalize_stone, normalize_stones};
pub use types::{QueryResponse, RawStoneDocument};
