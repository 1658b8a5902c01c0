pub mod client;
pub mod models;

pub use client::{ApiError, MediaClient};
pub use models::ClientConfig;
