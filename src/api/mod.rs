pub mod client;
pub mod resources;

pub use client::{ApiClient, ApiError};
pub use resources::{PhotoUpload, Resource};
