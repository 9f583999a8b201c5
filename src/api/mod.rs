pub mod client;
pub mod models;
pub mod traits;

pub use client::{ClientError, InstagramClientFactory, Result};
pub use models::{ClientConfig, ClientOptions};
pub use traits::{ClientFactory, ClientLogger, PostClient};
