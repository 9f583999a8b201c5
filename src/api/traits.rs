use std::sync::Arc;

use async_trait::async_trait;

use super::{ClientOptions, Result};
use crate::domain::Post;

/// Logging hook points a client reports through.
///
/// Clients start out with [`TracingLogger`]; callers that want the messages
/// elsewhere inject their own implementation with [`PostClient::set_logger`].
pub trait ClientLogger: Send + Sync {
    fn log(&self, message: &str);

    fn error(&self, message: &str);
}

/// Default logger, forwards client messages to `tracing`.
pub struct TracingLogger;

impl ClientLogger for TracingLogger {
    fn log(&self, message: &str) {
        tracing::info!(target: "post_client", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "post_client", "{}", message);
    }
}

/// A session against the remote post service.
///
/// One instance serves one download and must be closed afterwards.
#[async_trait]
pub trait PostClient: Send + Sync {
    /// Replaces the logger used for progress and error messages.
    fn set_logger(&mut self, logger: Arc<dyn ClientLogger>);

    async fn login(&mut self, username: &str, password: &str) -> Result<()>;

    /// Looks up post metadata by shortcode.
    async fn fetch_post(&self, shortcode: &str) -> Result<Post>;

    /// Saves the post's media into the directory derived from `target`.
    async fn download_post(&self, post: &Post, target: &str) -> Result<()>;

    /// Releases the session. Further calls on the client fail.
    async fn close(&mut self);
}

/// Creates configured clients, one per download.
pub trait ClientFactory: Send + Sync {
    fn create(&self, options: ClientOptions) -> Result<Box<dyn PostClient>>;
}
