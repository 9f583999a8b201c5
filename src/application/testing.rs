//! In-memory post client used by the application tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::DateTime;

use crate::api::{ClientError, ClientFactory, ClientLogger, ClientOptions, PostClient, Result};
use crate::domain::{MediaItem, MediaKind, Post};

/// Scripted behaviour and recorded calls, shared between the factory, the
/// clients it creates, and the test body.
#[derive(Default)]
pub struct FakeState {
    pub calls: Vec<String>,
    pub options: Vec<ClientOptions>,
    pub close_count: usize,
    pub login_error: Option<String>,
    pub fetch_error: bool,
    pub save_error: bool,
    pub factory_error: bool,
    /// Makes `create` panic, taking the worker thread down with it.
    pub factory_panic: bool,
    /// Blocks `login` until a value arrives.
    pub login_gate: Option<std::sync::mpsc::Receiver<()>>,
}

#[derive(Clone, Default)]
pub struct FakeFactory {
    pub state: Arc<Mutex<FakeState>>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F: FnOnce(&mut FakeState)>(self, configure: F) -> Self {
        configure(&mut self.state.lock().unwrap());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn close_count(&self) -> usize {
        self.state.lock().unwrap().close_count
    }
}

impl ClientFactory for FakeFactory {
    fn create(&self, options: ClientOptions) -> Result<Box<dyn PostClient>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push("create".to_string());
        if state.factory_panic {
            // release the lock first so the test can still inspect the state
            drop(state);
            panic!("client construction blew up");
        }
        if state.factory_error {
            return Err(ClientError::ApiError("no client available".to_string()));
        }
        state.options.push(options);

        Ok(Box::new(FakeClient {
            state: Arc::clone(&self.state),
            logger: None,
        }))
    }
}

pub struct FakeClient {
    state: Arc<Mutex<FakeState>>,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl FakeClient {
    fn record(&self, call: String) {
        self.state.lock().unwrap().calls.push(call);
    }
}

pub fn sample_post(owner: &str, shortcode: &str) -> Post {
    Post {
        shortcode: shortcode.to_string(),
        owner_username: owner.to_string(),
        taken_at: DateTime::from_timestamp(1700000000, 0).unwrap_or_default(),
        caption: Some("caption".to_string()),
        media: vec![MediaItem {
            kind: MediaKind::Image,
            url: "https://cdn.example/1.jpg".to_string(),
        }],
        comments: Vec::new(),
    }
}

#[async_trait]
impl PostClient for FakeClient {
    fn set_logger(&mut self, logger: Arc<dyn ClientLogger>) {
        self.record("set_logger".to_string());
        self.logger = Some(logger);
    }

    async fn login(&mut self, username: &str, _password: &str) -> Result<()> {
        self.record(format!("login {}", username));

        let gate = self.state.lock().unwrap().login_gate.take();
        if let Some(gate) = gate {
            let _ = gate.recv();
        }

        match self.state.lock().unwrap().login_error.clone() {
            Some(message) => Err(ClientError::BadCredentials(message)),
            None => Ok(()),
        }
    }

    async fn fetch_post(&self, shortcode: &str) -> Result<Post> {
        self.record(format!("fetch {}", shortcode));
        if self.state.lock().unwrap().fetch_error {
            return Err(ClientError::NotFound(shortcode.to_string()));
        }
        Ok(sample_post("jane", shortcode))
    }

    async fn download_post(&self, post: &Post, target: &str) -> Result<()> {
        self.record(format!("download {}", target));
        if let Some(logger) = &self.logger {
            logger.log(&format!("{}/1.jpg", target));
            logger.error("  ");
        }
        if self.state.lock().unwrap().save_error {
            if let Some(logger) = &self.logger {
                logger.error("disk full");
            }
            return Err(ClientError::Io(std::io::Error::other(format!(
                "cannot write {}",
                post.shortcode
            ))));
        }
        Ok(())
    }

    async fn close(&mut self) {
        self.record("close".to_string());
        self.state.lock().unwrap().close_count += 1;
    }
}
