use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use futures::{Stream, StreamExt, TryStreamExt};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use url::Url;

use super::models::{
    ClientConfig, ClientOptions, GraphqlResponse, LoginResponse, ShortcodeMediaData,
};
use super::traits::{ClientFactory, ClientLogger, PostClient, TracingLogger};
use crate::domain::Post;
use crate::utils::get_timestamp;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Login error: {0}")]
    Login(String),

    #[error("Bad credentials: {0}")]
    BadCredentials(String),

    #[error("Login error: two-factor authentication is required for {0}")]
    TwoFactorRequired(String),

    #[error("Post {0} not found")]
    NotFound(String),

    #[error("Too many requests, try again later")]
    RateLimited,

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Client is closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Client for the Instagram web endpoints.
pub struct InstagramClient {
    http: Client,
    config: ClientConfig,
    options: ClientOptions,
    logger: Arc<dyn ClientLogger>,
    logged_in_as: Option<String>,
    closed: bool,
}

impl InstagramClient {
    pub fn new(config: ClientConfig, options: ClientOptions) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            config,
            options,
            logger: Arc::new(TracingLogger),
            logged_in_as: None,
            closed: false,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(ClientError::Closed);
        }
        Ok(())
    }

    /// Fetch the login page and read the CSRF token cookie it sets
    async fn csrf_token(&self) -> Result<String> {
        let response = self
            .http
            .get(self.endpoint("/accounts/login/"))
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ClientError::ApiError(format!("Login page request failed: {}", e)))?;

        let token = response
            .cookies()
            .find(|cookie| cookie.name() == "csrftoken")
            .map(|cookie| cookie.value().to_string());
        token.ok_or_else(|| ClientError::Login("missing CSRF token".to_string()))
    }

    /// Download file with progress stream
    /// Returns (total_size, stream)
    pub async fn download_file_stream(
        &self,
        download_url: &str,
    ) -> Result<(Option<u64>, impl Stream<Item = Result<bytes::Bytes>>)> {
        let response = self
            .http
            .get(download_url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| ClientError::ApiError(format!("Download request failed: {}", e)))?;

        let total_size = response.content_length();
        let stream = response.bytes_stream().map_err(ClientError::RequestError);

        Ok((total_size, stream))
    }

    async fn save_media(&self, url: &str, path: &Path) -> Result<()> {
        let (total_size, stream) = self.download_file_stream(url).await?;
        tracing::debug!(path = %path.display(), ?total_size, "saving media");

        let mut file = tokio::fs::File::create(path).await?;
        let mut stream = stream.boxed();

        let written: Result<()> = async {
            while let Some(chunk) = stream.next().await {
                file.write_all(&chunk?).await?;
            }
            file.sync_all().await?;
            Ok::<(), ClientError>(())
        }
        .await;

        if written.is_err() {
            drop(file);
            if let Err(e) = tokio::fs::remove_file(path).await {
                self.logger.error(&format!(
                    "Failed to remove partial file {}: {}",
                    path.display(),
                    e
                ));
            }
        }

        written
    }

    async fn write_json<T: serde::Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_vec_pretty(value)
            .map_err(|e| ClientError::InvalidResponse(format!("JSON encode error: {}", e)))?;
        tokio::fs::write(path, json).await?;
        self.logger.log(&path.display().to_string());
        Ok(())
    }
}

#[async_trait]
impl PostClient for InstagramClient {
    fn set_logger(&mut self, logger: Arc<dyn ClientLogger>) {
        self.logger = logger;
    }

    async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        self.ensure_open()?;

        let csrf_token = self.csrf_token().await?;
        let enc_password = format!("#PWD_INSTAGRAM_BROWSER:0:{}:{}", get_timestamp(), password);

        let response = self
            .http
            .post(self.endpoint("/api/v1/web/accounts/login/ajax/"))
            .header("X-CSRFToken", csrf_token)
            .header("X-IG-App-ID", &self.config.app_id)
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Referer", self.endpoint("/accounts/login/"))
            .form(&[
                ("username", username),
                ("enc_password", enc_password.as_str()),
                ("queryParams", "{}"),
                ("optIntoOneTap", "false"),
            ])
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited);
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        if body.two_factor_required {
            return Err(ClientError::TwoFactorRequired(username.to_string()));
        }
        if let Some(checkpoint) = body.checkpoint_url {
            return Err(ClientError::Login(format!(
                "checkpoint required, complete it in a browser: {}",
                checkpoint
            )));
        }
        if body.status != "ok" {
            return Err(ClientError::Login(
                body.message.unwrap_or_else(|| format!("status {}", body.status)),
            ));
        }
        if !body.user {
            return Err(ClientError::Login(format!("user {} does not exist", username)));
        }
        if !body.authenticated {
            return Err(ClientError::BadCredentials(format!(
                "wrong password for user {}",
                username
            )));
        }

        self.logged_in_as = Some(username.to_string());
        tracing::info!(username, "logged in");
        Ok(())
    }

    async fn fetch_post(&self, shortcode: &str) -> Result<Post> {
        self.ensure_open()?;

        let variables = serde_json::json!({ "shortcode": shortcode }).to_string();
        let url = Url::parse_with_params(
            &self.endpoint("/graphql/query"),
            &[
                ("doc_id", self.config.post_doc_id.as_str()),
                ("variables", variables.as_str()),
            ],
        )?;

        let response = self
            .http
            .get(url)
            .header("X-IG-App-ID", &self.config.app_id)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(ClientError::NotFound(shortcode.to_string())),
            StatusCode::TOO_MANY_REQUESTS => return Err(ClientError::RateLimited),
            status if !status.is_success() => {
                return Err(ClientError::ApiError(format!(
                    "Post query failed with status {}",
                    status
                )))
            }
            _ => {}
        }

        let body: GraphqlResponse<ShortcodeMediaData> = response
            .json()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        if let Some(message) = body.message.filter(|_| body.status.as_deref() == Some("fail")) {
            return Err(ClientError::ApiError(message));
        }

        body.data
            .and_then(|data| data.xdt_shortcode_media)
            .map(Post::from)
            .ok_or_else(|| ClientError::NotFound(shortcode.to_string()))
    }

    async fn download_post(&self, post: &Post, target: &str) -> Result<()> {
        self.ensure_open()?;

        let dir = self.options.target_dir(target);
        tokio::fs::create_dir_all(&dir).await?;

        let stem = post.taken_at.format("%Y-%m-%d_%H-%M-%S_UTC").to_string();
        let numbered = post.media.len() > 1;

        for (index, item) in post.media.iter().enumerate() {
            let filename = if numbered {
                format!("{}_{}.{}", stem, index + 1, item.kind.extension())
            } else {
                format!("{}.{}", stem, item.kind.extension())
            };
            let path = dir.join(filename);

            if tokio::fs::try_exists(&path).await? {
                self.logger.log(&format!("{} exists", path.display()));
                continue;
            }

            self.save_media(&item.url, &path).await?;
            self.logger.log(&path.display().to_string());
        }

        if self.options.save_metadata {
            self.write_json(&dir.join(format!("{}.json", stem)), post)
                .await?;
        }
        if self.options.download_comments {
            self.write_json(&dir.join(format!("{}_comments.json", stem)), &post.comments)
                .await?;
        }

        Ok(())
    }

    async fn close(&mut self) {
        if !self.closed {
            tracing::debug!(logged_in = self.logged_in_as.is_some(), "closing client");
            self.closed = true;
            self.logged_in_as = None;
        }
    }
}

/// Builds [`InstagramClient`]s sharing one [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct InstagramClientFactory {
    config: ClientConfig,
}

impl InstagramClientFactory {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Checks that an HTTP client can be built on this platform.
    pub fn check_ready(&self) -> Result<()> {
        Client::builder()
            .cookie_store(true)
            .user_agent(self.config.user_agent.clone())
            .build()?;
        Ok(())
    }
}

impl ClientFactory for InstagramClientFactory {
    fn create(&self, options: ClientOptions) -> Result<Box<dyn PostClient>> {
        Ok(Box::new(InstagramClient::new(self.config.clone(), options)?))
    }
}
