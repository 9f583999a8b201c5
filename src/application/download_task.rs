use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
    api::{ClientFactory, ClientOptions, PostClient},
    application::log_bridge::{wire_logging, Emitter},
    domain::{AppError, Credentials, Shortcode},
    utils::{extract_shortcode, sanitize_filename},
};

/// Downloads a single post into `<root>/<owner>_<shortcode>`.
#[derive(Clone)]
pub struct DownloadTask {
    root: PathBuf,
    factory: Arc<dyn ClientFactory>,
}

impl DownloadTask {
    pub fn new(root: impl Into<PathBuf>, factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            root: root.into(),
            factory,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Runs the whole download, reporting progress through `emit`.
    ///
    /// The client is closed on every path once it has been created.
    pub async fn run(
        &self,
        link: &str,
        credentials: Option<&Credentials>,
        emit: Emitter,
    ) -> Result<PathBuf, AppError> {
        let shortcode = extract_shortcode(link)?;
        emit.emit(format!("Detected shortcode: {}", shortcode));

        let options = ClientOptions {
            dirname_pattern: self.root.join("{target}").display().to_string(),
            download_comments: false,
            save_metadata: false,
        };
        let mut client = self.factory.create(options)?;
        wire_logging(&mut *client, emit.clone());

        let result = self
            .fetch_and_save(&mut *client, &shortcode, credentials, &emit)
            .await;
        client.close().await;

        let path = result?;
        emit.emit("Download complete.");
        Ok(path)
    }

    async fn fetch_and_save(
        &self,
        client: &mut dyn PostClient,
        shortcode: &Shortcode,
        credentials: Option<&Credentials>,
        emit: &Emitter,
    ) -> Result<PathBuf, AppError> {
        match credentials {
            Some(creds) => {
                emit.emit(format!("Logging in as {}...", creds.username));
                client.login(&creds.username, &creds.password).await?;
            }
            None => {
                emit.emit("Downloading without login. Only public posts are accessible.");
            }
        }

        emit.emit("Fetching post metadata...");
        let post = client.fetch_post(shortcode.as_str()).await?;
        tracing::debug!(%shortcode, owner = %post.owner_username, media = post.media.len(), "fetched post");

        let target_name = sanitize_filename(&format!("{}_{}", post.owner_username, shortcode));
        let target_path = self.root.join(&target_name);
        emit.emit(format!("Saving post to {}", target_path.display()));
        client.download_post(&post, &target_name).await?;

        Ok(target_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::FakeFactory;
    use std::sync::Mutex;

    fn recording() -> (Emitter, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        (
            Emitter::new(move |text| sink.lock().unwrap().push(text)),
            lines,
        )
    }

    fn credentials() -> Credentials {
        Credentials {
            username: "jane".to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_anonymous_download_succeeds() {
        let root = tempfile::tempdir().unwrap();
        let factory = FakeFactory::new();
        let task = DownloadTask::new(root.path(), Arc::new(factory.clone()));
        let (emit, lines) = recording();

        let path = task
            .run("https://www.instagram.com/p/ABC123xy/", None, emit)
            .await
            .unwrap();

        let expected = root.path().join("jane_ABC123xy");
        assert_eq!(path, expected);
        assert_eq!(
            *lines.lock().unwrap(),
            vec![
                "Detected shortcode: ABC123xy".to_string(),
                "Downloading without login. Only public posts are accessible.".to_string(),
                "Fetching post metadata...".to_string(),
                format!("Saving post to {}", expected.display()),
                "jane_ABC123xy/1.jpg".to_string(),
                "Download complete.".to_string(),
            ]
        );
        assert_eq!(
            factory.calls(),
            vec![
                "create",
                "set_logger",
                "fetch ABC123xy",
                "download jane_ABC123xy",
                "close"
            ]
        );
    }

    #[tokio::test]
    async fn test_client_is_media_only_and_rooted() {
        let root = tempfile::tempdir().unwrap();
        let factory = FakeFactory::new();
        let task = DownloadTask::new(root.path(), Arc::new(factory.clone()));
        let (emit, _) = recording();

        task.run("ABC123xy", None, emit).await.unwrap();

        let state = factory.state.lock().unwrap();
        assert_eq!(
            state.options,
            vec![ClientOptions {
                dirname_pattern: root.path().join("{target}").display().to_string(),
                download_comments: false,
                save_metadata: false,
            }]
        );
    }

    #[tokio::test]
    async fn test_login_when_credentials_given() {
        let root = tempfile::tempdir().unwrap();
        let factory = FakeFactory::new();
        let task = DownloadTask::new(root.path(), Arc::new(factory.clone()));
        let (emit, lines) = recording();

        task.run("ABC123xy", Some(&credentials()), emit)
            .await
            .unwrap();

        let lines = lines.lock().unwrap();
        assert_eq!(lines[1], "Logging in as jane...");
        assert!(!lines.iter().any(|l| l.starts_with("Downloading without login")));
        assert_eq!(factory.calls()[2], "login jane");
    }

    #[tokio::test]
    async fn test_login_failure_still_closes_client() {
        let root = tempfile::tempdir().unwrap();
        let factory =
            FakeFactory::new().with(|s| s.login_error = Some("wrong password for user jane".into()));
        let task = DownloadTask::new(root.path(), Arc::new(factory.clone()));
        let (emit, lines) = recording();

        let err = task
            .run("ABC123xy", Some(&credentials()), emit)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("wrong password for user jane"));
        assert_eq!(factory.close_count(), 1);
        assert!(!factory.calls().iter().any(|c| c.starts_with("fetch")));
        assert!(!lines.lock().unwrap().contains(&"Download complete.".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_failure_closes_client() {
        let root = tempfile::tempdir().unwrap();
        let factory = FakeFactory::new().with(|s| s.fetch_error = true);
        let task = DownloadTask::new(root.path(), Arc::new(factory.clone()));
        let (emit, _) = recording();

        let err = task.run("ABC123xy", None, emit).await.unwrap_err();

        assert_eq!(err.to_string(), "Post ABC123xy not found");
        assert_eq!(factory.close_count(), 1);
    }

    #[tokio::test]
    async fn test_save_failure_forwards_client_error_log() {
        let root = tempfile::tempdir().unwrap();
        let factory = FakeFactory::new().with(|s| s.save_error = true);
        let task = DownloadTask::new(root.path(), Arc::new(factory.clone()));
        let (emit, lines) = recording();

        let err = task.run("ABC123xy", None, emit).await.unwrap_err();

        assert!(matches!(err, AppError::Download(_)));
        assert_eq!(factory.close_count(), 1);
        assert!(lines.lock().unwrap().contains(&"Error: disk full".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_link_creates_no_client() {
        let root = tempfile::tempdir().unwrap();
        let factory = FakeFactory::new();
        let task = DownloadTask::new(root.path(), Arc::new(factory.clone()));
        let (emit, lines) = recording();

        let err = task.run("http://example.com", None, emit).await.unwrap_err();

        assert!(matches!(err, AppError::InvalidInput));
        assert!(factory.calls().is_empty());
        assert!(lines.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_factory_failure_has_nothing_to_close() {
        let root = tempfile::tempdir().unwrap();
        let factory = FakeFactory::new().with(|s| s.factory_error = true);
        let task = DownloadTask::new(root.path(), Arc::new(factory.clone()));
        let (emit, _) = recording();

        let err = task.run("ABC123xy", None, emit).await.unwrap_err();

        assert!(matches!(err, AppError::Download(_)));
        assert_eq!(factory.close_count(), 0);
    }
}
