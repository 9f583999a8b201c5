use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AppError;

/// Short identifier naming a single post, e.g. `ABC123xy`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shortcode(String);

impl Shortcode {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Shortcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Builds credentials from raw form fields.
    ///
    /// The username is trimmed, the password is taken as typed. Both empty
    /// means an anonymous download; exactly one empty is rejected.
    pub fn from_inputs(username: &str, password: &str) -> Result<Option<Self>, AppError> {
        let username = username.trim();
        match (username.is_empty(), password.is_empty()) {
            (true, true) => Ok(None),
            (false, false) => Ok(Some(Self {
                username: username.to_string(),
                password: password.to_string(),
            })),
            _ => Err(AppError::CredentialsIncomplete),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A validated download request, ready to hand to the worker.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub link: String,
    pub credentials: Option<Credentials>,
}

impl DownloadRequest {
    pub fn from_inputs(link: &str, username: &str, password: &str) -> Result<Self, AppError> {
        let link = link.trim();
        if link.is_empty() {
            return Err(AppError::MissingLink);
        }

        Ok(Self {
            link: link.to_string(),
            credentials: Credentials::from_inputs(username, password)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Success { path: PathBuf },
    Failure { message: String },
}

/// Events flowing from the download worker to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Log { text: String },
    Done { outcome: DownloadOutcome },
}

impl ProgressEvent {
    pub fn is_done(&self) -> bool {
        matches!(self, ProgressEvent::Done { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn extension(self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItem {
    pub kind: MediaKind,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub owner_username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Post metadata as returned by a [`crate::api::PostClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub shortcode: String,
    pub owner_username: String,
    pub taken_at: DateTime<Utc>,
    pub caption: Option<String>,
    pub media: Vec<MediaItem>,
    pub comments: Vec<Comment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_both_or_neither() {
        assert!(Credentials::from_inputs("", "").unwrap().is_none());

        let creds = Credentials::from_inputs("x", "y").unwrap().unwrap();
        assert_eq!(creds.username, "x");
        assert_eq!(creds.password, "y");

        assert!(matches!(
            Credentials::from_inputs("", "x"),
            Err(AppError::CredentialsIncomplete)
        ));
        assert!(matches!(
            Credentials::from_inputs("x", ""),
            Err(AppError::CredentialsIncomplete)
        ));
    }

    #[test]
    fn test_credentials_trim_username_only() {
        let creds = Credentials::from_inputs("  jane ", " secret ").unwrap().unwrap();
        assert_eq!(creds.username, "jane");
        assert_eq!(creds.password, " secret ");

        // whitespace-only username counts as missing
        assert!(matches!(
            Credentials::from_inputs("   ", "secret"),
            Err(AppError::CredentialsIncomplete)
        ));
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials::from_inputs("jane", "hunter2").unwrap().unwrap();
        let debug = format!("{:?}", creds);
        assert!(debug.contains("jane"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_request_requires_link() {
        assert!(matches!(
            DownloadRequest::from_inputs("   ", "", ""),
            Err(AppError::MissingLink)
        ));

        let request = DownloadRequest::from_inputs(" ABC123xy ", "", "").unwrap();
        assert_eq!(request.link, "ABC123xy");
        assert!(request.credentials.is_none());
    }

    #[test]
    fn test_media_extension() {
        assert_eq!(MediaKind::Image.extension(), "jpg");
        assert_eq!(MediaKind::Video.extension(), "mp4");
    }
}
