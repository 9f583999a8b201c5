use thiserror::Error;

use crate::api::ClientError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Provide a valid Instagram post link or shortcode.")]
    InvalidInput,

    #[error("Enter an Instagram post link.")]
    MissingLink,

    #[error("Provide both username and password, or leave both blank.")]
    CredentialsIncomplete,

    #[error("A download is already in progress")]
    DownloadInProgress,

    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Failed to start download worker: {0}")]
    Worker(String),

    #[error(transparent)]
    Download(#[from] ClientError),
}

impl AppError {
    /// Dialog title used when the error is shown to the user.
    pub fn title(&self) -> &'static str {
        match self {
            AppError::InvalidInput | AppError::MissingLink => "Missing data",
            AppError::CredentialsIncomplete => "Credentials incomplete",
            AppError::DownloadInProgress => "Download running",
            AppError::DependencyUnavailable(_) => "Dependency missing",
            AppError::Worker(_) | AppError::Download(_) => "Download failed",
        }
    }
}
