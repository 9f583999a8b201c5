pub mod error;
pub mod model;

pub use error::AppError;
pub use model::{
    Comment, Credentials, DownloadOutcome, DownloadRequest, MediaItem, MediaKind, Post,
    ProgressEvent, Shortcode,
};
