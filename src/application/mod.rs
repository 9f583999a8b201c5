pub mod download_task;
pub mod log_bridge;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use download_task::DownloadTask;
pub use worker::DownloadWorker;
