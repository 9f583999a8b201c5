use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::{
    application::{download_task::DownloadTask, log_bridge::Emitter},
    domain::{AppError, DownloadOutcome, DownloadRequest, ProgressEvent},
};

/// Runs downloads on a dedicated thread and hands their events to the UI.
///
/// Each submission gets its own channel. The worker keeps the receiving end
/// until the terminal event arrives, so only one download can be in flight.
pub struct DownloadWorker {
    task: Arc<DownloadTask>,
    active: Option<UnboundedReceiver<ProgressEvent>>,
}

impl DownloadWorker {
    pub fn new(task: DownloadTask) -> Self {
        Self {
            task: Arc::new(task),
            active: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// Starts `request` in the background and returns immediately.
    pub fn submit(&mut self, request: DownloadRequest) -> Result<(), AppError> {
        if self.is_busy() {
            return Err(AppError::DownloadInProgress);
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        let task = Arc::clone(&self.task);

        thread::Builder::new()
            .name("post-download".to_string())
            .spawn(move || run_download(task, request, sender))
            .map_err(|e| AppError::Worker(e.to_string()))?;

        self.active = Some(receiver);
        Ok(())
    }

    /// Drains every event queued so far without blocking.
    ///
    /// The slot is released once the terminal event has been returned.
    pub fn poll(&mut self) -> Vec<ProgressEvent> {
        let Some(receiver) = self.active.as_mut() else {
            return Vec::new();
        };

        let mut events = Vec::new();
        let mut finished = false;

        loop {
            match receiver.try_recv() {
                Ok(event) => {
                    finished = event.is_done();
                    events.push(event);
                    if finished {
                        break;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::error!("download worker exited without reporting a result");
                    events.push(ProgressEvent::Done {
                        outcome: DownloadOutcome::Failure {
                            message: "Download worker stopped unexpectedly".to_string(),
                        },
                    });
                    finished = true;
                    break;
                }
            }
        }

        if finished {
            self.active = None;
        }
        events
    }
}

fn run_download(
    task: Arc<DownloadTask>,
    request: DownloadRequest,
    sender: UnboundedSender<ProgressEvent>,
) {
    tracing::info!(link = %request.link, login = request.credentials.is_some(), "download started");

    let emitter = {
        let sender = sender.clone();
        Emitter::new(move |text| {
            let _ = sender.send(ProgressEvent::Log { text });
        })
    };

    let result = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime.block_on(task.run(
            &request.link,
            request.credentials.as_ref(),
            emitter,
        )),
        Err(e) => Err(AppError::Worker(format!("cannot start async runtime: {}", e))),
    };

    let outcome = match result {
        Ok(path) => {
            tracing::info!(path = %path.display(), "download finished");
            DownloadOutcome::Success { path }
        }
        Err(e) => {
            tracing::warn!(error = %e, "download failed");
            DownloadOutcome::Failure {
                message: e.to_string(),
            }
        }
    };

    let _ = sender.send(ProgressEvent::Done { outcome });
}
