use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use iced::{Subscription, Task};
use rfd::{AsyncMessageDialog, MessageButtons, MessageLevel};

use crate::api::InstagramClientFactory;
use crate::application::{DownloadTask, DownloadWorker};
use crate::config::AppConfig;
use crate::domain::{AppError, DownloadOutcome, DownloadRequest, ProgressEvent};
use crate::ui::{DownloadMessage, DownloadView};

pub struct DownloadApp {
    view: DownloadView,
    /// None when startup checks failed; downloads stay disabled
    worker: Option<DownloadWorker>,
    poll_interval: Duration,
}

impl DownloadApp {
    pub fn new() -> (Self, Task<Message>) {
        let config = AppConfig::from_env();

        match build_worker(&config) {
            Ok(worker) => (Self::with_worker(&config, Some(worker)), Task::none()),
            Err(e) => {
                tracing::error!(error = %e, "downloads disabled");
                let mut app = Self::with_worker(&config, None);
                app.view.status_message = "Unavailable".to_string();
                let dialog = show_dialog(MessageLevel::Warning, "Missing dependency", e.to_string());
                (app, dialog)
            }
        }
    }

    fn with_worker(config: &AppConfig, worker: Option<DownloadWorker>) -> Self {
        let view = DownloadView {
            username: config.default_username.clone(),
            password: config.default_password.clone(),
            download_folder: config.download_root.display().to_string(),
            download_enabled: worker.is_some(),
            ..DownloadView::default()
        };

        Self {
            view,
            worker,
            poll_interval: config.poll_interval,
        }
    }

    fn is_busy(&self) -> bool {
        self.worker.as_ref().is_some_and(DownloadWorker::is_busy)
    }
}

fn build_worker(config: &AppConfig) -> Result<DownloadWorker, AppError> {
    config.ensure_download_root()?;

    let factory = InstagramClientFactory::new(config.client.clone());
    factory
        .check_ready()
        .map_err(|e| AppError::DependencyUnavailable(e.to_string()))?;

    let task = DownloadTask::new(config.download_root.clone(), Arc::new(factory));
    tracing::info!(root = %task.root().display(), "download folder ready");
    Ok(DownloadWorker::new(task))
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    /// Periodic poll of the download worker
    Tick,
    DialogClosed,
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            if let DownloadMessage::DownloadPressed = ui_msg {
                return start_download(app);
            }
        }
        Message::Tick => {
            app.view.advance_activity();
            return drain_events(app);
        }
        Message::DialogClosed => {}
    }
    Task::none()
}

fn start_download(app: &mut DownloadApp) -> Task<Message> {
    let Some(worker) = app.worker.as_mut() else {
        return show_dialog(
            MessageLevel::Error,
            AppError::DependencyUnavailable(String::new()).title(),
            "Downloads are unavailable, see the startup warning.".to_string(),
        );
    };

    let request =
        match DownloadRequest::from_inputs(&app.view.post_link, &app.view.username, &app.view.password) {
            Ok(request) => request,
            Err(e) => return show_dialog(MessageLevel::Error, e.title(), e.to_string()),
        };

    match worker.submit(request) {
        Ok(()) => {
            app.view.begin_download();
            Task::none()
        }
        Err(AppError::DownloadInProgress) => {
            tracing::debug!("ignoring download request while one is running");
            Task::none()
        }
        Err(e) => show_dialog(MessageLevel::Error, e.title(), e.to_string()),
    }
}

fn drain_events(app: &mut DownloadApp) -> Task<Message> {
    let Some(worker) = app.worker.as_mut() else {
        return Task::none();
    };

    let mut tasks = Vec::new();
    for event in worker.poll() {
        match event {
            ProgressEvent::Log { text } => app.view.append_log(text),
            ProgressEvent::Done { outcome } => tasks.push(finish_download(&mut app.view, outcome)),
        }
    }
    Task::batch(tasks)
}

fn finish_download(view: &mut DownloadView, outcome: DownloadOutcome) -> Task<Message> {
    match outcome {
        DownloadOutcome::Success { path } => {
            view.finish_download("Download complete.");
            let resolved: PathBuf = std::fs::canonicalize(&path).unwrap_or(path);
            show_dialog(
                MessageLevel::Info,
                "Download complete",
                format!("Post saved to:\n{}", resolved.display()),
            )
        }
        DownloadOutcome::Failure { message } => {
            view.finish_download("Failed");
            show_dialog(MessageLevel::Error, "Download failed", message)
        }
    }
}

fn show_dialog(level: MessageLevel, title: &str, description: String) -> Task<Message> {
    let title = title.to_string();
    Task::perform(
        async move {
            AsyncMessageDialog::new()
                .set_level(level)
                .set_title(title)
                .set_description(description)
                .set_buttons(MessageButtons::Ok)
                .show()
                .await;
        },
        |_| Message::DialogClosed,
    )
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view.view().map(Message::UiMessage)
}

pub fn subscription(app: &DownloadApp) -> Subscription<Message> {
    if app.is_busy() {
        iced::time::every(app.poll_interval).map(|_| Message::Tick)
    } else {
        Subscription::none()
    }
}
