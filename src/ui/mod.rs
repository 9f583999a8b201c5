use iced::{
    widget::{button, column, container, progress_bar, row, scrollable, text, text_input, Column, Space},
    Element, Length,
};

/// Main view state
pub struct DownloadView {
    pub post_link: String,
    pub username: String,
    pub password: String,
    pub status_message: String,
    pub download_folder: String,
    pub is_downloading: bool,
    /// False when startup checks failed
    pub download_enabled: bool,
    /// Position of the busy indicator, 0.0 to 1.0
    pub activity: f32,
    pub log_lines: Vec<String>,
}

impl Default for DownloadView {
    fn default() -> Self {
        Self {
            post_link: String::new(),
            username: String::new(),
            password: String::new(),
            status_message: "Idle".to_string(),
            download_folder: String::new(),
            is_downloading: false,
            download_enabled: true,
            activity: 0.0,
            log_lines: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    PostLinkChanged(String),
    UsernameChanged(String),
    PasswordChanged(String),
    DownloadPressed,
    ClearLogPressed,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::PostLinkChanged(link) => {
                self.post_link = link;
            }
            DownloadMessage::UsernameChanged(username) => {
                self.username = username;
            }
            DownloadMessage::PasswordChanged(password) => {
                self.password = password;
            }
            DownloadMessage::ClearLogPressed => {
                self.log_lines.clear();
            }
            DownloadMessage::DownloadPressed => {
                // Will be handled by the app
            }
        }
    }

    pub fn begin_download(&mut self) {
        self.is_downloading = true;
        self.activity = 0.0;
        self.status_message = "Downloading...".to_string();
        self.log_lines.clear();
    }

    pub fn finish_download(&mut self, status: &str) {
        self.is_downloading = false;
        self.activity = 0.0;
        self.status_message = status.to_string();
    }

    pub fn append_log(&mut self, line: String) {
        self.log_lines.push(line);
    }

    /// Moves the busy indicator along, wrapping at the end.
    pub fn advance_activity(&mut self) {
        if self.is_downloading {
            self.activity = (self.activity + 0.05) % 1.0;
        }
    }

    pub fn view(&self) -> Element<'_, DownloadMessage> {
        let can_download = self.download_enabled && !self.is_downloading;

        let credentials = row![
            column![
                text("Username (optional):").size(14),
                text_input("Username", &self.username)
                    .on_input(DownloadMessage::UsernameChanged)
                    .padding(10),
            ]
            .spacing(5)
            .width(Length::Fill),
            column![
                text("Password (optional):").size(14),
                text_input("Password", &self.password)
                    .on_input(DownloadMessage::PasswordChanged)
                    .secure(true)
                    .padding(10),
            ]
            .spacing(5)
            .width(Length::Fill),
        ]
        .spacing(10);

        let controls = row![
            button("Download Post")
                .on_press_maybe(can_download.then_some(DownloadMessage::DownloadPressed))
                .padding([10, 20])
                .width(Length::Fill),
            button("Clear Log")
                .on_press(DownloadMessage::ClearLogPressed)
                .padding([10, 20])
                .width(Length::Fill),
        ]
        .spacing(10);

        let status = row![
            text(&self.status_message).size(14).width(Length::Fill),
            progress_bar(0.0..=1.0, self.activity),
        ]
        .spacing(10);

        let log = Column::with_children(
            self.log_lines
                .iter()
                .map(|line| text(line).size(13).into()),
        )
        .spacing(2);

        column![
            text("Instagram Post Downloader").size(28),
            Space::new().height(Length::Fixed(10.0)),
            text("Instagram Post Link:").size(14),
            text_input("https://www.instagram.com/p/...", &self.post_link)
                .on_input(DownloadMessage::PostLinkChanged)
                .on_submit(DownloadMessage::DownloadPressed)
                .padding(10),
            credentials,
            text(format!("Download folder: {}", self.download_folder)).size(12),
            controls,
            status,
            text("Download Progress").size(16),
            // stick to the newest line as the log grows
            container(
                scrollable(log)
                    .anchor_bottom()
                    .height(Length::Fill)
                    .width(Length::Fill),
            )
            .padding(5)
            .height(Length::Fill),
        ]
        .padding(20)
        .spacing(10)
        .into()
    }
}
