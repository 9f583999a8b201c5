use std::fmt;
use std::sync::Arc;

use crate::api::{ClientLogger, PostClient};

/// Single-argument progress callback.
#[derive(Clone)]
pub struct Emitter(Arc<dyn Fn(String) + Send + Sync>);

impl Emitter {
    pub fn new(f: impl Fn(String) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn emit(&self, text: impl Into<String>) {
        (self.0)(text.into())
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Emitter")
    }
}

/// Joins message parts with `separator` (a single space when `None`) and
/// trims the result. Returns `None` when nothing but whitespace is left.
pub fn format_log_message<S: AsRef<str>>(parts: &[S], separator: Option<&str>) -> Option<String> {
    let separator = separator.unwrap_or(" ");
    let joined = parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(separator);

    let message = joined.trim();
    (!message.is_empty()).then(|| message.to_string())
}

/// Client logger that forwards every non-empty message to an [`Emitter`].
pub struct EmitterLogger {
    emitter: Emitter,
}

impl EmitterLogger {
    pub fn new(emitter: Emitter) -> Self {
        Self { emitter }
    }

    pub fn log_parts<S: AsRef<str>>(&self, parts: &[S]) {
        if let Some(message) = format_log_message(parts, None) {
            self.emitter.emit(message);
        }
    }

    pub fn error_parts<S: AsRef<str>>(&self, parts: &[S]) {
        if let Some(message) = format_log_message(parts, None) {
            self.emitter.emit(format!("Error: {}", message));
        }
    }
}

impl ClientLogger for EmitterLogger {
    fn log(&self, message: &str) {
        self.log_parts(&[message]);
    }

    fn error(&self, message: &str) {
        self.error_parts(&[message]);
    }
}

/// Routes the client's log and error output into `emitter`.
pub fn wire_logging(client: &mut dyn PostClient, emitter: Emitter) {
    client.set_logger(Arc::new(EmitterLogger::new(emitter)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording() -> (Emitter, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let emitter = Emitter::new(move |text| sink.lock().unwrap().push(text));
        (emitter, lines)
    }

    #[test]
    fn test_format_joins_with_default_separator() {
        assert_eq!(format_log_message(&["a", "b"], None).as_deref(), Some("a b"));
        assert_eq!(
            format_log_message(&["a", "b", "c"], Some(", ")).as_deref(),
            Some("a, b, c")
        );
        assert_eq!(
            format_log_message(&["  padded  "], None).as_deref(),
            Some("padded")
        );
    }

    #[test]
    fn test_format_suppresses_blank() {
        assert_eq!(format_log_message(&["  ", "\t"], None), None);
        assert_eq!(format_log_message::<&str>(&[], None), None);
        assert_eq!(format_log_message(&[""], None), None);
    }

    #[test]
    fn test_logger_forwards_and_prefixes_errors() {
        let (emitter, lines) = recording();
        let logger = EmitterLogger::new(emitter);

        logger.log("saved 1.jpg");
        logger.log("   ");
        logger.error("rate limited");
        logger.error("");
        logger.log_parts(&["a", "b"]);
        logger.error_parts(&["x ", " y"]);
        logger.log_parts(&["", "  "]);

        assert_eq!(
            *lines.lock().unwrap(),
            vec![
                "saved 1.jpg".to_string(),
                "Error: rate limited".to_string(),
                "a b".to_string(),
                "Error: x   y".to_string(),
            ]
        );
    }
}
