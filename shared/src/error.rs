use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Extraction,
    Debug,
    ScreenshotFetch,
    ScreenshotDelete,
    Clipboard,
    MalformedPayload,
    Cache,
    Config,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Extraction => "EXTRACTION_FAILED",
            Self::Debug => "DEBUG_FAILED",
            Self::ScreenshotFetch => "SCREENSHOT_FETCH_FAILED",
            Self::ScreenshotDelete => "SCREENSHOT_DELETE_FAILED",
            Self::Clipboard => "CLIPBOARD_FAILED",
            Self::MalformedPayload => "MALFORMED_PAYLOAD",
            Self::Cache => "CACHE_ERROR",
            Self::Config => "CONFIG_ERROR",
        }
    }

    /// Title used when the error is shown as a toast.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Extraction | Self::Debug => "Processing Failed",
            _ => "Error",
        }
    }

    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Extraction => "Failed to generate a solution.",
            Self::Debug => "There was an error debugging your code.",
            Self::ScreenshotFetch => "Failed to load screenshots.",
            Self::ScreenshotDelete => "Failed to delete the screenshot.",
            Self::Clipboard => "Failed to copy code to the clipboard.",
            Self::MalformedPayload => "Received an unreadable result.",
            Self::Cache | Self::Config => "Something went wrong.",
        }
    }

    /// Whether the user should ever see this kind. Malformed payloads are
    /// logged only.
    #[must_use]
    pub const fn is_user_visible(self) -> bool {
        !matches!(self, Self::MalformedPayload | Self::Cache)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewError {
    pub kind: ErrorKind,
    pub message: String,
    pub internal_message: Option<String>,
    pub context: HashMap<String, String>,
}

impl ReviewError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            internal_message: None,
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn from_kind(kind: ErrorKind) -> Self {
        Self::new(kind, kind.default_message())
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub fn title(&self) -> &'static str {
        self.kind.title()
    }

    /// Message shown to the user. Falls back to the kind's default when the
    /// platform sent an empty one.
    #[must_use]
    pub fn user_facing_message(&self) -> String {
        let trimmed = self.message.trim();
        if trimmed.is_empty() {
            self.kind.default_message().to_string()
        } else {
            trimmed.to_string()
        }
    }
}

impl std::fmt::Display for ReviewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " ({internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ReviewError {}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("payload missing")]
    Missing,

    #[error("payload for {target} did not match: {reason}")]
    Invalid { target: &'static str, reason: String },

    #[error("payload for {target} is empty")]
    Empty { target: &'static str },
}

impl From<PayloadError> for ReviewError {
    fn from(e: PayloadError) -> Self {
        ReviewError::from_kind(ErrorKind::MalformedPayload).with_internal(e.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("screenshot limit {value} outside {min}..={max}")]
    ScreenshotLimitOutOfRange { value: usize, min: usize, max: usize },
}

impl From<ConfigError> for ReviewError {
    fn from(e: ConfigError) -> Self {
        ReviewError::new(ErrorKind::Config, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_message_falls_back_to_default() {
        let err = ReviewError::new(ErrorKind::Debug, "   ");
        assert_eq!(err.user_facing_message(), "There was an error debugging your code.");
    }

    #[test]
    fn display_includes_code_and_internal() {
        let err = ReviewError::new(ErrorKind::ScreenshotDelete, "nope").with_internal("EACCES");
        assert_eq!(err.to_string(), "[SCREENSHOT_DELETE_FAILED] nope (EACCES)");
    }

    #[test]
    fn payload_errors_are_not_user_visible() {
        let err: ReviewError = PayloadError::Missing.into();
        assert_eq!(err.kind, ErrorKind::MalformedPayload);
        assert!(!err.kind.is_user_visible());
        assert_eq!(err.internal_message.as_deref(), Some("payload missing"));
    }
}
