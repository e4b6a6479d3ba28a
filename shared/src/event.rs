use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::capabilities::BridgeResult;
use crate::config::ReviewConfig;

/// Names of the platform events the review screen listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlatformEventName {
    ScreenshotTaken,
    ResetView,
    SolutionStart,
    ProblemExtracted,
    SolutionError,
    SolutionSuccess,
    DebugStart,
    DebugSuccess,
    DebugError,
    ProcessingNoScreenshots,
}

impl PlatformEventName {
    pub const ALL: [PlatformEventName; 10] = [
        Self::ScreenshotTaken,
        Self::ResetView,
        Self::SolutionStart,
        Self::ProblemExtracted,
        Self::SolutionError,
        Self::SolutionSuccess,
        Self::DebugStart,
        Self::DebugSuccess,
        Self::DebugError,
        Self::ProcessingNoScreenshots,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ScreenshotTaken => "screenshot-taken",
            Self::ResetView => "reset-view",
            Self::SolutionStart => "solution-start",
            Self::ProblemExtracted => "problem-extracted",
            Self::SolutionError => "solution-error",
            Self::SolutionSuccess => "solution-success",
            Self::DebugStart => "debug-start",
            Self::DebugSuccess => "debug-success",
            Self::DebugError => "debug-error",
            Self::ProcessingNoScreenshots => "processing-no-screenshots",
        }
    }
}

impl fmt::Display for PlatformEventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform event: {0}")]
pub struct UnknownEventName(pub String);

impl FromStr for PlatformEventName {
    type Err = UnknownEventName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownEventName(s.to_string()))
    }
}

/// An event pushed by the platform bridge. Payloads stay as raw JSON until a
/// handler validates them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum PlatformEvent {
    ScreenshotTaken,
    ResetView,
    SolutionStart,
    ProblemExtracted(Value),
    SolutionError(String),
    SolutionSuccess(Option<Value>),
    DebugStart,
    DebugSuccess(Value),
    DebugError(String),
    ProcessingNoScreenshots,
}

impl PlatformEvent {
    #[must_use]
    pub const fn name(&self) -> PlatformEventName {
        match self {
            Self::ScreenshotTaken => PlatformEventName::ScreenshotTaken,
            Self::ResetView => PlatformEventName::ResetView,
            Self::SolutionStart => PlatformEventName::SolutionStart,
            Self::ProblemExtracted(_) => PlatformEventName::ProblemExtracted,
            Self::SolutionError(_) => PlatformEventName::SolutionError,
            Self::SolutionSuccess(_) => PlatformEventName::SolutionSuccess,
            Self::DebugStart => PlatformEventName::DebugStart,
            Self::DebugSuccess(_) => PlatformEventName::DebugSuccess,
            Self::DebugError(_) => PlatformEventName::DebugError,
            Self::ProcessingNoScreenshots => PlatformEventName::ProcessingNoScreenshots,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    Noop,

    // shell lifecycle
    Mounted,
    Unmounted,
    Configure(ReviewConfig),

    Platform(PlatformEvent),

    // user actions
    DeleteScreenshot { index: usize },
    CopyCode,

    // capability responses; skipped by the shell's FFI
    #[serde(skip)]
    ScreenshotsFetched {
        epoch: u64,
        generation: u64,
        result: BridgeResult,
    },
    #[serde(skip)]
    ScreenshotDeleted {
        epoch: u64,
        path: String,
        result: BridgeResult,
    },
    #[serde(skip)]
    CodeCopied { epoch: u64, result: BridgeResult },
    #[serde(skip)]
    ResetSettled { generation: u64 },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Noop => "noop",
            Self::Mounted => "mounted",
            Self::Unmounted => "unmounted",
            Self::Configure(_) => "configure",
            Self::Platform(event) => event.name().as_str(),
            Self::DeleteScreenshot { .. } => "delete_screenshot",
            Self::CopyCode => "copy_code",
            Self::ScreenshotsFetched { .. } => "screenshots_fetched",
            Self::ScreenshotDeleted { .. } => "screenshot_deleted",
            Self::CodeCopied { .. } => "code_copied",
            Self::ResetSettled { .. } => "reset_settled",
        }
    }

    #[must_use]
    pub const fn is_user_action(&self) -> bool {
        matches!(self, Self::DeleteScreenshot { .. } | Self::CopyCode)
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::Noop
    }
}

impl From<PlatformEvent> for Event {
    fn from(event: PlatformEvent) -> Self {
        Self::Platform(event)
    }
}
