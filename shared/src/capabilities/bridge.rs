use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::model::ScreenshotEntry;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum BridgeOperation {
    ListScreenshots,
    DeleteScreenshot { path: String },
    WriteClipboard { text: String },
}

impl BridgeOperation {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ListScreenshots => "list_screenshots",
            Self::DeleteScreenshot { .. } => "delete_screenshot",
            Self::WriteClipboard { .. } => "write_clipboard",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum BridgeOutput {
    Screenshots(Vec<ScreenshotEntry>),
    Deleted { success: bool },
    ClipboardWritten,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum BridgeError {
    #[error("platform call failed: {message}")]
    Platform { message: String },

    #[error("bridge unavailable")]
    Unavailable,

    #[error("unexpected response to {operation}")]
    UnexpectedResponse { operation: String },
}

pub type BridgeResult = Result<BridgeOutput, BridgeError>;

impl Operation for BridgeOperation {
    type Output = BridgeResult;
}

/// Screenshot store and clipboard on the host platform.
pub struct Bridge<Ev> {
    context: CapabilityContext<BridgeOperation, Ev>,
}

impl<Ev> Capability<Ev> for Bridge<Ev> {
    type Operation = BridgeOperation;
    type MappedSelf<MappedEv> = Bridge<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Bridge::new(self.context.map_event(f))
    }
}

impl<Ev> Bridge<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<BridgeOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn list_screenshots<F>(&self, callback: F)
    where
        F: FnOnce(BridgeResult) -> Ev + Send + 'static,
    {
        self.request(BridgeOperation::ListScreenshots, callback);
    }

    pub fn delete_screenshot<F>(&self, path: String, callback: F)
    where
        F: FnOnce(BridgeResult) -> Ev + Send + 'static,
    {
        self.request(BridgeOperation::DeleteScreenshot { path }, callback);
    }

    pub fn write_clipboard<F>(&self, text: String, callback: F)
    where
        F: FnOnce(BridgeResult) -> Ev + Send + 'static,
    {
        self.request(BridgeOperation::WriteClipboard { text }, callback);
    }

    fn request<F>(&self, operation: BridgeOperation, callback: F)
    where
        F: FnOnce(BridgeResult) -> Ev + Send + 'static,
    {
        debug!(operation = operation.name(), "bridge request");
        let context = self.context.clone();
        self.context.spawn(async move {
            let result = context.request_from_shell(operation).await;
            context.update_app(callback(result));
        });
    }
}
