use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToastVariant {
    Error,
    Neutral,
    Success,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ToastOperation {
    Show {
        title: String,
        message: String,
        variant: ToastVariant,
    },
}

impl Operation for ToastOperation {
    type Output = ();
}

/// Fire-and-forget notifications. The shell never answers.
pub struct Toast<Ev> {
    context: CapabilityContext<ToastOperation, Ev>,
}

impl<Ev> Capability<Ev> for Toast<Ev> {
    type Operation = ToastOperation;
    type MappedSelf<MappedEv> = Toast<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Toast::new(self.context.map_event(f))
    }
}

impl<Ev> Toast<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<ToastOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn show(&self, title: impl Into<String>, message: impl Into<String>, variant: ToastVariant) {
        let operation = ToastOperation::Show {
            title: title.into(),
            message: message.into(),
            variant,
        };
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(operation).await;
        });
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) {
        self.show(title, message, ToastVariant::Error);
    }

    pub fn neutral(&self, title: impl Into<String>, message: impl Into<String>) {
        self.show(title, message, ToastVariant::Neutral);
    }

    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) {
        self.show(title, message, ToastVariant::Success);
    }
}
