use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

use crate::event::PlatformEventName;

/// Batches are applied by the shell as a unit; see `SubscriptionTable`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubscriptionOperation {
    Register { events: Vec<PlatformEventName> },
    Unregister { events: Vec<PlatformEventName> },
}

impl Operation for SubscriptionOperation {
    type Output = ();
}

pub struct Subscriptions<Ev> {
    context: CapabilityContext<SubscriptionOperation, Ev>,
}

impl<Ev> Capability<Ev> for Subscriptions<Ev> {
    type Operation = SubscriptionOperation;
    type MappedSelf<MappedEv> = Subscriptions<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Subscriptions::new(self.context.map_event(f))
    }
}

impl<Ev> Subscriptions<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<SubscriptionOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn register(&self, events: Vec<PlatformEventName>) {
        self.notify(SubscriptionOperation::Register { events });
    }

    pub fn unregister(&self, events: Vec<PlatformEventName>) {
        self.notify(SubscriptionOperation::Unregister { events });
    }

    fn notify(&self, operation: SubscriptionOperation) {
        let context = self.context.clone();
        self.context.spawn(async move {
            context.notify_shell(operation).await;
        });
    }
}
