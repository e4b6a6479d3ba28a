use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum SchedulerOperation {
    /// Resolve after `delay_ms`, once the shell has finished its current task.
    Defer { delay_ms: u64 },
}

impl Operation for SchedulerOperation {
    type Output = ();
}

pub struct Scheduler<Ev> {
    context: CapabilityContext<SchedulerOperation, Ev>,
}

impl<Ev> Capability<Ev> for Scheduler<Ev> {
    type Operation = SchedulerOperation;
    type MappedSelf<MappedEv> = Scheduler<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Scheduler::new(self.context.map_event(f))
    }
}

impl<Ev> Scheduler<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<SchedulerOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn defer<F>(&self, delay_ms: u64, callback: F)
    where
        F: FnOnce() -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            context
                .request_from_shell(SchedulerOperation::Defer { delay_ms })
                .await;
            context.update_app(callback());
        });
    }
}
