//! Shell-side event wiring.
//!
//! The platform pushes named events; [`EventBus`] fans them out to handlers
//! and [`SubscriptionTable`] owns one component's registrations so they are
//! added and removed as a single batch.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::capabilities::SubscriptionOperation;
use crate::event::{Event, PlatformEvent, PlatformEventName};

pub type Handler = Arc<dyn Fn(&PlatformEvent) + Send + Sync>;
pub type Unsubscribe = Box<dyn FnOnce() + Send>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

fn same_handler(a: &Handler, b: &Handler) -> bool {
    std::ptr::eq(Arc::as_ptr(a).cast::<()>(), Arc::as_ptr(b).cast::<()>())
}

/// Event name → handler, at most one per name.
#[derive(Clone, Default)]
pub struct HandlerSet {
    handlers: BTreeMap<PlatformEventName, Handler>,
}

impl HandlerSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: PlatformEventName, handler: Handler) -> Self {
        self.insert(name, handler);
        self
    }

    pub fn insert(&mut self, name: PlatformEventName, handler: Handler) -> Option<Handler> {
        self.handlers.insert(name, handler)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlatformEventName, &Handler)> {
        self.handlers.iter().map(|(name, handler)| (*name, handler))
    }

    #[must_use]
    pub fn names(&self) -> Vec<PlatformEventName> {
        self.handlers.keys().copied().collect()
    }

    /// Subset for the given names. Handlers keep their identity.
    #[must_use]
    pub fn only(&self, names: &[PlatformEventName]) -> Self {
        Self {
            handlers: self
                .handlers
                .iter()
                .filter(|(name, _)| names.contains(name))
                .map(|(name, handler)| (*name, Arc::clone(handler)))
                .collect(),
        }
    }

    /// True when both sets bind the same names to the very same handlers.
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        self.handlers.len() == other.handlers.len()
            && self.handlers.iter().all(|(name, handler)| {
                other
                    .handlers
                    .get(name)
                    .is_some_and(|theirs| same_handler(handler, theirs))
            })
    }
}

impl fmt::Debug for HandlerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

/// Anything that can register platform event handlers.
pub trait EventSource {
    /// Returns the handle that removes this registration, if the source
    /// supports removal at all.
    fn subscribe(&self, name: PlatformEventName, handler: Handler) -> Option<Unsubscribe>;

    fn subscribe_all(&self, handlers: &HandlerSet) -> Vec<(PlatformEventName, Option<Unsubscribe>)> {
        handlers
            .iter()
            .map(|(name, handler)| (name, self.subscribe(name, Arc::clone(handler))))
            .collect()
    }
}

type Listeners = BTreeMap<PlatformEventName, Vec<(SubscriptionId, Handler)>>;

/// In-process fan-out of platform events. Handlers for one name run in
/// registration order.
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Arc<Mutex<Listeners>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatches outside the lock so a handler may subscribe or unsubscribe.
    /// Returns how many handlers ran.
    #[instrument(skip_all, fields(event = %event.name()))]
    pub fn emit(&self, event: &PlatformEvent) -> usize {
        let handlers: Vec<Handler> = {
            let listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            listeners
                .get(&event.name())
                .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };
        for handler in &handlers {
            handler(event);
        }
        debug!(handlers = handlers.len(), "dispatched platform event");
        handlers.len()
    }

    #[must_use]
    pub fn listener_count(&self, name: PlatformEventName) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&name)
            .map_or(0, Vec::len)
    }

    fn register(listeners: &mut Listeners, name: PlatformEventName, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId::generate();
        listeners.entry(name).or_default().push((id, handler));
        id
    }

    fn unsubscriber(&self, name: PlatformEventName, id: SubscriptionId) -> Unsubscribe {
        let listeners: Weak<Mutex<Listeners>> = Arc::downgrade(&self.listeners);
        Box::new(move || {
            let Some(shared) = listeners.upgrade() else {
                return;
            };
            let mut table = shared.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(list) = table.get_mut(&name) {
                list.retain(|(existing, _)| *existing != id);
                if list.is_empty() {
                    table.remove(&name);
                }
            }
            debug!(event = %name, subscription = %id, "unsubscribed");
        })
    }
}

impl EventSource for EventBus {
    fn subscribe(&self, name: PlatformEventName, handler: Handler) -> Option<Unsubscribe> {
        let id = {
            let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            Self::register(&mut listeners, name, handler)
        };
        Some(self.unsubscriber(name, id))
    }

    /// The whole batch goes in under one lock, so no emit sees half of it.
    fn subscribe_all(&self, handlers: &HandlerSet) -> Vec<(PlatformEventName, Option<Unsubscribe>)> {
        let ids: Vec<(PlatformEventName, SubscriptionId)> = {
            let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
            handlers
                .iter()
                .map(|(name, handler)| (name, Self::register(&mut listeners, name, Arc::clone(handler))))
                .collect()
        };
        ids.into_iter()
            .map(|(name, id)| (name, Some(self.unsubscriber(name, id))))
            .collect()
    }
}

/// One component's live registrations.
#[derive(Default)]
pub struct SubscriptionTable {
    active: Option<HandlerSet>,
    handles: Vec<(PlatformEventName, Option<Unsubscribe>)>,
}

impl SubscriptionTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handlers` as one batch. Re-activating with the same handler
    /// identities is a no-op; a changed set is torn down and registered again.
    /// Returns whether anything was registered.
    pub fn activate<S>(&mut self, source: &S, handlers: HandlerSet) -> bool
    where
        S: EventSource + ?Sized,
    {
        if let Some(current) = &self.active {
            if current.same_identity(&handlers) {
                return false;
            }
            self.teardown();
        }
        self.handles = source.subscribe_all(&handlers);
        debug!(events = ?handlers.names(), "subscriptions registered");
        self.active = Some(handlers);
        true
    }

    /// Runs every held unregister handle; missing handles are skipped.
    /// Returns how many handles ran.
    pub fn teardown(&mut self) -> usize {
        let mut invoked = 0;
        for (name, handle) in self.handles.drain(..) {
            match handle {
                Some(unsubscribe) => {
                    unsubscribe();
                    invoked += 1;
                }
                None => debug!(event = %name, "no unregister handle"),
            }
        }
        if self.active.take().is_some() {
            debug!(invoked, "subscriptions torn down");
        }
        invoked
    }

    /// Carries out a batch the core asked for.
    pub fn apply<S>(&mut self, source: &S, operation: &SubscriptionOperation, handlers: &HandlerSet)
    where
        S: EventSource + ?Sized,
    {
        match operation {
            SubscriptionOperation::Register { events } => {
                self.activate(source, handlers.only(events));
            }
            SubscriptionOperation::Unregister { .. } => {
                self.teardown();
            }
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn registered(&self) -> Vec<PlatformEventName> {
        self.active.as_ref().map(HandlerSet::names).unwrap_or_default()
    }
}

impl Drop for SubscriptionTable {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Handlers that wrap every platform event into [`Event::Platform`] and pass
/// it to `sink`. Build once and reuse the set to keep identities stable.
pub fn forwarding_handlers<S>(sink: S) -> HandlerSet
where
    S: Fn(Event) + Send + Sync + 'static,
{
    let sink = Arc::new(sink);
    PlatformEventName::ALL
        .into_iter()
        .fold(HandlerSet::new(), |set, name| {
            let sink = Arc::clone(&sink);
            let handler: Handler =
                Arc::new(move |event: &PlatformEvent| (*sink)(Event::Platform(event.clone())));
            set.with(name, handler)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting() -> (Handler, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let handler: Handler = Arc::new(move |_: &PlatformEvent| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (handler, count)
    }

    /// Source that hands out no unregister handle for some names.
    struct PartialSource {
        bus: EventBus,
        without_handle: PlatformEventName,
    }

    impl EventSource for PartialSource {
        fn subscribe(&self, name: PlatformEventName, handler: Handler) -> Option<Unsubscribe> {
            let handle = self.bus.subscribe(name, handler);
            if name == self.without_handle {
                None
            } else {
                handle
            }
        }
    }

    #[test]
    fn emit_reaches_registered_handler() {
        let bus = EventBus::new();
        let (handler, count) = counting();
        let mut table = SubscriptionTable::new();
        table.activate(&bus, HandlerSet::new().with(PlatformEventName::DebugStart, handler));

        assert_eq!(bus.emit(&PlatformEvent::DebugStart), 1);
        assert_eq!(bus.emit(&PlatformEvent::ResetView), 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn teardown_removes_every_registration() {
        let bus = EventBus::new();
        let mut table = SubscriptionTable::new();
        let handlers = forwarding_handlers(|_| {});
        table.activate(&bus, handlers);
        assert!(PlatformEventName::ALL.iter().all(|n| bus.listener_count(*n) == 1));

        assert_eq!(table.teardown(), 10);
        assert!(!table.is_active());
        assert!(PlatformEventName::ALL.iter().all(|n| bus.listener_count(*n) == 0));
        assert_eq!(table.teardown(), 0);
    }

    #[test]
    fn teardown_tolerates_missing_handles() {
        let source = PartialSource {
            bus: EventBus::new(),
            without_handle: PlatformEventName::SolutionError,
        };
        let mut table = SubscriptionTable::new();
        table.activate(&source, forwarding_handlers(|_| {}));
        assert_eq!(table.teardown(), 9);
        assert_eq!(source.bus.listener_count(PlatformEventName::SolutionError), 1);
        assert_eq!(source.bus.listener_count(PlatformEventName::DebugError), 0);
    }

    #[test]
    fn same_handlers_do_not_churn() {
        let bus = EventBus::new();
        let handlers = forwarding_handlers(|_| {});
        let mut table = SubscriptionTable::new();

        assert!(table.activate(&bus, handlers.clone()));
        assert!(!table.activate(&bus, handlers.clone()));
        assert_eq!(bus.listener_count(PlatformEventName::ResetView), 1);

        assert!(table.activate(&bus, forwarding_handlers(|_| {})));
        assert_eq!(bus.listener_count(PlatformEventName::ResetView), 1);
    }

    #[test]
    fn dropping_table_unsubscribes() {
        let bus = EventBus::new();
        {
            let mut table = SubscriptionTable::new();
            table.activate(&bus, forwarding_handlers(|_| {}));
            assert_eq!(bus.listener_count(PlatformEventName::ScreenshotTaken), 1);
        }
        assert_eq!(bus.listener_count(PlatformEventName::ScreenshotTaken), 0);
    }

    #[test]
    fn apply_follows_core_batches() {
        let bus = EventBus::new();
        let handlers = forwarding_handlers(|_| {});
        let mut table = SubscriptionTable::new();

        table.apply(
            &bus,
            &SubscriptionOperation::Register {
                events: vec![PlatformEventName::DebugStart, PlatformEventName::DebugError],
            },
            &handlers,
        );
        assert_eq!(
            table.registered(),
            vec![PlatformEventName::DebugStart, PlatformEventName::DebugError]
        );

        table.apply(
            &bus,
            &SubscriptionOperation::Unregister {
                events: PlatformEventName::ALL.to_vec(),
            },
            &handlers,
        );
        assert!(!table.is_active());
        assert_eq!(bus.listener_count(PlatformEventName::DebugStart), 0);
    }

    #[test]
    fn forwarding_wraps_platform_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handlers = forwarding_handlers(move |event| sink.lock().unwrap().push(event));
        let bus = EventBus::new();
        let mut table = SubscriptionTable::new();
        table.activate(&bus, handlers);

        bus.emit(&PlatformEvent::SolutionError("boom".into()));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![Event::Platform(PlatformEvent::SolutionError("boom".into()))]
        );
    }

    #[test]
    fn unsubscribe_after_bus_dropped_is_noop() {
        let bus = EventBus::new();
        let handle = bus
            .subscribe(PlatformEventName::ResetView, counting().0)
            .unwrap();
        drop(bus);
        handle();
    }
}
