use crux_core::testing::AppTester;
use review_core::subscription::{forwarding_handlers, EventBus, SubscriptionTable};
use review_core::{App, Effect, Event, Model, PlatformEvent, PlatformEventName, ViewState};
use serde_json::json;
use tokio::sync::mpsc;

fn apply_subscriptions(
    effects: Vec<Effect>,
    table: &mut SubscriptionTable,
    bus: &EventBus,
    handlers: &review_core::subscription::HandlerSet,
) {
    for effect in effects {
        if let Effect::Subscriptions(request) = effect {
            table.apply(bus, &request.operation, handlers);
        }
    }
}

#[tokio::test(flavor = "current_thread")]
async fn platform_events_reach_the_core_through_the_bus() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let handlers = forwarding_handlers(move |event| {
        let _ = tx.send(event);
    });
    let bus = EventBus::new();
    let mut table = SubscriptionTable::new();

    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    let update = app.update(Event::Mounted, &mut model);
    apply_subscriptions(update.effects, &mut table, &bus, &handlers);
    assert_eq!(table.registered(), PlatformEventName::ALL.to_vec());

    bus.emit(&PlatformEvent::ProblemExtracted(json!({ "problem_statement": "Two sum" })));
    bus.emit(&PlatformEvent::SolutionStart);

    for _ in 0..2 {
        let event = rx.recv().await.expect("forwarded event");
        let _ = app.update(event, &mut model);
    }

    match app.view(&model).state {
        ViewState::Solution {
            problem_statement,
            is_loading,
            ..
        } => {
            assert_eq!(problem_statement.as_deref(), Some("Two sum"));
            assert!(is_loading);
        }
        other => panic!("expected solution layout, got {other:?}"),
    }

    let update = app.update(Event::Unmounted, &mut model);
    apply_subscriptions(update.effects, &mut table, &bus, &handlers);
    assert!(!table.is_active());
    assert_eq!(bus.emit(&PlatformEvent::ResetView), 0);
    assert!(rx.try_recv().is_err());
}

#[tokio::test(flavor = "current_thread")]
async fn remount_with_same_handlers_registers_once_per_event() {
    let (tx, _rx) = mpsc::unbounded_channel::<Event>();
    let handlers = forwarding_handlers(move |event| {
        let _ = tx.send(event);
    });
    let bus = EventBus::new();
    let mut table = SubscriptionTable::new();
    let app = AppTester::<App, Effect>::default();
    let mut model = Model::default();

    for _ in 0..3 {
        let update = app.update(Event::Mounted, &mut model);
        apply_subscriptions(update.effects, &mut table, &bus, &handlers);
        let update = app.update(Event::Unmounted, &mut model);
        apply_subscriptions(update.effects, &mut table, &bus, &handlers);
    }
    let update = app.update(Event::Mounted, &mut model);
    apply_subscriptions(update.effects, &mut table, &bus, &handlers);

    assert!(PlatformEventName::ALL
        .iter()
        .all(|name| bus.listener_count(*name) == 1));
    assert_eq!(model.mount.epoch, 4);
}
