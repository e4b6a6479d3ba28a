mod bridge;
mod scheduler;
mod subscriptions;
mod toast;

pub use self::bridge::{Bridge, BridgeError, BridgeOperation, BridgeOutput, BridgeResult};
pub use self::scheduler::{Scheduler, SchedulerOperation};
pub use self::subscriptions::{SubscriptionOperation, Subscriptions};
pub use self::toast::{Toast, ToastOperation, ToastVariant};

// Crux's built-in Render covers view updates.
pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub render: Render<Event>,
    pub bridge: Bridge<Event>,
    pub subscriptions: Subscriptions<Event>,
    pub toast: Toast<Event>,
    pub scheduler: Scheduler<Event>,
}
