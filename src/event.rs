use chrono::DateTime;
use chrono::Utc;

use crate::model::ReminderSlot;
use crate::model::SubscriberModel;

pub mod event_bus;

/// Marker trait for events that can be dispatched through the event bus.
///
/// Automatically implemented methods aside from `as_any()`, which extracts
/// the concrete event type from a trait object.
pub trait Event: std::any::Any + Send + Sync + 'static {
    /// Downcast this event to a concrete type.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Get the name of the event type.
    fn event_name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// Inbound message or reaction from a platform user.
#[derive(Clone, Debug)]
pub struct InteractionEvent {
    pub user_id: u64,
    pub at: DateTime<Utc>,
    pub kind: InteractionKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionKind {
    Message,
    Reaction,
}

impl Event for InteractionEvent {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// A reminder slot has come due for a subscriber.
#[derive(Clone, Debug)]
pub struct ReminderDueEvent {
    pub subscriber: SubscriberModel,
    pub slot: ReminderSlot,
}

impl Event for ReminderDueEvent {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// A subscriber crossed the silence threshold during a sweep.
#[derive(Clone, Debug)]
pub struct EscalationEvent {
    pub subscriber: SubscriberModel,
    pub silent_days: u32,
}

impl Event for EscalationEvent {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
