//! Daily reminder fan-out task.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::NaiveTime;
use chrono::Utc;
use log::debug;
use log::error;
use log::info;
use tokio::time::sleep;

use crate::config::ScheduleConfig;
use crate::event::ReminderDueEvent;
use crate::event::event_bus::EventBus;
use crate::model::ReminderSlot;
use crate::service::Services;
use crate::task::next_occurrence;

/// Task that publishes a reminder event per subscriber at each configured
/// daily slot.
///
/// Sends are unconditional: an interaction earlier in the day does not
/// suppress the later slot.
pub struct ReminderPublisher {
    services: Arc<Services>,
    event_bus: Arc<EventBus>,
    schedule: ScheduleConfig,
    running: AtomicBool,
}

impl ReminderPublisher {
    /// Creates a new reminder publisher with the given configuration.
    pub fn new(
        services: Arc<Services>,
        event_bus: Arc<EventBus>,
        schedule: ScheduleConfig,
    ) -> Arc<Self> {
        info!(
            "Initializing ReminderPublisher with slots {} and {}.",
            schedule.reminder_times[0].format("%H:%M"),
            schedule.reminder_times[1].format("%H:%M"),
        );
        Arc::new(Self {
            services,
            event_bus,
            schedule,
            running: AtomicBool::new(false),
        })
    }

    /// Starts the reminder loop.
    pub fn start(self: Arc<Self>) -> anyhow::Result<()> {
        if !self.running.load(Ordering::SeqCst) {
            self.running.store(true, Ordering::SeqCst);
            info!("Starting ReminderPublisher loop.");
            self.spawn_loop();
        }
        Ok(())
    }

    /// Stops the reminder loop after the current wait elapses.
    pub fn stop(self: Arc<Self>) -> anyhow::Result<()> {
        info!("Stopping ReminderPublisher loop.");
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn spawn_loop(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                let now = Utc::now().with_timezone(&self.schedule.utc_offset);
                let Some(next) = next_occurrence(now, &self.schedule.reminder_times) else {
                    error!("No reminder slots configured. Stopping loop.");
                    break;
                };
                debug!("Next reminder slot at {next}.");
                sleep((next - now).to_std().unwrap_or(Duration::ZERO)).await;

                if !self.running.load(Ordering::SeqCst) {
                    info!("Stopping reminder loop.");
                    break;
                }

                let slot = self.slot_for(next.time());
                if let Err(e) = self.publish_due(slot).await {
                    error!("Error publishing {} reminders: {e}", slot.label());
                }
            }
        });
    }

    fn slot_for(&self, time: NaiveTime) -> ReminderSlot {
        if time == self.schedule.reminder_times[0] {
            ReminderSlot::Morning
        } else {
            ReminderSlot::Evening
        }
    }

    async fn publish_due(&self, slot: ReminderSlot) -> anyhow::Result<()> {
        let subscribers = self.services.subscription.list_subscribed().await?;
        info!(
            "Publishing {} reminder for {} subscriber(s).",
            slot.label(),
            subscribers.len()
        );

        for subscriber in subscribers {
            self.event_bus
                .publish(ReminderDueEvent { subscriber, slot });
        }

        Ok(())
    }
}
