//! Daily silence sweep task.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;

use chrono::Utc;
use log::debug;
use log::error;
use log::info;
use tokio::time::sleep;

use crate::config::ScheduleConfig;
use crate::event::EscalationEvent;
use crate::event::event_bus::EventBus;
use crate::service::Services;
use crate::task::next_occurrence;

/// Task that refreshes silence counters once a day and publishes an
/// escalation event per newly threshold-crossing subscriber.
///
/// An occurrence is claimed through the store before any work, so a restart
/// that replays the trigger runs the pass at most once per calendar day. A
/// store failure skips the occurrence entirely; the next trigger recomputes
/// everything from the stored dates.
pub struct InactivitySweeper {
    services: Arc<Services>,
    event_bus: Arc<EventBus>,
    schedule: ScheduleConfig,
    running: AtomicBool,
}

impl InactivitySweeper {
    /// Creates a new sweeper with the given configuration.
    pub fn new(
        services: Arc<Services>,
        event_bus: Arc<EventBus>,
        schedule: ScheduleConfig,
    ) -> Arc<Self> {
        info!(
            "Initializing InactivitySweeper at {} with threshold {} day(s).",
            schedule.sweep_time.format("%H:%M"),
            schedule.silence_threshold_days,
        );
        Arc::new(Self {
            services,
            event_bus,
            schedule,
            running: AtomicBool::new(false),
        })
    }

    /// Starts the sweep loop.
    pub fn start(self: Arc<Self>) -> anyhow::Result<()> {
        if !self.running.load(Ordering::SeqCst) {
            self.running.store(true, Ordering::SeqCst);
            info!("Starting InactivitySweeper loop.");
            self.spawn_loop();
        }
        Ok(())
    }

    /// Stops the sweep loop after the current wait elapses.
    pub fn stop(self: Arc<Self>) -> anyhow::Result<()> {
        info!("Stopping InactivitySweeper loop.");
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn spawn_loop(self: Arc<Self>) {
        tokio::spawn(async move {
            loop {
                let now = Utc::now().with_timezone(&self.schedule.utc_offset);
                let Some(next) = next_occurrence(now, &[self.schedule.sweep_time]) else {
                    error!("No sweep time configured. Stopping loop.");
                    break;
                };
                debug!("Next sweep at {next}.");
                sleep((next - now).to_std().unwrap_or(Duration::ZERO)).await;

                if !self.running.load(Ordering::SeqCst) {
                    info!("Stopping sweep loop.");
                    break;
                }

                if let Err(e) = self.sweep().await {
                    error!("Error running sweep: {e}");
                }
            }
        });
    }

    async fn sweep(&self) -> anyhow::Result<()> {
        let today = Utc::now()
            .with_timezone(&self.schedule.utc_offset)
            .date_naive();

        if !self.services.engagement.try_claim_sweep(today).await? {
            info!("Sweep for {today} already ran. Skipping.");
            return Ok(());
        }

        let outcome = self.services.engagement.run_sweep(today).await?;
        info!(
            "Swept {} subscriber(s), {} escalation(s).",
            outcome.swept,
            outcome.escalations.len()
        );

        for subscriber in outcome.escalations {
            let silent_days = subscriber.silent_days.max(0) as u32;
            self.event_bus.publish(EscalationEvent {
                subscriber,
                silent_days,
            });
        }

        Ok(())
    }
}
