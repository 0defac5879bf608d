use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use log::info;
use log::warn;

use crate::event::ReminderDueEvent;
use crate::gateway::DeliveryGateway;
use crate::service::Services;
use crate::subscriber::Subscriber;
use crate::subscriber::message_builder;

/// Delivers reminder DMs and records confirmed deliveries.
pub struct ReminderSubscriber {
    gateway: Arc<dyn DeliveryGateway>,
    services: Arc<Services>,
}

impl ReminderSubscriber {
    pub fn new(gateway: Arc<dyn DeliveryGateway>, services: Arc<Services>) -> Self {
        info!("Initializing ReminderSubscriber.");
        Self { gateway, services }
    }

    async fn deliver(&self, event: ReminderDueEvent) -> Result<()> {
        let user_id = event.subscriber.user_id;
        let text = message_builder::reminder_text(event.slot);

        match self.gateway.send_to_user(user_id, &text).await {
            Ok(()) => {
                self.services
                    .engagement
                    .mark_reminded(user_id, Utc::now())
                    .await?;
                info!(
                    "Delivered {} reminder to user {user_id}.",
                    event.slot.label()
                );
            }
            Err(e) => {
                // Bookkeeping stays put so the next slot retries naturally.
                warn!(
                    "Failed to deliver {} reminder to user {user_id}: {e}",
                    event.slot.label()
                );
            }
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl Subscriber<ReminderDueEvent> for ReminderSubscriber {
    async fn callback(&self, event: ReminderDueEvent) -> Result<()> {
        self.deliver(event).await
    }
}
