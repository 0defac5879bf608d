use std::sync::Arc;

use anyhow::Result;
use log::debug;
use log::error;
use log::info;
use log::warn;

use crate::event::EscalationEvent;
use crate::gateway::DeliveryGateway;
use crate::service::Services;
use crate::subscriber::Subscriber;
use crate::subscriber::message_builder;

/// Sends the check-in message to a quiet subscriber and alerts the
/// administrator.
///
/// Order matters: the check-in is sent first, and only a confirmed delivery
/// flips the escalation flag. Of several concurrent triggers for the same
/// streak, only the one that wins the flip alerts the administrator.
pub struct EscalationSubscriber {
    gateway: Arc<dyn DeliveryGateway>,
    services: Arc<Services>,
    admin_id: Option<u64>,
}

impl EscalationSubscriber {
    pub fn new(
        gateway: Arc<dyn DeliveryGateway>,
        services: Arc<Services>,
        admin_id: Option<u64>,
    ) -> Self {
        info!(
            "Initializing EscalationSubscriber (admin alerts {}).",
            if admin_id.is_some() {
                "enabled"
            } else {
                "disabled"
            }
        );
        Self {
            gateway,
            services,
            admin_id,
        }
    }

    async fn escalate(&self, event: EscalationEvent) -> Result<()> {
        let user_id = event.subscriber.user_id;
        let days = event.silent_days;

        let check_in = message_builder::check_in_text(days);
        if let Err(e) = self.gateway.send_to_user(user_id, &check_in).await {
            // The flag stays unset so the next sweep retries.
            warn!("Failed to deliver check-in to user {user_id}: {e}");
            return Ok(());
        }

        if !self.services.engagement.claim_escalation(user_id).await? {
            debug!("Escalation for user {user_id} already claimed.");
            return Ok(());
        }
        info!("User {user_id} escalated after {days} silent days.");

        let Some(admin_id) = self.admin_id else {
            return Ok(());
        };
        let alert = message_builder::admin_alert_text(user_id, days);
        if let Err(e) = self.gateway.send_to_user(admin_id, &alert).await {
            error!("Failed to alert admin {admin_id} about user {user_id}: {e}");
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl Subscriber<EscalationEvent> for EscalationSubscriber {
    async fn callback(&self, event: EscalationEvent) -> Result<()> {
        self.escalate(event).await
    }
}
