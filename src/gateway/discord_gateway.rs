use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use poise::serenity_prelude as serenity;
use serenity::CreateMessage;
use serenity::Http;
use serenity::UserId;

use crate::gateway::DeliveryGateway;
use crate::gateway::GatewayError;

/// Delivery over Discord direct messages.
pub struct DiscordGateway {
    http: Arc<Http>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>) -> Self {
        info!("Initializing DiscordGateway.");
        Self { http }
    }
}

#[async_trait]
impl DeliveryGateway for DiscordGateway {
    async fn send_to_user(&self, user_id: u64, text: &str) -> Result<(), GatewayError> {
        let user = self
            .http
            .get_user(UserId::new(user_id))
            .await
            .map_err(|e| GatewayError::UnknownRecipient {
                user_id,
                reason: e.to_string(),
            })?;

        user.direct_message(&self.http, CreateMessage::new().content(text))
            .await
            .map_err(|e| GatewayError::SendFailed {
                user_id,
                reason: e.to_string(),
            })?;

        Ok(())
    }
}
