//! Outbound message delivery.

use async_trait::async_trait;

pub mod discord_gateway;

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("Recipient {user_id} could not be resolved: {reason}")]
    UnknownRecipient { user_id: u64, reason: String },

    #[error("Delivery to {user_id} failed: {reason}")]
    SendFailed { user_id: u64, reason: String },
}

/// Transport capable of pushing a message to a user.
///
/// The transport's own timeout applies to a send; a timeout surfaces as a
/// [`GatewayError`] like any other delivery failure.
#[async_trait]
pub trait DeliveryGateway: Send + Sync {
    /// Sends `text` to the user's direct-message channel.
    async fn send_to_user(&self, user_id: u64, text: &str) -> Result<(), GatewayError>;
}
