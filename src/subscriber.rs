//! Event-bus consumers that turn scheduler decisions into outbound sends.
//!
//! Each consumer performs exactly one gateway call per event and updates the
//! subscriber store only after a confirmed delivery, so a failed send leaves
//! the bookkeeping ready for the next scheduled attempt.

use anyhow::Result;

pub mod escalation_subscriber;
pub mod interaction_subscriber;
pub mod message_builder;
pub mod reminder_subscriber;

#[async_trait::async_trait]
pub trait Subscriber<E> {
    async fn callback(&self, event: E) -> Result<()>;
}
