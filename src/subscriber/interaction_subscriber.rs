use std::sync::Arc;

use anyhow::Result;
use log::debug;
use log::info;

use crate::event::InteractionEvent;
use crate::service::Services;
use crate::service::engagement_service::InteractionOutcome;
use crate::subscriber::Subscriber;

/// Records inbound messages and reactions against the subscriber store.
pub struct InteractionSubscriber {
    services: Arc<Services>,
}

impl InteractionSubscriber {
    pub fn new(services: Arc<Services>) -> Self {
        info!("Initializing InteractionSubscriber.");
        Self { services }
    }
}

#[async_trait::async_trait]
impl Subscriber<InteractionEvent> for InteractionSubscriber {
    async fn callback(&self, event: InteractionEvent) -> Result<()> {
        let outcome = self
            .services
            .engagement
            .record_interaction(event.user_id, event.at)
            .await?;

        match outcome {
            InteractionOutcome::Recorded { date } => {
                info!(
                    "Recorded {:?} interaction for user {} on {date}.",
                    event.kind, event.user_id
                );
            }
            InteractionOutcome::AlreadyCurrent => {
                debug!("User {} already interacted today.", event.user_id);
            }
            InteractionOutcome::Ignored => {}
        }

        Ok(())
    }
}
