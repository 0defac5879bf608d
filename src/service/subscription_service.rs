//! Subscription management service.

use std::sync::Arc;

use chrono::DateTime;
use chrono::FixedOffset;
use chrono::Utc;

use crate::model::SubscriberModel;
use crate::repository::Repository;
use crate::repository::table::Table;
use crate::service::error::ServiceError;

/// Service for enrolling and unenrolling reminder subscribers.
pub struct SubscriptionService {
    db: Arc<Repository>,
    utc_offset: FixedOffset,
}

impl SubscriptionService {
    pub fn new(db: Arc<Repository>, utc_offset: FixedOffset) -> Self {
        Self { db, utc_offset }
    }

    /// Subscribes a user, creating the row on first contact.
    ///
    /// Enrollment counts as an interaction: a returning user starts a fresh
    /// streak instead of being escalated from stale history on the next
    /// sweep.
    pub async fn enroll(
        &self,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<EnrollResult, ServiceError> {
        let today = now.with_timezone(&self.utc_offset).date_naive();

        match self.db.subscriber.select(&user_id).await? {
            Some(existing) if existing.subscribed => Ok(EnrollResult::AlreadySubscribed {
                subscriber: existing,
            }),
            Some(mut existing) => {
                existing.subscribed = true;
                existing.subscribed_at = now;
                existing.last_interaction_date = Some(today);
                existing.silent_days = 0;
                existing.escalated = false;
                self.db.subscriber.replace(&existing).await?;
                Ok(EnrollResult::Resumed {
                    subscriber: existing,
                })
            }
            None => {
                let subscriber = SubscriberModel {
                    user_id,
                    subscribed: true,
                    subscribed_at: now,
                    last_interaction_date: Some(today),
                    ..Default::default()
                };
                self.db.subscriber.replace(&subscriber).await?;
                Ok(EnrollResult::Enrolled { subscriber })
            }
        }
    }

    /// Marks a user as unsubscribed, keeping the row and its history.
    pub async fn unenroll(&self, user_id: u64) -> Result<UnenrollResult, ServiceError> {
        match self.db.subscriber.select(&user_id).await? {
            Some(existing) if existing.subscribed => {
                self.db.subscriber.set_subscribed(user_id, false).await?;
                Ok(UnenrollResult::Unenrolled)
            }
            _ => Ok(UnenrollResult::NotSubscribed),
        }
    }

    pub async fn get(&self, user_id: u64) -> Result<Option<SubscriberModel>, ServiceError> {
        Ok(self.db.subscriber.select(&user_id).await?)
    }

    pub async fn list_subscribed(&self) -> Result<Vec<SubscriberModel>, ServiceError> {
        Ok(self.db.subscriber.select_all_subscribed().await?)
    }
}

// Return types
pub enum EnrollResult {
    /// First-time subscription
    Enrolled { subscriber: SubscriberModel },
    /// Re-subscription of a previously unenrolled user
    Resumed { subscriber: SubscriberModel },
    /// Was already subscribed; nothing changed
    AlreadySubscribed { subscriber: SubscriberModel },
}

pub enum UnenrollResult {
    Unenrolled,
    NotSubscribed,
}
