//! Silence tracking and escalation decisions.

use std::sync::Arc;

use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use log::debug;

use crate::config::ScheduleConfig;
use crate::model::BotMetaKey;
use crate::model::SilenceState;
use crate::model::SubscriberModel;
use crate::repository::Repository;
use crate::repository::table::Table;
use crate::service::error::ServiceError;

/// Service maintaining per-subscriber silence state.
///
/// Silence is always re-derived from the stored dates and today's date; the
/// `silent_days` column is bookkeeping refreshed by the sweep, never the
/// source of truth. Every write here is a single conditional UPDATE, so
/// replayed or concurrent triggers cannot double-count a day.
pub struct EngagementService {
    db: Arc<Repository>,
    schedule: ScheduleConfig,
}

impl EngagementService {
    pub fn new(db: Arc<Repository>, schedule: ScheduleConfig) -> Self {
        Self { db, schedule }
    }

    /// Today's calendar date in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        Utc::now()
            .with_timezone(&self.schedule.utc_offset)
            .date_naive()
    }

    pub fn silence_state(&self, subscriber: &SubscriberModel, today: NaiveDate) -> SilenceState {
        SilenceState::derive(
            subscriber,
            today,
            self.schedule.silence_threshold_days,
            &self.schedule.utc_offset,
        )
    }

    /// Records an inbound message or reaction.
    ///
    /// Idempotent: the interaction date only ever moves forward, and a
    /// same-or-earlier date changes nothing. Interactions from users without
    /// an active subscription are ignored.
    pub async fn record_interaction(
        &self,
        user_id: u64,
        at: DateTime<Utc>,
    ) -> Result<InteractionOutcome, ServiceError> {
        let date = at.with_timezone(&self.schedule.utc_offset).date_naive();

        let Some(subscriber) = self.db.subscriber.select(&user_id).await? else {
            debug!("Ignoring interaction from unknown user {user_id}.");
            return Ok(InteractionOutcome::Ignored);
        };
        if !subscriber.subscribed {
            debug!("Ignoring interaction from unsubscribed user {user_id}.");
            return Ok(InteractionOutcome::Ignored);
        }

        if self
            .db
            .subscriber
            .advance_interaction_date(user_id, date)
            .await?
        {
            Ok(InteractionOutcome::Recorded { date })
        } else {
            Ok(InteractionOutcome::AlreadyCurrent)
        }
    }

    /// Claims the sweep occurrence for `today`. Exactly one of several
    /// concurrent or replayed triggers wins the claim for a calendar day.
    pub async fn try_claim_sweep(&self, today: NaiveDate) -> Result<bool, ServiceError> {
        Ok(self
            .db
            .bot_meta
            .replace_if_greater(BotMetaKey::LastSweepDate, today.to_string())
            .await?)
    }

    /// Refreshes every subscribed user's silent-day count and collects those
    /// whose streak crossed the threshold without a prior alert.
    ///
    /// The returned subscribers carry the freshly computed count; actually
    /// sending the check-in and flipping `escalated` is the dispatcher's job
    /// so the flag only changes on confirmed delivery.
    pub async fn run_sweep(&self, today: NaiveDate) -> Result<SweepOutcome, ServiceError> {
        let subscribers = self.db.subscriber.select_all_subscribed().await?;

        let mut outcome = SweepOutcome::default();
        for mut subscriber in subscribers {
            let days = subscriber.days_silent(today, &self.schedule.utc_offset);
            self.db
                .subscriber
                .set_silent_days(subscriber.user_id, days as i64)
                .await?;
            outcome.swept += 1;

            if days >= self.schedule.silence_threshold_days && !subscriber.escalated {
                subscriber.silent_days = days as i64;
                outcome.escalations.push(subscriber);
            }
        }

        Ok(outcome)
    }

    /// Records a confirmed reminder delivery.
    pub async fn mark_reminded(
        &self,
        user_id: u64,
        at: DateTime<Utc>,
    ) -> Result<(), ServiceError> {
        Ok(self.db.subscriber.touch_reminded(user_id, &at).await?)
    }

    /// Flips the escalation flag, returning whether this caller won the
    /// claim. A lost claim means another trigger already alerted the
    /// administrator for this streak.
    pub async fn claim_escalation(&self, user_id: u64) -> Result<bool, ServiceError> {
        Ok(self.db.subscriber.claim_escalation(user_id).await?)
    }

    /// Subscribed users with at least one silent day, most silent first.
    pub async fn quiet_list(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<(SubscriberModel, u32)>, ServiceError> {
        let mut quiet: Vec<(SubscriberModel, u32)> = self
            .db
            .subscriber
            .select_all_subscribed()
            .await?
            .into_iter()
            .filter_map(|s| {
                let days = s.days_silent(today, &self.schedule.utc_offset);
                (days > 0).then_some((s, days))
            })
            .collect();
        quiet.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(quiet)
    }
}

pub enum InteractionOutcome {
    /// The interaction date moved forward; silence bookkeeping was reset.
    Recorded { date: NaiveDate },
    /// Same or earlier date than already stored; nothing changed.
    AlreadyCurrent,
    /// Unknown or unsubscribed user; nothing recorded.
    Ignored,
}

#[derive(Default)]
pub struct SweepOutcome {
    /// Number of subscribed users whose counters were refreshed.
    pub swept: usize,
    /// Users that crossed the threshold this sweep, with fresh counts.
    pub escalations: Vec<SubscriberModel>,
}
