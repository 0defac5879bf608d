use chrono::DateTime;
use chrono::FixedOffset;
use chrono::NaiveDate;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use sqlx::FromRow;

/// A user who opted in to daily journaling reminders.
///
/// Rows are never deleted: `/stop` flips `subscribed` off so the history is
/// still there if the user comes back. The silence fields are bookkeeping
/// maintained by the daily sweep; the source of truth for "how silent is this
/// user" is always the stored dates plus today's date.
#[derive(FromRow, Serialize, Deserialize, Default, Clone, Debug)]
pub struct SubscriberModel {
    #[serde(default)]
    #[sqlx(try_from = "i64")]
    pub user_id: u64,
    #[serde(default)]
    pub subscribed: bool,
    /// Instant of the most recent enrollment. Baseline for silence when no
    /// interaction has been recorded yet.
    #[serde(default)]
    pub subscribed_at: DateTime<Utc>,
    /// Calendar date (configured timezone) of the most recent inbound
    /// message or reaction. Only ever moves forward.
    #[serde(default)]
    pub last_interaction_date: Option<NaiveDate>,
    /// Consecutive silent days as of the last sweep.
    #[serde(default)]
    pub silent_days: i64,
    /// True once the administrator has been alerted for the current streak.
    #[serde(default)]
    pub escalated: bool,
    /// Instant of the last confirmed reminder delivery.
    #[serde(default)]
    pub last_reminded_at: Option<DateTime<Utc>>,
}

impl SubscriberModel {
    /// Calendar date the silence streak is measured from: the last recorded
    /// interaction, or the enrollment date when there is none yet.
    pub fn silence_baseline(&self, utc_offset: &FixedOffset) -> NaiveDate {
        match self.last_interaction_date {
            Some(date) => date,
            None => self.subscribed_at.with_timezone(utc_offset).date_naive(),
        }
    }

    /// Whole days elapsed between the silence baseline and `today`.
    pub fn days_silent(&self, today: NaiveDate, utc_offset: &FixedOffset) -> u32 {
        let days = (today - self.silence_baseline(utc_offset)).num_days();
        days.max(0) as u32
    }
}

/// Silence classification for a subscriber, re-derived from the stored dates
/// and today's date rather than held in memory. Crash-safe by construction:
/// the process can restart at any point and arrive at the same answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilenceState {
    /// Interacted today (or enrolled today with no interaction yet).
    Active,
    /// Silent for the given number of consecutive days, below escalation.
    Silent(u32),
    /// Past the threshold with the administrator already alerted. Sticky
    /// until an interaction resets the streak.
    Escalated(u32),
}

impl SilenceState {
    pub fn derive(
        subscriber: &SubscriberModel,
        today: NaiveDate,
        threshold_days: u32,
        utc_offset: &FixedOffset,
    ) -> Self {
        let days = subscriber.days_silent(today, utc_offset);
        if days == 0 {
            Self::Active
        } else if subscriber.escalated && days >= threshold_days {
            Self::Escalated(days)
        } else {
            Self::Silent(days)
        }
    }
}

/// Which of the two daily reminder sends an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderSlot {
    Morning,
    Evening,
}

impl ReminderSlot {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Evening => "evening",
        }
    }
}

/// Key-value store for bot metadata.
#[derive(FromRow, Serialize, Deserialize, Default, Clone, Debug)]
pub struct BotMetaModel {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

pub enum BotMetaKey {
    LastSweepDate,
}

impl From<&BotMetaKey> for String {
    fn from(value: &BotMetaKey) -> Self {
        match value {
            BotMetaKey::LastSweepDate => "last_sweep_date".to_string(),
        }
    }
}

impl From<BotMetaKey> for String {
    fn from(value: BotMetaKey) -> Self {
        String::from(&value)
    }
}
