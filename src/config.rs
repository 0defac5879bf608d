use std::path::PathBuf;

use chrono::FixedOffset;
use chrono::NaiveTime;
use log::warn;

use crate::error::AppError;

/// Fixed wall-clock triggers and silence policy, read once at startup and
/// passed into the scheduler tasks at construction.
#[derive(Clone, Debug)]
pub struct ScheduleConfig {
    /// Local times of the two daily reminder sends.
    pub reminder_times: [NaiveTime; 2],
    /// Local time of the daily silence sweep.
    pub sweep_time: NaiveTime,
    /// Consecutive silent days before the administrator is alerted.
    pub silence_threshold_days: u32,
    /// Offset used to bucket instants into calendar days.
    pub utc_offset: FixedOffset,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            reminder_times: [
                NaiveTime::from_hms_opt(10, 0, 0).expect("valid literal time"),
                NaiveTime::from_hms_opt(22, 0, 0).expect("valid literal time"),
            ],
            sweep_time: NaiveTime::from_hms_opt(9, 0, 0).expect("valid literal time"),
            silence_threshold_days: 3,
            utc_offset: FixedOffset::east_opt(0).expect("valid literal offset"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub discord_token: String,
    pub admin_id: Option<u64>,
    pub db_url: String,
    pub db_path: String,
    pub logs_path: PathBuf,
    pub schedule: ScheduleConfig,
}

impl Config {
    pub fn new() -> Self {
        Self {
            discord_token: String::new(),
            admin_id: None,
            db_url: "sqlite://data.db".to_string(),
            db_path: "data.db".to_string(),
            logs_path: PathBuf::from("logs"),
            schedule: ScheduleConfig::default(),
        }
    }

    /// Reads configuration from the environment, keeping defaults for unset keys.
    pub fn load(&mut self) -> Result<(), AppError> {
        self.discord_token =
            std::env::var("DISCORD_TOKEN").map_err(|_| AppError::MissingConfig {
                key: "DISCORD_TOKEN".to_string(),
            })?;

        // A malformed admin id disables escalation alerts instead of
        // refusing to start; the subscriber-facing behavior is unaffected.
        self.admin_id = match std::env::var("ADMIN_ID") {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!("ADMIN_ID is not a valid user id. Escalation alerts disabled.");
                    None
                }
            },
            Err(_) => None,
        };

        if let Ok(v) = std::env::var("DB_URL") {
            self.db_url = v;
        }
        if let Ok(v) = std::env::var("DB_PATH") {
            self.db_path = v;
        }
        if let Ok(v) = std::env::var("LOGS_PATH") {
            self.logs_path = PathBuf::from(v);
        }

        self.schedule.reminder_times = [
            Self::time_var("REMINDER_TIME_1", self.schedule.reminder_times[0])?,
            Self::time_var("REMINDER_TIME_2", self.schedule.reminder_times[1])?,
        ];
        self.schedule.sweep_time = Self::time_var("SWEEP_TIME", self.schedule.sweep_time)?;

        if let Ok(v) = std::env::var("SILENCE_THRESHOLD_DAYS") {
            self.schedule.silence_threshold_days =
                v.parse::<u32>().map_err(|e| AppError::ConfigurationError {
                    msg: format!("Invalid SILENCE_THRESHOLD_DAYS '{v}': {e}"),
                })?;
        }

        if let Ok(v) = std::env::var("UTC_OFFSET") {
            self.schedule.utc_offset =
                v.parse::<FixedOffset>()
                    .map_err(|e| AppError::ConfigurationError {
                        msg: format!("Invalid UTC_OFFSET '{v}' (expected e.g. '+02:00'): {e}"),
                    })?;
        }

        Ok(())
    }

    fn time_var(key: &str, default: NaiveTime) -> Result<NaiveTime, AppError> {
        match std::env::var(key) {
            Ok(v) => NaiveTime::parse_from_str(&v, "%H:%M").map_err(|e| {
                AppError::ConfigurationError {
                    msg: format!("Invalid {key} '{v}' (expected HH:MM): {e}"),
                }
            }),
            Err(_) => Ok(default),
        }
    }
}
