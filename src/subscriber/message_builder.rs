//! User-facing message texts.

use crate::config::ScheduleConfig;
use crate::model::ReminderSlot;

pub fn reminder_text(slot: ReminderSlot) -> String {
    match slot {
        ReminderSlot::Morning => {
            "Good morning! Take a minute to write down what's on your mind. \
             Reply to this message with your entry, or react with an emoji to check in."
                .to_string()
        }
        ReminderSlot::Evening => {
            "Before the day ends, jot down a few thoughts in your journal. \
             A reply or an emoji reaction counts as a check-in."
                .to_string()
        }
    }
}

pub fn check_in_text(silent_days: u32) -> String {
    format!(
        "Hey, it's been {silent_days} days since your last check-in. Everything okay? \
         Even a single line or an emoji keeps the habit going."
    )
}

pub fn admin_alert_text(user_id: u64, silent_days: u32) -> String {
    format!("User {user_id} has been inactive for {silent_days} days.")
}

pub fn welcome_text(schedule: &ScheduleConfig) -> String {
    format!(
        "Welcome! I'll remind you to write in your journal each day at {} and {}. \
         Use /stop any time to unsubscribe.",
        schedule.reminder_times[0].format("%H:%M"),
        schedule.reminder_times[1].format("%H:%M"),
    )
}

pub fn welcome_back_text(schedule: &ScheduleConfig) -> String {
    format!(
        "Welcome back! Your daily reminders at {} and {} are active again, \
         starting with a fresh streak.",
        schedule.reminder_times[0].format("%H:%M"),
        schedule.reminder_times[1].format("%H:%M"),
    )
}

pub fn goodbye_text() -> String {
    "You've been unsubscribed from journaling reminders. Send /start to re-enable.".to_string()
}
