//! Background tasks that fire on fixed local wall-clock times.

use chrono::DateTime;
use chrono::Days;
use chrono::FixedOffset;
use chrono::LocalResult;
use chrono::NaiveTime;

pub mod inactivity_sweeper;
pub mod reminder_publisher;

/// Earliest occurrence of any of `times` strictly after `now`, looking at
/// today and tomorrow. Returns `None` only for an empty `times`.
pub(crate) fn next_occurrence(
    now: DateTime<FixedOffset>,
    times: &[NaiveTime],
) -> Option<DateTime<FixedOffset>> {
    let today = now.date_naive();
    let mut best: Option<DateTime<FixedOffset>> = None;

    for &time in times {
        for day in [today, today + Days::new(1)] {
            // A fixed offset never yields ambiguous local times
            let LocalResult::Single(candidate) =
                day.and_time(time).and_local_timezone(now.timezone())
            else {
                continue;
            };
            if candidate > now && best.map_or(true, |b| candidate < b) {
                best = Some(candidate);
            }
        }
    }

    best
}
