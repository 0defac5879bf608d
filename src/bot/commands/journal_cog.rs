//! Subscriber-facing journaling commands.

use chrono::Utc;
use poise::Command;
use poise::CreateReply;

use crate::bot::Data;
use crate::bot::commands::Cog;
use crate::bot::commands::Context;
use crate::bot::commands::Error;
use crate::model::SilenceState;
use crate::service::subscription_service::EnrollResult;
use crate::service::subscription_service::UnenrollResult;
use crate::subscriber::message_builder;

/// Subscribe to daily journaling reminders
#[poise::command(slash_command)]
pub async fn start(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id.get();
    let data = ctx.data();

    let result = data
        .services
        .subscription
        .enroll(user_id, Utc::now())
        .await?;

    let schedule = &data.config.schedule;
    let reply = match result {
        EnrollResult::Enrolled { .. } => message_builder::welcome_text(schedule),
        EnrollResult::Resumed { .. } => message_builder::welcome_back_text(schedule),
        EnrollResult::AlreadySubscribed { .. } => format!(
            "You're already subscribed! Reminders arrive at {} and {}.",
            schedule.reminder_times[0].format("%H:%M"),
            schedule.reminder_times[1].format("%H:%M"),
        ),
    };
    ctx.say(reply).await?;
    Ok(())
}

/// Stop receiving journaling reminders
#[poise::command(slash_command)]
pub async fn stop(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id.get();

    let reply = match ctx.data().services.subscription.unenroll(user_id).await? {
        UnenrollResult::Unenrolled => message_builder::goodbye_text(),
        UnenrollResult::NotSubscribed => {
            "You're not subscribed. Use /start to enable daily reminders.".to_string()
        }
    };
    ctx.say(reply).await?;
    Ok(())
}

/// Show your subscription and check-in streak
#[poise::command(slash_command)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let user_id = ctx.author().id.get();
    let data = ctx.data();

    let Some(subscriber) = data.services.subscription.get(user_id).await? else {
        ctx.send(
            CreateReply::default()
                .content("You're not subscribed yet. Use /start to enable daily reminders.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    };

    if !subscriber.subscribed {
        ctx.send(
            CreateReply::default()
                .content("You're unsubscribed. Use /start to resume daily reminders.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let today = data.services.engagement.today();
    let last_entry = subscriber
        .last_interaction_date
        .map_or("never".to_string(), |d| d.to_string());
    let streak_line = match data.services.engagement.silence_state(&subscriber, today) {
        SilenceState::Active => "You've checked in today. Keep it up!".to_string(),
        SilenceState::Silent(days) => {
            format!("No check-in for {days} day(s). Your journal misses you!")
        }
        SilenceState::Escalated(days) => {
            format!("No check-in for {days} day(s). Any entry restarts your streak.")
        }
    };

    let schedule = &data.config.schedule;
    let message = format!(
        "**Subscribed:** yes\n**Reminders:** {} and {}\n**Last entry:** {}\n{}",
        schedule.reminder_times[0].format("%H:%M"),
        schedule.reminder_times[1].format("%H:%M"),
        last_entry,
        streak_line,
    );
    ctx.send(CreateReply::default().content(message).ephemeral(true))
        .await?;
    Ok(())
}

/// Cog for subscriber-facing commands.
pub struct JournalCog;

impl Cog for JournalCog {
    fn commands(&self) -> Vec<Command<Data, Error>> {
        vec![start(), stop(), status()]
    }
}
