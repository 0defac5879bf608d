//! Owner-only maintenance commands.

use poise::Command;
use poise::CreateReply;
use poise::serenity_prelude::CreateAttachment;

use crate::bot::Data;
use crate::bot::commands::Cog;
use crate::bot::commands::Context;
use crate::bot::commands::Error;
use crate::bot::error::BotError;

/// Register slash commands in the current guild
#[poise::command(prefix_command, hide_in_help, owners_only)]
pub async fn register(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(BotError::GuildOnlyCommand)?;

    let create_commands =
        poise::builtins::create_application_commands(&ctx.framework().options.commands);
    let num_commands = create_commands.len();

    let start_time = std::time::Instant::now();
    let reply = ctx
        .reply(format!(
            ":gear: Registering {num_commands} guild commands..."
        ))
        .await?;
    guild_id
        .set_commands(ctx.serenity_context(), create_commands)
        .await?;

    reply
        .edit(
            ctx,
            CreateReply::default().content(format!(
                ":white_check_mark: Done! Took {}ms",
                start_time.elapsed().as_millis()
            )),
        )
        .await?;

    Ok(())
}

/// Remove slash commands from the current guild
#[poise::command(prefix_command, hide_in_help, owners_only)]
pub async fn unregister(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or(BotError::GuildOnlyCommand)?;

    let start_time = std::time::Instant::now();
    let reply = ctx.reply(":gear: Unregistering guild commands...").await?;
    guild_id
        .set_commands(ctx.serenity_context(), Vec::new())
        .await?;

    reply
        .edit(
            ctx,
            CreateReply::default().content(format!(
                ":white_check_mark: Done! Took {}ms",
                start_time.elapsed().as_millis()
            )),
        )
        .await?;

    Ok(())
}

/// List subscribers who haven't checked in recently
#[poise::command(slash_command, owners_only)]
pub async fn quiet_list(ctx: Context<'_>) -> Result<(), Error> {
    let services = &ctx.data().services;
    let today = services.engagement.today();
    let quiet = services.engagement.quiet_list(today).await?;

    if quiet.is_empty() {
        ctx.say("Everyone has checked in recently.").await?;
        return Ok(());
    }

    let mut lines = vec![format!("{} subscriber(s) currently silent:", quiet.len())];
    for (subscriber, days) in quiet {
        let last_entry = subscriber
            .last_interaction_date
            .map_or("never".to_string(), |d| d.to_string());
        let alerted = if subscriber.escalated {
            " (alerted)"
        } else {
            ""
        };
        lines.push(format!(
            "- <@{}>: {} day(s) silent, last entry {}{}",
            subscriber.user_id, days, last_entry, alerted
        ));
    }
    ctx.send(
        CreateReply::default()
            .content(lines.join("\n"))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Dump the database as a JSON attachment
#[poise::command(slash_command, owners_only)]
pub async fn dump_db(ctx: Context<'_>) -> Result<(), Error> {
    let dump = ctx.data().services.maintenance.dump_database().await?;
    let json = serde_json::to_string_pretty(&dump)?;

    ctx.send(
        CreateReply::default()
            .attachment(CreateAttachment::bytes(
                json.into_bytes(),
                "quill-bot-dump.json",
            ))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Cog of bot-owner only commands.
pub struct AdminCog;

impl Cog for AdminCog {
    fn commands(&self) -> Vec<Command<Data, Error>> {
        vec![register(), unregister(), quiet_list(), dump_db()]
    }
}
