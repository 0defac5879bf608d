//! Error handling for Discord bot commands.

use log::error;
use poise::CreateReply;
use poise::FrameworkError;

use crate::bot::Data;
use crate::bot::Error;
use crate::bot::error::BotError;
use crate::error::AppError;
use crate::service::error::ServiceError;

/// Handles framework errors and sends appropriate responses to users.
pub struct ErrorHandler;

impl ErrorHandler {
    /// Handles a framework error by classifying and responding appropriately.
    pub async fn handle(error: FrameworkError<'_, Data, Error>) {
        match error {
            FrameworkError::Command { error, ctx, .. } => {
                let (title, description) = Self::classify_error(&error, &ctx);
                let message = format!(
                    "## {}\n\n**Command:** `{}`\n**Error:** {}",
                    title,
                    ctx.command().qualified_name,
                    description
                );
                Self::send_reply(&ctx, &message).await;
            }
            FrameworkError::ArgumentParse { error, ctx, .. } => {
                let message = format!(
                    "## ⚠️ Invalid Arguments\n\n**Command:** `/{}`\n**Issue:** {}",
                    ctx.command().name,
                    error
                );
                Self::send_reply(&ctx, &message).await;
            }
            error => {
                if let Err(e) = poise::builtins::on_error(error).await {
                    error!("Error while handling error: {}", e);
                }
            }
        }
    }

    /// Classifies an error and returns user-friendly title and description.
    fn classify_error(
        error: &Error,
        ctx: &poise::Context<'_, Data, Error>,
    ) -> (&'static str, String) {
        if let Some(bot_error) = error.downcast_ref::<BotError>() {
            ("❌ Action Failed", bot_error.to_string())
        } else if let Some(service_error) = error.downcast_ref::<ServiceError>() {
            ("❌ Service Error", service_error.to_string())
        } else {
            let ref_id = AppError::log_with_ref(error);
            error!(
                "Unexpected error in command `{}`: {:?}",
                ctx.command().name,
                error
            );
            (
                "❌ Internal Error",
                format!(
                    "An unexpected error occurred. Please contact the bot developer.\n-# Reference ID: {}",
                    ref_id
                ),
            )
        }
    }

    /// Sends an error message as an ephemeral reply.
    async fn send_reply(ctx: &poise::Context<'_, Data, Error>, message: &str) {
        let _ = ctx
            .send(CreateReply::default().content(message).ephemeral(true))
            .await;
    }
}
