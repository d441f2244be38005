//! Central error reporter, shipped as the `core.error` extension.
//!
//! Translates framework errors into chat replies. Unexpected command errors
//! are logged with their full debug form and the command's authors are
//! pointed at the attached `traceback.txt`.

use crate::extensions::Extension;
use crate::framework::{Context, Data, Error};
use crate::metadata::{CommandMetadata, HelpCategory};
use poise::serenity_prelude as serenity;
use poise::{CreateReply, FrameworkError};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, warn};

/// Name of the error reporter extension.
pub const EXTENSION_NAME: &str = "core.error";

/// The error reporter. It has no commands; unloading it hands errors back to
/// poise's default handler.
pub const EXTENSION: Extension = Extension {
    name: EXTENSION_NAME,
    category: HelpCategory("Core"),
    authors: &[],
    commands: Vec::new,
};

/// How long transient error replies stay up.
pub const DELETE_AFTER: Duration = Duration::from_secs(10);

/// Errors commands raise on purpose.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The user gave an argument the command cannot work with.
    #[error("{0}")]
    BadArgument(String),

    /// The command belongs to an extension that is not loaded.
    #[error("Extension '{0}' is not loaded.")]
    ExtensionUnloaded(String),
}

/// Who should hear about an unexpected error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Developers {
    /// The failing command is not part of any extension.
    Unknown,
    /// Nobody declared ownership of the command.
    NoneDeclared,
    /// Mentions of the authors that could be fetched.
    Found(Vec<String>),
    /// Authors are declared but none could be fetched.
    Unresolvable,
}

/// Text of the message notifying developers about an unexpected error.
pub fn dev_notice(simple: &str, developers: &Developers) -> String {
    match developers {
        Developers::Unknown => {
            format!("{simple}, something happened, one of the devs should check the logs.")
        }
        Developers::NoneDeclared => {
            format!("{simple}. btw the creator of this command is a coward.")
        }
        Developers::Found(mentions) => {
            let insert = if mentions.len() > 1 { "one of " } else { "" };
            format!(
                "{simple}. You should probably inform {insert}{}.",
                mentions.join(", ")
            )
        }
        Developers::Unresolvable => {
            format!("{simple}, but I couldn't find the creator of this command.")
        }
    }
}

/// Reply for a bad argument; falls back to a stock text when empty.
pub fn bad_argument_text(message: &str) -> String {
    if message.is_empty() {
        "Bad argument. No further information was specified.".to_string()
    } else {
        message.to_string()
    }
}

/// Reply for a command on cooldown.
pub fn cooldown_text(remaining: Duration) -> String {
    format!(
        ":snowflake: Please wait {:.2} seconds to use this command again.",
        remaining.as_secs_f64()
    )
}

/// Framework error handler.
pub async fn on_error(error: FrameworkError<'_, Data, Error>) {
    let reporter_loaded = error
        .ctx()
        .map_or(true, |ctx| ctx.data().extensions.is_loaded(EXTENSION_NAME));

    let result = if reporter_loaded {
        report(error).await
    } else {
        poise::builtins::on_error(error).await
    };

    if let Err(e) = result {
        error!("Error while handling error: {}", e);
    }
}

async fn report(error: FrameworkError<'_, Data, Error>) -> Result<(), serenity::Error> {
    match error {
        FrameworkError::Command { error, ctx, .. } => report_command_error(ctx, error).await,
        FrameworkError::CommandPanic { payload, ctx, .. } => {
            let detail = payload.unwrap_or_else(|| "command panicked".to_string());
            notify_devs(ctx, "Command panicked", &detail).await
        }
        FrameworkError::CommandCheckFailed { error, ctx, .. } => match error {
            Some(e) if is_unloaded_extension(&e) => Ok(()),
            Some(e) => say_temporary(ctx, format!("You can't do that. {e}")).await,
            None => say_temporary(ctx, "You can't do that. ").await,
        },
        FrameworkError::NotAnOwner { ctx, .. } => {
            say_temporary(ctx, "You can't do that. You do not own this bot.").await
        }
        FrameworkError::MissingUserPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            let detail = missing_permissions.map_or_else(
                || "I could not check your permissions.".to_string(),
                |missing| format!("You are missing {missing} permission(s) to run this command."),
            );
            say_temporary(ctx, format!("You can't do that. {detail}")).await
        }
        FrameworkError::MissingBotPermissions {
            missing_permissions,
            ctx,
            ..
        } => {
            say_temporary(
                ctx,
                format!("You can't do that. Bot requires {missing_permissions} permission(s) to run this command."),
            )
            .await
        }
        FrameworkError::GuildOnly { ctx, .. } => {
            say_temporary(ctx, "You can't do that. This command cannot be used in private messages.").await
        }
        FrameworkError::DmOnly { ctx, .. } => {
            say_temporary(ctx, "You can't do that. This command can only be used in private messages.").await
        }
        FrameworkError::NsfwOnly { ctx, .. } => {
            say_temporary(ctx, "You can't do that. This command can only be used in NSFW channels.").await
        }
        FrameworkError::UnknownCommand { .. } => Ok(()),
        FrameworkError::ArgumentParse { error, ctx, .. } => {
            let text = if error.is::<poise::TooFewArguments>() || error.is::<poise::TooManyArguments>() {
                format!("Error: {error}")
            } else {
                bad_argument_text(&error.to_string())
            };
            say_temporary(ctx, text).await
        }
        FrameworkError::CooldownHit {
            remaining_cooldown,
            ctx,
            ..
        } => {
            ctx.say(cooldown_text(remaining_cooldown)).await?;
            Ok(())
        }
        other => poise::builtins::on_error(other).await,
    }
}

async fn report_command_error(ctx: Context<'_>, error: Error) -> Result<(), serenity::Error> {
    if let Some(serenity::Error::Http(http)) = error.downcast_ref::<serenity::Error>() {
        if http.status_code().map(|status| status.as_u16()) == Some(403) {
            if let Err(e) = say_temporary(ctx, format!("Permissions error: `{error}`")).await {
                warn!("Could not report permissions error: {}", e);
            }
            return Ok(());
        }
    }

    if let Some(CommandError::BadArgument(message)) = error.downcast_ref::<CommandError>() {
        return say_temporary(ctx, bad_argument_text(message)).await;
    }

    notify_devs(ctx, &error.to_string(), &format!("{error:?}")).await
}

fn is_unloaded_extension(error: &Error) -> bool {
    matches!(
        error.downcast_ref::<CommandError>(),
        Some(CommandError::ExtensionUnloaded(_))
    )
}

/// Logs an unexpected error and tells the command's authors about it.
async fn notify_devs(ctx: Context<'_>, simple: &str, detail: &str) -> Result<(), serenity::Error> {
    error!(
        command = %ctx.command().qualified_name,
        "Unexpected command error: {}",
        detail
    );

    let developers = match ctx.command().meta() {
        None => Developers::Unknown,
        Some(meta) if meta.ownership.is_empty() => Developers::NoneDeclared,
        Some(meta) => {
            let mut mentions = Vec::new();
            for author in meta.ownership.authors() {
                match serenity::UserId::new(author.0).to_user(ctx).await {
                    Ok(_) => mentions.push(author.mention()),
                    Err(e) => warn!("Could not fetch developer {}: {}", author, e),
                }
            }
            if mentions.is_empty() {
                Developers::Unresolvable
            } else {
                Developers::Found(mentions)
            }
        }
    };

    let reply = CreateReply::default()
        .content(dev_notice(simple, &developers))
        .attachment(serenity::CreateAttachment::bytes(
            detail.as_bytes().to_vec(),
            "traceback.txt",
        ));
    ctx.send(reply).await?;
    Ok(())
}

/// Replies, then deletes the reply after [`DELETE_AFTER`].
pub async fn say_temporary(ctx: Context<'_>, content: impl Into<String>) -> Result<(), serenity::Error> {
    let message = ctx.say(content).await?.into_message().await?;
    let http = ctx.serenity_context().http.clone();

    tokio::spawn(async move {
        tokio::time::sleep(DELETE_AFTER).await;
        if let Err(e) = http.delete_message(message.channel_id, message.id, None).await {
            warn!("Could not delete temporary reply: {}", e);
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_notice_texts() {
        assert_eq!(
            dev_notice("boom", &Developers::Unknown),
            "boom, something happened, one of the devs should check the logs."
        );
        assert_eq!(
            dev_notice("boom", &Developers::NoneDeclared),
            "boom. btw the creator of this command is a coward."
        );
        assert_eq!(
            dev_notice("boom", &Developers::Found(vec!["<@1>".to_string()])),
            "boom. You should probably inform <@1>."
        );
        assert_eq!(
            dev_notice(
                "boom",
                &Developers::Found(vec!["<@1>".to_string(), "<@2>".to_string()])
            ),
            "boom. You should probably inform one of <@1>, <@2>."
        );
        assert_eq!(
            dev_notice("boom", &Developers::Unresolvable),
            "boom, but I couldn't find the creator of this command."
        );
    }

    #[test]
    fn test_bad_argument_text() {
        assert_eq!(
            bad_argument_text(""),
            "Bad argument. No further information was specified."
        );
        assert_eq!(bad_argument_text("too big"), "too big");
    }

    #[test]
    fn test_cooldown_text() {
        assert_eq!(
            cooldown_text(Duration::from_millis(2500)),
            ":snowflake: Please wait 2.50 seconds to use this command again."
        );
    }

    #[test]
    fn test_unloaded_extension_is_recognised() {
        let unloaded: Error = CommandError::ExtensionUnloaded("cogs.poll".to_string()).into();
        let other: Error = CommandError::BadArgument(String::new()).into();
        assert!(is_unloaded_extension(&unloaded));
        assert!(!is_unloaded_extension(&other));
    }
}
