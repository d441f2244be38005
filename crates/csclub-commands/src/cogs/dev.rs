//! Developer commands: updating the checkout, managing extensions, and
//! shutting down.
//!
//! Every command here is gated by [`developer_access`].

use crate::cogs::help::PAGE_LIMIT;
use crate::extensions::{qualify, Extension, ExtensionError};
use crate::framework::{Context, Data, Error};
use crate::metadata::HelpCategory;
use anyhow::{bail, Context as _};
use chrono::{DateTime, Utc};
use csclub_common::utils::{format_timestamp, truncate_string};
use csclub_common::{GuildId, RoleId};
use poise::serenity_prelude as serenity;
use tracing::{error, info};

/// The developer extension. It cannot be unloaded.
pub const EXTENSION: Extension = Extension {
    name: "cogs.dev",
    category: HelpCategory("Developer"),
    authors: &[],
    commands,
};

fn commands() -> Vec<poise::Command<Data, Error>> {
    let mut commands = vec![update(), reload(), load(), unload(), die(), version()];
    for command in &mut commands {
        require_developer(command);
    }
    commands
}

fn require_developer(command: &mut poise::Command<Data, Error>) {
    command.checks.push(|ctx| Box::pin(developer_check(ctx)));
    for subcommand in &mut command.subcommands {
        require_developer(subcommand);
    }
}

/// Whether someone may use developer commands.
///
/// Pass `permissions: None` outside guilds, together with empty role lists.
pub fn developer_access(
    dev_roles: &[RoleId],
    member_roles: &[RoleId],
    permissions: Option<serenity::Permissions>,
    is_owner: bool,
) -> bool {
    let has_dev_role = member_roles.iter().any(|role| dev_roles.contains(role));
    let can_manage = permissions.is_some_and(|permissions| {
        permissions.contains(serenity::Permissions::MANAGE_ROLES)
            || permissions.contains(serenity::Permissions::ADMINISTRATOR)
    });
    has_dev_role || can_manage || is_owner
}

async fn developer_check(ctx: Context<'_>) -> Result<bool, Error> {
    let is_owner = ctx.framework().options().owners.contains(&ctx.author().id);
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(is_owner);
    };

    let dev_roles = ctx
        .data()
        .config
        .get()
        .dev_roles_for(GuildId(guild_id.get()))
        .to_vec();
    let Some(member) = ctx.author_member().await else {
        return Ok(is_owner);
    };
    let member_roles: Vec<RoleId> = member.roles.iter().map(|role| RoleId(role.get())).collect();
    let permissions = ctx.guild().map(|guild| guild.member_permissions(&member));

    Ok(developer_access(&dev_roles, &member_roles, permissions, is_owner))
}

/// Updates the bot from the GitHub repo
#[poise::command(prefix_command, aliases("git_pull"))]
pub async fn update(
    ctx: Context<'_>,
    #[description = "Extension to reload afterwards"]
    #[rest]
    ext: Option<String>,
) -> Result<(), Error> {
    ctx.say(":warning: Warning! Pulling from Git!").await?;
    let output = git_pull().await?;
    ctx.say(git_response(&output)).await?;

    if let Some(ext) = ext {
        reload_extension(ctx, &ext).await?;
    }
    Ok(())
}

async fn git_pull() -> anyhow::Result<String> {
    let output = tokio::process::Command::new("git")
        .arg("pull")
        .output()
        .await
        .context("Failed to run git")?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    if !output.status.success() {
        bail!("git pull failed ({}): {}", output.status, text.trim());
    }
    Ok(text.trim_end().to_string())
}

/// Wraps `git pull` output in a diff block that fits in one message.
pub fn git_response(output: &str) -> String {
    const HEAD: &str = "`Git` response: ```diff\n";
    const TAIL: &str = "```";
    let budget = PAGE_LIMIT - HEAD.len() - TAIL.len();
    format!("{HEAD}{}{TAIL}", truncate_string(output, budget))
}

fn failure(action: &str, ext: &str, error: &impl std::fmt::Display) -> String {
    format!("Failed to {action}: `{ext}`\n```\n{error}\n```")
}

/// Reloads an extension
///
/// Also re-reads the configuration file. An extension that is not loaded
/// is loaded instead.
#[poise::command(prefix_command, subcommands("reload_all"))]
pub async fn reload(
    ctx: Context<'_>,
    #[description = "Extension name"]
    #[rest]
    ext: String,
) -> Result<(), Error> {
    reload_extension(ctx, &ext).await
}

async fn reload_extension(ctx: Context<'_>, ext: &str) -> Result<(), Error> {
    let ext = qualify(ext.trim());
    info!("Reloading {}", ext);

    let data = ctx.data();
    let result = data.extensions.reload(&ext).map_err(Error::from).and_then(|name| {
        data.config.reload()?;
        Ok(name)
    });

    match result {
        Ok(name) => {
            info!("Reloaded {}!", name);
            ctx.say(format!("👌 Reloaded extension `{name}` successfully"))
                .await?;
        }
        Err(e) if matches!(
            e.downcast_ref::<ExtensionError>(),
            Some(ExtensionError::NotLoaded(_))
        ) =>
        {
            load_extension(ctx, &ext).await?;
        }
        Err(e) => {
            error!("Error while reloading {}: {}", ext, e);
            ctx.say(failure("load", &ext, &e)).await?;
        }
    }
    Ok(())
}

/// Reloads all extensions
#[poise::command(prefix_command, rename = "all")]
pub async fn reload_all(ctx: Context<'_>) -> Result<(), Error> {
    info!("Reloading all extensions");
    let data = ctx.data();

    if let Err(e) = data.config.reload() {
        error!("Error while reloading configuration: {}", e);
        ctx.say(format!("Failed to load configuration:\n```\n{e}\n```"))
            .await?;
    }

    for ext in data.extensions.loaded() {
        info!("Reloading {}", ext);
        match data.extensions.reload(ext) {
            Ok(_) => info!("Reloaded {}!", ext),
            Err(e) => {
                error!("Error while reloading {}: {}", ext, e);
                ctx.say(format!("Failed to load `{ext}`:\n```\n{e}\n```"))
                    .await?;
            }
        }
    }

    ctx.say(format!(
        "👌 Reloaded {} extensions successfully",
        data.extensions.loaded().len()
    ))
    .await?;
    Ok(())
}

/// Loads an extension
#[poise::command(prefix_command)]
pub async fn load(
    ctx: Context<'_>,
    #[description = "Extension name"]
    #[rest]
    ext: String,
) -> Result<(), Error> {
    load_extension(ctx, &ext).await
}

async fn load_extension(ctx: Context<'_>, ext: &str) -> Result<(), Error> {
    let ext = qualify(ext.trim());
    info!("Loading {}", ext);

    match ctx.data().extensions.load(&ext) {
        Ok(name) => {
            info!("Loaded {}!", name);
            ctx.say(format!("👌 **Loaded** extension `{name}` successfully"))
                .await?;
        }
        Err(e) => {
            error!("Error while loading {}: {}", ext, e);
            ctx.say(failure("load", &ext, &e)).await?;
        }
    }
    Ok(())
}

/// Unloads an extension
#[poise::command(prefix_command)]
pub async fn unload(
    ctx: Context<'_>,
    #[description = "Extension name"]
    #[rest]
    ext: String,
) -> Result<(), Error> {
    let ext = qualify(ext.trim());
    info!("Unloading {}", ext);

    match ctx.data().extensions.unload(&ext) {
        Ok(name) => {
            info!("Unloaded {}!", name);
            ctx.say(format!("👌 **Unloaded** extension `{name}` successfully"))
                .await?;
        }
        Err(e) => {
            error!("Error while unloading {}: {}", ext, e);
            ctx.say(failure("unload", &ext, &e)).await?;
        }
    }
    Ok(())
}

/// Kill the bot. For real it kills the bot don't spam this please
#[poise::command(prefix_command, owners_only)]
pub async fn die(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(r"\*pop\*").await?;
    info!("Shutdown requested by {}", ctx.author().name);
    ctx.framework().shard_manager().shutdown_all().await;
    Ok(())
}

/// Prints version information about the bot and the platform it runs on
#[poise::command(prefix_command)]
pub async fn version(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(version_text(ctx.data().started_at)).await?;
    Ok(())
}

/// The `version` reply.
pub fn version_text(started_at: DateTime<Utc>) -> String {
    [
        format!("csclub-bot {}", env!("CARGO_PKG_VERSION")),
        String::new(),
        format!(
            "Running on {} ({})",
            std::env::consts::OS,
            std::env::consts::ARCH
        ),
        format!("Up since {}", format_timestamp(started_at)),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_dev_role_grants_access() {
        let dev = [RoleId(1)];
        assert!(developer_access(&dev, &[RoleId(2), RoleId(1)], Some(serenity::Permissions::empty()), false));
        assert!(!developer_access(&dev, &[RoleId(2)], Some(serenity::Permissions::empty()), false));
    }

    #[test]
    fn test_permissions_grant_access() {
        assert!(developer_access(&[], &[], Some(serenity::Permissions::MANAGE_ROLES), false));
        assert!(developer_access(&[], &[], Some(serenity::Permissions::ADMINISTRATOR), false));
        assert!(!developer_access(&[], &[], Some(serenity::Permissions::SEND_MESSAGES), false));
    }

    #[test]
    fn test_outside_guild_only_owners() {
        assert!(developer_access(&[], &[], None, true));
        assert!(!developer_access(&[], &[], None, false));
    }

    #[test]
    fn test_git_response_fits_in_a_message() {
        let short = git_response("Already up to date.");
        assert_eq!(short, "`Git` response: ```diff\nAlready up to date.```");

        let long = git_response(&"+ line\n".repeat(1000));
        assert!(long.chars().count() <= PAGE_LIMIT);
        assert!(long.ends_with("...```"));
    }

    #[test]
    fn test_version_text() {
        let started = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let text = version_text(started);
        assert!(text.starts_with("csclub-bot "));
        assert!(text.ends_with("Up since 2024-01-02 03:04:05 UTC"));
    }
}
