//! Poll commands: react to the invoking message with the requested options.

use crate::error_handler::CommandError;
use crate::extensions::Extension;
use crate::framework::{Context, Data, Error};
use crate::metadata::HelpCategory;
use async_trait::async_trait;
use csclub_poll::{
    CustomEmoji, EmojiCatalog, EmojiToken, Grammar, MessageContext, ReactionEmitter,
    ReactionParser, ReactionSurface,
};
use poise::serenity_prelude as serenity;
use tracing::debug;

/// The poll extension.
pub const EXTENSION: Extension = Extension {
    name: "cogs.poll",
    category: HelpCategory("Utils"),
    authors: &[141_294_044_671_246_337],
    commands,
};

fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![poll()]
}

/// Create a poll.
///
/// Reactions can be emoji, letters, numbers, or ranges like `A-D` and `0..5`.
/// `y`, `n` and `m` add yes, no and maybe. Unrecognised reactions are replaced
/// by yes/no/maybe.
#[poise::command(prefix_command, aliases("polls"), subcommands("lines"))]
pub async fn poll(
    ctx: Context<'_>,
    #[description = "Reactions to add"] reactions: String,
    #[description = "Poll text"]
    #[rest]
    content: Option<String>,
) -> Result<(), Error> {
    debug!(%reactions, has_content = content.is_some(), "Creating poll");
    react_to_invocation(ctx, &reactions, Grammar::Full).await
}

/// Create a poll. The emotes on each line are used as the reactions.
#[poise::command(prefix_command)]
pub async fn lines(
    ctx: Context<'_>,
    #[description = "Poll text, one option per line"]
    #[rest]
    content: Option<String>,
) -> Result<(), Error> {
    let content = content.unwrap_or_default();
    let text = split_lines(content.trim()).collect::<Vec<_>>().join("\n");
    react_to_invocation(ctx, &text, Grammar::Lines).await
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Splits `text` at every line boundary, including vertical tabs, form
/// feeds, and the unicode line and paragraph separators. `\r\n` is a single
/// boundary.
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split("\r\n").flat_map(|line| line.split(is_line_break))
}

async fn react_to_invocation(ctx: Context<'_>, input: &str, grammar: Grammar) -> Result<(), Error> {
    let poise::Context::Prefix(prefix) = ctx else {
        return Err(CommandError::BadArgument("Polls can only be created with a prefix command.".to_string()).into());
    };

    let message = message_context(ctx, prefix.msg);
    let tokens = {
        let catalog = CacheCatalog(ctx.cache());
        ReactionParser::new(&catalog)
            .grammar(grammar)
            .message(Some(&message))
            .parse(input)
    };

    let surface = DiscordSurface::new(ctx.serenity_context().clone());
    let report = ReactionEmitter::new()
        .emit(&surface, prefix.msg.clone(), &tokens)
        .await?;
    debug!(
        attached = report.attached,
        skipped = report.skipped,
        messages = report.messages,
        "Poll reactions sent"
    );
    Ok(())
}

/// Collects what the parser needs to know about the invoking message.
fn message_context(ctx: Context<'_>, msg: &serenity::Message) -> MessageContext {
    let guild_emojis = ctx
        .guild()
        .map(|guild| guild.emojis.values().map(CustomEmoji::from).collect());
    let reactions = msg
        .reactions
        .iter()
        .filter_map(|reaction| CustomEmoji::from_reaction(&reaction.reaction_type))
        .collect();

    MessageContext {
        guild_emojis,
        reactions,
    }
}

/// Custom emoji from every guild in the cache.
pub struct CacheCatalog<'a>(pub &'a serenity::Cache);

impl EmojiCatalog for CacheCatalog<'_> {
    fn emoji(&self, id: u64) -> Option<CustomEmoji> {
        if id == 0 {
            return None;
        }
        let id = serenity::EmojiId::new(id);
        self.0.guilds().into_iter().find_map(|guild_id| {
            self.0
                .guild(guild_id)
                .and_then(|guild| guild.emojis.get(&id).map(CustomEmoji::from))
        })
    }
}

/// Attaches reactions through the Discord API.
pub struct DiscordSurface {
    ctx: serenity::Context,
}

impl DiscordSurface {
    /// Creates a surface using `ctx` for HTTP access.
    pub const fn new(ctx: serenity::Context) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl ReactionSurface for DiscordSurface {
    type Message = serenity::Message;
    type Error = serenity::Error;

    async fn react(&self, message: &serenity::Message, token: &EmojiToken) -> Result<(), serenity::Error> {
        message
            .react(&self.ctx, serenity::ReactionType::from(token))
            .await
            .map(|_| ())
    }

    async fn follow_up(
        &self,
        after: &serenity::Message,
        content: &str,
    ) -> Result<serenity::Message, serenity::Error> {
        after.channel_id.say(&self.ctx, content).await
    }
}
