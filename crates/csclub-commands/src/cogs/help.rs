//! The `help` command.
//!
//! Rendering is split from sending: [`HelpCatalog`] is a snapshot of the
//! visible commands and turns a query into pages of text, which the command
//! then sends one message per page.

use crate::extensions::{self, Extension, ExtensionRegistry};
use crate::framework::{Context, Data, Error};
use crate::metadata::{CommandMetadata, HelpCategory, Ownership};
use csclub_common::utils::escape_markdown;
use csclub_common::UserId;
use std::collections::BTreeMap;

/// The help extension.
pub const EXTENSION: Extension = Extension {
    name: "cogs.help",
    category: HelpCategory("Misc"),
    authors: &[141_294_044_671_246_337],
    commands,
};

/// Longest message Discord accepts.
pub const PAGE_LIMIT: usize = 2000;

/// Category that is always listed last.
const LAST_CATEGORY: &str = "Misc";

fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![help()]
}

/// Shows this message
///
/// Give a command name for in-depth help on it, or a category name to list
/// the commands in that category.
#[poise::command(prefix_command)]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Command or category"]
    #[rest]
    query: Option<String>,
) -> Result<(), Error> {
    let catalog = HelpCatalog::from_commands(
        &ctx.framework().options().commands,
        &ctx.data().extensions,
    );
    for page in catalog.render(ctx.prefix(), ctx.invoked_command_name(), query.as_deref()) {
        ctx.say(page).await?;
    }
    Ok(())
}

/// A command as help shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    /// Command name.
    pub name: String,
    /// Name including parent commands, e.g. `poll lines`.
    pub qualified_name: String,
    /// Alternative names.
    pub aliases: Vec<String>,
    /// First paragraph of the documentation.
    pub description: Option<String>,
    /// Remaining documentation.
    pub help_text: Option<String>,
    /// Parameters as `<required>` and `[optional]`.
    pub signature: String,
    /// Help category name.
    pub category: String,
    /// Authors of the command.
    pub authors: Vec<UserId>,
    /// Visible subcommands in definition order.
    pub subcommands: Vec<HelpEntry>,
}

impl HelpEntry {
    /// Snapshot of a registered command and its visible subcommands.
    pub fn from_command<U, E>(command: &poise::Command<U, E>) -> Self {
        let signature = command
            .parameters
            .iter()
            .map(|parameter| {
                if parameter.required {
                    format!("<{}>", parameter.name)
                } else {
                    format!("[{}]", parameter.name)
                }
            })
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            name: command.name.clone(),
            qualified_name: command.qualified_name.clone(),
            aliases: command.aliases.clone(),
            description: command.description.clone(),
            help_text: command.help_text.clone(),
            signature,
            category: command
                .help_category()
                .map_or_else(|| "No Category".to_string(), |category| category.to_string()),
            authors: command.ownership().authors().collect(),
            subcommands: command
                .subcommands
                .iter()
                .filter(|subcommand| !subcommand.hide_in_help)
                .map(Self::from_command)
                .collect(),
        }
    }

    fn matches(&self, key: &str) -> bool {
        self.name == key || self.aliases.iter().any(|alias| alias == key)
    }

    fn short_doc(&self) -> &str {
        self.description.as_deref().unwrap_or_default().trim()
    }

    fn full_help(&self) -> String {
        match (&self.description, &self.help_text) {
            (Some(description), Some(help)) => format!("{}\n\n{}", description.trim(), help.trim()),
            (Some(text), None) | (None, Some(text)) => text.trim().to_string(),
            (None, None) => String::new(),
        }
    }

    fn parent_name(&self) -> Option<&str> {
        self.qualified_name
            .strip_suffix(self.name.as_str())
            .map(str::trim_end)
            .filter(|parent| !parent.is_empty())
    }
}

/// Splits text into messages of at most `max_size` characters, breaking
/// between lines.
#[derive(Debug, Clone)]
pub struct Paginator {
    max_size: usize,
    lines: Vec<String>,
    count: usize,
    pages: Vec<String>,
}

impl Paginator {
    /// An empty paginator; `max_size` must be at least 2.
    pub const fn new(max_size: usize) -> Self {
        Self {
            max_size,
            lines: Vec::new(),
            count: 0,
            pages: Vec::new(),
        }
    }

    /// Adds one line, hard-wrapping it when it alone would overflow a page.
    pub fn add_line(&mut self, line: &str) {
        let len = line.chars().count();
        if len >= self.max_size {
            let chars: Vec<char> = line.chars().collect();
            for chunk in chars.chunks(self.max_size - 1) {
                self.add_line(&chunk.iter().collect::<String>());
            }
            return;
        }

        if self.count + len + 1 > self.max_size {
            self.close_page();
        }
        self.count += len + 1;
        self.lines.push(line.to_string());
    }

    /// Adds each line of `text`.
    pub fn add_text(&mut self, text: &str) {
        for line in text.lines() {
            self.add_line(line);
        }
    }

    /// Adds an empty line.
    pub fn add_blank(&mut self) {
        self.add_line("");
    }

    /// Ends the current page.
    pub fn close_page(&mut self) {
        if self.lines.is_empty() {
            return;
        }
        self.pages.push(self.lines.join("\n"));
        self.lines.clear();
        self.count = 0;
    }

    /// All pages, the current one included.
    pub fn finish(mut self) -> Vec<String> {
        self.close_page();
        self.pages
    }
}

enum Found<'a> {
    Command(&'a HelpEntry),
    Category(String),
}

/// The commands help can show, grouped by category.
#[derive(Debug, Clone, Default)]
pub struct HelpCatalog {
    entries: Vec<HelpEntry>,
    category_authors: BTreeMap<String, Ownership>,
}

impl HelpCatalog {
    /// A catalog of the given top-level entries.
    pub const fn new(entries: Vec<HelpEntry>, category_authors: BTreeMap<String, Ownership>) -> Self {
        Self {
            entries,
            category_authors,
        }
    }

    /// Snapshot of the commands that are visible right now: not hidden and
    /// belonging to a loaded extension.
    pub fn from_commands<U, E>(commands: &[poise::Command<U, E>], registry: &ExtensionRegistry) -> Self {
        let entries = commands
            .iter()
            .filter(|command| !command.hide_in_help)
            .filter(|command| command.extension().map_or(true, |name| registry.is_loaded(name)))
            .map(HelpEntry::from_command)
            .collect();

        let mut category_authors: BTreeMap<String, Ownership> = BTreeMap::new();
        for extension in extensions::builtin() {
            if !registry.is_loaded(extension.name) {
                continue;
            }
            let authors = category_authors
                .entry(extension.category.to_string())
                .or_default();
            *authors = authors.union(&extension.ownership());
        }

        Self::new(entries, category_authors)
    }

    /// Visible top-level entries.
    pub fn entries(&self) -> &[HelpEntry] {
        &self.entries
    }

    /// Category names, alphabetical with `Misc` last.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .entries
            .iter()
            .map(|entry| entry.category.clone())
            .collect();
        categories.sort_by(|a, b| (a == LAST_CATEGORY, a).cmp(&(b == LAST_CATEGORY, b)));
        categories.dedup();
        categories
    }

    /// Renders the answer to `query` as message pages.
    ///
    /// `prefix` and `invoked` are the prefix and command name the user typed.
    pub fn render(&self, prefix: &str, invoked: &str, query: Option<&str>) -> Vec<String> {
        let mut pages = Paginator::new(PAGE_LIMIT);

        match query.map(str::trim).filter(|query| !query.is_empty()) {
            None => self.bot_help(&mut pages, prefix, invoked),
            Some(query) => match self.find(query) {
                Ok(Found::Command(entry)) => command_help(&mut pages, entry, prefix),
                Ok(Found::Category(category)) => {
                    self.category_help(&mut pages, &category, prefix, invoked);
                }
                Err(message) => pages.add_line(&message),
            },
        }

        pages.finish()
    }

    fn find(&self, query: &str) -> Result<Found<'_>, String> {
        let mut keys = query.split(' ');
        let first = keys.next().unwrap_or_default();

        let Some(mut entry) = self.entries.iter().find(|entry| entry.matches(first)) else {
            return self
                .categories()
                .into_iter()
                .find(|category| category.to_lowercase() == query.to_lowercase())
                .map(Found::Category)
                .ok_or_else(|| format!("No command called \"{first}\" found."));
        };

        for key in keys {
            if entry.subcommands.is_empty() {
                return Err(format!(
                    "Command \"{}\" has no subcommands.",
                    entry.qualified_name
                ));
            }
            entry = entry
                .subcommands
                .iter()
                .find(|subcommand| subcommand.matches(key))
                .ok_or_else(|| {
                    format!(
                        "Command \"{}\" has no subcommand named {key}",
                        entry.qualified_name
                    )
                })?;
        }

        Ok(Found::Command(entry))
    }

    fn bot_help(&self, pages: &mut Paginator, prefix: &str, invoked: &str) {
        let categories = self.categories();
        pages.add_line("**Categories:**");

        let width = categories
            .iter()
            .map(|category| category.chars().count())
            .max()
            .unwrap_or_default()
            + 2;

        for pair in categories.chunks(2) {
            match pair {
                [left, right] => {
                    let gap = category_gap(width, left.chars().count());
                    pages.add_line(&format!("`{left}`{}`{right}`", " ".repeat(gap)));
                }
                [only] => pages.add_line(&format!("`{only}`")),
                _ => {}
            }
        }

        ending_note(pages, prefix, invoked);
    }

    fn category_help(&self, pages: &mut Paginator, category: &str, prefix: &str, invoked: &str) {
        let mut entries: Vec<&HelpEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.category == category)
            .collect();

        if let [only] = entries.as_slice() {
            if only.name.to_lowercase() == category.to_lowercase() {
                command_help(pages, only, prefix);
                return;
            }
        }

        pages.add_line(&format!("**{category} commands:**"));
        if let Some(authors) = self.category_authors.get(category) {
            if !authors.is_empty() {
                pages.add_line(&authored_by(authors.authors()));
            }
        }
        pages.add_blank();

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        command_list(pages, &entries, prefix);

        ending_note(pages, prefix, invoked);
    }
}

/// Spaces between two category names on one line.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn category_gap(width: usize, left: usize) -> usize {
    (2.3 * width.saturating_sub(left) as f64) as usize
}

fn ending_note(pages: &mut Paginator, prefix: &str, invoked: &str) {
    pages.add_blank();
    pages.add_line(&format!(
        "`{prefix}{invoked} <command>` for in-depth help for a command"
    ));
    pages.add_line(&format!(
        "`{prefix}{invoked} <category>` for commands in a category"
    ));
}

fn authored_by(authors: impl Iterator<Item = UserId>) -> String {
    let mentions: Vec<String> = authors.map(|author| author.mention()).collect();
    format!("*Authored by* {}", mentions.join(", "))
}

fn command_list(pages: &mut Paginator, entries: &[&HelpEntry], prefix: &str) {
    let Some(cell) = entries
        .iter()
        .map(|entry| entry.qualified_name.chars().count() + 1)
        .max()
    else {
        return;
    };

    for entry in entries {
        let text = format!("{prefix}{}", entry.qualified_name);
        let padded = format!("{text:<cell$}");
        if entry.short_doc().is_empty() {
            pages.add_line(&format!("`{padded}`"));
        } else {
            pages.add_line(&format!("`{padded}` {}", entry.short_doc()));
        }
    }
}

fn command_help(pages: &mut Paginator, entry: &HelpEntry, prefix: &str) {
    pages.add_line(&format!("Help for `{prefix}{}`:", entry.qualified_name));
    let help = entry.full_help();
    if !help.is_empty() {
        pages.add_text(&help);
    }

    pages.add_blank();
    pages.add_line("**Usage:**");
    pages.add_line(&format!(
        "`{prefix}{} {}`",
        entry.qualified_name, entry.signature
    ));
    let subcommands: Vec<&HelpEntry> = entry.subcommands.iter().collect();
    command_list(pages, &subcommands, prefix);
    pages.add_blank();

    if !entry.aliases.is_empty() {
        let aliases: Vec<String> = entry
            .aliases
            .iter()
            .map(|alias| match entry.parent_name() {
                Some(parent) => format!("{prefix}{parent} {alias}"),
                None => format!("{prefix}{alias}"),
            })
            .map(|alias| escape_markdown(&alias))
            .collect();
        pages.add_line(&format!("**Aliases:** {}", aliases.join(", ")));
        pages.add_blank();
    }

    if !entry.authors.is_empty() {
        pages.add_line(&authored_by(entry.authors.iter().copied()));
    }
}
