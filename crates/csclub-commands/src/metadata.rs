//! Typed command metadata: owning extension, help category, and authors.
//!
//! Every registered command carries a [`CommandMeta`] in poise's
//! `custom_data`. Commands may declare their own authors with
//! [`with_ownership`] before registration; the registration step merges those
//! with the extension's authors.

use crate::extensions::Extension;
use csclub_common::UserId;
use std::collections::BTreeSet;
use std::fmt;

/// Users responsible for a command or an extension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ownership {
    authors: BTreeSet<UserId>,
}

impl Ownership {
    /// Ownership by the given user ids.
    pub fn new(ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            authors: ids.into_iter().map(UserId).collect(),
        }
    }

    /// Whether nobody is declared.
    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }

    /// Declared authors, in id order.
    pub fn authors(&self) -> impl Iterator<Item = UserId> + '_ {
        self.authors.iter().copied()
    }

    /// Everyone in either set.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            authors: self.authors.union(&other.authors).copied().collect(),
        }
    }
}

impl FromIterator<UserId> for Ownership {
    fn from_iter<T: IntoIterator<Item = UserId>>(iter: T) -> Self {
        Self {
            authors: iter.into_iter().collect(),
        }
    }
}

/// Name of a help category, such as `Utils` or `Misc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HelpCategory(pub &'static str);

impl HelpCategory {
    /// The category name.
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for HelpCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Metadata attached to every registered command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMeta {
    /// Qualified name of the owning extension.
    pub extension: &'static str,
    /// Help category.
    pub category: HelpCategory,
    /// Command authors merged with the extension's.
    pub ownership: Ownership,
}

/// Typed access to a command's metadata.
pub trait CommandMetadata {
    /// The attached metadata, if the command was registered through an extension.
    fn meta(&self) -> Option<&CommandMeta>;

    /// Qualified name of the owning extension.
    fn extension(&self) -> Option<&'static str> {
        self.meta().map(|meta| meta.extension)
    }

    /// Help category.
    fn help_category(&self) -> Option<HelpCategory> {
        self.meta().map(|meta| meta.category)
    }

    /// Authors of the command; empty if none are declared.
    fn ownership(&self) -> Ownership {
        self.meta().map(|meta| meta.ownership.clone()).unwrap_or_default()
    }
}

impl<U, E> CommandMetadata for poise::Command<U, E> {
    fn meta(&self) -> Option<&CommandMeta> {
        self.custom_data.downcast_ref::<CommandMeta>()
    }
}

/// Declares authors for a single command, ahead of registration.
#[must_use]
pub fn with_ownership<U, E>(mut command: poise::Command<U, E>, ownership: Ownership) -> poise::Command<U, E> {
    command.custom_data = Box::new(ownership);
    command
}

/// Attaches `extension`'s metadata to `command` and all of its subcommands.
pub fn attach<U, E>(command: &mut poise::Command<U, E>, extension: &Extension) {
    let declared = command
        .custom_data
        .downcast_ref::<Ownership>()
        .cloned()
        .unwrap_or_default();

    command.custom_data = Box::new(CommandMeta {
        extension: extension.name,
        category: extension.category,
        ownership: declared.union(&extension.ownership()),
    });
    command.category = Some(extension.category.to_string());

    for subcommand in &mut command.subcommands {
        attach(subcommand, extension);
    }
}
