//! Attaches parsed reactions to messages, spilling over into follow-up
//! messages once a message holds as many reactions as it can.

use crate::token::EmojiToken;
use async_trait::async_trait;
use tracing::{debug, warn};

/// Most reactions a single message can carry.
pub const REACTION_CAP: usize = 20;

/// Content of follow-up messages; renders as an empty line.
pub const BLANK_TEXT: &str = "** **";

/// Somewhere reactions can be attached.
#[async_trait]
pub trait ReactionSurface: Send + Sync {
    /// A message reactions can be attached to.
    type Message: Send + Sync;
    /// Failure reported by the surface.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Attaches one reaction to `message`.
    async fn react(&self, message: &Self::Message, token: &EmojiToken) -> Result<(), Self::Error>;

    /// Sends a message with `content` in the same channel as `after`.
    async fn follow_up(&self, after: &Self::Message, content: &str)
        -> Result<Self::Message, Self::Error>;
}

/// What an emit call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Reactions attached.
    pub attached: usize,
    /// Reactions the surface refused.
    pub skipped: usize,
    /// Messages used, the original target included.
    pub messages: usize,
}

/// Attaches reactions in order, at most `cap` per message.
#[derive(Debug, Clone, Copy)]
pub struct ReactionEmitter {
    cap: usize,
    allow_overflow: bool,
}

impl Default for ReactionEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReactionEmitter {
    /// An emitter with the platform cap and overflow messages enabled.
    pub const fn new() -> Self {
        Self {
            cap: REACTION_CAP,
            allow_overflow: true,
        }
    }

    /// Uses a different per-message cap.
    #[must_use]
    pub const fn with_cap(mut self, cap: usize) -> Self {
        self.cap = cap;
        self
    }

    /// Whether to send follow-up messages once the cap is reached.
    #[must_use]
    pub const fn allow_overflow(mut self, allow: bool) -> Self {
        self.allow_overflow = allow;
        self
    }

    /// Attaches `tokens` to `target` in order.
    ///
    /// A refused reaction is logged and skipped, and does not count towards
    /// the cap. Failing to send a follow-up message stops the emit; reactions
    /// already attached stay.
    pub async fn emit<S: ReactionSurface>(
        &self,
        surface: &S,
        target: S::Message,
        tokens: &[EmojiToken],
    ) -> Result<EmitReport, S::Error> {
        let mut report = EmitReport {
            messages: 1,
            ..EmitReport::default()
        };
        let mut current = target;
        let mut on_current = 0;

        for token in tokens {
            if self.allow_overflow && on_current == self.cap {
                debug!(cap = self.cap, "Reaction cap reached, sending follow-up message");
                current = surface.follow_up(&current, BLANK_TEXT).await?;
                on_current = 0;
                report.messages += 1;
            }

            match surface.react(&current, token).await {
                Ok(()) => {
                    on_current += 1;
                    report.attached += 1;
                }
                Err(e) => {
                    warn!("Failed to add reaction {}: {}", token, e);
                    report.skipped += 1;
                }
            }
        }

        Ok(report)
    }
}
