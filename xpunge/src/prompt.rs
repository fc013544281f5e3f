//! # Prompt
//!
//! Module dedicated to user interaction: confirmation dialogs and
//! localized messages. Hosts implement [`UserPrompt`] to plug their
//! own dialogs, and may override [`UserPrompt::message`] to plug
//! their own translations.

use async_trait::async_trait;

use crate::Result;

/// The localized message key enumeration.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MessageKey {
    SingleConfirmTitle,
    /// Arguments: account name, empty trash, empty junk, compact.
    SingleConfirmBody,
    MultiConfirmTitle,
    /// Arguments: trash list, junk list, compact list.
    MultiConfirmBody,
    Yes,
    No,
    CompactWholeAccount,
}

impl MessageKey {
    /// Return the English template of the message.
    ///
    /// Placeholders `$1`, `$2`… are replaced by the message arguments.
    pub fn template(&self) -> &'static str {
        match self {
            Self::SingleConfirmTitle => "Xpunge",
            Self::SingleConfirmBody => {
                "Xpunge the account \"$1\"?\n\nEmpty trash: $2\nEmpty junk: $3\nCompact folders: $4"
            }
            Self::MultiConfirmTitle => "MultiXpunge",
            Self::MultiConfirmBody => {
                "MultiXpunge the following accounts and folders?\n\nEmpty trash of:$1\n\nEmpty junk of:$2\n\nCompact:$3"
            }
            Self::Yes => "yes",
            Self::No => "no",
            Self::CompactWholeAccount => "(whole account)",
        }
    }
}

/// Replace `$n` placeholders of the given template by the matching
/// argument. Placeholders without argument become empty.
pub fn render(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        let index = match (c, chars.peek().and_then(|d| d.to_digit(10))) {
            ('$', Some(index)) if index > 0 => index as usize,
            _ => {
                out.push(c);
                continue;
            }
        };

        chars.next();

        if let Some(arg) = args.get(index - 1) {
            out.push_str(arg);
        }
    }

    out
}

#[async_trait]
pub trait UserPrompt: Send + Sync {
    /// Ask the user to confirm, returns `true` if they accepted.
    async fn confirm(&self, title: &str, message: &str) -> Result<bool>;

    /// Render the given message.
    fn message(&self, key: MessageKey, args: &[String]) -> String {
        render(key.template(), args)
    }

    fn yes_or_no(&self, value: bool) -> String {
        self.message(if value { MessageKey::Yes } else { MessageKey::No }, &[])
    }
}
