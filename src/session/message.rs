//! Conversation messages

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::markdown;

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// One entry of the conversation log
///
/// Messages are immutable. Bot messages carry their HTML rendering, computed
/// once when the message is created; the raw text is kept for speech.
#[derive(Debug, Clone)]
pub struct Message {
    id: Uuid,
    sender: Sender,
    text: String,
    rendered_html: Option<String>,
    created_at: DateTime<Utc>,
}

impl Message {
    /// A message typed or spoken by the user
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender: Sender::User,
            text: text.into(),
            rendered_html: None,
            created_at: Utc::now(),
        }
    }

    /// A reply from the assistant, rendered from Markdown
    #[must_use]
    pub fn bot(text: impl Into<String>) -> Self {
        let text = text.into();
        let rendered_html = Some(markdown::render(&text));
        Self {
            id: Uuid::new_v4(),
            sender: Sender::Bot,
            text,
            rendered_html,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub const fn sender(&self) -> Sender {
        self.sender
    }

    /// Raw text as typed or as received
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// HTML rendering; `None` for user messages
    #[must_use]
    pub fn rendered_html(&self) -> Option<&str> {
        self.rendered_html.as_deref()
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
