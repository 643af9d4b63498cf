use time::{macros::format_description, OffsetDateTime, UtcOffset};

use crate::formatter::escape_html;

const TIMESTAMP_FORMAT: &[time::format_description::FormatItem<'static>] =
    format_description!("[hour]:[minute]");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Bot,
}

/// How an entry's text reaches the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageBody {
    /// Author-supplied text, escaped on render.
    Plain,
    /// Pre-rendered markup, inserted verbatim.
    Markup,
    /// The fixed apology shown when the backend cannot be reached.
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub id: u64,
    pub role: MessageRole,
    pub body: MessageBody,
    pub text: String,
    pub timestamp: i64,
}

impl Message {
    /// A message not yet placed in a transcript. `id` is assigned on append.
    pub fn user(text: impl Into<String>) -> Self {
        Self::unplaced(MessageRole::User, MessageBody::Plain, text.into())
    }

    pub fn bot_markup(markup: impl Into<String>) -> Self {
        Self::unplaced(MessageRole::Bot, MessageBody::Markup, markup.into())
    }

    pub fn bot_error(text: impl Into<String>) -> Self {
        Self::unplaced(MessageRole::Bot, MessageBody::Error, text.into())
    }

    fn unplaced(role: MessageRole, body: MessageBody, text: String) -> Self {
        Self {
            id: 0,
            role,
            body,
            text,
            timestamp: now_unix_ts(),
        }
    }

    pub fn css_class(&self) -> &'static str {
        match (self.role, self.body) {
            (MessageRole::User, _) => "user-msg",
            (MessageRole::Bot, MessageBody::Error) => "bot-msg text-danger",
            (MessageRole::Bot, _) => "bot-msg",
        }
    }

    /// Inner HTML for the entry. Only `Markup` bodies pass through unescaped.
    pub fn to_html(&self) -> String {
        match self.body {
            MessageBody::Markup => self.text.clone(),
            MessageBody::Plain | MessageBody::Error => escape_html(&self.text),
        }
    }

    pub fn local_time(&self) -> String {
        format_local_time(self.timestamp)
    }
}

/// Ordered, append-only list of displayed messages.
#[derive(Clone, Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `message`, assigning the next id, and returns the stored entry.
    pub fn append(&mut self, mut message: Message) -> &Message {
        self.next_id += 1;
        message.id = self.next_id;
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

fn now_unix_ts() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

fn format_local_time(ts: i64) -> String {
    let Ok(dt) = OffsetDateTime::from_unix_timestamp(ts) else {
        return ts.to_string();
    };
    let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    dt.to_offset(local_offset)
        .format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| ts.to_string())
}
