// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use crate::button::Grid;
use std::{fmt, time::Duration};
use telegram::MessageRef;

/// Cleanup hook run once when a form is torn down.
pub type UnloadHook = Box<dyn FnOnce() -> anyhow::Result<()> + Send>;

/// Where a new form is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
  Chat(i64),
  /// An existing message; it is replaced by the form once the form is sent.
  Message(SourceMessage),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMessage {
  pub chat_id: i64,
  pub message_id: i64,
  /// Message the source was replying to; the form keeps that reply.
  pub reply_to: Option<i64>,
  /// Sent by the application itself, so it can be edited.
  pub outgoing: bool,
}

impl Target {
  pub fn chat_id(&self) -> i64 {
    match self {
      Target::Chat(chat_id) => *chat_id,
      Target::Message(message) => message.chat_id,
    }
  }
}

impl SourceMessage {
  pub fn from_message(message: &telegram::Message, outgoing: bool) -> Self {
    Self {
      chat_id: message.chat.id,
      message_id: message.message_id,
      reply_to: message
        .reply_to_message
        .as_ref()
        .map(|reply| reply.message_id),
      outgoing,
    }
  }
}

pub struct FormOptions {
  /// Only the owner scope and `always_allow` may press callback buttons.
  pub force_me: bool,
  pub always_allow: Vec<i64>,
  pub ttl: Option<Duration>,
  pub on_unload: Option<UnloadHook>,
}

impl Default for FormOptions {
  fn default() -> Self {
    Self {
      force_me: true,
      always_allow: Vec::new(),
      ttl: None,
      on_unload: None,
    }
  }
}

impl FormOptions {
  pub fn force_me(mut self, force_me: bool) -> Self {
    self.force_me = force_me;
    self
  }

  pub fn always_allow(mut self, users: Vec<i64>) -> Self {
    self.always_allow = users;
    self
  }

  pub fn ttl(mut self, ttl: Duration) -> Self {
    self.ttl = Some(ttl);
    self
  }

  pub fn on_unload(mut self, hook: impl FnOnce() -> anyhow::Result<()> + Send + 'static) -> Self {
    self.on_unload = Some(Box::new(hook));
    self
  }
}

pub struct FormRecord {
  pub id: String,
  pub text: String,
  pub grid: Grid,
  /// Unix timestamp after which the buttons are inert.
  pub expires_at: i64,
  pub force_me: bool,
  pub always_allow: Vec<i64>,
  chat_id: Option<i64>,
  message_id: Option<i64>,
  on_unload: Option<UnloadHook>,
}

impl FormRecord {
  pub fn new(
    id: String,
    text: String,
    grid: Grid,
    expires_at: i64,
    options: FormOptions,
  ) -> Self {
    Self {
      id,
      text,
      grid,
      expires_at,
      force_me: options.force_me,
      always_allow: options.always_allow,
      chat_id: None,
      message_id: None,
      on_unload: options.on_unload,
    }
  }

  pub fn chat_id(&self) -> Option<i64> {
    self.chat_id
  }

  pub fn message_id(&self) -> Option<i64> {
    self.message_id
  }

  pub fn message_ref(&self) -> Option<MessageRef> {
    Some(MessageRef::Chat {
      chat_id: self.chat_id?,
      message_id: self.message_id?,
    })
  }

  /// Records where the form was sent. Only the first call has any effect.
  pub(crate) fn set_message(&mut self, chat_id: i64, message_id: i64) -> bool {
    if self.chat_id.is_some() || self.message_id.is_some() {
      return false;
    }
    self.chat_id = Some(chat_id);
    self.message_id = Some(message_id);
    true
  }

  pub fn is_expired(&self, now: i64) -> bool {
    now >= self.expires_at
  }

  pub fn has_unload_hook(&self) -> bool {
    self.on_unload.is_some()
  }

  /// May `user_id` press the callback buttons of this form?
  pub fn allows(&self, user_id: i64, privileged: bool) -> bool {
    !self.force_me || self.may_capture_input(user_id, privileged)
  }

  /// May `user_id` send values through the input buttons of this form?
  pub fn may_capture_input(&self, user_id: i64, privileged: bool) -> bool {
    privileged || self.always_allow.contains(&user_id)
  }

  /// Consumes the record and runs its unload hook, if it has one.
  pub fn unload(mut self) -> anyhow::Result<()> {
    match self.on_unload.take() {
      Some(hook) => hook(),
      None => Ok(()),
    }
  }
}

impl fmt::Debug for FormRecord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("FormRecord")
      .field("id", &self.id)
      .field("text", &self.text)
      .field("grid", &self.grid)
      .field("expires_at", &self.expires_at)
      .field("force_me", &self.force_me)
      .field("always_allow", &self.always_allow)
      .field("chat_id", &self.chat_id)
      .field("message_id", &self.message_id)
      .field("on_unload", &self.on_unload.is_some())
      .finish()
  }
}
