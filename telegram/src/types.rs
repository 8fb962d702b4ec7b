// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
  Markdown,
  #[serde(rename = "HTML")]
  Html,
  MarkdownV2,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct User {
  pub id: i64,
  #[serde(default)]
  pub is_bot: bool,
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub username: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Chat {
  pub id: i64,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Message {
  pub message_id: i64,
  pub chat: Chat,
  #[serde(default)]
  pub from: Option<User>,
  #[serde(default)]
  pub text: Option<String>,
  #[serde(default)]
  pub reply_to_message: Option<Box<Message>>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct InlineQuery {
  pub id: String,
  pub from: User,
  #[serde(default)]
  pub query: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CallbackQuery {
  pub id: String,
  pub from: User,
  #[serde(default)]
  pub message: Option<Message>,
  #[serde(default)]
  pub inline_message_id: Option<String>,
  #[serde(default)]
  pub data: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Update {
  pub update_id: i64,
  #[serde(default)]
  pub message: Option<Message>,
  #[serde(default)]
  pub inline_query: Option<InlineQuery>,
  #[serde(default)]
  pub callback_query: Option<CallbackQuery>,
}

/// Where an editable message lives: a regular chat message, or a message
/// that was sent through inline mode and is only addressable by its inline id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageRef {
  Chat { chat_id: i64, message_id: i64 },
  Inline(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct InlineKeyboardMarkup {
  pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
  pub fn is_empty(&self) -> bool {
    self.inline_keyboard.iter().all(Vec::is_empty)
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InlineKeyboardButton {
  pub text: String,
  #[serde(flatten)]
  pub action: InlineKeyboardButtonAction,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum InlineKeyboardButtonAction {
  Url(String),
  /// Sent back in a callback query when pressed, 1-64 bytes.
  CallbackData(String),
  SwitchInlineQueryCurrentChat(String),
}

impl InlineKeyboardButton {
  pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      action: InlineKeyboardButtonAction::Url(url.into()),
    }
  }

  pub fn callback(text: impl Into<String>, data: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      action: InlineKeyboardButtonAction::CallbackData(data.into()),
    }
  }

  pub fn switch_inline_current_chat(text: impl Into<String>, query: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      action: InlineKeyboardButtonAction::SwitchInlineQueryCurrentChat(query.into()),
    }
  }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineQueryResult {
  Article(InlineQueryResultArticle),
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct InlineQueryResultArticle {
  pub id: String,
  pub title: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  pub input_message_content: InputTextMessageContent,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reply_markup: Option<InlineKeyboardMarkup>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct InputTextMessageContent {
  pub message_text: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub parse_mode: Option<ParseMode>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub disable_web_page_preview: Option<bool>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct TelegramResponse<T> {
  pub ok: bool,
  #[serde(default)]
  pub description: String,
  pub result: Option<T>,
  #[serde(default)]
  pub error_code: Option<u16>,
  #[serde(default)]
  pub parameters: Option<ResponseParameters>,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct ResponseParameters {
  #[serde(default)]
  pub retry_after: Option<u64>,
}

#[derive(Serialize)]
pub(crate) struct SendMessage<'a> {
  pub chat_id: i64,
  pub text: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub parse_mode: Option<ParseMode>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub disable_web_page_preview: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub disable_notification: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reply_to_message_id: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reply_markup: Option<&'a InlineKeyboardMarkup>,
}

#[derive(Serialize)]
pub(crate) struct EditMessageText<'a> {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub chat_id: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message_id: Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub inline_message_id: Option<&'a str>,
  pub text: &'a str,
  pub parse_mode: ParseMode,
  pub disable_web_page_preview: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub reply_markup: Option<&'a InlineKeyboardMarkup>,
}

impl<'a> EditMessageText<'a> {
  pub fn new(target: &'a MessageRef, text: &'a str) -> Self {
    let (chat_id, message_id, inline_message_id) = match target {
      MessageRef::Chat {
        chat_id,
        message_id,
      } => (Some(*chat_id), Some(*message_id), None),
      MessageRef::Inline(id) => (None, None, Some(id.as_str())),
    };

    Self {
      chat_id,
      message_id,
      inline_message_id,
      text,
      parse_mode: ParseMode::Html,
      disable_web_page_preview: true,
      reply_markup: None,
    }
  }
}

#[derive(Serialize)]
pub(crate) struct DeleteMessages<'a> {
  pub chat_id: i64,
  pub message_ids: &'a [i64],
}

#[derive(Serialize)]
pub(crate) struct AnswerInlineQuery<'a> {
  pub inline_query_id: &'a str,
  pub results: &'a [InlineQueryResult],
  pub cache_time: u32,
  pub is_personal: bool,
}

#[derive(Serialize)]
pub(crate) struct AnswerCallbackQuery<'a> {
  pub callback_query_id: &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub text: Option<&'a str>,
}

#[derive(Serialize)]
pub(crate) struct GetUpdates {
  pub offset: i64,
  pub timeout: u32,
  pub allowed_updates: &'static [&'static str],
}
