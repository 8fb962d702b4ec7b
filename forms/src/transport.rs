// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use async_trait::async_trait;
use error::Error;
use std::collections::HashSet;
use telegram::{InlineKeyboardMarkup, InlineQueryResult, MessageRef};

/// One entry returned by an inline query the client ran against a bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
  pub query_id: String,
  pub result_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentMessage {
  pub chat_id: i64,
  pub message_id: i64,
}

/// Chat transport the forms are rendered through.
///
/// Failures are reported with the `error::Error` signals: `RateLimited`,
/// `MessageNotModified`, `MessageNotFound` and `QueryExpired` are acted upon,
/// everything else is treated as a plain failure.
#[async_trait]
pub trait Transport: Send + Sync {
  /// Runs an inline query against `bot_username` on behalf of the client.
  async fn send_via_bot_query(
    &self,
    bot_username: &str,
    query: &str,
  ) -> Result<Vec<QueryResult>, Error>;

  /// Sends `result` to `chat_id`, as a reply to `reply_to` when given.
  async fn materialize(
    &self,
    result: &QueryResult,
    chat_id: i64,
    reply_to: Option<i64>,
  ) -> Result<SentMessage, Error>;

  async fn send_message(
    &self,
    chat_id: i64,
    text: &str,
    reply_to: Option<i64>,
  ) -> Result<SentMessage, Error>;

  async fn edit_message(
    &self,
    target: &MessageRef,
    text: &str,
    markup: Option<&InlineKeyboardMarkup>,
    disable_web_page_preview: bool,
  ) -> Result<(), Error>;

  async fn delete_messages(&self, chat_id: i64, message_ids: &[i64]) -> Result<(), Error>;

  async fn answer_inline_query(
    &self,
    query_id: &str,
    results: Vec<InlineQueryResult>,
    cache_time: u32,
  ) -> Result<(), Error>;

  async fn answer_callback(&self, query_id: &str, notice: Option<&str>) -> Result<(), Error>;
}

/// Decides who counts as the owner scope of the application.
pub trait PermissionRegistry: Send + Sync {
  fn is_privileged(&self, user_id: i64) -> bool;
}

impl PermissionRegistry for HashSet<i64> {
  fn is_privileged(&self, user_id: i64) -> bool {
    self.contains(&user_id)
  }
}
