// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use async_trait::async_trait;
use error::Error;
use forms::{FormError, FormStore, QueryResult, RandomTokens, SentMessage, Transport};
use std::sync::Arc;
use telegram::{InlineKeyboardMarkup, InlineQueryResult, MessageRef, ParseMode, TelegramClient};
use tracing::{debug, instrument};

/// Transport for a plain bot account.
///
/// A bot cannot run inline queries against itself, so the inline step is
/// resolved against the local store and the form goes out with
/// `sendMessage` instead.
pub struct BotBridge {
  tg: TelegramClient,
  store: Arc<FormStore>,
}

impl BotBridge {
  pub fn new(tg: TelegramClient, store: Arc<FormStore>) -> Self {
    Self { tg, store }
  }
}

#[async_trait]
impl Transport for BotBridge {
  async fn send_via_bot_query(
    &self,
    bot_username: &str,
    query: &str,
  ) -> Result<Vec<QueryResult>, Error> {
    debug!("Resolving @{} {} locally", bot_username, query);
    if !self.store.contains(query) {
      return Ok(Vec::new());
    }
    Ok(vec![QueryResult {
      query_id: String::new(),
      result_id: query.to_string(),
    }])
  }

  #[instrument(skip(self, result), fields(form_id = %result.result_id))]
  async fn materialize(
    &self,
    result: &QueryResult,
    chat_id: i64,
    reply_to: Option<i64>,
  ) -> Result<SentMessage, Error> {
    let rendered = self
      .store
      .render_form(&result.result_id, &RandomTokens)
      .map_err(|e| match e {
        FormError::Transport(e) => e,
        other => Error::ApiError(other.to_string()),
      })?;

    let sent = self
      .tg
      .message()
      .chat_id(chat_id)
      .text(&rendered.text)
      .parse_mode(ParseMode::Html)
      .disable_preview()
      .reply_to(reply_to)
      .keyboard(&rendered.markup)
      .send(&self.tg)
      .await?;

    Ok(SentMessage {
      chat_id: sent.chat.id,
      message_id: sent.message_id,
    })
  }

  async fn send_message(
    &self,
    chat_id: i64,
    text: &str,
    reply_to: Option<i64>,
  ) -> Result<SentMessage, Error> {
    let sent = self
      .tg
      .message()
      .chat_id(chat_id)
      .text(text)
      .parse_mode(ParseMode::Html)
      .reply_to(reply_to)
      .send(&self.tg)
      .await?;

    Ok(SentMessage {
      chat_id: sent.chat.id,
      message_id: sent.message_id,
    })
  }

  async fn edit_message(
    &self,
    target: &MessageRef,
    text: &str,
    markup: Option<&InlineKeyboardMarkup>,
    disable_web_page_preview: bool,
  ) -> Result<(), Error> {
    self
      .tg
      .edit_message_text(target, text, markup, disable_web_page_preview)
      .await
  }

  async fn delete_messages(&self, chat_id: i64, message_ids: &[i64]) -> Result<(), Error> {
    self.tg.delete_messages(chat_id, message_ids).await
  }

  async fn answer_inline_query(
    &self,
    query_id: &str,
    results: Vec<InlineQueryResult>,
    cache_time: u32,
  ) -> Result<(), Error> {
    self
      .tg
      .answer_inline_query(query_id, &results, cache_time)
      .await
  }

  async fn answer_callback(&self, query_id: &str, notice: Option<&str>) -> Result<(), Error> {
    self.tg.answer_callback_query(query_id, notice).await
  }
}
