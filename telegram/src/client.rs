// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use crate::{
  builders::{MessageBuilder, TelegramClientBuilder},
  config::{ClientConfig, ALLOWED_UPDATES},
  types::{
    AnswerCallbackQuery, AnswerInlineQuery, DeleteMessages, EditMessageText, GetUpdates,
    InlineKeyboardMarkup, InlineQueryResult, Message, MessageRef, SendMessage, TelegramResponse,
    Update, User,
  },
};
use error::Error;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

#[derive(Clone)]
pub struct TelegramClient {
  pub(crate) config: ClientConfig,
  pub(crate) client: Client,
}

impl TelegramClient {
  pub fn builder() -> TelegramClientBuilder {
    TelegramClientBuilder::default()
  }

  pub fn message(&self) -> MessageBuilder {
    MessageBuilder::new()
  }

  async fn call<P, R>(&self, method: &str, params: &P, timeout: Option<Duration>) -> Result<R, Error>
  where
    P: Serialize + ?Sized,
    R: DeserializeOwned,
  {
    let mut request = self.client.post(self.config.method_url(method)).json(params);
    if let Some(timeout) = timeout {
      request = request.timeout(timeout);
    }

    let response = request.send().await.map_err(Error::HttpError)?;
    let status = response.status();
    let telegram_response: TelegramResponse<R> =
      response.json().await.map_err(Error::HttpError)?;

    if !telegram_response.ok {
      let error_code = telegram_response.error_code.unwrap_or(status.as_u16());
      let retry_after = telegram_response
        .parameters
        .and_then(|parameters| parameters.retry_after);
      return Err(classify_failure(
        error_code,
        &telegram_response.description,
        retry_after,
      ));
    }

    telegram_response
      .result
      .ok_or_else(|| Error::ParseError(format!("{}: response carries no result", method)))
  }

  #[instrument(skip(self))]
  pub async fn get_me(&self) -> Result<User, Error> {
    self.call("getMe", &serde_json::json!({}), None).await
  }

  #[instrument(skip(self))]
  pub async fn get_updates(&self, offset: i64, timeout: u32) -> Result<Vec<Update>, Error> {
    let params = GetUpdates {
      offset,
      timeout,
      allowed_updates: ALLOWED_UPDATES,
    };
    let deadline = self.config.poll_deadline(timeout);
    self.call("getUpdates", &params, Some(deadline)).await
  }

  #[instrument(skip(self, message), fields(chat_id = message.chat_id))]
  pub(crate) async fn send_message(&self, message: SendMessage<'_>) -> Result<Message, Error> {
    for attempt in 0..=self.config.retry_attempts {
      match self.call::<_, Message>("sendMessage", &message, None).await {
        Ok(sent) => {
          debug!("Message sent successfully");
          return Ok(sent);
        }
        Err(e) => {
          if attempt == self.config.retry_attempts || !e.is_transient() {
            error!("Sending message failed: {}", e);
            return Err(e);
          }
          let delay = self.config.backoff(&e);
          warn!("Attempt {} failed: {}. Retrying...", attempt + 1, e);
          tokio::time::sleep(delay).await;
        }
      }
    }

    Err(Error::ApiError("Max retry attempts reached".into()))
  }

  /// Edits the text and keyboard of a message with HTML parse mode.
  ///
  /// Failures come back classified, so callers can tell a flood wait or an
  /// unchanged message apart from a real error. No retries happen here.
  #[instrument(skip(self, text, markup))]
  pub async fn edit_message_text(
    &self,
    target: &MessageRef,
    text: &str,
    markup: Option<&InlineKeyboardMarkup>,
    disable_web_page_preview: bool,
  ) -> Result<(), Error> {
    let mut params = EditMessageText::new(target, text);
    params.disable_web_page_preview = disable_web_page_preview;
    params.reply_markup = markup.filter(|markup| !markup.is_empty());

    // The result is `true` for inline messages and the edited `Message` otherwise.
    self
      .call::<_, serde_json::Value>("editMessageText", &params, None)
      .await
      .map(|_| ())
  }

  #[instrument(skip(self))]
  pub async fn delete_messages(&self, chat_id: i64, message_ids: &[i64]) -> Result<(), Error> {
    let params = DeleteMessages {
      chat_id,
      message_ids,
    };
    let deleted: bool = self.call("deleteMessages", &params, None).await?;
    if !deleted {
      return Err(Error::MessageNotFound(format!(
        "messages {:?} in chat {} were not deleted",
        message_ids, chat_id
      )));
    }
    Ok(())
  }

  #[instrument(skip(self, results), fields(results = results.len()))]
  pub async fn answer_inline_query(
    &self,
    inline_query_id: &str,
    results: &[InlineQueryResult],
    cache_time: u32,
  ) -> Result<(), Error> {
    let params = AnswerInlineQuery {
      inline_query_id,
      results,
      cache_time,
      is_personal: true,
    };
    self
      .call::<_, bool>("answerInlineQuery", &params, None)
      .await
      .map(|_| ())
  }

  #[instrument(skip(self))]
  pub async fn answer_callback_query(
    &self,
    callback_query_id: &str,
    text: Option<&str>,
  ) -> Result<(), Error> {
    let params = AnswerCallbackQuery {
      callback_query_id,
      text,
    };
    self
      .call::<_, bool>("answerCallbackQuery", &params, None)
      .await
      .map(|_| ())
  }
}

/// Maps a failed Bot API response onto the error signals callers act upon.
pub(crate) fn classify_failure(error_code: u16, description: &str, retry_after: Option<u64>) -> Error {
  if error_code == 429 {
    return Error::RateLimited(Duration::from_secs(retry_after.unwrap_or(1)));
  }

  let lowered = description.to_lowercase();
  if lowered.contains("message is not modified") {
    Error::MessageNotModified
  } else if lowered.contains("message to edit not found")
    || lowered.contains("message to delete not found")
    || lowered.contains("message_id_invalid")
    || lowered.contains("message can't be deleted")
  {
    Error::MessageNotFound(description.to_string())
  } else if lowered.contains("query is too old") || lowered.contains("query_id_invalid") {
    Error::QueryExpired
  } else {
    Error::ApiError(format!("{}: {}", error_code, description))
  }
}
