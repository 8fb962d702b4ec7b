// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use crate::{
  error::FormError,
  expiry,
  manager::{EditRequest, FormManager},
  token::RESULT_ID_LEN,
};
use async_trait::async_trait;
use error::Error;
use std::{
  future::Future,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};
use telegram::{
  CallbackQuery, InlineQuery, InlineQueryResult, InlineQueryResultArticle,
  InputTextMessageContent, ParseMode, User,
};
use tracing::{debug, error, instrument, warn};

/// Code run when a callback button is pressed.
#[async_trait]
pub trait CallbackHandler: Send + Sync {
  async fn handle(&self, call: FormCall) -> anyhow::Result<()>;
}

pub struct HandlerFn<F>(F);

/// Wraps an async closure into a [`CallbackHandler`].
pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
  F: Fn(FormCall) -> Fut + Send + Sync,
  Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
  HandlerFn(f)
}

#[async_trait]
impl<F, Fut> CallbackHandler for HandlerFn<F>
where
  F: Fn(FormCall) -> Fut + Send + Sync,
  Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
  async fn handle(&self, call: FormCall) -> anyhow::Result<()> {
    (self.0)(call).await
  }
}

/// The callback query a handler is running for.
#[derive(Debug)]
pub(crate) struct Interaction {
  pub(crate) query_id: String,
  pub(crate) inline_message_id: Option<String>,
  answered: AtomicBool,
}

impl Interaction {
  fn new(query: &CallbackQuery) -> Self {
    Self {
      query_id: query.id.clone(),
      inline_message_id: query.inline_message_id.clone(),
      answered: AtomicBool::new(false),
    }
  }

  /// Returns `true` for the first caller only.
  pub(crate) fn mark_answered(&self) -> bool {
    !self.answered.swap(true, Ordering::SeqCst)
  }
}

/// Handle passed to a callback: the pressed form, the presser and
/// operations bound to both.
#[derive(Clone)]
pub struct FormCall {
  manager: FormManager,
  form_id: String,
  from: User,
  interaction: Arc<Interaction>,
}

impl FormCall {
  pub fn form_id(&self) -> &str {
    &self.form_id
  }

  pub fn user(&self) -> &User {
    &self.from
  }

  pub fn manager(&self) -> &FormManager {
    &self.manager
  }

  /// Edits the pressed form, preferring the message the press came from.
  pub async fn edit(&self, request: EditRequest) -> Result<(), FormError> {
    self
      .manager
      .edit_with(&self.form_id, request, Some(&*self.interaction))
      .await
  }

  pub async fn delete(&self) -> bool {
    self.manager.delete(&self.form_id).await
  }

  pub async fn unload(&self) -> bool {
    self.manager.unload(&self.form_id).await
  }

  /// Answers the query with an optional notice. Later answers are no-ops.
  pub async fn answer(&self, notice: Option<&str>) {
    self.manager.acknowledge(Some(&*self.interaction), notice).await;
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
  Handled,
  /// The presser is not allowed to press buttons of this form.
  Denied,
  /// The data does not belong to any live form; the host may route it.
  Unrouted,
  HandlerFailed,
}

impl FormManager {
  /// Answers inline queries that belong to forms. Returns `false` for
  /// queries that should be handled elsewhere.
  #[instrument(skip(self, query), fields(query_id = %query.id))]
  pub async fn on_inline_query(&self, query: &InlineQuery) -> bool {
    let now = expiry::now();
    let text = query.query.trim_start();
    let token = text.split_whitespace().next().unwrap_or_default();

    if !token.is_empty() {
      let privileged = self.inner.permissions.is_privileged(query.from.id);
      let matched = self
        .inner
        .store
        .input_candidates(token, now)
        .into_iter()
        .find(|input| privileged || input.always_allow.contains(&query.from.id));

      if let Some(input) = matched {
        let value = text[token.len()..].trim();
        debug!("Inline input for form {}", input.form_id);
        let results = if value.is_empty() {
          Vec::new()
        } else {
          vec![self.input_article(&input.prompt, value)]
        };
        self.answer_inline(&query.id, results).await;
        return true;
      }
    }

    let query_text = query.query.trim();
    if !self.inner.store.contains(query_text) {
      return false;
    }

    match self.render_form(query_text) {
      Ok(rendered) => {
        let strings = &self.inner.config.strings;
        let article = InlineQueryResult::Article(InlineQueryResultArticle {
          id: self.inner.tokens.token(RESULT_ID_LEN),
          title: strings.form_title.clone(),
          description: None,
          input_message_content: InputTextMessageContent {
            message_text: rendered.text,
            parse_mode: Some(ParseMode::Html),
            disable_web_page_preview: Some(true),
          },
          reply_markup: (!rendered.markup.is_empty()).then_some(rendered.markup),
        });
        self.answer_inline(&query.id, vec![article]).await;
        true
      }
      Err(FormError::NotFound) => false,
      Err(e) => {
        error!("Could not render form {}: {}", query_text, e);
        false
      }
    }
  }

  fn input_article(&self, prompt: &str, value: &str) -> InlineQueryResult {
    InlineQueryResult::Article(InlineQueryResultArticle {
      id: self.inner.tokens.token(RESULT_ID_LEN),
      title: prompt.to_string(),
      description: Some(self.inner.config.strings.input_description.clone()),
      // Sent as typed, with no markup parsing.
      input_message_content: InputTextMessageContent {
        message_text: value.to_string(),
        parse_mode: None,
        disable_web_page_preview: Some(true),
      },
      reply_markup: None,
    })
  }

  async fn answer_inline(&self, query_id: &str, results: Vec<InlineQueryResult>) {
    let cache_time = self.inner.config.inline_cache_secs;
    match self
      .inner
      .transport
      .answer_inline_query(query_id, results, cache_time)
      .await
    {
      Ok(()) => {}
      Err(Error::QueryExpired) => debug!("Inline query {} expired before the answer", query_id),
      Err(e) => warn!("Failed to answer inline query {}: {}", query_id, e),
    }
  }

  /// Runs the handler of the pressed button.
  #[instrument(skip(self, query), fields(query_id = %query.id, user_id = query.from.id))]
  pub async fn on_callback_query(&self, query: &CallbackQuery) -> CallbackOutcome {
    let Some(data) = query.data.as_deref() else {
      return CallbackOutcome::Unrouted;
    };
    let Some(found) = self.inner.store.find_callback(data, expiry::now()) else {
      return CallbackOutcome::Unrouted;
    };

    let interaction = Arc::new(Interaction::new(query));
    let privileged = self.inner.permissions.is_privileged(query.from.id);
    if found.force_me && !privileged && !found.always_allow.contains(&query.from.id) {
      debug!("User {} may not press buttons of form {}", query.from.id, found.form_id);
      self
        .acknowledge(Some(&*interaction), Some(self.inner.config.strings.not_allowed.as_str()))
        .await;
      return CallbackOutcome::Denied;
    }

    let call = FormCall {
      manager: self.clone(),
      form_id: found.form_id.clone(),
      from: query.from.clone(),
      interaction: interaction.clone(),
    };

    let outcome = match found.handler.handle(call).await {
      Ok(()) => CallbackOutcome::Handled,
      Err(e) => {
        error!("Callback handler of form {} failed: {:#}", found.form_id, e);
        CallbackOutcome::HandlerFailed
      }
    };

    self.acknowledge(Some(&*interaction), None).await;
    outcome
  }
}
