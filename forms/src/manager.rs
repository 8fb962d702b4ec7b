// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use crate::{
  button::{self, Grid},
  error::FormError,
  expiry::{self, TtlPolicy},
  form::{FormOptions, FormRecord, Target},
  router::Interaction,
  store::{FormStore, RenderedForm},
  token::{RandomTokens, TokenSource, FORM_ID_LEN},
  transport::{PermissionRegistry, Transport},
};
use config::FormsConfig;
use error::Error;
use std::sync::Arc;
use telegram::MessageRef;
use tracing::{debug, error, info, instrument, warn};

/// New content for a live form. Optional parts are merged into the form
/// only when given.
#[derive(Debug, Clone)]
pub struct EditRequest {
  pub text: String,
  pub grid: Option<Grid>,
  pub force_me: Option<bool>,
  pub always_allow: Option<Vec<i64>>,
  pub disable_web_page_preview: bool,
}

impl EditRequest {
  pub fn new(text: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      grid: None,
      force_me: None,
      always_allow: None,
      disable_web_page_preview: true,
    }
  }

  pub fn grid(mut self, grid: Grid) -> Self {
    self.grid = Some(grid);
    self
  }

  pub fn force_me(mut self, force_me: bool) -> Self {
    self.force_me = Some(force_me);
    self
  }

  pub fn always_allow(mut self, users: Vec<i64>) -> Self {
    self.always_allow = Some(users);
    self
  }

  pub fn link_preview(mut self, enabled: bool) -> Self {
    self.disable_web_page_preview = !enabled;
    self
  }
}

pub(crate) struct Inner {
  pub(crate) store: Arc<FormStore>,
  pub(crate) transport: Arc<dyn Transport>,
  pub(crate) permissions: Arc<dyn PermissionRegistry>,
  pub(crate) tokens: Arc<dyn TokenSource>,
  pub(crate) config: FormsConfig,
  pub(crate) bot_username: String,
  pub(crate) ttl: TtlPolicy,
}

/// Creates forms and applies every mutation to them. Cheap to clone.
#[derive(Clone)]
pub struct FormManager {
  pub(crate) inner: Arc<Inner>,
}

impl FormManager {
  pub fn new(
    store: Arc<FormStore>,
    transport: Arc<dyn Transport>,
    permissions: Arc<dyn PermissionRegistry>,
    bot_username: impl Into<String>,
    config: FormsConfig,
  ) -> Self {
    Self::with_tokens(
      store,
      transport,
      permissions,
      Arc::new(RandomTokens),
      bot_username,
      config,
    )
  }

  pub fn with_tokens(
    store: Arc<FormStore>,
    transport: Arc<dyn Transport>,
    permissions: Arc<dyn PermissionRegistry>,
    tokens: Arc<dyn TokenSource>,
    bot_username: impl Into<String>,
    config: FormsConfig,
  ) -> Self {
    let ttl = TtlPolicy::from_config(&config);
    Self {
      inner: Arc::new(Inner {
        store,
        transport,
        permissions,
        tokens,
        config,
        bot_username: bot_username.into(),
        ttl,
      }),
    }
  }

  pub fn store(&self) -> &FormStore {
    &self.inner.store
  }

  pub fn config(&self) -> &FormsConfig {
    &self.inner.config
  }

  pub fn render_form(&self, form_id: &str) -> Result<RenderedForm, FormError> {
    self.inner.store.render_form(form_id, self.inner.tokens.as_ref())
  }

  /// Sends a new form to `target` and returns its id.
  ///
  /// Nothing is sent when the text or a button is malformed. A form without
  /// callback or input buttons stays visible but is dropped from the store
  /// right after it is sent.
  #[instrument(skip(self, text, grid, options))]
  pub async fn create(
    &self,
    text: impl Into<String>,
    target: Target,
    grid: Grid,
    options: FormOptions,
  ) -> Result<String, FormError> {
    let text = text.into();
    if text.trim().is_empty() {
      error!("Invalid form text: it cannot be empty");
      return Err(FormError::EmptyText);
    }
    if let Err(e) = button::validate(&grid) {
      error!("Invalid form markup: {}", e);
      return Err(e);
    }

    let interactive = button::is_interactive(&grid);
    let expires_at = self.inner.ttl.expires_at(expiry::now(), options.ttl);
    let form_id = self.inner.tokens.token(FORM_ID_LEN);

    self.inner.store.insert(FormRecord::new(
      form_id.clone(),
      text,
      grid,
      expires_at,
      options,
    ));
    debug!("Registered form {}", form_id);

    let sent = match self.send_through_inline(&form_id, &target).await {
      Ok(sent) => sent,
      Err(e) => {
        error!("Inline bot failed to send form {}: {}", form_id, e);
        self.inner.store.remove(&form_id);
        self.report_inline_failure(&target).await;
        return Err(e);
      }
    };

    if !self.inner.store.materialize(&form_id, sent.chat_id, sent.message_id) {
      warn!("Form {} disappeared before its message was recorded", form_id);
    }

    if let Target::Message(source) = &target {
      if let Err(e) = self
        .inner
        .transport
        .delete_messages(source.chat_id, &[source.message_id])
        .await
      {
        warn!("Could not delete message replaced by form {}: {}", form_id, e);
      }
    }

    if !interactive {
      if let Some(record) = self.inner.store.remove(&form_id) {
        debug!("Unloading form {}, because it doesn't contain callbacks", form_id);
        if let Err(e) = record.unload() {
          warn!("Unload hook of form {} failed: {:#}", form_id, e);
        }
      }
    }

    Ok(form_id)
  }

  async fn send_through_inline(
    &self,
    form_id: &str,
    target: &Target,
  ) -> Result<crate::transport::SentMessage, FormError> {
    let results = self
      .inner
      .transport
      .send_via_bot_query(&self.inner.bot_username, form_id)
      .await?;
    let first = results.first().ok_or(FormError::NoInlineResults)?;

    let reply_to = match target {
      Target::Message(source) => source.reply_to,
      Target::Chat(_) => None,
    };

    Ok(
      self
        .inner
        .transport
        .materialize(first, target.chat_id(), reply_to)
        .await?,
    )
  }

  async fn report_inline_failure(&self, target: &Target) {
    let notice = self.inner.config.strings.inline_error.as_str();
    let transport = &self.inner.transport;
    let result = match target {
      Target::Message(source) if source.outgoing => {
        let own = MessageRef::Chat {
          chat_id: source.chat_id,
          message_id: source.message_id,
        };
        transport.edit_message(&own, notice, None, true).await
      }
      Target::Message(source) => transport
        .send_message(source.chat_id, notice, Some(source.message_id))
        .await
        .map(|_| ()),
      Target::Chat(chat_id) => transport.send_message(*chat_id, notice, None).await.map(|_| ()),
    };

    if let Err(e) = result {
      warn!("Could not report inline failure: {}", e);
    }
  }

  /// Replaces the text (and optionally the buttons and access rules) of a
  /// live form.
  pub async fn edit(&self, form_id: &str, request: EditRequest) -> Result<(), FormError> {
    self.edit_with(form_id, request, None).await
  }

  #[instrument(skip(self, request, interaction))]
  pub(crate) async fn edit_with(
    &self,
    form_id: &str,
    request: EditRequest,
    interaction: Option<&Interaction>,
  ) -> Result<(), FormError> {
    if request.text.trim().is_empty() {
      error!("Invalid form text: it cannot be empty");
      return Err(FormError::EmptyText);
    }

    let EditRequest {
      text,
      grid,
      force_me,
      always_allow,
      disable_web_page_preview,
    } = request;

    let merged = self.inner.store.update(form_id, |record| {
      record.text = text.clone();
      if let Some(grid) = grid {
        record.grid = grid;
      }
      if let Some(force_me) = force_me {
        record.force_me = force_me;
      }
      if let Some(always_allow) = always_allow {
        record.always_allow = always_allow;
      }
    });
    if merged.is_none() {
      return self.form_gone(form_id, interaction).await;
    }

    loop {
      let prepared = self.inner.store.update(form_id, |record| {
        let target = interaction
          .and_then(|interaction| interaction.inline_message_id.clone())
          .map(MessageRef::Inline)
          .or_else(|| record.message_ref())
          .ok_or(FormError::NotFound)?;
        let markup = button::render(&mut record.grid, self.inner.tokens.as_ref())?;
        Ok::<_, FormError>((target, markup))
      });

      let (target, markup) = match prepared {
        Some(Ok(prepared)) => prepared,
        Some(Err(e)) => return Err(e),
        None => return self.form_gone(form_id, interaction).await,
      };

      match self
        .inner
        .transport
        .edit_message(&target, &text, Some(&markup), disable_web_page_preview)
        .await
      {
        Ok(()) => return Ok(()),
        Err(Error::MessageNotModified) => {
          self.acknowledge(interaction, None).await;
          return Ok(());
        }
        Err(Error::RateLimited(delay)) => {
          info!("Sleeping {:?} on flood wait...", delay);
          tokio::time::sleep(delay).await;
        }
        Err(Error::MessageNotFound(reason)) => {
          debug!("Message of form {} is gone: {}", form_id, reason);
          self
            .acknowledge(interaction, Some(self.inner.config.strings.message_deleted.as_str()))
            .await;
          return Err(FormError::MessageGone);
        }
        Err(e) => {
          warn!("Failed to edit form {}: {}", form_id, e);
          return Err(e.into());
        }
      }
    }
  }

  async fn form_gone(
    &self,
    form_id: &str,
    interaction: Option<&Interaction>,
  ) -> Result<(), FormError> {
    debug!("Form {} vanished before it could be edited", form_id);
    self
      .acknowledge(interaction, Some(self.inner.config.strings.message_deleted.as_str()))
      .await;
    Err(FormError::NotFound)
  }

  /// Answers the callback query behind `interaction`, ignoring any failure.
  pub(crate) async fn acknowledge(&self, interaction: Option<&Interaction>, notice: Option<&str>) {
    let Some(interaction) = interaction else {
      return;
    };
    if !interaction.mark_answered() {
      return;
    }
    match self
      .inner
      .transport
      .answer_callback(&interaction.query_id, notice)
      .await
    {
      Ok(()) | Err(Error::QueryExpired) => {}
      Err(e) => debug!("Could not answer callback query: {}", e),
    }
  }

  /// Deletes the form message, then drops the form and runs its unload hook.
  ///
  /// Returns `false` if the form is unknown or not sent yet, if the message
  /// could not be deleted, or if the hook failed. Once the message is gone
  /// the form is always dropped.
  #[instrument(skip(self))]
  pub async fn delete(&self, form_id: &str) -> bool {
    let Some(Some((chat_id, message_id))) = self
      .inner
      .store
      .view(form_id, |record| record.chat_id().zip(record.message_id()))
    else {
      debug!("Nothing to delete for form {}", form_id);
      return false;
    };

    if let Err(e) = self
      .inner
      .transport
      .delete_messages(chat_id, &[message_id])
      .await
    {
      warn!("Could not delete message of form {}: {}", form_id, e);
      return false;
    }

    match self.inner.store.remove(form_id) {
      Some(record) => self.run_unload(record),
      None => true,
    }
  }

  /// Drops the form and runs its unload hook, leaving the message alone.
  #[instrument(skip(self))]
  pub async fn unload(&self, form_id: &str) -> bool {
    match self.inner.store.remove(form_id) {
      Some(record) => self.run_unload(record),
      None => {
        debug!("Form {} is already unloaded", form_id);
        false
      }
    }
  }

  fn run_unload(&self, record: FormRecord) -> bool {
    let form_id = record.id.clone();
    match record.unload() {
      Ok(()) => {
        debug!("Unloaded form {}", form_id);
        true
      }
      Err(e) => {
        warn!("Unload hook of form {} failed: {:#}", form_id, e);
        false
      }
    }
  }

  /// Unloads every form whose ttl has passed at `now`.
  pub async fn sweep_expired(&self, now: i64) -> usize {
    let mut unloaded = 0;
    for form_id in self.inner.store.expired(now) {
      if self.unload(&form_id).await {
        unloaded += 1;
      }
    }
    unloaded
  }
}
