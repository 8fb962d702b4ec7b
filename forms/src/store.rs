// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use crate::{
  button::{self, ButtonKind},
  error::FormError,
  form::FormRecord,
  router::CallbackHandler,
  token::TokenSource,
};
use std::{
  collections::HashMap,
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use telegram::InlineKeyboardMarkup;

/// Text and keyboard of a form, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedForm {
  pub text: String,
  pub markup: InlineKeyboardMarkup,
}

/// Input button that matched an inline query.
#[derive(Debug, Clone)]
pub(crate) struct InputMatch {
  pub form_id: String,
  pub prompt: String,
  pub always_allow: Vec<i64>,
}

/// Callback button that matched a callback query.
#[derive(Clone)]
pub(crate) struct CallbackMatch {
  pub form_id: String,
  pub handler: Arc<dyn CallbackHandler>,
  pub force_me: bool,
  pub always_allow: Vec<i64>,
}

/// Live forms, keyed by form id. Every access is a short critical section;
/// nothing here is held across an await point.
#[derive(Default)]
pub struct FormStore {
  forms: Mutex<HashMap<String, FormRecord>>,
}

impl FormStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, FormRecord>> {
    self.forms.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn insert(&self, record: FormRecord) {
    self.lock().insert(record.id.clone(), record);
  }

  /// Removing an absent id is a no-op.
  pub fn remove(&self, form_id: &str) -> Option<FormRecord> {
    self.lock().remove(form_id)
  }

  pub fn contains(&self, form_id: &str) -> bool {
    self.lock().contains_key(form_id)
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  pub fn ids(&self) -> Vec<String> {
    self.lock().keys().cloned().collect()
  }

  pub fn view<R>(&self, form_id: &str, f: impl FnOnce(&FormRecord) -> R) -> Option<R> {
    self.lock().get(form_id).map(f)
  }

  pub fn update<R>(&self, form_id: &str, f: impl FnOnce(&mut FormRecord) -> R) -> Option<R> {
    self.lock().get_mut(form_id).map(f)
  }

  /// Stores where the form was sent. Returns `false` if the form is gone or
  /// already had a message.
  pub fn materialize(&self, form_id: &str, chat_id: i64, message_id: i64) -> bool {
    self
      .update(form_id, |record| record.set_message(chat_id, message_id))
      .unwrap_or(false)
  }

  pub fn render_form(
    &self,
    form_id: &str,
    tokens: &dyn TokenSource,
  ) -> Result<RenderedForm, FormError> {
    self
      .update(form_id, |record| {
        let markup = button::render(&mut record.grid, tokens)?;
        Ok(RenderedForm {
          text: record.text.clone(),
          markup,
        })
      })
      .unwrap_or(Err(FormError::NotFound))
  }

  /// Ids of forms whose ttl has passed at `now`.
  pub fn expired(&self, now: i64) -> Vec<String> {
    self
      .lock()
      .values()
      .filter(|record| record.is_expired(now))
      .map(|record| record.id.clone())
      .collect()
  }

  pub(crate) fn input_candidates(&self, token: &str, now: i64) -> Vec<InputMatch> {
    let forms = self.lock();
    let mut matches = Vec::new();
    for record in forms.values().filter(|record| !record.is_expired(now)) {
      for button in record.grid.iter().flatten() {
        if button.token() != Some(token) {
          continue;
        }
        if let (ButtonKind::Input(_), Some(prompt)) = (&button.kind, button.prompt()) {
          matches.push(InputMatch {
            form_id: record.id.clone(),
            prompt: prompt.to_string(),
            always_allow: record.always_allow.clone(),
          });
        }
      }
    }
    matches
  }

  pub(crate) fn find_callback(&self, token: &str, now: i64) -> Option<CallbackMatch> {
    let forms = self.lock();
    forms
      .values()
      .filter(|record| !record.is_expired(now))
      .find_map(|record| {
        record
          .grid
          .iter()
          .flatten()
          .find_map(|button| match &button.kind {
            ButtonKind::Callback(handler) if button.token() == Some(token) => {
              Some(CallbackMatch {
                form_id: record.id.clone(),
                handler: handler.clone(),
                force_me: record.force_me,
                always_allow: record.always_allow.clone(),
              })
            }
            _ => None,
          })
      })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    button::Button,
    form::FormOptions,
    router::{handler_fn, FormCall},
    token::RandomTokens,
  };

  fn record(id: &str, expires_at: i64) -> FormRecord {
    let grid = vec![
      vec![Button::callback(
        "+1",
        handler_fn(|_call: FormCall| async { Ok(()) }),
      )],
      vec![Button::input("Rename", "New name")],
    ];
    FormRecord::new(
      id.into(),
      "text".into(),
      grid,
      expires_at,
      FormOptions::default(),
    )
  }

  #[test]
  fn removal_is_idempotent() {
    let store = FormStore::new();
    store.insert(record("a", 100));
    assert!(store.contains("a"));
    assert!(store.remove("a").is_some());
    assert!(store.remove("a").is_none());
    assert!(store.is_empty());
  }

  #[test]
  fn materialize_is_write_once() {
    let store = FormStore::new();
    store.insert(record("a", 100));
    assert!(store.materialize("a", -100, 1));
    assert!(!store.materialize("a", -100, 2));
    assert!(!store.materialize("missing", -100, 3));
    assert_eq!(store.view("a", |r| r.message_id()), Some(Some(1)));
  }

  #[test]
  fn render_form_annotates_and_finds_buttons() {
    let store = FormStore::new();
    store.insert(record("a", 100));
    let rendered = store.render_form("a", &RandomTokens).unwrap();
    assert_eq!(rendered.text, "text");
    assert_eq!(rendered.markup.inline_keyboard.len(), 2);

    let (callback, input) = store
      .view("a", |r| {
        (
          r.grid[0][0].token().unwrap().to_string(),
          r.grid[1][0].token().unwrap().to_string(),
        )
      })
      .unwrap();

    let found = store.find_callback(&callback, 50).unwrap();
    assert_eq!(found.form_id, "a");
    assert!(found.force_me);
    assert!(store.find_callback(&input, 50).is_none());

    let inputs = store.input_candidates(&input, 50);
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].prompt, "New name");
    assert!(store.input_candidates(&callback, 50).is_empty());
  }

  #[test]
  fn expired_forms_are_not_routed() {
    let store = FormStore::new();
    store.insert(record("old", 10));
    store.render_form("old", &RandomTokens).unwrap();
    let token = store
      .view("old", |r| r.grid[0][0].token().unwrap().to_string())
      .unwrap();

    assert!(store.find_callback(&token, 10).is_none());
    assert_eq!(store.expired(10), vec!["old".to_string()]);
    assert!(store.expired(9).is_empty());
  }

  #[test]
  fn render_missing_form_is_not_found() {
    let store = FormStore::new();
    assert!(matches!(
      store.render_form("missing", &RandomTokens),
      Err(FormError::NotFound)
    ));
  }
}
