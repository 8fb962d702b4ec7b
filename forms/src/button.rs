// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use crate::{
  error::FormError,
  router::CallbackHandler,
  token::{TokenSource, CALLBACK_TOKEN_LEN, INPUT_TOKEN_LEN},
};
use std::{fmt, sync::Arc};
use telegram::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::{instrument, warn};

/// Bot API limit for `callback_data`, in bytes.
pub const MAX_CALLBACK_DATA_LEN: usize = 64;

pub type Row = Vec<Button>;
pub type Grid = Vec<Row>;

#[derive(Clone)]
pub enum ButtonKind {
  Url(String),
  Callback(Arc<dyn CallbackHandler>),
  /// Asks the user for a value; holds the prompt shown on the inline result card.
  Input(String),
  /// Callback button whose data is the given literal, routed by the host.
  Data(String),
}

#[derive(Clone)]
pub struct Button {
  pub text: String,
  pub kind: ButtonKind,
  token: Option<String>,
}

impl Button {
  pub fn url(text: impl Into<String>, url: impl Into<String>) -> Self {
    Self::with_kind(text, ButtonKind::Url(url.into()))
  }

  pub fn callback(text: impl Into<String>, handler: impl CallbackHandler + 'static) -> Self {
    Self::with_kind(text, ButtonKind::Callback(Arc::new(handler)))
  }

  pub fn input(text: impl Into<String>, prompt: impl Into<String>) -> Self {
    Self::with_kind(text, ButtonKind::Input(prompt.into()))
  }

  pub fn data(text: impl Into<String>, data: impl Into<String>) -> Self {
    Self::with_kind(text, ButtonKind::Data(data.into()))
  }

  fn with_kind(text: impl Into<String>, kind: ButtonKind) -> Self {
    Self {
      text: text.into(),
      kind,
      token: None,
    }
  }

  /// Correlation token assigned by [`annotate`], if any.
  pub fn token(&self) -> Option<&str> {
    self.token.as_deref()
  }

  /// `true` for buttons that route back into the form.
  pub fn is_interactive(&self) -> bool {
    matches!(self.kind, ButtonKind::Callback(_) | ButtonKind::Input(_))
  }

  /// Prompt of an input button; the label stands in when the prompt is blank.
  pub fn prompt(&self) -> Option<&str> {
    match &self.kind {
      ButtonKind::Input(prompt) if prompt.trim().is_empty() => Some(&self.text),
      ButtonKind::Input(prompt) => Some(prompt),
      _ => None,
    }
  }

  fn check(&self) -> Result<(), String> {
    if self.text.trim().is_empty() {
      return Err("button text cannot be empty".into());
    }

    match &self.kind {
      ButtonKind::Url(url) if url.trim().is_empty() => Err("url cannot be empty".into()),
      ButtonKind::Data(data) if data.is_empty() || data.len() > MAX_CALLBACK_DATA_LEN => Err(
        format!(
          "data must be 1-{} bytes, got {}",
          MAX_CALLBACK_DATA_LEN,
          data.len()
        ),
      ),
      _ => Ok(()),
    }
  }

  fn build(&self) -> Option<InlineKeyboardButton> {
    match (&self.kind, &self.token) {
      (ButtonKind::Url(url), _) => Some(InlineKeyboardButton::url(&self.text, url)),
      (ButtonKind::Callback(_), Some(token)) => {
        Some(InlineKeyboardButton::callback(&self.text, token))
      }
      // The trailing space ends the token word, so the inline handler can
      // split the typed value off it.
      (ButtonKind::Input(_), Some(token)) => Some(InlineKeyboardButton::switch_inline_current_chat(
        &self.text,
        format!("{} ", token),
      )),
      (ButtonKind::Data(data), _) => Some(InlineKeyboardButton::callback(&self.text, data)),
      (ButtonKind::Callback(_), None) | (ButtonKind::Input(_), None) => None,
    }
  }
}

impl fmt::Debug for ButtonKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ButtonKind::Url(url) => f.debug_tuple("Url").field(url).finish(),
      ButtonKind::Callback(_) => f.write_str("Callback(..)"),
      ButtonKind::Input(prompt) => f.debug_tuple("Input").field(prompt).finish(),
      ButtonKind::Data(data) => f.debug_tuple("Data").field(data).finish(),
    }
  }
}

impl fmt::Debug for Button {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Button")
      .field("text", &self.text)
      .field("kind", &self.kind)
      .field("token", &self.token)
      .finish()
  }
}

/// Checks the shape of every button before anything is sent.
pub fn validate(grid: &Grid) -> Result<(), FormError> {
  for (row, buttons) in grid.iter().enumerate() {
    for (column, button) in buttons.iter().enumerate() {
      button
        .check()
        .map_err(|reason| FormError::InvalidButton {
          row,
          column,
          reason,
        })?;
    }
  }
  Ok(())
}

pub fn is_interactive(grid: &Grid) -> bool {
  grid.iter().flatten().any(Button::is_interactive)
}

/// Gives every callback and input button a token, keeping existing ones.
pub fn annotate(grid: &mut Grid, tokens: &dyn TokenSource) {
  for button in grid.iter_mut().flatten() {
    if button.token.is_some() {
      continue;
    }
    button.token = match button.kind {
      ButtonKind::Callback(_) => Some(tokens.token(CALLBACK_TOKEN_LEN)),
      ButtonKind::Input(_) => Some(tokens.token(INPUT_TOKEN_LEN)),
      ButtonKind::Url(_) | ButtonKind::Data(_) => None,
    };
  }
}

/// Translates an annotated grid into a keyboard.
///
/// A malformed button aborts the whole keyboard. A routed button that lost
/// its token is dropped with a warning instead.
pub fn build(grid: &Grid) -> Result<InlineKeyboardMarkup, FormError> {
  validate(grid)?;

  let inline_keyboard = grid
    .iter()
    .map(|row| {
      row
        .iter()
        .filter_map(|button| {
          let built = button.build();
          if built.is_none() {
            warn!(
              "Button has not been added to form, because it is not structured properly: {:?}",
              button
            );
          }
          built
        })
        .collect::<Vec<_>>()
    })
    .filter(|row| !row.is_empty())
    .collect();

  Ok(InlineKeyboardMarkup { inline_keyboard })
}

#[instrument(skip_all)]
pub fn render(grid: &mut Grid, tokens: &dyn TokenSource) -> Result<InlineKeyboardMarkup, FormError> {
  annotate(grid, tokens);
  build(grid)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::router::{handler_fn, FormCall};
  use std::sync::atomic::{AtomicUsize, Ordering};
  use telegram::InlineKeyboardButtonAction;

  struct Counter(AtomicUsize);

  impl TokenSource for Counter {
    fn token(&self, len: usize) -> String {
      let n = self.0.fetch_add(1, Ordering::SeqCst);
      format!("{:0>width$}", n, width = len)
    }
  }

  fn noop() -> impl CallbackHandler {
    handler_fn(|_call: FormCall| async { Ok(()) })
  }

  fn sample() -> Grid {
    vec![
      vec![Button::callback("+1", noop()), Button::url("site", "https://example.org")],
      vec![Button::input("Rename", "New name"), Button::data("raw", "app:raw")],
    ]
  }

  #[test]
  fn builds_one_keyboard_button_per_button() {
    let tokens = Counter(AtomicUsize::new(0));
    let mut grid = sample();
    let markup = render(&mut grid, &tokens).unwrap();

    let callback_token = grid[0][0].token().unwrap().to_string();
    let input_token = grid[1][0].token().unwrap().to_string();
    assert_eq!(callback_token.len(), CALLBACK_TOKEN_LEN);
    assert_eq!(input_token.len(), INPUT_TOKEN_LEN);
    assert!(grid[0][1].token().is_none());
    assert!(grid[1][1].token().is_none());

    assert_eq!(
      markup.inline_keyboard,
      vec![
        vec![
          InlineKeyboardButton::callback("+1", callback_token),
          InlineKeyboardButton::url("site", "https://example.org"),
        ],
        vec![
          InlineKeyboardButton::switch_inline_current_chat("Rename", format!("{} ", input_token)),
          InlineKeyboardButton::callback("raw", "app:raw"),
        ],
      ]
    );
  }

  #[test]
  fn annotation_is_idempotent() {
    let tokens = Counter(AtomicUsize::new(0));
    let mut grid = sample();
    let first = render(&mut grid, &tokens).unwrap();
    let second = render(&mut grid, &tokens).unwrap();
    assert_eq!(first, second);

    grid.push(vec![Button::callback("new", noop())]);
    let third = render(&mut grid, &tokens).unwrap();
    assert_eq!(third.inline_keyboard[..2], first.inline_keyboard[..]);

    let fresh = grid[2][0].token().unwrap();
    assert_ne!(Some(fresh), grid[0][0].token());
  }

  #[test]
  fn routed_button_without_token_is_dropped() {
    let grid = vec![vec![
      Button::callback("lost", noop()),
      Button::url("site", "https://example.org"),
    ]];
    let markup = build(&grid).unwrap();
    assert_eq!(markup.inline_keyboard.len(), 1);
    assert_eq!(markup.inline_keyboard[0].len(), 1);
    assert!(matches!(
      markup.inline_keyboard[0][0].action,
      InlineKeyboardButtonAction::Url(_)
    ));
  }

  #[test]
  fn malformed_button_aborts_the_keyboard() {
    let tokens = Counter(AtomicUsize::new(0));
    let mut grid = vec![
      vec![Button::callback("ok", noop())],
      vec![Button::data("too long", "x".repeat(MAX_CALLBACK_DATA_LEN + 1))],
    ];
    let result = render(&mut grid, &tokens);
    assert!(matches!(
      result,
      Err(FormError::InvalidButton { row: 1, column: 0, .. })
    ));

    let grid = vec![vec![Button::url("  ", "https://example.org")]];
    assert!(validate(&grid).is_err());
    let grid = vec![vec![Button::url("site", "")]];
    assert!(validate(&grid).is_err());
  }

  #[test]
  fn interactivity_ignores_links_and_data() {
    let display = vec![
      vec![Button::url("site", "https://example.org")],
      vec![Button::data("raw", "app:raw")],
    ];
    assert!(!is_interactive(&display));
    assert!(is_interactive(&sample()));
    assert!(!is_interactive(&Vec::new()));
  }

  #[test]
  fn blank_prompt_falls_back_to_label() {
    assert_eq!(Button::input("Rename", "").prompt(), Some("Rename"));
    assert_eq!(Button::input("Rename", "New name").prompt(), Some("New name"));
    assert_eq!(Button::url("a", "b").prompt(), None);
  }
}
