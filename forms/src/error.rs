// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormError {
  #[error("Form text cannot be empty")]
  EmptyText,
  #[error("Invalid button at row {row}, column {column}: {reason}")]
  InvalidButton {
    row: usize,
    column: usize,
    reason: String,
  },
  #[error("Form not found")]
  NotFound,
  #[error("Inline bot returned no results")]
  NoInlineResults,
  #[error("Form message is gone")]
  MessageGone,
  #[error("Transport error: {0}")]
  Transport(#[from] error::Error),
}
