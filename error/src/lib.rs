// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use std::time::Duration;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
  #[error("API error: {0}")]
  ApiError(String),
  #[error("Configuration error: {0}")]
  ConfigError(String),
  #[error("IO error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("HTTP error: {0}")]
  HttpError(#[from] reqwest::Error),
  #[error("JSON error: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("Failed to parse response: {0}")]
  ParseError(String),
  #[error("Rate limit exceeded, retry after {0:?}")]
  RateLimited(Duration),
  #[error("Message is not modified")]
  MessageNotModified,
  #[error("Message not found: {0}")]
  MessageNotFound(String),
  #[error("Query is too old or its id is invalid")]
  QueryExpired,
  #[error("Timeout error")]
  TimeoutError,
}

impl Error {
  /// `true` for failures that go away if the same request is sent again later.
  pub fn is_transient(&self) -> bool {
    matches!(
      self,
      Error::HttpError(_) | Error::RateLimited(_) | Error::TimeoutError
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn signals_are_not_transient() {
    assert!(!Error::MessageNotModified.is_transient());
    assert!(!Error::MessageNotFound("gone".into()).is_transient());
    assert!(!Error::QueryExpired.is_transient());
    assert!(Error::RateLimited(Duration::from_secs(3)).is_transient());
  }

  #[test]
  fn rate_limit_message_carries_delay() {
    let text = Error::RateLimited(Duration::from_secs(7)).to_string();
    assert_eq!(text, "Rate limit exceeded, retry after 7s");
  }
}
