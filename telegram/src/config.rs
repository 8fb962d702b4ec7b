// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use error::Error;
use std::time::Duration;

pub(crate) const TELEGRAM_API_BASE: &str = "https://api.telegram.org/bot";
pub(crate) const MAX_MESSAGE_LENGTH: usize = 4096;
/// Update kinds the forms engine reacts to.
pub(crate) const ALLOWED_UPDATES: &[&str] = &["message", "inline_query", "callback_query"];

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

#[derive(Clone, Debug)]
pub struct ClientConfig {
  pub(crate) token: String,
  pub(crate) api_base: String,
  pub(crate) timeout: Duration,
  pub(crate) retry_attempts: u32,
  pub(crate) retry_delay: Duration,
}

impl ClientConfig {
  pub(crate) fn method_url(&self, method: &str) -> String {
    format!("{}{}/{}", self.api_base, self.token, method)
  }

  /// Request deadline for a long poll; the server holds it for `timeout`.
  pub(crate) fn poll_deadline(&self, timeout: u32) -> Duration {
    Duration::from_secs(u64::from(timeout)) + self.timeout
  }

  /// Pause before resending after `error`. Flood waits dictate their own.
  pub(crate) fn backoff(&self, error: &Error) -> Duration {
    match error {
      Error::RateLimited(delay) => *delay,
      _ => self.retry_delay,
    }
  }
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      token: String::new(),
      api_base: TELEGRAM_API_BASE.to_string(),
      timeout: DEFAULT_TIMEOUT,
      retry_attempts: DEFAULT_RETRY_ATTEMPTS,
      retry_delay: DEFAULT_RETRY_DELAY,
    }
  }
}
