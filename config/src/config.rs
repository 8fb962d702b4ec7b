// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::instrument;

const DEFAULT_MARKUP_TTL_SECS: u64 = 86_400;
const DEFAULT_MIN_TTL_SECS: u64 = 10;
const DEFAULT_INLINE_CACHE_SECS: u32 = 60;
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 300;
const DEFAULT_POLL_TIMEOUT_SECS: u32 = 30;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub telegram: TelegramSection,
  pub forms: FormsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramSection {
  pub token: String,
  pub bot_username: String,
  /// Users allowed to press buttons of `force_me` forms.
  pub owners: Vec<i64>,
  pub poll_timeout_secs: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
  /// Upper TTL bound; also the TTL of forms created without one.
  pub markup_ttl_secs: u64,
  pub min_ttl_secs: u64,
  pub inline_cache_secs: u32,
  pub cleanup_interval_secs: u64,
  pub strings: Strings,
}

/// User-facing notices. HTML is allowed where the text ends up in a message.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Strings {
  pub inline_error: String,
  pub message_deleted: String,
  pub not_allowed: String,
  pub input_description: String,
  pub form_title: String,
}

impl Config {
  #[instrument(skip(path))]
  pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
    let content = fs::read_to_string(path)?;
    Self::from_toml(&content)
  }

  pub fn from_toml(content: &str) -> anyhow::Result<Self> {
    let config: Self = toml::from_str(content)?;
    tracing::debug!("Loaded configuration successfully");
    Ok(config)
  }
}

impl FormsConfig {
  pub fn max_ttl(&self) -> Duration {
    Duration::from_secs(self.markup_ttl_secs)
  }

  pub fn min_ttl(&self) -> Duration {
    Duration::from_secs(self.min_ttl_secs)
  }

  pub fn cleanup_interval(&self) -> Duration {
    Duration::from_secs(self.cleanup_interval_secs)
  }
}

impl Default for TelegramSection {
  fn default() -> Self {
    Self {
      token: String::new(),
      bot_username: String::new(),
      owners: Vec::new(),
      poll_timeout_secs: DEFAULT_POLL_TIMEOUT_SECS,
    }
  }
}

impl Default for FormsConfig {
  fn default() -> Self {
    Self {
      markup_ttl_secs: DEFAULT_MARKUP_TTL_SECS,
      min_ttl_secs: DEFAULT_MIN_TTL_SECS,
      inline_cache_secs: DEFAULT_INLINE_CACHE_SECS,
      cleanup_interval_secs: DEFAULT_CLEANUP_INTERVAL_SECS,
      strings: Strings::default(),
    }
  }
}

impl Default for Strings {
  fn default() -> Self {
    Self {
      inline_error: "🚫 <b>A problem occurred with inline bot while processing query. \
                     Check logs for further info.</b>"
        .into(),
      message_deleted: "I should have edited some message, but it is deleted :(".into(),
      not_allowed: "You are not allowed to press this button!".into(),
      input_description: "⚠️ Please, do not remove identifier!".into(),
      form_title: "Form".into(),
    }
  }
}
