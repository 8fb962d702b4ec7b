// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
mod bridge;
mod demo;

use anyhow::{Context, Result};
use bridge::BotBridge;
use config::Config;
use error::Error;
use forms::{spawn_sweeper, CallbackOutcome, FormManager, FormStore};
use std::{collections::HashSet, env, path::PathBuf, sync::Arc, time::Duration};
use telegram::{TelegramClient, Update};
use tracing::{debug, info, instrument, warn};

const DEFAULT_CONFIG_PATH: &str = "formbot.toml";
const POLL_ERROR_DELAY: Duration = Duration::from_secs(5);

pub struct FormBot {
  tg: TelegramClient,
  manager: FormManager,
  poll_timeout: u32,
}

#[cfg(debug_assertions)]
fn setup_logging() {
  tracing_subscriber::fmt()
    .with_file(true)
    .with_line_number(true)
    .with_thread_ids(true)
    .init();
}

#[cfg(not(debug_assertions))]
fn setup_logging() {
  tracing_subscriber::fmt().init();
}

#[tokio::main]
async fn main() -> Result<()> {
  #[cfg(debug_assertions)]
  dotenvy::dotenv().ok();
  setup_logging();

  let config_path: PathBuf = env::var("FORMBOT_CONFIG")
    .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into())
    .into();
  let mut config = if config_path.exists() {
    Config::from_file(&config_path)
      .with_context(|| format!("Failed to load {}", config_path.display()))?
  } else {
    info!("{} not found, using defaults", config_path.display());
    Config::default()
  };
  if let Ok(token) = env::var("TELEGRAM_BOT_TOKEN") {
    config.telegram.token = token;
  }
  anyhow::ensure!(
    !config.telegram.token.is_empty(),
    "Missing TELEGRAM_BOT_TOKEN"
  );

  FormBot::new(config).await?.run().await
}

impl FormBot {
  #[instrument(skip(config))]
  pub async fn new(config: Config) -> Result<Self> {
    let tg = TelegramClient::builder()
      .token(config.telegram.token.clone())
      .build()?;

    let bot_username = if config.telegram.bot_username.is_empty() {
      tg.get_me()
        .await?
        .username
        .context("Bot account has no username")?
    } else {
      config.telegram.bot_username.clone()
    };
    info!("Running as @{}", bot_username);

    let store = Arc::new(FormStore::new());
    let owners: HashSet<i64> = config.telegram.owners.iter().copied().collect();
    let manager = FormManager::new(
      store.clone(),
      Arc::new(BotBridge::new(tg.clone(), store)),
      Arc::new(owners),
      bot_username,
      config.forms,
    );

    Ok(Self {
      tg,
      manager,
      poll_timeout: config.telegram.poll_timeout_secs,
    })
  }

  pub async fn run(&self) -> Result<()> {
    let _sweeper = spawn_sweeper(
      self.manager.clone(),
      self.manager.config().cleanup_interval(),
    );

    let mut offset = 0;
    loop {
      let updates = match self.tg.get_updates(offset, self.poll_timeout).await {
        Ok(updates) => updates,
        Err(Error::RateLimited(delay)) => {
          info!("Sleeping {:?} on flood wait...", delay);
          tokio::time::sleep(delay).await;
          continue;
        }
        Err(e) => {
          warn!("Polling failed: {}", e);
          tokio::time::sleep(POLL_ERROR_DELAY).await;
          continue;
        }
      };

      for update in updates {
        offset = offset.max(update.update_id + 1);
        let manager = self.manager.clone();
        tokio::spawn(async move { dispatch(manager, update).await });
      }
    }
  }
}

async fn dispatch(manager: FormManager, update: Update) {
  if let Some(query) = update.inline_query {
    if !manager.on_inline_query(&query).await {
      debug!("Inline query {:?} does not belong to a form", query.query);
    }
  } else if let Some(query) = update.callback_query {
    if manager.on_callback_query(&query).await == CallbackOutcome::Unrouted {
      debug!("Callback data {:?} does not belong to a form", query.data);
    }
  } else if let Some(message) = update.message {
    if let Err(e) = demo::on_message(&manager, &message).await {
      warn!("Failed to handle message {}: {:#}", message.message_id, e);
    }
  }
}
