// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
mod builders;
mod client;
mod config;
pub mod types;

pub use crate::{
  builders::{MessageBuilder, TelegramClientBuilder},
  client::TelegramClient,
  types::{
    CallbackQuery, InlineKeyboardButton, InlineKeyboardButtonAction, InlineKeyboardMarkup,
    InlineQuery, InlineQueryResult, InlineQueryResultArticle, InputTextMessageContent, Message,
    MessageRef, ParseMode, Update, User,
  },
};
