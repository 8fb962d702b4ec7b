// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
#![allow(dead_code)]

use async_trait::async_trait;
use config::FormsConfig;
use error::Error;
use forms::{FormManager, FormStore, QueryResult, SentMessage, TokenSource, Transport};
use std::{
  collections::{HashSet, VecDeque},
  sync::{
    atomic::{AtomicI64, AtomicUsize, Ordering},
    Arc, Mutex,
  },
};
use telegram::{
  CallbackQuery, InlineKeyboardMarkup, InlineQuery, InlineQueryResult, MessageRef, User,
};

pub const OWNER: i64 = 1;
pub const STRANGER: i64 = 2;
pub const CHAT: i64 = -100;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
  Inline {
    bot: String,
    query: String,
  },
  Materialize {
    chat_id: i64,
    reply_to: Option<i64>,
  },
  Send {
    chat_id: i64,
    text: String,
    reply_to: Option<i64>,
  },
  Edit {
    target: MessageRef,
    text: String,
    markup: Option<InlineKeyboardMarkup>,
    disable_preview: bool,
  },
  Delete {
    chat_id: i64,
    message_ids: Vec<i64>,
  },
  AnswerInline {
    query_id: String,
    results: Vec<InlineQueryResult>,
    cache_time: u32,
  },
  AnswerCallback {
    query_id: String,
    notice: Option<String>,
  },
}

/// Records every request and fails the ones scripted to fail.
#[derive(Default)]
pub struct RecordingTransport {
  calls: Mutex<Vec<Call>>,
  next_message_id: AtomicI64,
  pub no_inline_results: Mutex<bool>,
  pub edit_failures: Mutex<VecDeque<Error>>,
  pub delete_failures: Mutex<VecDeque<Error>>,
}

impl RecordingTransport {
  fn record(&self, call: Call) {
    self.calls.lock().unwrap().push(call);
  }

  pub fn calls(&self) -> Vec<Call> {
    self.calls.lock().unwrap().clone()
  }

  pub fn edits(&self) -> Vec<Call> {
    self
      .calls()
      .into_iter()
      .filter(|call| matches!(call, Call::Edit { .. }))
      .collect()
  }

  pub fn callback_answers(&self) -> Vec<Option<String>> {
    self
      .calls()
      .into_iter()
      .filter_map(|call| match call {
        Call::AnswerCallback { notice, .. } => Some(notice),
        _ => None,
      })
      .collect()
  }

  pub fn inline_answers(&self) -> Vec<Vec<InlineQueryResult>> {
    self
      .calls()
      .into_iter()
      .filter_map(|call| match call {
        Call::AnswerInline { results, .. } => Some(results),
        _ => None,
      })
      .collect()
  }

  pub fn fail_next_edit(&self, error: Error) {
    self.edit_failures.lock().unwrap().push_back(error);
  }

  pub fn fail_next_delete(&self, error: Error) {
    self.delete_failures.lock().unwrap().push_back(error);
  }

  pub fn return_no_inline_results(&self) {
    *self.no_inline_results.lock().unwrap() = true;
  }
}

#[async_trait]
impl Transport for RecordingTransport {
  async fn send_via_bot_query(
    &self,
    bot_username: &str,
    query: &str,
  ) -> Result<Vec<QueryResult>, Error> {
    self.record(Call::Inline {
      bot: bot_username.into(),
      query: query.into(),
    });
    if *self.no_inline_results.lock().unwrap() {
      return Ok(Vec::new());
    }
    Ok(vec![QueryResult {
      query_id: "inline-query".into(),
      result_id: "result".into(),
    }])
  }

  async fn materialize(
    &self,
    _result: &QueryResult,
    chat_id: i64,
    reply_to: Option<i64>,
  ) -> Result<SentMessage, Error> {
    self.record(Call::Materialize { chat_id, reply_to });
    Ok(SentMessage {
      chat_id,
      message_id: 100 + self.next_message_id.fetch_add(1, Ordering::SeqCst),
    })
  }

  async fn send_message(
    &self,
    chat_id: i64,
    text: &str,
    reply_to: Option<i64>,
  ) -> Result<SentMessage, Error> {
    self.record(Call::Send {
      chat_id,
      text: text.into(),
      reply_to,
    });
    Ok(SentMessage {
      chat_id,
      message_id: 500 + self.next_message_id.fetch_add(1, Ordering::SeqCst),
    })
  }

  async fn edit_message(
    &self,
    target: &MessageRef,
    text: &str,
    markup: Option<&InlineKeyboardMarkup>,
    disable_web_page_preview: bool,
  ) -> Result<(), Error> {
    self.record(Call::Edit {
      target: target.clone(),
      text: text.into(),
      markup: markup.cloned(),
      disable_preview: disable_web_page_preview,
    });
    match self.edit_failures.lock().unwrap().pop_front() {
      Some(error) => Err(error),
      None => Ok(()),
    }
  }

  async fn delete_messages(&self, chat_id: i64, message_ids: &[i64]) -> Result<(), Error> {
    self.record(Call::Delete {
      chat_id,
      message_ids: message_ids.to_vec(),
    });
    match self.delete_failures.lock().unwrap().pop_front() {
      Some(error) => Err(error),
      None => Ok(()),
    }
  }

  async fn answer_inline_query(
    &self,
    query_id: &str,
    results: Vec<InlineQueryResult>,
    cache_time: u32,
  ) -> Result<(), Error> {
    self.record(Call::AnswerInline {
      query_id: query_id.into(),
      results,
      cache_time,
    });
    Ok(())
  }

  async fn answer_callback(&self, query_id: &str, notice: Option<&str>) -> Result<(), Error> {
    self.record(Call::AnswerCallback {
      query_id: query_id.into(),
      notice: notice.map(Into::into),
    });
    Ok(())
  }
}

/// Zero-padded counter, so every token is unique and has the asked length.
#[derive(Default)]
pub struct SequentialTokens(AtomicUsize);

impl TokenSource for SequentialTokens {
  fn token(&self, len: usize) -> String {
    let n = self.0.fetch_add(1, Ordering::SeqCst);
    format!("{:0>width$}", n, width = len)
  }
}

pub struct Harness {
  pub manager: FormManager,
  pub transport: Arc<RecordingTransport>,
}

pub fn harness() -> Harness {
  let transport = Arc::new(RecordingTransport::default());
  let owners: HashSet<i64> = [OWNER].into_iter().collect();
  let manager = FormManager::with_tokens(
    Arc::new(FormStore::new()),
    transport.clone(),
    Arc::new(owners),
    Arc::new(SequentialTokens::default()),
    "formbot",
    FormsConfig::default(),
  );
  Harness { manager, transport }
}

pub fn user(id: i64) -> User {
  User {
    id,
    is_bot: false,
    first_name: format!("user{}", id),
    username: None,
  }
}

pub fn inline_query(from: i64, query: &str) -> InlineQuery {
  InlineQuery {
    id: format!("iq-{}", from),
    from: user(from),
    query: query.into(),
  }
}

pub fn callback_query(from: i64, data: &str, inline_message_id: Option<&str>) -> CallbackQuery {
  CallbackQuery {
    id: format!("cq-{}", from),
    from: user(from),
    message: None,
    inline_message_id: inline_message_id.map(Into::into),
    data: Some(data.into()),
  }
}

/// Token of the button at `row`, `column` of a stored form.
pub fn token_of(manager: &FormManager, form_id: &str, row: usize, column: usize) -> String {
  manager
    .store()
    .view(form_id, |record| {
      record.grid[row][column]
        .token()
        .map(ToString::to_string)
    })
    .flatten()
    .expect("button has a token")
}
