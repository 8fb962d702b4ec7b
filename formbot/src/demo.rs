// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use anyhow::Result;
use forms::{
  handler_fn, Button, EditRequest, FormCall, FormManager, FormOptions, Grid, SourceMessage,
  Target,
};
use std::sync::{
  atomic::{AtomicI64, Ordering},
  Arc,
};
use telegram::Message;
use tracing::info;

/// Replies to `/form` with a counter form.
pub async fn on_message(manager: &FormManager, message: &Message) -> Result<()> {
  let Some(text) = message.text.as_deref() else {
    return Ok(());
  };
  if text.split_whitespace().next() != Some("/form") {
    return Ok(());
  }

  let count = Arc::new(AtomicI64::new(0));
  let form_id = manager
    .create(
      counter_text(0),
      Target::Message(SourceMessage::from_message(message, false)),
      counter_grid(count),
      FormOptions::default()
        .force_me(false)
        .on_unload(|| {
          info!("Counter form unloaded");
          Ok(())
        }),
    )
    .await?;

  info!("Created counter form {}", form_id);
  Ok(())
}

fn counter_text(value: i64) -> String {
  format!("<b>Counter:</b> {}", value)
}

fn counter_grid(count: Arc<AtomicI64>) -> Grid {
  let increment = count.clone();
  let decrement = count;

  vec![
    vec![
      Button::callback(
        "-1",
        handler_fn(move |call: FormCall| {
          let count = decrement.clone();
          async move {
            let value = count.fetch_sub(1, Ordering::SeqCst) - 1;
            call.edit(EditRequest::new(counter_text(value))).await?;
            Ok(())
          }
        }),
      ),
      Button::callback(
        "+1",
        handler_fn(move |call: FormCall| {
          let count = increment.clone();
          async move {
            let value = count.fetch_add(1, Ordering::SeqCst) + 1;
            call.edit(EditRequest::new(counter_text(value))).await?;
            Ok(())
          }
        }),
      ),
    ],
    vec![Button::input("✍️ Say something", "Your message")],
    vec![
      Button::url("Bot API", "https://core.telegram.org/bots/api"),
      Button::callback(
        "Close",
        handler_fn(|call: FormCall| async move {
          if !call.delete().await {
            call.answer(Some("Could not close the form")).await;
          }
          Ok(())
        }),
      ),
    ],
  ]
}
