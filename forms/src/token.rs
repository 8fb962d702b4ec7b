// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
use rand::Rng;

pub const FORM_ID_LEN: usize = 30;
pub const CALLBACK_TOKEN_LEN: usize = 30;
pub const INPUT_TOKEN_LEN: usize = 10;
pub const RESULT_ID_LEN: usize = 20;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz1234567890";

/// Source of the opaque identifiers used for forms, buttons and inline results.
pub trait TokenSource: Send + Sync {
  fn token(&self, len: usize) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokens;

impl TokenSource for RandomTokens {
  fn token(&self, len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
      .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
      .collect()
  }
}
