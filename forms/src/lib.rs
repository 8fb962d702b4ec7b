// Авторские права (c) 2025 urdekcah. Все права защищены.
//
// Этот исходный код распространяется под лицензией AGPL-3.0,
// текст которой находится в файле LICENSE в корневом каталоге данного проекта.
pub mod button;
pub mod error;
pub mod expiry;
pub mod form;
pub mod manager;
pub mod router;
pub mod store;
pub mod token;
pub mod transport;

pub use button::{Button, ButtonKind, Grid, Row};
pub use crate::error::FormError;
pub use expiry::{spawn_sweeper, TtlPolicy};
pub use form::{FormOptions, FormRecord, SourceMessage, Target, UnloadHook};
pub use manager::{EditRequest, FormManager};
pub use router::{handler_fn, CallbackHandler, CallbackOutcome, FormCall};
pub use store::{FormStore, RenderedForm};
pub use token::{RandomTokens, TokenSource};
pub use transport::{PermissionRegistry, QueryResult, SentMessage, Transport};
