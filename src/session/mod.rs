//! Persisted session: tokens, cached user, and the store behind them.

pub mod model;
pub mod store;

pub use model::{Session, SessionEvent, UserSummary};
pub use store::{ACCESS_TOKEN_KEY, FileStore, MemoryStore, REFRESH_TOKEN_KEY, SESSION_KEYS, SessionStore, USER_KEY};
