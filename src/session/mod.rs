pub mod store;
pub mod types;

pub use store::{SessionStore, TurnGuard};
pub use types::{Message, MessageRole, Session, SessionSummary, UserId};
