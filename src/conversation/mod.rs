pub mod engine;
pub mod turn;

pub use engine::{ConversationEngine, ReplyBody, TurnReply, TurnSettings};
pub use turn::Turn;
