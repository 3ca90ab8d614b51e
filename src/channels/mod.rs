pub mod chunker;
pub mod telegram;
pub mod traits;

pub use telegram::TelegramChannel;
pub use traits::{Channel, ChannelMessage, ChatId, CommandInvocation, SendOptions};
