pub mod dispatcher;
pub mod parser;
pub mod types;

pub use dispatcher::CommandDispatcher;
pub use parser::{command_menu, parse_command, parse_user_id};
pub use types::BotCommand;
