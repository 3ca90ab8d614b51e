use super::types::BotCommand;
use crate::channels::CommandInvocation;
use crate::error::CommandError;
use crate::session::UserId;

pub fn parse_command(invocation: &CommandInvocation) -> BotCommand {
    let name = invocation.name.to_lowercase();
    let args = invocation.args.trim().to_string();

    match name.as_str() {
        "start" => BotCommand::Start,
        "help" => BotCommand::Help,
        "new" => BotCommand::New,
        "listusers" => BotCommand::ListUsers,
        "adduser" => BotCommand::AddUser { target: args },
        "removeuser" => BotCommand::RemoveUser { target: args },
        _ => BotCommand::Unknown(name),
    }
}

/// First whitespace-separated token as a non-zero user id.
pub fn parse_user_id(args: &str) -> Result<UserId, CommandError> {
    let Some(raw) = args.split_whitespace().next() else {
        return Err(CommandError::MissingArgument("user ID"));
    };
    match raw.parse::<UserId>() {
        Ok(id) if id.get() != 0 => Ok(id),
        _ => Err(CommandError::InvalidArgument(raw.to_string())),
    }
}

/// `(command, description)` pairs for the client-side command menu.
pub fn command_menu() -> Vec<(String, String)> {
    [
        ("help", t!("menu.help")),
        ("new", t!("menu.new")),
        ("listusers", t!("menu.listusers")),
        ("adduser", t!("menu.adduser")),
        ("removeuser", t!("menu.removeuser")),
    ]
    .into_iter()
    .map(|(name, description)| (name.to_string(), description.into_owned()))
    .collect()
}
