/// Slash commands understood by the bot.
///
/// Admin commands keep their raw argument; it is only parsed once the caller
/// has been confirmed as an admin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Help,
    New,
    ListUsers,
    AddUser { target: String },
    RemoveUser { target: String },
    Unknown(String),
}

impl BotCommand {
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Self::ListUsers | Self::AddUser { .. } | Self::RemoveUser { .. }
        )
    }
}
