use super::parser::{parse_command, parse_user_id};
use super::types::BotCommand;
use crate::channels::CommandInvocation;
use crate::error::{AccessError, CommandError};
use crate::security::{AccessController, AccessListStore};
use crate::session::{SessionStore, UserId};
use chrono::Utc;
use std::fmt::Write as _;
use std::sync::Arc;

/// Runs slash commands against the access lists and the session store.
///
/// Allow-list mutations and the save that follows them run under one
/// mutex, so concurrent admin commands never interleave. A failed save undoes
/// the in-memory change.
pub struct CommandDispatcher {
    access: Arc<AccessController>,
    sessions: Arc<SessionStore>,
    persistence: Arc<dyn AccessListStore>,
    mutation_lock: tokio::sync::Mutex<()>,
    draw_hint: String,
}

impl CommandDispatcher {
    pub fn new(
        access: Arc<AccessController>,
        sessions: Arc<SessionStore>,
        persistence: Arc<dyn AccessListStore>,
        draw_hint: impl Into<String>,
    ) -> Self {
        Self {
            access,
            sessions,
            persistence,
            mutation_lock: tokio::sync::Mutex::new(()),
            draw_hint: draw_hint.into(),
        }
    }

    /// Reply text for `invocation` sent by `caller`. The caller has already
    /// passed the allow-list gate.
    pub async fn dispatch(&self, caller: UserId, invocation: &CommandInvocation) -> String {
        let command = parse_command(invocation);
        if command.requires_admin() && !self.access.is_admin(caller) {
            tracing::warn!(user = %caller, command = %invocation.name, "admin command refused");
            return t!("bot.not_allowed").into_owned();
        }

        match command {
            BotCommand::Start => t!("bot.welcome").into_owned(),
            BotCommand::Help => t!("bot.help", draw = self.draw_hint.as_str()).into_owned(),
            BotCommand::New => {
                self.sessions.reset(caller).await;
                t!("bot.new_conversation").into_owned()
            }
            BotCommand::ListUsers => self.list_users(),
            BotCommand::AddUser { target } => {
                let outcome = match parse_user_id(&target) {
                    Ok(id) => self.add_user(id).await.map(|added| (id, added)),
                    Err(err) => Err(err),
                };
                match outcome {
                    Ok((id, true)) => t!("bot.user_added", id = id).into_owned(),
                    Ok((id, false)) => t!("bot.user_already_allowed", id = id).into_owned(),
                    Err(err) => render_error(&err),
                }
            }
            BotCommand::RemoveUser { target } => {
                let outcome = match parse_user_id(&target) {
                    Ok(id) => self.remove_user(id).await.map(|()| id),
                    Err(err) => Err(err),
                };
                match outcome {
                    Ok(id) => t!("bot.user_removed", id = id).into_owned(),
                    Err(err) => render_error(&err),
                }
            }
            BotCommand::Unknown(name) => {
                tracing::debug!(user = %caller, command = %name, "unknown command");
                t!("bot.unknown_command").into_owned()
            }
        }
    }

    /// Idempotent. Returns whether the allow-list changed; unchanged lists
    /// are not rewritten.
    pub async fn add_user(&self, target: UserId) -> Result<bool, CommandError> {
        let _guard = self.mutation_lock.lock().await;
        if !self.access.add_allowed(target) {
            return Ok(false);
        }

        if let Err(err) = self.persistence.save(&self.access.snapshot()).await {
            self.access.discard_allowed(target);
            tracing::error!(user = %target, error = %format!("{err:#}"), "allow-list save failed; add undone");
            return Err(CommandError::Persistence(format!("{err:#}")));
        }

        tracing::info!(user = %target, "user added to allow-list");
        Ok(true)
    }

    pub async fn remove_user(&self, target: UserId) -> Result<(), CommandError> {
        let _guard = self.mutation_lock.lock().await;
        self.access.remove_allowed(target)?;

        if let Err(err) = self.persistence.save(&self.access.snapshot()).await {
            self.access.add_allowed(target);
            tracing::error!(user = %target, error = %format!("{err:#}"), "allow-list save failed; removal undone");
            return Err(CommandError::Persistence(format!("{err:#}")));
        }

        tracing::info!(user = %target, "user removed from allow-list");
        Ok(())
    }

    fn list_users(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", t!("bot.connected_users"));
        let summaries = self.sessions.summaries(Utc::now());
        if summaries.is_empty() {
            let _ = writeln!(out, "{}", t!("bot.none"));
        }
        for summary in summaries {
            let _ = writeln!(
                out,
                "{}",
                t!(
                    "bot.session_line",
                    id = summary.identity,
                    messages = summary.message_count,
                    idle = summary.idle_secs
                )
            );
        }

        let _ = writeln!(out, "{}", t!("bot.allowed_users"));
        let allowed = self.access.allowed();
        if allowed.is_empty() {
            let _ = writeln!(out, "{}", t!("bot.open_access"));
        }
        for id in allowed.iter() {
            let _ = writeln!(out, "{id}");
        }
        out
    }
}

fn render_error(err: &CommandError) -> String {
    match err {
        CommandError::MissingArgument(_) => t!("bot.provide_user_id").into_owned(),
        CommandError::InvalidArgument(raw) => t!("bot.invalid_user_id", value = raw).into_owned(),
        CommandError::Access(err) => render_access_error(err),
        CommandError::Persistence(_) => t!("bot.save_failed").into_owned(),
    }
}

/// User-facing text for an access decision.
pub fn render_access_error(err: &AccessError) -> String {
    match err {
        AccessError::Unauthorized(id) => t!("bot.unauthorized", id = id).into_owned(),
        AccessError::Forbidden(_) => t!("bot.cant_remove_admin").into_owned(),
        AccessError::NotFound(id) => t!("bot.user_not_found", id = id).into_owned(),
    }
}
