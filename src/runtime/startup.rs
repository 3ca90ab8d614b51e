use super::router::MessageRouter;
use super::supervisor::{DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_BACKOFF, spawn_supervised_listener};
use super::sweeper::ExpirySweeper;
use crate::channels::{Channel, ChannelMessage, TelegramChannel};
use crate::commands::{CommandDispatcher, command_menu};
use crate::config::Config;
use crate::conversation::ConversationEngine;
use crate::error::ConfigError;
use crate::llm::OpenAiClient;
use crate::security::{AccessController, AccessListStore, JsonAccessFile};
use crate::session::SessionStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

const INBOUND_QUEUE: usize = 100;
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Load the persisted access lists; a missing file means open access.
pub async fn load_access(config: &Config) -> Result<(Arc<JsonAccessFile>, AccessController)> {
    let store = Arc::new(JsonAccessFile::new(config.access_file_path()));
    let lists = store
        .load()
        .await
        .with_context(|| format!("Failed to load access file {}", store.path().display()))?;
    Ok((store, AccessController::new(lists)))
}

/// Run the bot until Ctrl-C.
#[allow(clippy::too_many_lines)]
pub async fn start_bot(config: Arc<Config>) -> Result<()> {
    let token = config
        .telegram_api_token
        .clone()
        .ok_or(ConfigError::MissingSecret("TELEGRAM_APITOKEN"))?;
    let telegram = Arc::new(TelegramChannel::new(token, &config.telegram_api_url));

    let me = telegram
        .get_me()
        .await
        .context("Telegram rejected the bot token (getMe failed)")?;
    tracing::info!(
        bot_id = me.id,
        username = me.username.as_deref().unwrap_or("?"),
        "authorized on Telegram"
    );

    if let Err(e) = telegram.set_commands(&command_menu()).await {
        tracing::warn!(error = %format!("{e:#}"), "failed to register command menu (non-fatal)");
    }

    let (access_store, access) = load_access(&config).await?;
    let access = Arc::new(access);
    tracing::info!(
        admins = access.admins().len(),
        allowed = access.allowed().len(),
        file = %access_store.path().display(),
        "access lists loaded"
    );
    if access.allowed().is_empty() {
        tracing::warn!("allow-list is empty; every Telegram user may use this bot");
    }

    let openai = Arc::new(OpenAiClient::new(
        &config.openai_base_url,
        config.openai_api_key.as_deref(),
        config.request_timeout_secs,
    ));
    let sessions = Arc::new(SessionStore::new());
    let engine = Arc::new(ConversationEngine::new(
        Arc::clone(&sessions),
        openai.clone(),
        openai,
        config.turn_settings(),
    ));
    let commands = Arc::new(CommandDispatcher::new(
        Arc::clone(&access),
        Arc::clone(&sessions),
        access_store,
        config.draw_hint(),
    ));
    let channel: Arc<dyn Channel> = telegram;
    let router = Arc::new(MessageRouter::new(
        Arc::clone(&channel),
        access,
        engine,
        commands,
    ));

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown requested");
            }
            cancel.cancel();
        });
    }

    let sweeper = ExpirySweeper::new(
        Arc::clone(&sessions),
        Arc::clone(&channel),
        config.idle_timeout(),
        config.notify_on_idle_timeout,
    )
    .spawn(Duration::from_secs(config.sweep_interval_secs), cancel.clone());

    let (tx, mut rx) = tokio::sync::mpsc::channel::<ChannelMessage>(INBOUND_QUEUE);
    let listener = spawn_supervised_listener(
        Arc::clone(&channel),
        tx,
        DEFAULT_INITIAL_BACKOFF,
        DEFAULT_MAX_BACKOFF,
        cancel.clone(),
    );

    tracing::info!(
        model = %config.model,
        idle_timeout_secs = config.conversation_idle_timeout_secs,
        "listening for messages"
    );

    let permits = Arc::new(Semaphore::new(config.max_concurrent_turns));
    let mut workers = JoinSet::new();
    loop {
        let msg = tokio::select! {
            () = cancel.cancelled() => break,
            msg = rx.recv() => match msg {
                Some(msg) => msg,
                None => break,
            },
        };
        let permit = tokio::select! {
            () = cancel.cancelled() => break,
            permit = Arc::clone(&permits).acquire_owned() => permit?,
        };
        let router = Arc::clone(&router);
        workers.spawn(async move {
            router.handle(&msg).await;
            drop(permit);
        });
        // Reap finished workers so the set does not grow unbounded.
        while workers.try_join_next().is_some() {}
    }

    cancel.cancel();
    drop(rx);
    let drained = tokio::time::timeout(SHUTDOWN_GRACE, async {
        while workers.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        tracing::warn!("in-flight turns did not finish in time; aborting them");
        workers.abort_all();
    }
    for handle in [listener, sweeper] {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "background task ended abnormally");
        }
    }
    tracing::info!("stopped");
    Ok(())
}
