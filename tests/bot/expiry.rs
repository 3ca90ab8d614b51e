use crate::harness::{ADMIN, Bot, Outbound, write_access_file};
use chatgate::channels::ChatId;
use chatgate::conversation::TurnSettings;
use chatgate::runtime::ExpirySweeper;
use chatgate::session::{Message, UserId};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tempfile::TempDir;

const BOB: UserId = UserId::new(77);

async fn bot(dir: &TempDir) -> Bot {
    let path = dir.path().join("config.cfg");
    write_access_file(&path, &[ADMIN.get()], &[BOB.get()]).await;
    Bot::start(&path, TurnSettings::default()).await
}

#[tokio::test]
async fn stale_conversation_is_replaced_on_next_prompt() {
    let dir = TempDir::new().unwrap();
    let bot = bot(&dir).await;
    bot.sessions
        .append_user_message_at(BOB, "ancient", Utc::now() - Duration::seconds(901));
    bot.completion.reply("fresh start", 5);

    bot.say(BOB, "hello again").await;

    assert_eq!(
        bot.completion.last_request().messages,
        vec![Message::user("hello again")]
    );
    assert_eq!(bot.sessions.history(BOB).len(), 2);
}

#[tokio::test]
async fn conversation_inside_timeout_is_kept() {
    let dir = TempDir::new().unwrap();
    let bot = bot(&dir).await;
    bot.sessions
        .append_user_message_at(BOB, "recent", Utc::now() - Duration::seconds(899));
    bot.completion.reply("still here", 5);

    bot.say(BOB, "next").await;

    assert_eq!(bot.completion.last_request().messages.len(), 2);
}

#[tokio::test]
async fn sweep_notifies_owner_of_evicted_conversation() {
    let dir = TempDir::new().unwrap();
    let bot = bot(&dir).await;
    let now = Utc::now();
    bot.sessions
        .append_user_message_at(BOB, "idle", now - Duration::seconds(1_000));
    bot.sessions
        .append_user_message_at(ADMIN, "active", now - Duration::seconds(10));
    let sweeper = ExpirySweeper::new(
        Arc::clone(&bot.sessions),
        bot.channel.clone(),
        Duration::seconds(900),
        true,
    );

    let evicted = sweeper.sweep_once(now).await;

    assert_eq!(evicted, vec![BOB]);
    assert!(bot.sessions.get(BOB).is_none());
    assert!(bot.sessions.get(ADMIN).is_some());
    assert_eq!(
        bot.channel.take(),
        vec![Outbound::Text {
            chat: ChatId::new(77),
            text: "Context cleared due to inactivity.".into(),
            silent: false,
        }]
    );
}
