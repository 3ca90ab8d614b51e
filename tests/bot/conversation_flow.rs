use crate::harness::{ADMIN, Bot, Outbound, write_access_file};
use chatgate::channels::ChatId;
use chatgate::conversation::TurnSettings;
use chatgate::session::{Message, UserId};
use std::time::Duration;
use tempfile::TempDir;

const ALICE: UserId = UserId::new(42);

async fn bot_with_alice(dir: &TempDir) -> Bot {
    let path = dir.path().join("config.cfg");
    write_access_file(&path, &[ADMIN.get()], &[ADMIN.get(), ALICE.get()]).await;
    Bot::start(&path, TurnSettings::default()).await
}

#[tokio::test]
async fn first_prompt_creates_a_two_message_history() {
    let dir = TempDir::new().unwrap();
    let bot = bot_with_alice(&dir).await;
    bot.completion.reply("Hi there!", 20);

    bot.say(ALICE, "hello").await;

    assert_eq!(
        bot.sessions.history(ALICE),
        vec![Message::user("hello"), Message::assistant("Hi there!")]
    );
    assert_eq!(
        bot.channel.take(),
        vec![Outbound::Text {
            chat: ChatId::new(42),
            text: "Hi there!".into(),
            silent: false,
        }]
    );
    let request = bot.completion.last_request();
    assert_eq!(request.model, "gpt-3.5-turbo");
    assert_eq!(request.n, 1);
    assert!((request.top_p - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn follow_up_sends_whole_history() {
    let dir = TempDir::new().unwrap();
    let bot = bot_with_alice(&dir).await;
    bot.completion.reply("first", 10);
    bot.completion.reply("second", 10);

    bot.say(ALICE, "one").await;
    bot.say(ALICE, "two").await;

    let request = bot.completion.last_request();
    assert_eq!(
        request.messages,
        vec![
            Message::user("one"),
            Message::assistant("first"),
            Message::user("two"),
        ]
    );
}

#[tokio::test]
async fn new_command_clears_context_before_next_prompt() {
    let dir = TempDir::new().unwrap();
    let bot = bot_with_alice(&dir).await;
    bot.completion.reply("first", 10);
    bot.completion.reply("fresh", 10);

    bot.say(ALICE, "remember me").await;
    bot.say(ALICE, "/new").await;
    assert!(bot.sessions.get(ALICE).is_none());
    bot.say(ALICE, "who am I?").await;

    assert_eq!(
        bot.completion.last_request().messages,
        vec![Message::user("who am I?")]
    );
    let texts = bot.channel.texts();
    assert_eq!(texts[1], "OK, let's start a new conversation.");
}

#[tokio::test]
async fn over_budget_reply_trims_and_notifies_silently() {
    let dir = TempDir::new().unwrap();
    let bot = bot_with_alice(&dir).await;
    bot.completion.reply("a", 100);
    bot.completion.reply("b", 3501);

    bot.say(ALICE, "q1").await;
    bot.say(ALICE, "q2").await;

    let history = bot.sessions.history(ALICE);
    assert_eq!(history.len(), 3);
    assert_eq!(history[0], Message::assistant("a"));
    let sent = bot.channel.take();
    assert_eq!(
        sent.last(),
        Some(&Outbound::Text {
            chat: ChatId::new(42),
            text: "Context trimmed.".into(),
            silent: true,
        })
    );
}

#[tokio::test]
async fn reply_at_budget_is_not_trimmed() {
    let dir = TempDir::new().unwrap();
    let bot = bot_with_alice(&dir).await;
    bot.completion.reply("ok", 3500);

    bot.say(ALICE, "q").await;

    assert_eq!(bot.sessions.history(ALICE).len(), 2);
    assert_eq!(bot.channel.texts(), vec!["ok".to_string()]);
}

#[tokio::test]
async fn upstream_failure_leaves_history_unchanged() {
    let dir = TempDir::new().unwrap();
    let bot = bot_with_alice(&dir).await;
    bot.completion.reply("kept", 10);
    bot.completion.fail("HTTP 503");

    bot.say(ALICE, "first").await;
    bot.say(ALICE, "second").await;

    assert_eq!(bot.sessions.history(ALICE).len(), 2);
    let texts = bot.channel.texts();
    assert!(texts[1].starts_with("Request failed:"));
    assert!(texts[1].contains("HTTP 503"));
}

#[tokio::test]
async fn empty_completion_is_reported_and_rolled_back() {
    let dir = TempDir::new().unwrap();
    let bot = bot_with_alice(&dir).await;

    bot.say(ALICE, "anyone?").await;

    assert!(bot.sessions.history(ALICE).is_empty());
    assert_eq!(
        bot.channel.texts(),
        vec!["No result was returned. Please try again.".to_string()]
    );
}

#[tokio::test]
async fn draw_prefix_sends_image_without_touching_history() {
    let dir = TempDir::new().unwrap();
    let bot = bot_with_alice(&dir).await;

    bot.say(ALICE, "Draw a cat in a hat").await;

    assert_eq!(
        bot.channel.take(),
        vec![Outbound::Image {
            chat: ChatId::new(42),
            url: "https://images.example/cat.png".into(),
        }]
    );
    assert!(bot.sessions.history(ALICE).is_empty());
    assert!(bot.completion.requests.lock().unwrap().is_empty());
    let requests = bot.images.requests.lock().unwrap();
    assert_eq!(requests[0].prompt, "a cat in a hat");
    assert_eq!(requests[0].size, "256x256");
}

#[tokio::test]
async fn unlisted_user_is_turned_away() {
    let dir = TempDir::new().unwrap();
    let bot = bot_with_alice(&dir).await;
    let stranger = UserId::new(777);

    bot.say(stranger, "hello").await;
    bot.say(stranger, "/new").await;

    assert_eq!(
        bot.channel.texts(),
        vec![
            "You are not allowed to use this bot. User ID: 777".to_string(),
            "You are not allowed to use this bot. User ID: 777".to_string(),
        ]
    );
    assert!(bot.sessions.get(stranger).is_none());
    assert!(bot.completion.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_access_file_is_open_access() {
    let dir = TempDir::new().unwrap();
    let bot = Bot::start(&dir.path().join("absent.json"), TurnSettings::default()).await;
    bot.completion.reply("welcome aboard", 5);

    bot.say(UserId::new(9_999), "hi").await;

    assert_eq!(bot.channel.texts(), vec!["welcome aboard".to_string()]);
}

#[tokio::test]
async fn slow_completion_times_out_with_friendly_reply() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.cfg");
    write_access_file(&path, &[], &[ALICE.get()]).await;
    let settings = TurnSettings {
        request_timeout: Duration::from_millis(1),
        ..TurnSettings::default()
    };
    let bot = Bot::start(&path, settings).await;
    bot.completion.set_delay(Duration::from_millis(200));
    bot.completion.reply("too late", 5);

    bot.say(ALICE, "hurry").await;

    assert!(bot.sessions.history(ALICE).is_empty());
    assert_eq!(
        bot.channel.texts(),
        vec!["The request took too long. Please try again.".to_string()]
    );
}

#[tokio::test]
async fn long_reply_is_chunked_to_channel_limit() {
    let dir = TempDir::new().unwrap();
    let bot = bot_with_alice(&dir).await;
    let long = "word ".repeat(2_000);
    bot.completion.reply(long.trim_end(), 10);

    bot.say(ALICE, "essay please").await;

    let texts = bot.channel.texts();
    assert!(texts.len() >= 3);
    assert!(texts.iter().all(|chunk| chunk.chars().count() <= 4096));
}
