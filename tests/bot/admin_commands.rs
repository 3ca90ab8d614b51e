use crate::harness::{ADMIN, Bot, write_access_file};
use chatgate::conversation::TurnSettings;
use chatgate::security::AccessListStore;
use chatgate::session::UserId;
use tempfile::TempDir;

const MEMBER: UserId = UserId::new(10);
const NEWCOMER: UserId = UserId::new(555);

async fn bot(dir: &TempDir) -> Bot {
    let path = dir.path().join("config.cfg");
    write_access_file(&path, &[ADMIN.get()], &[ADMIN.get(), MEMBER.get()]).await;
    Bot::start(&path, TurnSettings::default()).await
}

#[tokio::test]
async fn admin_adds_user_and_change_is_persisted() {
    let dir = TempDir::new().unwrap();
    let bot = bot(&dir).await;

    bot.say(ADMIN, "/adduser 555").await;

    assert!(bot.access.is_allowed(NEWCOMER));
    assert_eq!(
        bot.channel.texts(),
        vec!["user ID 555 added successfully".to_string()]
    );
    let on_disk = bot.access_file.load().await.unwrap();
    assert!(on_disk.allowed.contains(&NEWCOMER));
    assert!(on_disk.admins.contains(&ADMIN));
}

#[tokio::test]
async fn repeated_add_keeps_list_size() {
    let dir = TempDir::new().unwrap();
    let bot = bot(&dir).await;

    bot.say(ADMIN, "/adduser 555").await;
    let size = bot.access.allowed().len();
    bot.say(ADMIN, "/adduser 555").await;

    assert_eq!(bot.access.allowed().len(), size);
    assert_eq!(
        bot.channel.texts()[1],
        "user ID 555 is already allowed".to_string()
    );
}

#[tokio::test]
async fn newly_added_user_can_talk() {
    let dir = TempDir::new().unwrap();
    let bot = bot(&dir).await;
    bot.completion.reply("hi newcomer", 5);

    bot.say(ADMIN, "/adduser 555").await;
    bot.say(NEWCOMER, "hello").await;

    assert_eq!(bot.channel.texts()[1], "hi newcomer");
}

#[tokio::test]
async fn non_admin_cannot_remove_users() {
    let dir = TempDir::new().unwrap();
    let bot = bot(&dir).await;
    bot.say(ADMIN, "/adduser 555").await;
    bot.channel.take();

    bot.say(MEMBER, "/removeuser 555").await;

    assert_eq!(bot.channel.texts(), vec!["action not allowed".to_string()]);
    assert!(bot.access.is_allowed(NEWCOMER));
}

#[tokio::test]
async fn non_admin_cannot_list_users() {
    let dir = TempDir::new().unwrap();
    let bot = bot(&dir).await;

    bot.say(MEMBER, "/listusers").await;

    assert_eq!(bot.channel.texts(), vec!["action not allowed".to_string()]);
}

#[tokio::test]
async fn admin_removes_user_and_they_lose_access() {
    let dir = TempDir::new().unwrap();
    let bot = bot(&dir).await;

    bot.say(ADMIN, "/removeuser 10").await;
    bot.say(MEMBER, "hello").await;

    assert_eq!(
        bot.channel.texts(),
        vec![
            "user ID 10 removed successfully".to_string(),
            "You are not allowed to use this bot. User ID: 10".to_string(),
        ]
    );
    let on_disk = bot.access_file.load().await.unwrap();
    assert!(!on_disk.allowed.contains(&MEMBER));
}

#[tokio::test]
async fn admin_cannot_be_removed() {
    let dir = TempDir::new().unwrap();
    let bot = bot(&dir).await;

    bot.say(ADMIN, "/removeuser 1").await;

    assert_eq!(bot.channel.texts(), vec!["cant remove admin".to_string()]);
    assert!(bot.access.is_allowed(ADMIN));
}

#[tokio::test]
async fn bad_arguments_change_nothing() {
    let dir = TempDir::new().unwrap();
    let bot = bot(&dir).await;
    let before = bot.access.allowed();

    bot.say(ADMIN, "/adduser").await;
    bot.say(ADMIN, "/adduser abc").await;
    bot.say(ADMIN, "/adduser 0").await;
    bot.say(ADMIN, "/removeuser 999").await;

    assert_eq!(
        bot.channel.texts(),
        vec![
            "provide user ID".to_string(),
            "incorrect user ID: abc".to_string(),
            "incorrect user ID: 0".to_string(),
            "user ID 999 not found".to_string(),
        ]
    );
    assert_eq!(bot.access.allowed(), before);
}

#[tokio::test]
async fn listusers_shows_sessions_and_allow_list() {
    let dir = TempDir::new().unwrap();
    let bot = bot(&dir).await;
    bot.completion.reply("hey", 5);
    bot.say(MEMBER, "hi").await;
    bot.channel.take();

    bot.say(ADMIN, "/listusers").await;

    let texts = bot.channel.texts();
    assert_eq!(texts.len(), 1);
    let listing = &texts[0];
    assert!(listing.starts_with("Connected users:"));
    assert!(listing.contains("10 - 2 messages"));
    assert!(listing.contains("Allowed users:"));
}

#[tokio::test]
async fn unknown_command_and_start_and_help() {
    let dir = TempDir::new().unwrap();
    let bot = bot(&dir).await;

    bot.say(MEMBER, "/frobnicate").await;
    bot.say(MEMBER, "/start").await;
    bot.say(MEMBER, "/help@chatgate_bot").await;

    let texts = bot.channel.texts();
    assert_eq!(texts[0], "I don't know that command");
    assert!(texts[1].starts_with("Welcome"));
    assert!(texts[2].contains("draw <prompt>"));
}
