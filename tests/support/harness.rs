#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use chatgate::channels::{Channel, ChannelMessage, ChatId, CommandInvocation, SendOptions};
use chatgate::commands::CommandDispatcher;
use chatgate::conversation::{ConversationEngine, TurnSettings};
use chatgate::llm::{
    CompletionRequest, CompletionResponse, CompletionService, ImageRequest, ImageResponse,
    ImageService,
};
use chatgate::runtime::MessageRouter;
use chatgate::security::{AccessController, AccessListStore, AccessLists, JsonAccessFile};
use chatgate::session::{SessionStore, UserId};
use serde_json::json;

pub const ADMIN: UserId = UserId::new(1);

/// Completion service that answers from a queue and records every request.
#[derive(Default)]
pub struct FakeCompletion {
    replies: Mutex<VecDeque<Result<(String, u64), String>>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
    delay: Mutex<Option<Duration>>,
}

impl FakeCompletion {
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn reply(&self, text: &str, total_tokens: u64) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok((text.to_string(), total_tokens)));
    }

    pub fn fail(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn last_request(&self) -> CompletionRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

impl CompletionService for FakeCompletion {
    fn name(&self) -> &str {
        "fake-completion"
    }

    fn complete<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<CompletionResponse>> + Send + 'a>> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request.clone());
            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let next = self.replies.lock().unwrap().pop_front();
            match next {
                Some(Ok((text, total_tokens))) => Ok(serde_json::from_value(json!({
                    "choices": [{"message": {"role": "assistant", "content": text}}],
                    "usage": {"total_tokens": total_tokens}
                }))?),
                Some(Err(message)) => anyhow::bail!(message),
                None => Ok(CompletionResponse::default()),
            }
        })
    }
}

pub struct FakeImages {
    pub url: Option<String>,
    pub requests: Mutex<Vec<ImageRequest>>,
}

impl ImageService for FakeImages {
    fn name(&self) -> &str {
        "fake-images"
    }

    fn generate<'a>(
        &'a self,
        request: &'a ImageRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ImageResponse>> + Send + 'a>> {
        Box::pin(async move {
            self.requests.lock().unwrap().push(request.clone());
            Ok(serde_json::from_value(json!({ "data": [{ "url": self.url }] }))?)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Text {
        chat: ChatId,
        text: String,
        silent: bool,
    },
    Image {
        chat: ChatId,
        url: String,
    },
}

/// Channel that records everything the bot sends.
#[derive(Default)]
pub struct RecordingChannel {
    pub sent: Mutex<Vec<Outbound>>,
}

impl RecordingChannel {
    pub fn take(&self) -> Vec<Outbound> {
        std::mem::take(&mut *self.sent.lock().unwrap())
    }

    pub fn texts(&self) -> Vec<String> {
        self.take()
            .into_iter()
            .filter_map(|outbound| match outbound {
                Outbound::Text { text, .. } => Some(text),
                Outbound::Image { .. } => None,
            })
            .collect()
    }
}

impl Channel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    fn send<'a>(
        &'a self,
        text: &'a str,
        chat: ChatId,
        options: SendOptions,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.sent.lock().unwrap().push(Outbound::Text {
                chat,
                text: text.to_string(),
                silent: options.silent,
            });
            Ok(())
        })
    }

    fn listen<'a>(
        &'a self,
        _tx: tokio::sync::mpsc::Sender<ChannelMessage>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move { Ok(()) })
    }

    fn max_message_length(&self) -> usize {
        4096
    }

    fn send_image_url<'a>(
        &'a self,
        url: &'a str,
        chat: ChatId,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            self.sent.lock().unwrap().push(Outbound::Image {
                chat,
                url: url.to_string(),
            });
            Ok(())
        })
    }
}

/// The whole bot wired to fakes, with the access lists persisted in a
/// JSON file under `access_path`.
pub struct Bot {
    pub router: MessageRouter,
    pub channel: Arc<RecordingChannel>,
    pub completion: Arc<FakeCompletion>,
    pub images: Arc<FakeImages>,
    pub sessions: Arc<SessionStore>,
    pub access: Arc<AccessController>,
    pub access_file: Arc<JsonAccessFile>,
}

impl Bot {
    pub async fn start(access_path: &Path, settings: TurnSettings) -> Self {
        let access_file = Arc::new(JsonAccessFile::new(access_path));
        let lists = access_file.load().await.unwrap();
        let access = Arc::new(AccessController::new(lists));
        let channel = Arc::new(RecordingChannel::default());
        let completion = Arc::new(FakeCompletion::default());
        let images = Arc::new(FakeImages {
            url: Some("https://images.example/cat.png".into()),
            requests: Mutex::new(Vec::new()),
        });
        let sessions = Arc::new(SessionStore::new());
        let engine = Arc::new(ConversationEngine::new(
            Arc::clone(&sessions),
            completion.clone(),
            images.clone(),
            settings,
        ));
        let commands = Arc::new(CommandDispatcher::new(
            Arc::clone(&access),
            Arc::clone(&sessions),
            access_file.clone(),
            "draw",
        ));
        let router = MessageRouter::new(
            channel.clone(),
            Arc::clone(&access),
            engine,
            commands,
        );
        Self {
            router,
            channel,
            completion,
            images,
            sessions,
            access,
            access_file,
        }
    }

    pub async fn say(&self, from: UserId, text: &str) {
        let msg = ChannelMessage {
            id: format!("test-{}", from),
            sender: from,
            sender_name: None,
            chat: ChatId::from(from),
            text: text.to_string(),
            command: CommandInvocation::parse(text),
            timestamp: 0,
        };
        self.router.handle(&msg).await;
    }
}

/// Seed an access file with `admins` and `allowed`.
pub async fn write_access_file(path: &Path, admins: &[i64], allowed: &[i64]) {
    let lists = AccessLists {
        admins: admins.iter().copied().map(UserId::new).collect(),
        allowed: allowed.iter().copied().map(UserId::new).collect(),
    };
    JsonAccessFile::new(path).save(&lists).await.unwrap();
}
