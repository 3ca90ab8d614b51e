use super::types::{Message, Session, SessionSummary, UserId};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OwnedMutexGuard;

/// In-memory registry of per-user conversations.
///
/// The session map sits behind one `std::sync::Mutex` that is never held
/// across an `.await`, so every operation below is atomic with respect to the
/// others and to [`SessionStore::sweep_expired`]. Whole turns (which span a
/// network call) are serialised per identity through [`SessionStore::lock_turn`].
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<UserId, Session>>,
    turn_locks: Mutex<HashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
}

/// Held for the duration of one turn. Dropping it lets the next turn of the
/// same identity (or a pending reset) proceed.
pub struct TurnGuard {
    identity: UserId,
    _guard: OwnedMutexGuard<()>,
}

impl TurnGuard {
    pub fn identity(&self) -> UserId {
        self.identity
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<UserId, Session>> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn turn_locks(&self) -> MutexGuard<'_, HashMap<UserId, Arc<tokio::sync::Mutex<()>>>> {
        self.turn_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn turn_lock(&self, identity: UserId) -> Arc<tokio::sync::Mutex<()>> {
        self.turn_locks()
            .entry(identity)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Wait until no other turn of `identity` is in flight, then claim it.
    pub async fn lock_turn(&self, identity: UserId) -> TurnGuard {
        let lock = self.turn_lock(identity);
        TurnGuard {
            identity,
            _guard: lock.lock_owned().await,
        }
    }

    fn turn_in_flight(locks: &HashMap<UserId, Arc<tokio::sync::Mutex<()>>>, id: UserId) -> bool {
        locks.get(&id).is_some_and(|lock| lock.try_lock().is_err())
    }

    pub fn get_or_create(&self, identity: UserId) -> Session {
        self.sessions()
            .entry(identity)
            .or_insert_with(|| Session::new(identity, Utc::now()))
            .clone()
    }

    pub fn get(&self, identity: UserId) -> Option<Session> {
        self.sessions().get(&identity).cloned()
    }

    /// Prompt context for the next completion request, oldest first.
    pub fn history(&self, identity: UserId) -> Vec<Message> {
        self.sessions()
            .get(&identity)
            .map(|session| session.history.clone())
            .unwrap_or_default()
    }

    pub fn append_user_message(&self, identity: UserId, text: impl Into<String>) {
        self.append_user_message_at(identity, text, Utc::now());
    }

    /// Creates the session when absent. `at` becomes the new `last_active_at`.
    pub fn append_user_message_at(
        &self,
        identity: UserId,
        text: impl Into<String>,
        at: DateTime<Utc>,
    ) {
        let mut sessions = self.sessions();
        let session = sessions
            .entry(identity)
            .or_insert_with(|| Session::new(identity, at));
        session.history.push(Message::user(text));
        session.last_active_at = at;
    }

    /// Does not refresh `last_active_at`. Returns `false` when the session is
    /// gone (reset or evicted), in which case nothing is recorded.
    pub fn append_assistant_message(&self, identity: UserId, text: impl Into<String>) -> bool {
        match self.sessions().get_mut(&identity) {
            Some(session) => {
                session.history.push(Message::assistant(text));
                true
            }
            None => false,
        }
    }

    /// Rollback pop. A session left without history is dropped, so a failed
    /// first turn leaves no session behind.
    pub fn remove_last_message(&self, identity: UserId) -> Option<Message> {
        let mut sessions = self.sessions();
        let session = sessions.get_mut(&identity)?;
        let popped = session.history.pop();
        if session.history.is_empty() {
            sessions.remove(&identity);
        }
        popped
    }

    pub fn trim_oldest(&self, identity: UserId) -> Option<Message> {
        let mut sessions = self.sessions();
        let session = sessions.get_mut(&identity)?;
        if session.history.is_empty() {
            return None;
        }
        Some(session.history.remove(0))
    }

    /// Drop the session of `identity`, waiting for its in-flight turn first.
    pub async fn reset(&self, identity: UserId) -> bool {
        let _turn = self.lock_turn(identity).await;
        self.sessions().remove(&identity).is_some()
    }

    /// Evict `identity` if it idled past `idle_timeout`. Callers hold the
    /// identity's turn guard.
    pub fn clear_if_expired(
        &self,
        identity: UserId,
        idle_timeout: Duration,
        now: DateTime<Utc>,
    ) -> bool {
        let mut sessions = self.sessions();
        let expired = sessions
            .get(&identity)
            .is_some_and(|session| session.is_expired(idle_timeout, now));
        if expired {
            sessions.remove(&identity);
        }
        expired
    }

    /// Evict every idle session and return the evicted identities.
    ///
    /// Identities with a turn in flight are skipped; they are reconsidered on
    /// the next sweep.
    pub fn sweep_expired(&self, idle_timeout: Duration, now: DateTime<Utc>) -> Vec<UserId> {
        let mut sessions = self.sessions();
        let mut locks = self.turn_locks();

        let expired: Vec<UserId> = sessions
            .values()
            .filter(|session| session.is_expired(idle_timeout, now))
            .map(|session| session.identity)
            .filter(|id| !Self::turn_in_flight(&locks, *id))
            .collect();

        for id in &expired {
            sessions.remove(id);
        }

        locks.retain(|id, lock| Arc::strong_count(lock) > 1 || sessions.contains_key(id));
        expired
    }

    pub fn summaries(&self, now: DateTime<Utc>) -> Vec<SessionSummary> {
        let mut summaries: Vec<SessionSummary> = self
            .sessions()
            .values()
            .map(|session| SessionSummary {
                identity: session.identity,
                message_count: session.history.len(),
                idle_secs: now
                    .signed_duration_since(session.last_active_at)
                    .num_seconds()
                    .max(0),
            })
            .collect();
        summaries.sort_by_key(|summary| summary.identity);
        summaries
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }
}
