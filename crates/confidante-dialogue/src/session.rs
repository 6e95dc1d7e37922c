//! Per-user chat session: transcript, pacing timers, and cancellation.
//!
//! Every delayed message or effect runs as a spawned task tied to the
//! session's `CancellationToken`. Closing (or dropping) the session cancels
//! the token, and a cancelled task appends nothing and emits nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use confidante_core::ContactDetails;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::effect::{action_effect, ChatTimings, ContactEffect, ScheduledEffect};
use crate::error::DialogueError;
use crate::graph::DialogueGraph;
use crate::types::Message;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Something observable that happened in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    MessageAppended { message: Message },
    EffectTriggered { effect: ContactEffect },
    Closed,
}

#[derive(Default)]
struct Transcript {
    messages: Vec<Message>,
    /// Set once the greeting is on screen; selections are refused before that.
    greeted: bool,
    closed: bool,
}

/// State reachable from background tasks.
struct Shared {
    transcript: Mutex<Transcript>,
    events: broadcast::Sender<SessionEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Transcript> {
        self.transcript
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, transcript: &mut Transcript, message: Message) {
        transcript.messages.push(message.clone());
        // No receivers is fine; the transcript is the source of truth.
        let _ = self.events.send(SessionEvent::MessageAppended { message });
    }

    /// Append a bot message unless the session closed in the meantime.
    fn append(&self, message: Message) -> bool {
        let mut transcript = self.lock();
        if transcript.closed {
            return false;
        }
        self.push(&mut transcript, message);
        true
    }

    fn append_greeting(&self, message: Message) -> bool {
        let mut transcript = self.lock();
        if transcript.closed {
            return false;
        }
        transcript.greeted = true;
        self.push(&mut transcript, message);
        true
    }

    fn append_selection(&self, session_id: Uuid, message: Message) -> Result<(), DialogueError> {
        let mut transcript = self.lock();
        if transcript.closed {
            return Err(DialogueError::SessionClosed(session_id));
        }
        if !transcript.greeted {
            return Err(DialogueError::GreetingPending(session_id));
        }
        self.push(&mut transcript, message);
        Ok(())
    }

    fn emit_effect(&self, effect: ContactEffect) {
        let transcript = self.lock();
        if transcript.closed {
            return;
        }
        let _ = self.events.send(SessionEvent::EffectTriggered { effect });
    }
}

/// Sleep for `delay`, returning `false` if the token was cancelled first.
async fn sleep_unless_cancelled(token: &CancellationToken, delay: Duration) -> bool {
    tokio::select! {
        biased;
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(delay) => !token.is_cancelled(),
    }
}

/// A chat widget session. Must be used inside a tokio runtime.
pub struct ChatSession {
    id: Uuid,
    graph: Arc<DialogueGraph>,
    timings: ChatTimings,
    contact: ContactDetails,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    started: AtomicBool,
    created_at: DateTime<Utc>,
    last_activity: Mutex<Instant>,
}

impl ChatSession {
    pub fn new(graph: Arc<DialogueGraph>, timings: ChatTimings, contact: ContactDetails) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            id: Uuid::new_v4(),
            graph,
            timings,
            contact,
            shared: Arc::new(Shared {
                transcript: Mutex::new(Transcript::default()),
                events,
            }),
            cancel: CancellationToken::new(),
            started: AtomicBool::new(false),
            created_at: Utc::now(),
            last_activity: Mutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Record that the client is still around.
    pub fn touch(&self) {
        *self
            .last_activity
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Instant::now();
    }

    /// Time since the last selection or lookup.
    pub fn idle_for(&self) -> Duration {
        self.last_activity
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .elapsed()
    }

    /// Schedule the greeting. Only the first call has any effect.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            return;
        }

        let greeting = Message::from_bot(
            self.graph.greeting(),
            self.graph.initial_options().to_vec(),
        );
        let shared = Arc::clone(&self.shared);
        let token = self.cancel.clone();
        let delay = self.timings.greeting_delay;
        let session_id = self.id;

        tokio::spawn(async move {
            if sleep_unless_cancelled(&token, delay).await && shared.append_greeting(greeting) {
                tracing::debug!(session_id = %session_id, "Greeting delivered");
            }
        });
    }

    /// Record a user click and schedule the bot reply (and any contact effect).
    ///
    /// Returns the user message, which is appended immediately. Fails with
    /// [`DialogueError::GreetingPending`] until the greeting has been shown,
    /// since the user has no options to click before then.
    pub fn select_option(&self, label: &str) -> Result<Message, DialogueError> {
        let user_message = Message::from_user(label);
        self.shared.append_selection(self.id, user_message.clone())?;
        self.touch();

        let resolution = self.graph.resolve(label);
        let scheduled: Option<ScheduledEffect> = resolution
            .action
            .map(|action| action_effect(Some(action), &self.contact, &self.timings));
        let reply = Message::from_bot(resolution.response, resolution.options);

        tracing::debug!(
            session_id = %self.id,
            option = %label,
            matched = resolution.matched,
            action = ?resolution.action,
            "Option selected"
        );

        let shared = Arc::clone(&self.shared);
        let token = self.cancel.clone();
        let response_delay = self.timings.response_delay;

        tokio::spawn(async move {
            if !sleep_unless_cancelled(&token, response_delay).await || !shared.append(reply) {
                return;
            }
            if let Some(scheduled) = scheduled {
                if sleep_unless_cancelled(&token, scheduled.delay).await {
                    shared.emit_effect(scheduled.effect);
                }
            }
        });

        Ok(user_message)
    }

    /// Snapshot of the transcript so far.
    pub fn transcript(&self) -> Vec<Message> {
        self.shared.lock().messages.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    /// End the session and discard every pending message or effect.
    pub fn close(&self) {
        {
            let mut transcript = self.shared.lock();
            if transcript.closed {
                return;
            }
            transcript.closed = true;
            let _ = self.shared.events.send(SessionEvent::Closed);
        }
        self.cancel.cancel();
        tracing::debug!(session_id = %self.id, "Chat session closed");
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confidante_core::config::ContactConfig;

    fn session() -> ChatSession {
        let graph = Arc::new(DialogueGraph::embedded().unwrap());
        ChatSession::new(graph, ChatTimings::default(), ContactConfig::default().details())
    }

    /// A started session whose greeting has been delivered.
    async fn greeted_session() -> ChatSession {
        let s = session();
        s.start();
        tokio::time::sleep(Duration::from_millis(2001)).await;
        assert_eq!(s.transcript().len(), 1);
        s
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_session_is_empty() {
        let s = session();
        assert!(s.transcript().is_empty());
        assert!(!s.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_greeting_arrives_after_delay() {
        let s = session();
        s.start();

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert!(s.transcript().is_empty());

        tokio::time::sleep(Duration::from_millis(2)).await;
        let transcript = s.transcript();
        assert_eq!(transcript.len(), 1);
        assert!(!transcript[0].is_from_user);
        assert!(transcript[0].text.starts_with("Hello! I'm Confidante's"));
        assert_eq!(
            transcript[0].options.as_deref().unwrap(),
            DialogueGraph::embedded().unwrap().initial_options()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_greeting_only_once() {
        let s = session();
        s.start();
        s.start();
        tokio::time::sleep(Duration::from_secs(5)).await;
        s.start();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(s.transcript().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_appends_user_then_bot() {
        let s = greeted_session().await;
        let user = s.select_option("Talk to a specialist").unwrap();
        assert!(user.is_from_user);
        assert_eq!(s.transcript().len(), 2);

        tokio::time::sleep(Duration::from_millis(801)).await;
        let transcript = s.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].text, "Talk to a specialist");
        assert!(!transcript[2].is_from_user);
        assert!(transcript[2].text.starts_with("I'd be happy to connect you"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_before_greeting_rejected() {
        let s = session();
        s.start();
        tokio::time::sleep(Duration::from_millis(500)).await;

        let err = s.select_option("Talk to a specialist").unwrap_err();
        assert!(matches!(err, DialogueError::GreetingPending(id) if id == s.id()));
        assert!(s.transcript().is_empty());

        tokio::time::sleep(Duration::from_millis(1600)).await;
        s.select_option("Talk to a specialist").unwrap();
        let transcript = s.transcript();
        assert!(!transcript[0].is_from_user);
        assert!(transcript[1].is_from_user);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unstarted_session_rejects_selection() {
        let s = session();
        assert!(matches!(
            s.select_option("Call us now"),
            Err(DialogueError::GreetingPending(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_resets_idle_clock() {
        let s = greeted_session().await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(s.idle_for() >= Duration::from_secs(30));

        s.select_option("Back to main menu").unwrap();
        assert!(s.idle_for() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_option_gets_fallback_reply() {
        let s = greeted_session().await;
        s.select_option("Social Health").unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        let reply = &s.transcript()[2];
        assert!(reply.text.starts_with("I'd be happy to help you with that!"));
        assert_eq!(
            reply.options.as_deref().unwrap(),
            ["Contact our team", "Back to main menu"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_email_effect_follows_reply() {
        let s = greeted_session().await;
        let mut rx = s.subscribe();
        s.select_option("Send us an email").unwrap();

        let first = rx.recv().await.unwrap();
        assert!(matches!(first, SessionEvent::MessageAppended { ref message } if message.is_from_user));

        let second = rx.recv().await.unwrap();
        match second {
            SessionEvent::MessageAppended { message } => {
                assert!(message.text.contains("helpatconfidante@gmail.com"))
            }
            other => panic!("expected bot message, got {other:?}"),
        }

        let third = rx.recv().await.unwrap();
        match third {
            SessionEvent::EffectTriggered { effect } => {
                assert!(matches!(effect, ContactEffect::OpenMailCompose { .. }))
            }
            other => panic!("expected effect, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_effect_timing() {
        let s = greeted_session().await;
        let mut rx = s.subscribe();
        let start = tokio::time::Instant::now();
        s.select_option("Fill contact form").unwrap();

        loop {
            if let SessionEvent::EffectTriggered { effect } = rx.recv().await.unwrap() {
                assert_eq!(
                    effect,
                    ContactEffect::ScrollToElement {
                        element_id: "contact-form".into()
                    }
                );
                break;
            }
        }
        // 800ms reply delay + 1000ms form settle delay.
        assert!(start.elapsed() >= Duration::from_millis(1800));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_discards_pending_greeting() {
        let s = session();
        s.start();
        tokio::time::sleep(Duration::from_millis(500)).await;
        s.close();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(s.transcript().is_empty());
        assert!(s.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_discards_pending_effect() {
        let s = greeted_session().await;
        let mut rx = s.subscribe();
        s.select_option("Call us now").unwrap();

        // Wait for the bot reply, then close before the dial effect fires.
        let _user = rx.recv().await.unwrap();
        let _reply = rx.recv().await.unwrap();
        s.close();

        assert_eq!(rx.recv().await.unwrap(), SessionEvent::Closed);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
        assert_eq!(s.transcript().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_after_close_fails() {
        let s = session();
        s.close();
        let err = s.select_option("Call us now").unwrap_err();
        assert!(matches!(err, DialogueError::SessionClosed(id) if id == s.id()));
        assert!(s.transcript().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_is_idempotent() {
        let s = session();
        let mut rx = s.subscribe();
        s.close();
        s.close();
        assert_eq!(rx.recv().await.unwrap(), SessionEvent::Closed);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_session_fires_nothing() {
        let s = greeted_session().await;
        let mut rx = s.subscribe();
        s.select_option("Send us an email").unwrap();
        let _user = rx.recv().await.unwrap();
        drop(s);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!matches!(
            rx.try_recv(),
            Ok(SessionEvent::MessageAppended { .. })
        ));
    }
}
