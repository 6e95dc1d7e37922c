//! Registry of open chat sessions, owned by the hosting application.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use confidante_core::ContactDetails;
use uuid::Uuid;

use crate::effect::ChatTimings;
use crate::error::DialogueError;
use crate::graph::DialogueGraph;
use crate::session::ChatSession;

/// Creates, looks up, and tears down chat sessions.
pub struct SessionManager {
    graph: Arc<DialogueGraph>,
    timings: ChatTimings,
    contact: ContactDetails,
    max_sessions: usize,
    /// Sessions untouched for this long are closed. Zero keeps them forever.
    idle_timeout: Duration,
    sessions: RwLock<HashMap<Uuid, Arc<ChatSession>>>,
}

impl SessionManager {
    pub fn new(
        graph: Arc<DialogueGraph>,
        timings: ChatTimings,
        contact: ContactDetails,
        max_sessions: usize,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            graph,
            timings,
            contact,
            max_sessions,
            idle_timeout,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn graph(&self) -> &Arc<DialogueGraph> {
        &self.graph
    }

    pub fn timings(&self) -> &ChatTimings {
        &self.timings
    }

    pub fn contact(&self) -> &ContactDetails {
        &self.contact
    }

    /// Open a session and schedule its greeting.
    ///
    /// Idle sessions are reaped first so abandoned chats do not hold slots.
    pub fn create(&self) -> Result<Arc<ChatSession>, DialogueError> {
        self.reap_idle();
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if sessions.len() >= self.max_sessions {
            tracing::warn!(max_sessions = self.max_sessions, "Chat session limit reached");
            return Err(DialogueError::SessionLimitReached(self.max_sessions));
        }

        let session = Arc::new(ChatSession::new(
            Arc::clone(&self.graph),
            self.timings,
            self.contact.clone(),
        ));
        session.start();
        sessions.insert(session.id(), Arc::clone(&session));

        tracing::info!(session_id = %session.id(), active = sessions.len(), "Chat session opened");
        Ok(session)
    }

    /// Look up a session. Counts as activity for idle reaping.
    pub fn get(&self, id: Uuid) -> Result<Arc<ChatSession>, DialogueError> {
        let session = self
            .sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&id)
            .cloned()
            .ok_or(DialogueError::SessionNotFound(id))?;
        session.touch();
        Ok(session)
    }

    /// Close a session and forget it. Pending timers are cancelled.
    pub fn close(&self, id: Uuid) -> Result<(), DialogueError> {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&id);
        match removed {
            Some(session) => {
                session.close();
                tracing::info!(session_id = %id, "Chat session removed");
                Ok(())
            }
            None => Err(DialogueError::SessionNotFound(id)),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close and forget every session idle for at least the idle timeout.
    /// Returns how many were reaped.
    pub fn reap_idle(&self) -> usize {
        if self.idle_timeout.is_zero() {
            return 0;
        }
        let reaped: Vec<Arc<ChatSession>> = {
            let mut sessions = self
                .sessions
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let idle: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, session)| session.idle_for() >= self.idle_timeout)
                .map(|(id, _)| *id)
                .collect();
            idle.iter().filter_map(|id| sessions.remove(id)).collect()
        };
        for session in &reaped {
            session.close();
            tracing::info!(session_id = %session.id(), "Idle chat session reaped");
        }
        reaped.len()
    }

    /// Reap idle sessions on a fixed period. Runs until the task is aborted.
    pub async fn reap_idle_every(self: Arc<Self>, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let reaped = self.reap_idle();
            if reaped > 0 {
                tracing::debug!(reaped, active = self.len(), "Idle sweep finished");
            }
        }
    }

    /// Close every session. Called on application shutdown.
    pub fn shutdown(&self) {
        let drained: Vec<Arc<ChatSession>> = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .drain()
            .map(|(_, session)| session)
            .collect();
        for session in &drained {
            session.close();
        }
        tracing::info!(closed = drained.len(), "All chat sessions closed");
    }
}
