//! Application state shared across all route handlers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use confidante_blog::PostCatalog;
use confidante_core::config::ConfidanteConfig;
use confidante_dialogue::{ChatTimings, DialogueGraph, SessionManager};

use crate::contact::{ContactSink, LogSink};

/// Shared application state. Everything is read-only or internally
/// synchronized, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConfidanteConfig>,
    pub graph: Arc<DialogueGraph>,
    pub catalog: Arc<PostCatalog>,
    pub sessions: Arc<SessionManager>,
    pub contact_sink: Arc<dyn ContactSink>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: ConfidanteConfig, graph: DialogueGraph, catalog: PostCatalog) -> Self {
        let graph = Arc::new(graph);
        let sessions = SessionManager::new(
            Arc::clone(&graph),
            ChatTimings::from(&config.chat),
            config.contact.details(),
            config.chat.max_sessions,
            Duration::from_secs(config.chat.idle_timeout_secs),
        );
        Self {
            config: Arc::new(config),
            graph,
            catalog: Arc::new(catalog),
            sessions: Arc::new(sessions),
            contact_sink: Arc::new(LogSink),
            start_time: Instant::now(),
        }
    }

    /// Replace the sink that receives contact submissions.
    pub fn with_contact_sink(mut self, sink: Arc<dyn ContactSink>) -> Self {
        self.contact_sink = sink;
        self
    }
}
