//! Scripted conversation engine for the Confidante chat widget.
//!
//! Provides the immutable dialogue graph (lookup, fallback, lint), the
//! classification of contact actions into host effects, and the per-user
//! session shell that paces messages with cancellable delayed tasks.

pub mod effect;
pub mod error;
pub mod graph;
pub mod manager;
pub mod session;
pub mod types;

pub use effect::{action_effect, ChatTimings, ContactEffect, ScheduledEffect};
pub use error::DialogueError;
pub use graph::DialogueGraph;
pub use manager::SessionManager;
pub use session::{ChatSession, SessionEvent};
pub use types::{DeadLink, DialogueNode, Message, Resolution};
