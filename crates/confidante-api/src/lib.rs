//! HTTP surface for the Confidante site: contact submissions, blog
//! queries, the chat widget's dialogue and session endpoints, and health.

pub mod contact;
pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod state;

pub use contact::{ContactSink, LogSink};
pub use error::ApiError;
pub use routes::{create_router, serve_until};
pub use state::AppState;
