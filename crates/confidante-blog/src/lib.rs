//! Blog post catalog for the Confidante site.
//!
//! Holds the static post collection and answers listing queries: category
//! and text filtering, slug lookup, and "you might also like" ranking.

pub mod catalog;
pub mod error;
pub mod markdown;
pub mod types;

pub use catalog::{related_posts, PostCatalog};
pub use error::BlogError;
pub use types::{Author, BlogPost, PostFilterQuery, PostSummary};
