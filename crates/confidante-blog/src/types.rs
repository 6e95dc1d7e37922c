use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub avatar: String,
    pub bio: String,
}

/// A static blog post record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    /// Unique and URL-safe.
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    /// Lightweight markup, see [`crate::markdown`].
    pub content: String,
    pub featured_image: String,
    /// Display string, e.g. "May 12, 2023".
    pub publish_date: String,
    pub author: Author,
    pub category: String,
    /// Set-like; duplicates carry no meaning.
    pub tags: Vec<String>,
    pub reading_time_minutes: u32,
}

/// Listing projection of a post without its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub featured_image: String,
    pub publish_date: String,
    pub author: Author,
    pub category: String,
    pub tags: Vec<String>,
    pub reading_time_minutes: u32,
}

impl From<&BlogPost> for PostSummary {
    fn from(post: &BlogPost) -> Self {
        Self {
            id: post.id.clone(),
            slug: post.slug.clone(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            featured_image: post.featured_image.clone(),
            publish_date: post.publish_date.clone(),
            author: post.author.clone(),
            category: post.category.clone(),
            tags: post.tags.clone(),
            reading_time_minutes: post.reading_time_minutes,
        }
    }
}

/// Listing filter. Absent or empty fields pass everything through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostFilterQuery {
    pub category: Option<String>,
    pub search_text: Option<String>,
}

impl PostFilterQuery {
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            search_text: None,
        }
    }

    pub fn search(text: impl Into<String>) -> Self {
        Self {
            category: None,
            search_text: Some(text.into()),
        }
    }
}
