//! The in-memory post catalog and its queries.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::BlogError;
use crate::types::{BlogPost, PostFilterQuery};

const EMBEDDED_POSTS: &str = include_str!("../assets/posts.json");

#[derive(Debug, Deserialize)]
struct CatalogAsset {
    posts: Vec<BlogPost>,
}

/// Ordered, read-only collection of posts. Catalog order is meaningful:
/// every query preserves it.
#[derive(Debug, Clone)]
pub struct PostCatalog {
    posts: Vec<BlogPost>,
    by_slug: HashMap<String, usize>,
}

impl PostCatalog {
    /// The catalog compiled into the binary.
    pub fn embedded() -> Result<Self, BlogError> {
        Self::from_json(EMBEDDED_POSTS)
    }

    pub fn load(path: &Path) -> Result<Self, BlogError> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        info!(path = %path.display(), posts = catalog.len(), "Post catalog loaded");
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, BlogError> {
        let asset: CatalogAsset = serde_json::from_str(json)?;
        Self::from_posts(asset.posts)
    }

    /// Build a catalog, rejecting empty or duplicate slugs and duplicate ids.
    pub fn from_posts(posts: Vec<BlogPost>) -> Result<Self, BlogError> {
        let mut by_slug = HashMap::with_capacity(posts.len());
        let mut ids = HashSet::with_capacity(posts.len());

        for (i, post) in posts.iter().enumerate() {
            if post.slug.trim().is_empty() {
                return Err(BlogError::EmptySlug(post.id.clone()));
            }
            if !ids.insert(post.id.clone()) {
                return Err(BlogError::DuplicateId(post.id.clone()));
            }
            if by_slug.insert(post.slug.clone(), i).is_some() {
                return Err(BlogError::DuplicateSlug(post.slug.clone()));
            }
        }

        Ok(Self { posts, by_slug })
    }

    pub fn posts(&self) -> &[BlogPost] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Distinct categories in first-seen order.
    pub fn list_categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.posts
            .iter()
            .filter(|post| seen.insert(post.category.as_str()))
            .map(|post| post.category.clone())
            .collect()
    }

    /// Posts matching the category (exact) and search text (case-insensitive
    /// substring of title or excerpt), in catalog order.
    pub fn filter(&self, query: &PostFilterQuery) -> Vec<&BlogPost> {
        let category = query.category.as_deref().filter(|c| !c.is_empty());
        let needle = query
            .search_text
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        self.posts
            .iter()
            .filter(|post| category.map_or(true, |c| post.category == c))
            .filter(|post| {
                needle.as_deref().map_or(true, |n| {
                    post.title.to_lowercase().contains(n) || post.excerpt.to_lowercase().contains(n)
                })
            })
            .collect()
    }

    pub fn find_by_slug(&self, slug: &str) -> Option<&BlogPost> {
        self.by_slug.get(slug).map(|&i| &self.posts[i])
    }

    /// Up to `limit` posts related to `reference`; see [`related_posts`].
    pub fn related_posts(&self, reference: &BlogPost, limit: usize) -> Vec<&BlogPost> {
        related_posts(reference, &self.posts, limit)
    }
}

/// Rank posts related to `reference`.
///
/// Candidates share the reference's category or at least one tag, and never
/// include the reference itself. They are ordered by descending count of
/// shared tags; the sort is stable, so ties keep catalog order.
pub fn related_posts<'a>(
    reference: &BlogPost,
    catalog: &'a [BlogPost],
    limit: usize,
) -> Vec<&'a BlogPost> {
    let reference_tags: HashSet<&str> = reference.tags.iter().map(String::as_str).collect();

    let mut candidates: Vec<(usize, &BlogPost)> = catalog
        .iter()
        .filter(|post| post.id != reference.id)
        .filter_map(|post| {
            let shared = post
                .tags
                .iter()
                .map(String::as_str)
                .filter(|tag| reference_tags.contains(tag))
                .collect::<HashSet<_>>()
                .len();
            (post.category == reference.category || shared > 0).then_some((shared, post))
        })
        .collect();

    candidates.sort_by_key(|&(shared, _)| Reverse(shared));
    candidates
        .into_iter()
        .take(limit)
        .map(|(_, post)| post)
        .collect()
}
