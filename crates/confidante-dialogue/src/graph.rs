//! Immutable dialogue graph: a label-keyed table of conversation nodes.
//!
//! Lookup is an exact, case-sensitive match on the visible button text.
//! Labels with no node resolve to the fallback response, so the widget
//! never dead-ends. The graph may contain cycles ("Back to main menu").

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::DialogueError;
use crate::types::{DeadLink, DialogueNode, Resolution};

const EMBEDDED_DIALOGUE: &str = include_str!("../assets/dialogue.json");

#[derive(Debug, Deserialize)]
struct DialogueAsset {
    greeting: String,
    initial_options: Vec<String>,
    fallback_response: String,
    default_options: Vec<String>,
    nodes: Vec<DialogueNode>,
}

/// The conversation graph, loaded once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct DialogueGraph {
    greeting: String,
    initial_options: Vec<String>,
    fallback_response: String,
    default_options: Vec<String>,
    /// Nodes in authoring order.
    nodes: Vec<DialogueNode>,
    index: HashMap<String, usize>,
}

impl DialogueGraph {
    /// The graph compiled into the binary.
    pub fn embedded() -> Result<Self, DialogueError> {
        Self::from_json(EMBEDDED_DIALOGUE)
    }

    /// Load a graph from a JSON file on disk.
    pub fn load(path: &Path) -> Result<Self, DialogueError> {
        let content = std::fs::read_to_string(path)?;
        let graph = Self::from_json(&content)?;
        info!(path = %path.display(), nodes = graph.len(), "Dialogue graph loaded");
        Ok(graph)
    }

    /// Parse and validate a graph from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, DialogueError> {
        let asset: DialogueAsset = serde_json::from_str(json)?;

        if asset.initial_options.is_empty() {
            return Err(DialogueError::NoInitialOptions);
        }
        if asset.default_options.is_empty() {
            return Err(DialogueError::NoDefaultOptions);
        }
        if asset.fallback_response.trim().is_empty() {
            return Err(DialogueError::InvalidAsset(
                "fallback response must not be empty".to_string(),
            ));
        }

        let mut index = HashMap::with_capacity(asset.nodes.len());
        for (i, node) in asset.nodes.iter().enumerate() {
            if node.response.trim().is_empty() {
                return Err(DialogueError::EmptyResponse(node.key.clone()));
            }
            if index.insert(node.key.clone(), i).is_some() {
                return Err(DialogueError::DuplicateKey(node.key.clone()));
            }
        }

        Ok(Self {
            greeting: asset.greeting,
            initial_options: asset.initial_options,
            fallback_response: asset.fallback_response,
            default_options: asset.default_options,
            nodes: asset.nodes,
            index,
        })
    }

    /// Resolve a clicked option label to the next bot message.
    ///
    /// Total: any string yields a well-formed result with at least one option.
    pub fn resolve(&self, label: &str) -> Resolution {
        match self.node(label) {
            Some(node) => {
                let options = match &node.options {
                    Some(opts) if !opts.is_empty() => opts.clone(),
                    _ => self.default_options.clone(),
                };
                Resolution {
                    response: node.response.clone(),
                    options,
                    action: node.action,
                    matched: true,
                }
            }
            None => {
                debug!(label = %label, "Unresolved dialogue option, using fallback");
                Resolution {
                    response: self.fallback_response.clone(),
                    options: self.default_options.clone(),
                    action: None,
                    matched: false,
                }
            }
        }
    }

    /// The four top-level choices offered with the greeting.
    pub fn initial_options(&self) -> &[String] {
        &self.initial_options
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn default_options(&self) -> &[String] {
        &self.default_options
    }

    pub fn node(&self, key: &str) -> Option<&DialogueNode> {
        self.index.get(key).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn nodes(&self) -> &[DialogueNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// List every offered option that names no node, in authoring order.
    ///
    /// Dead links are legal (they resolve to the fallback); this exists so
    /// the host can report them at startup.
    pub fn lint(&self) -> Vec<DeadLink> {
        let initial = self.initial_options.iter().map(|opt| (None, opt));
        let offered = self.nodes.iter().flat_map(|node| {
            node.options
                .iter()
                .flatten()
                .map(move |opt| (Some(node.key.as_str()), opt))
        });
        let defaults = self.default_options.iter().map(|opt| (None, opt));

        initial
            .chain(offered)
            .chain(defaults)
            .filter(|(_, opt)| !self.contains(opt))
            .map(|(from, opt)| DeadLink {
                from: from.map(str::to_string),
                option: opt.clone(),
            })
            .collect()
    }
}
