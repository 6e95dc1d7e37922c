use chrono::{DateTime, Utc};
use confidante_core::ContactAction;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry of the conversation graph, keyed by the exact button text that selects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueNode {
    pub key: String,
    pub response: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ContactAction>,
}

/// Result of resolving an option label against the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub response: String,
    /// Always non-empty.
    pub options: Vec<String>,
    pub action: Option<ContactAction>,
    /// `false` when the label hit no node and the fallback was used.
    pub matched: bool,
}

/// An option label that names no node in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeadLink {
    /// Key of the node offering the option, or `None` for the initial options.
    pub from: Option<String>,
    pub option: String,
}

/// One line of a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub is_from_user: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn from_user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            is_from_user: true,
            options: None,
            created_at: Utc::now(),
        }
    }

    pub fn from_bot(text: impl Into<String>, options: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            is_from_user: false,
            options: Some(options),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_deserializes_without_options_or_action() {
        let node: DialogueNode =
            serde_json::from_str(r#"{"key": "Hi", "response": "Hello"}"#).unwrap();
        assert_eq!(node.key, "Hi");
        assert!(node.options.is_none());
        assert!(node.action.is_none());
    }

    #[test]
    fn test_node_rejects_unknown_action() {
        let result: Result<DialogueNode, _> =
            serde_json::from_str(r#"{"key": "Hi", "response": "Hello", "action": "fax"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_message_serializes_camel_case() {
        let msg = Message::from_user("Call us now");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["isFromUser"], true);
        assert_eq!(json["text"], "Call us now");
        assert!(json.get("options").is_none());

        let bot = Message::from_bot("Hello", vec!["A".into()]);
        let json = serde_json::to_value(&bot).unwrap();
        assert_eq!(json["isFromUser"], false);
        assert_eq!(json["options"][0], "A");
    }
}
