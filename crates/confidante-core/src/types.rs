//! Shared value types used by more than one crate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Side effect a dialogue node may ask the host page to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactAction {
    Email,
    Phone,
    Form,
}

impl fmt::Display for ContactAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContactAction::Email => write!(f, "email"),
            ContactAction::Phone => write!(f, "phone"),
            ContactAction::Form => write!(f, "form"),
        }
    }
}

impl std::str::FromStr for ContactAction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(ContactAction::Email),
            "phone" => Ok(ContactAction::Phone),
            "form" => Ok(ContactAction::Form),
            _ => Err(format!("Unknown contact action: {}", s)),
        }
    }
}

/// Fixed contact coordinates the host uses when performing a contact action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub mail_to: String,
    pub mail_subject: String,
    pub phone_number: String,
    pub form_element_id: String,
}
