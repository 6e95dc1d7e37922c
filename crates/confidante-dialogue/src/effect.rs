//! Classification of contact actions into host-side effects.
//!
//! The engine never performs an effect itself. It tells the host which
//! effect applies and how long to wait after the reply is displayed.

use std::time::Duration;

use confidante_core::config::ChatConfig;
use confidante_core::{ContactAction, ContactDetails};
use serde::Serialize;

/// Display pacing for a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatTimings {
    pub greeting_delay: Duration,
    pub response_delay: Duration,
    pub email_action_delay: Duration,
    pub phone_action_delay: Duration,
    pub form_action_delay: Duration,
}

impl From<&ChatConfig> for ChatTimings {
    fn from(config: &ChatConfig) -> Self {
        Self {
            greeting_delay: Duration::from_millis(config.greeting_delay_ms),
            response_delay: Duration::from_millis(config.response_delay_ms),
            email_action_delay: Duration::from_millis(config.email_action_delay_ms),
            phone_action_delay: Duration::from_millis(config.phone_action_delay_ms),
            form_action_delay: Duration::from_millis(config.form_action_delay_ms),
        }
    }
}

impl Default for ChatTimings {
    fn default() -> Self {
        Self::from(&ChatConfig::default())
    }
}

/// The concrete effect the host environment performs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContactEffect {
    None,
    OpenMailCompose {
        to: String,
        subject: String,
        href: String,
    },
    DialNumber {
        number: String,
        href: String,
    },
    ScrollToElement {
        element_id: String,
    },
}

/// An effect together with the settle delay that precedes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledEffect {
    pub effect: ContactEffect,
    #[serde(rename = "delay_ms", serialize_with = "serialize_millis")]
    pub delay: Duration,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// Map a node's action to the effect the host should perform.
pub fn action_effect(
    action: Option<ContactAction>,
    contact: &ContactDetails,
    timings: &ChatTimings,
) -> ScheduledEffect {
    match action {
        None => ScheduledEffect {
            effect: ContactEffect::None,
            delay: Duration::ZERO,
        },
        Some(ContactAction::Email) => ScheduledEffect {
            effect: ContactEffect::OpenMailCompose {
                to: contact.mail_to.clone(),
                subject: contact.mail_subject.clone(),
                href: format!(
                    "mailto:{}?subject={}",
                    contact.mail_to,
                    urlencoding::encode(&contact.mail_subject)
                ),
            },
            delay: timings.email_action_delay,
        },
        Some(ContactAction::Phone) => ScheduledEffect {
            effect: ContactEffect::DialNumber {
                number: contact.phone_number.clone(),
                href: format!("tel:{}", contact.phone_number),
            },
            delay: timings.phone_action_delay,
        },
        Some(ContactAction::Form) => ScheduledEffect {
            effect: ContactEffect::ScrollToElement {
                element_id: contact.form_element_id.clone(),
            },
            delay: timings.form_action_delay,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confidante_core::config::ContactConfig;

    fn contact() -> ContactDetails {
        ContactConfig::default().details()
    }

    #[test]
    fn test_no_action_is_none_effect() {
        let s = action_effect(None, &contact(), &ChatTimings::default());
        assert_eq!(s.effect, ContactEffect::None);
        assert_eq!(s.delay, Duration::ZERO);
    }

    #[test]
    fn test_email_effect() {
        let s = action_effect(Some(ContactAction::Email), &contact(), &ChatTimings::default());
        assert_eq!(
            s.effect,
            ContactEffect::OpenMailCompose {
                to: "helpatconfidante@gmail.com".into(),
                subject: "Inquiry from Confidante Website".into(),
                href: "mailto:helpatconfidante@gmail.com?subject=Inquiry%20from%20Confidante%20Website"
                    .into(),
            }
        );
        assert_eq!(s.delay, Duration::from_millis(2000));
    }

    #[test]
    fn test_phone_effect() {
        let s = action_effect(Some(ContactAction::Phone), &contact(), &ChatTimings::default());
        assert_eq!(
            s.effect,
            ContactEffect::DialNumber {
                number: "+919839154888".into(),
                href: "tel:+919839154888".into(),
            }
        );
        assert_eq!(s.delay, Duration::from_millis(2000));
    }

    #[test]
    fn test_form_effect() {
        let s = action_effect(Some(ContactAction::Form), &contact(), &ChatTimings::default());
        assert_eq!(
            s.effect,
            ContactEffect::ScrollToElement {
                element_id: "contact-form".into()
            }
        );
        assert_eq!(s.delay, Duration::from_millis(1000));
    }

    #[test]
    fn test_timings_follow_config() {
        let config = ChatConfig {
            form_action_delay_ms: 5,
            ..ChatConfig::default()
        };
        let timings = ChatTimings::from(&config);
        let s = action_effect(Some(ContactAction::Form), &contact(), &timings);
        assert_eq!(s.delay, Duration::from_millis(5));
        assert_eq!(timings.response_delay, Duration::from_millis(800));
    }

    #[test]
    fn test_scheduled_effect_json_shape() {
        let s = action_effect(Some(ContactAction::Form), &contact(), &ChatTimings::default());
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["delay_ms"], 1000);
        assert_eq!(json["effect"]["kind"], "scroll_to_element");
        assert_eq!(json["effect"]["element_id"], "contact-form");

        let none = serde_json::to_value(ContactEffect::None).unwrap();
        assert_eq!(none["kind"], "none");
    }
}
