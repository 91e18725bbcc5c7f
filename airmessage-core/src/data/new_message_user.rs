//! A recipient picked while composing a new message

use serde::{Deserialize, Serialize};

/// Data for a user to send a new message to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessageUser {
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Avatar image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Normalized address
    pub address: String,
    /// Address as shown to the user
    pub display_address: String,
    /// Label such as "mobile" or "work"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_label: Option<String>,
}

impl NewMessageUser {
    /// Create a user known only by address
    pub fn new(address: impl Into<String>, display_address: impl Into<String>) -> Self {
        Self {
            name: None,
            avatar: None,
            address: address.into(),
            display_address: display_address.into(),
            address_label: None,
        }
    }

    /// Name to show in recipient chips, falling back to the display address
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.display_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_optional_fields_omitted() {
        let user = NewMessageUser::new("+15551234567", "(555) 123-4567");
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            json!({ "address": "+15551234567", "displayAddress": "(555) 123-4567" })
        );
        assert_eq!(user.label(), "(555) 123-4567");
    }

    #[test]
    fn test_label_prefers_name() {
        let user = NewMessageUser {
            name: Some("Ada".to_string()),
            address_label: Some("mobile".to_string()),
            ..NewMessageUser::new("+15551234567", "(555) 123-4567")
        };
        assert_eq!(user.label(), "Ada");
    }
}
