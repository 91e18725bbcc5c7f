//! Addressing for conversations that may not exist yet

use serde::{Deserialize, Serialize};

/// Either an existing conversation or the members of a new one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConversationTarget {
    /// An existing conversation, by GUID
    Linked { guid: String },
    /// A conversation not yet confirmed to exist
    Unlinked {
        members: Vec<String>,
        service: String,
    },
}

impl ConversationTarget {
    /// Target an existing conversation
    pub fn linked(guid: impl Into<String>) -> Self {
        ConversationTarget::Linked { guid: guid.into() }
    }

    /// Target a new conversation with `members` on `service`
    pub fn unlinked(members: Vec<String>, service: impl Into<String>) -> Self {
        ConversationTarget::Unlinked {
            members,
            service: service.into(),
        }
    }

    /// GUID of a linked target
    pub fn guid(&self) -> Option<&str> {
        match self {
            ConversationTarget::Linked { guid } => Some(guid),
            ConversationTarget::Unlinked { .. } => None,
        }
    }
}
