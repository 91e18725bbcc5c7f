//! Conversation items
//!
//! A [`ConversationItem`] is one entry in a conversation thread: a message,
//! a participant joining or leaving, or a chat rename.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delivery state of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum MessageStatusCode {
    /// Not yet acknowledged by the server
    #[default]
    Unconfirmed,
    Idle,
    Sent,
    Delivered,
    Read,
}

/// Why a message failed to send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageErrorCode {
    LocalInvalidContent,
    LocalTooLarge,
    LocalIo,
    LocalNetwork,
    LocalInternalError,
    ServerUnknown,
    ServerExternal,
    ServerBadRequest,
    ServerUnauthorized,
    ServerTimeout,
    AppleNoConversation,
    AppleNetwork,
    AppleUnregistered,
}

/// Send failure attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageError {
    pub code: MessageErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// File attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    pub name: String,
    /// MIME type
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
    /// Base64 checksum reported by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

/// A text and/or attachment message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessageItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Sender address, `None` for outgoing messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default)]
    pub attachments: Vec<AttachmentItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub send_style: Option<String>,
    #[serde(default)]
    pub status: MessageStatusCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<MessageError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParticipantActionType {
    Unknown,
    Join,
    Leave,
}

/// A member was added to or removed from a group chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantAction {
    #[serde(rename = "type")]
    pub action_type: ParticipantActionType,
    /// Member who performed the action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Member the action applies to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}

/// A group chat was renamed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRenameAction {
    pub user: String,
    pub chat_name: String,
}

/// Payload of a [`ConversationItem`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "itemType", rename_all = "camelCase")]
pub enum ConversationItemKind {
    Message(MessageItem),
    ParticipantAction(ParticipantAction),
    ChatRenameAction(ChatRenameAction),
}

/// One entry in a conversation thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationItem {
    /// Client-side id, set before the server confirms the item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
    /// GUID of the conversation this item belongs to
    pub chat_guid: String,
    pub date: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: ConversationItemKind,
}

impl ConversationItem {
    /// Build a message item
    pub fn message(
        chat_guid: impl Into<String>,
        date: DateTime<Utc>,
        message: MessageItem,
    ) -> Self {
        Self {
            local_id: None,
            server_id: None,
            guid: None,
            chat_guid: chat_guid.into(),
            date,
            kind: ConversationItemKind::Message(message),
        }
    }

    /// The message payload, if this item is a message
    pub fn as_message(&self) -> Option<&MessageItem> {
        match &self.kind {
            ConversationItemKind::Message(message) => Some(message),
            _ => None,
        }
    }

    /// Whether this is a message sent from this account
    pub fn is_outgoing_message(&self) -> bool {
        self.as_message()
            .map(|message| message.sender.is_none())
            .unwrap_or(false)
    }
}
