//! Data Shapes
//!
//! Plain records exchanged between the messaging layer and the interface.
//! Everything serializes to the camelCase JSON used by the web layer; closed
//! variants carry a `type` tag.

pub mod blocks;
pub mod call_event;
pub mod conversation_target;
pub mod new_message_user;

pub use blocks::{
    AttachmentItem, ChatRenameAction, ConversationItem, ConversationItemKind, MessageError,
    MessageErrorCode, MessageItem, MessageStatusCode, ParticipantAction, ParticipantActionType,
};
pub use call_event::CallEvent;
pub use conversation_target::ConversationTarget;
pub use new_message_user::NewMessageUser;
