//! Terminal outcomes of a FaceTime call flow

use serde::{Deserialize, Serialize};

/// Outcome of an outgoing call or of handling an incoming one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum CallEvent {
    /// The recipient accepted; join through the link
    OutgoingAccepted { face_time_link: String },
    /// The recipient declined
    OutgoingRejected,
    /// The outgoing call could not be placed
    OutgoingError { error_details: Option<String> },
    /// An incoming call was handed off to a link
    IncomingHandled { face_time_link: String },
    /// An incoming call could not be handled
    IncomingHandleError { error_details: Option<String> },
}

impl CallEvent {
    /// FaceTime link carried by successful outcomes
    pub fn face_time_link(&self) -> Option<&str> {
        match self {
            CallEvent::OutgoingAccepted { face_time_link }
            | CallEvent::IncomingHandled { face_time_link } => Some(face_time_link),
            _ => None,
        }
    }

    /// Whether this outcome reports a failure
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            CallEvent::OutgoingError { .. } | CallEvent::IncomingHandleError { .. }
        )
    }
}
