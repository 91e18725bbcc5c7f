//! Browser platform utilities
//!
//! A browser tab cannot be activated from outside, so there is no activation
//! emitter and nothing to initialize. Focus follows the document's visibility
//! state, which the host feeds in through [`BrowserPlatform::set_visibility`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use super::{EmailDetails, PlatformKind, PlatformUtils};
use crate::event_emitter::EventEmitter;

/// Mirror of `document.visibilityState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityState {
    Visible,
    Hidden,
}

/// Platform utilities for the browser host
#[derive(Debug)]
pub struct BrowserPlatform {
    visibility: watch::Sender<VisibilityState>,
}

impl BrowserPlatform {
    pub fn new(initial: VisibilityState) -> Self {
        let (visibility, _) = watch::channel(initial);
        Self { visibility }
    }

    /// Record a `visibilitychange` from the host document
    pub fn set_visibility(&self, state: VisibilityState) {
        let previous = self.visibility.send_replace(state);
        if previous != state {
            debug!("Document visibility changed: {:?} -> {:?}", previous, state);
        }
    }

    /// Current visibility state
    pub fn visibility(&self) -> VisibilityState {
        *self.visibility.borrow()
    }

    /// Watch visibility changes
    pub fn watch_visibility(&self) -> watch::Receiver<VisibilityState> {
        self.visibility.subscribe()
    }
}

#[async_trait]
impl PlatformUtils for BrowserPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Browser
    }

    fn initialize_activations(&self) {}

    fn chat_activation_emitter(&self) -> Option<EventEmitter<String>> {
        None
    }

    async fn has_focus(&self) -> bool {
        self.visibility() == VisibilityState::Visible
    }

    async fn extra_email_details(&self) -> EmailDetails {
        EmailDetails::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_focus_follows_visibility() {
        let platform = BrowserPlatform::new(VisibilityState::Visible);
        assert!(platform.has_focus().await);

        platform.set_visibility(VisibilityState::Hidden);
        assert!(!platform.has_focus().await);

        platform.set_visibility(VisibilityState::Visible);
        assert!(platform.has_focus().await);
    }

    #[tokio::test]
    async fn test_missing_capabilities_are_empty() {
        let platform = BrowserPlatform::new(VisibilityState::Hidden);
        platform.initialize_activations();

        assert!(platform.chat_activation_emitter().is_none());
        assert!(platform.extra_email_details().await.is_empty());
    }

    #[tokio::test]
    async fn test_watch_visibility() {
        let platform = BrowserPlatform::new(VisibilityState::Visible);
        let mut receiver = platform.watch_visibility();

        platform.set_visibility(VisibilityState::Hidden);
        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow(), VisibilityState::Hidden);
    }

    #[test]
    fn test_visibility_serializes_like_dom() {
        assert_eq!(
            serde_json::to_string(&VisibilityState::Visible).unwrap(),
            "\"visible\""
        );
    }
}
