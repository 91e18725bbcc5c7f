//! Platform Utilities
//!
//! Host-specific capabilities behind one trait. Each host target gets its own
//! implementing type; the variant is chosen at startup from configuration
//! (see [`create_platform`]).
//!
//! ## Capabilities
//!
//! | Operation | Browser | Desktop |
//! |-----------|---------|---------|
//! | `initialize_activations` | no-op | delivers queued activations, then goes live |
//! | `chat_activation_emitter` | `None` | emitter of chat GUIDs |
//! | `has_focus` | document visibility is `Visible` | window focus flag |
//! | `extra_email_details` | empty | OS, architecture, client version |
//!
//! A missing capability is reported as `None` or an empty value, never as an
//! error.

pub mod browser;
pub mod desktop;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::event_emitter::EventEmitter;
use crate::CoreError;

pub use browser::{BrowserPlatform, VisibilityState};
pub use desktop::DesktopPlatform;

/// Key/value lines appended to the device section of feedback e-mails
pub type EmailDetails = BTreeMap<String, String>;

/// Capability surface every host target implements
#[async_trait]
pub trait PlatformUtils: Send + Sync {
    /// Which host variant this is
    fn kind(&self) -> PlatformKind;

    /// Check for pending activations and start listening for new ones
    ///
    /// Call once the app is ready to handle activations.
    fn initialize_activations(&self);

    /// Emitter of chat GUIDs the user asked to open, if the host supports it
    fn chat_activation_emitter(&self) -> Option<EventEmitter<String>>;

    /// Whether the app currently has focus
    async fn has_focus(&self) -> bool;

    /// Extra items for the device information section of the feedback e-mail
    async fn extra_email_details(&self) -> EmailDetails;
}

/// Host environment selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PlatformKind {
    /// Web browser tab
    #[default]
    Browser,
    /// Native desktop window
    Desktop,
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformKind::Browser => write!(f, "browser"),
            PlatformKind::Desktop => write!(f, "desktop"),
        }
    }
}

impl FromStr for PlatformKind {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "browser" | "web" => Ok(PlatformKind::Browser),
            "desktop" | "native" => Ok(PlatformKind::Desktop),
            other => Err(CoreError::configuration(format!(
                "unknown platform '{}'",
                other
            ))),
        }
    }
}

/// Platform selection and initial host state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Host variant to run as
    #[serde(default)]
    pub kind: PlatformKind,

    /// Whether the host window starts visible / focused
    #[serde(default = "default_true")]
    pub initially_visible: bool,
}

fn default_true() -> bool {
    true
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            kind: PlatformKind::default(),
            initially_visible: true,
        }
    }
}

/// Build the platform variant named by `config`
pub fn create_platform(config: &PlatformConfig) -> Arc<dyn PlatformUtils> {
    info!("Using {} platform utilities", config.kind);

    match config.kind {
        PlatformKind::Browser => {
            let visibility = if config.initially_visible {
                VisibilityState::Visible
            } else {
                VisibilityState::Hidden
            };
            Arc::new(BrowserPlatform::new(visibility))
        }
        PlatformKind::Desktop => Arc::new(DesktopPlatform::new(config.initially_visible)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!(
            "browser".parse::<PlatformKind>().unwrap(),
            PlatformKind::Browser
        );
        assert_eq!(
            "Desktop".parse::<PlatformKind>().unwrap(),
            PlatformKind::Desktop
        );
        assert!(matches!(
            "toaster".parse::<PlatformKind>(),
            Err(CoreError::Configuration(_))
        ));
        assert_eq!(PlatformKind::Desktop.to_string(), "desktop");
    }

    #[tokio::test]
    async fn test_create_platform_selects_variant() {
        let browser = create_platform(&PlatformConfig::default());
        assert_eq!(browser.kind(), PlatformKind::Browser);
        assert!(browser.has_focus().await);

        let desktop = create_platform(&PlatformConfig {
            kind: PlatformKind::Desktop,
            initially_visible: false,
        });
        assert_eq!(desktop.kind(), PlatformKind::Desktop);
        assert!(!desktop.has_focus().await);
        assert!(desktop.chat_activation_emitter().is_some());
    }
}
