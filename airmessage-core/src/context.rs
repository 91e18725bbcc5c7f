//! Application Context
//!
//! Owns the process-wide pieces of state: the local message cache, the
//! platform utilities selected for this host and the contacts provider.
//! Create it once at startup, hand it (or its parts) to consumers, and call
//! [`AppContext::shutdown`] on exit.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::LocalMessageCache;
use crate::people::{ContactsConfig, ContactsProvider, NativeContacts};
use crate::platform::{create_platform, PlatformConfig, PlatformUtils};

/// Settings consumed by [`AppContext::init`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextConfig {
    #[serde(default)]
    pub platform: PlatformConfig,

    #[serde(default)]
    pub contacts: ContactsConfig,
}

/// Shared application state
pub struct AppContext {
    message_cache: Arc<LocalMessageCache>,
    platform: Arc<dyn PlatformUtils>,
    contacts: Arc<dyn ContactsProvider>,
}

impl AppContext {
    /// Build the context described by `config`
    pub fn init(config: &ContextConfig) -> Self {
        Self::with_platform(config, create_platform(&config.platform))
    }

    /// Build the context around a platform the host constructed itself
    ///
    /// Hosts that feed focus or activation state keep their own handle to the
    /// concrete platform type and pass it in here.
    pub fn with_platform(config: &ContextConfig, platform: Arc<dyn PlatformUtils>) -> Self {
        let contacts: Arc<dyn ContactsProvider> = Arc::new(NativeContacts::load(&config.contacts));
        Self::from_parts(platform, contacts)
    }

    /// Build the context from already constructed parts
    pub fn from_parts(
        platform: Arc<dyn PlatformUtils>,
        contacts: Arc<dyn ContactsProvider>,
    ) -> Self {
        info!(
            "Application context initialized ({} platform)",
            platform.kind()
        );
        Self {
            message_cache: Arc::new(LocalMessageCache::new()),
            platform,
            contacts,
        }
    }

    pub fn message_cache(&self) -> &Arc<LocalMessageCache> {
        &self.message_cache
    }

    pub fn platform(&self) -> &Arc<dyn PlatformUtils> {
        &self.platform
    }

    pub fn contacts(&self) -> &Arc<dyn ContactsProvider> {
        &self.contacts
    }

    /// Tear the context down, discarding cached messages
    ///
    /// Consumers still holding the cache see it empty afterwards.
    pub fn shutdown(self) {
        let cached = self.message_cache.len();
        self.message_cache.clear();
        info!(
            "Application context shut down, discarded {} cached conversations",
            cached
        );
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("platform", &self.platform.kind())
            .field("cached_conversations", &self.message_cache.len())
            .finish_non_exhaustive()
    }
}
