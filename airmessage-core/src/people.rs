//! People / Contacts
//!
//! The native contacts module is a callback-style boundary
//! ([`ContactsBackend`]): it reports results by invoking a callback, and its
//! only failure mode is never invoking it. [`NativeContacts`] bridges that
//! boundary into the async [`ContactsProvider`] trait using [`Deferred`].
//!
//! Concurrent requests are coalesced: while a `get_contacts` call is in
//! flight, further callers wait on the same backend request, and lookups for
//! the same query share one `find_contact` call.
//!
//! A backend that cannot be loaded is logged and swallowed; the provider then
//! simply has no contacts.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fs;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::future::{FutureExt, Shared};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::deferred::{Deferred, DeferredError, Promise, Settler};
use crate::Result;

/// Kind of contact address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    Email,
    Phone,
}

/// One address of a contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressData {
    /// Normalized address
    pub value: String,
    /// Address as shown to the user
    pub display_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub address_type: AddressType,
}

/// A person from the host's address book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub addresses: Vec<AddressData>,
}

impl Contact {
    /// Whether `query` names one of this contact's addresses or is part of its name
    ///
    /// Matching is case-insensitive.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return false;
        }

        self.addresses
            .iter()
            .any(|address| address.value.to_lowercase() == query)
            || self
                .name
                .as_ref()
                .map(|name| name.to_lowercase().contains(&query))
                .unwrap_or(false)
    }
}

/// Callback receiving every contact
pub type ContactsCallback = Box<dyn FnOnce(Vec<Contact>) + Send>;

/// Callback receiving the first matching contact
pub type FindContactCallback = Box<dyn FnOnce(Option<Contact>) + Send>;

/// Callback-style native contacts module
pub trait ContactsBackend: Send + Sync {
    fn get_contacts(&self, callback: ContactsCallback);

    fn find_contact(&self, query: &str, callback: FindContactCallback);
}

/// Async access to the user's contacts
#[async_trait]
pub trait ContactsProvider: Send + Sync {
    /// All contacts, empty if unavailable
    async fn get_contacts(&self) -> Vec<Contact>;

    /// First contact matching `query`
    async fn find_contact(&self, query: &str) -> Option<Contact>;
}

/// Contacts source settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactsConfig {
    /// JSON file holding an array of contacts; no contacts when unset
    #[serde(default)]
    pub source: Option<PathBuf>,
}

type SharedRequest<T> = Shared<Promise<T, Infallible>>;

/// Backend requests currently awaiting their callback, by key
struct InFlight<K, T: Clone> {
    requests: Mutex<HashMap<K, SharedRequest<T>>>,
}

impl<K: Eq + Hash + Clone, T: Clone> InFlight<K, T> {
    fn new() -> Self {
        Self {
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Join the request for `key`, or start one
    ///
    /// A settler is returned only to the caller that must issue the backend
    /// call.
    fn join(&self, key: &K) -> (SharedRequest<T>, Option<Settler<T, Infallible>>) {
        let mut requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(request) = requests.get(key) {
            return (request.clone(), None);
        }

        let (settler, promise) = Deferred::new().split();
        let request = promise.shared();
        requests.insert(key.clone(), request.clone());
        (request, Some(settler))
    }

    /// Forget the completed `request` so the next caller asks the backend again
    fn finish(&self, key: &K, request: &SharedRequest<T>) {
        let mut requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
        if requests
            .get(key)
            .map_or(false, |current| current.ptr_eq(request))
        {
            requests.remove(key);
        }
    }

    fn len(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// [`ContactsProvider`] over an optional [`ContactsBackend`]
pub struct NativeContacts {
    backend: Option<Arc<dyn ContactsBackend>>,
    contacts_requests: InFlight<(), Vec<Contact>>,
    find_requests: InFlight<String, Option<Contact>>,
}

impl NativeContacts {
    pub fn new(backend: Arc<dyn ContactsBackend>) -> Self {
        Self::with_backend(Some(backend))
    }

    /// A provider without a backend
    pub fn unavailable() -> Self {
        Self::with_backend(None)
    }

    fn with_backend(backend: Option<Arc<dyn ContactsBackend>>) -> Self {
        Self {
            backend,
            contacts_requests: InFlight::new(),
            find_requests: InFlight::new(),
        }
    }

    /// Load the backend named by `config`
    ///
    /// Load failures are logged and yield an unavailable provider.
    pub fn load(config: &ContactsConfig) -> Self {
        let Some(path) = &config.source else {
            debug!("No contacts source configured");
            return Self::unavailable();
        };

        match JsonContactsBackend::load(path) {
            Ok(backend) => {
                info!("Loaded {} contacts from {}", backend.len(), path.display());
                Self::new(Arc::new(backend))
            }
            Err(e) => {
                warn!("Failed to load contacts from {}: {}", path.display(), e);
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Number of backend requests still waiting for their callback
    pub fn pending_requests(&self) -> usize {
        self.contacts_requests.len() + self.find_requests.len()
    }
}

fn callback_outcome<T>(outcome: std::result::Result<T, DeferredError<Infallible>>, fallback: T) -> T {
    match outcome {
        Ok(value) => value,
        Err(_) => {
            warn!("Contacts backend dropped its callback");
            fallback
        }
    }
}

#[async_trait]
impl ContactsProvider for NativeContacts {
    async fn get_contacts(&self) -> Vec<Contact> {
        let Some(backend) = &self.backend else {
            return Vec::new();
        };

        let (request, settler) = self.contacts_requests.join(&());
        match settler {
            Some(settler) => backend.get_contacts(Box::new(move |contacts| {
                settler.resolve(contacts);
            })),
            None => debug!("Joining in-flight contacts request"),
        }

        let outcome = request.clone().await;
        self.contacts_requests.finish(&(), &request);
        callback_outcome(outcome, Vec::new())
    }

    async fn find_contact(&self, query: &str) -> Option<Contact> {
        let backend = self.backend.as_ref()?;

        let key = query.to_string();
        let (request, settler) = self.find_requests.join(&key);
        match settler {
            Some(settler) => backend.find_contact(
                query,
                Box::new(move |contact| {
                    settler.resolve(contact);
                }),
            ),
            None => debug!("Joining in-flight lookup for {}", query),
        }

        let outcome = request.clone().await;
        self.find_requests.finish(&key, &request);
        callback_outcome(outcome, None)
    }
}

/// Contacts backend reading a JSON array of [`Contact`]s
#[derive(Debug, Clone, Default)]
pub struct JsonContactsBackend {
    contacts: Vec<Contact>,
}

impl JsonContactsBackend {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self { contacts }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let contacts: Vec<Contact> = serde_json::from_str(&contents)?;
        Ok(Self::new(contacts))
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

impl ContactsBackend for JsonContactsBackend {
    fn get_contacts(&self, callback: ContactsCallback) {
        callback(self.contacts.clone());
    }

    fn find_contact(&self, query: &str, callback: FindContactCallback) {
        callback(
            self.contacts
                .iter()
                .find(|contact| contact.matches(query))
                .cloned(),
        );
    }
}
