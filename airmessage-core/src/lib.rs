//! AirMessage Client Core
//!
//! The host-independent core of the AirMessage client: the local message
//! cache, small async building blocks (deferred promises, event emitters,
//! ordered task queues), data shapes shared with the interface, and the
//! platform utilities each host target implements.

pub mod cache;
pub mod context;
pub mod data;
pub mod deferred;
pub mod emitter_promise;
pub mod encoding;
pub mod event_emitter;
pub mod hash;
pub mod people;
pub mod platform;
pub mod task_queue;

mod error;

pub use cache::{ConversationId, LocalMessageCache};
pub use context::{AppContext, ContextConfig};
pub use data::{CallEvent, ConversationItem, ConversationTarget, NewMessageUser};
pub use deferred::{Deferred, DeferredError, Promise, Settler};
pub use emitter_promise::{EmitterPromiseProducer, EmitterPromiseTuple};
pub use encoding::{decode_base64, encode_base64, to_hex};
pub use error::{CoreError, Result};
pub use event_emitter::{EventEmitter, ListenerId, Subscription};
pub use hash::hash_string;
pub use people::{Contact, ContactsConfig, ContactsProvider, NativeContacts};
pub use platform::{
    create_platform, BrowserPlatform, DesktopPlatform, PlatformConfig, PlatformKind, PlatformUtils,
    VisibilityState,
};
pub use task_queue::TaskQueue;
