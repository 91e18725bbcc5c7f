//! Desktop platform utilities
//!
//! A native window can be asked to open a chat (for example from a
//! notification or a launch argument) before the interface is ready. Such
//! requests are queued until [`PlatformUtils::initialize_activations`] runs,
//! then delivered in order; later requests go straight to the emitter.
//! Requests made while the queue is being delivered (including from a
//! listener) join the queue, so they never overtake earlier ones.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::{debug, info};

use super::{EmailDetails, PlatformKind, PlatformUtils};
use crate::event_emitter::EventEmitter;

#[derive(Debug)]
enum ActivationState {
    /// Not initialized yet
    Queueing(Vec<String>),
    /// Initialized, queued requests still being delivered
    Draining(Vec<String>),
    Live,
}

/// Platform utilities for the native desktop host
#[derive(Debug)]
pub struct DesktopPlatform {
    focused: AtomicBool,
    activations: EventEmitter<String>,
    state: Mutex<ActivationState>,
}

impl DesktopPlatform {
    pub fn new(initially_focused: bool) -> Self {
        Self {
            focused: AtomicBool::new(initially_focused),
            activations: EventEmitter::new(),
            state: Mutex::new(ActivationState::Queueing(Vec::new())),
        }
    }

    /// Record a window focus change from the host
    pub fn set_focused(&self, focused: bool) {
        self.focused.store(focused, Ordering::SeqCst);
    }

    /// Ask the interface to open the chat with `chat_guid`
    pub fn request_chat_activation(&self, chat_guid: impl Into<String>) {
        let chat_guid = chat_guid.into();
        match &mut *self.lock_state() {
            ActivationState::Queueing(queue) | ActivationState::Draining(queue) => {
                debug!("Queueing activation for chat {}", chat_guid);
                queue.push(chat_guid);
                return;
            }
            ActivationState::Live => {}
        }

        debug!("Activating chat {}", chat_guid);
        self.activations.notify(&chat_guid);
    }

    /// Whether [`PlatformUtils::initialize_activations`] has run
    pub fn activations_initialized(&self) -> bool {
        !matches!(*self.lock_state(), ActivationState::Queueing(_))
    }

    fn lock_state(&self) -> MutexGuard<'_, ActivationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the next batch to deliver, going live once nothing is left
    fn next_batch(&self) -> Option<Vec<String>> {
        let mut state = self.lock_state();
        if let ActivationState::Draining(queue) = &mut *state {
            if !queue.is_empty() {
                return Some(std::mem::take(queue));
            }
        }
        *state = ActivationState::Live;
        None
    }
}

#[async_trait]
impl PlatformUtils for DesktopPlatform {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Desktop
    }

    fn initialize_activations(&self) {
        {
            let mut state = self.lock_state();
            let queued = match &mut *state {
                ActivationState::Queueing(queue) => std::mem::take(queue),
                _ => {
                    debug!("Activations already initialized");
                    return;
                }
            };
            info!("Activations initialized, {} pending", queued.len());
            *state = ActivationState::Draining(queued);
        }

        // Listeners run without the lock held and may request more activations
        while let Some(batch) = self.next_batch() {
            for chat_guid in batch {
                self.activations.notify(&chat_guid);
            }
        }
    }

    fn chat_activation_emitter(&self) -> Option<EventEmitter<String>> {
        Some(self.activations.clone())
    }

    async fn has_focus(&self) -> bool {
        self.focused.load(Ordering::SeqCst)
    }

    async fn extra_email_details(&self) -> EmailDetails {
        let mut details = EmailDetails::new();
        details.insert(
            "Operating system".to_string(),
            std::env::consts::OS.to_string(),
        );
        details.insert(
            "Architecture".to_string(),
            std::env::consts::ARCH.to_string(),
        );
        details.insert(
            "Client version".to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );
        details
    }
}
