use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use dom::{Document, DomEvent, ElementId, EventKind, Selector};
use shared::error::ConfigurationError;
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, error, warn};

use crate::error::ClientError;

pub const TOAST_ROOT_ID: &str = "toast-notification";
pub const TOAST_MESSAGE_ID: &str = "toast-message";
pub const TOAST_CLOSE_ID: &str = "toast-close-button";
pub const TOAST_LINK_SELECTOR: &str = ".brand-marq .slide-har .box .item a.img";
pub const TOAST_TEXT_KEY: &str = "toast-text";
pub const VISIBLE_CLASS: &str = "show";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastSnapshot {
    pub visible: bool,
    pub message: String,
    pub dismiss_pending: bool,
}

#[derive(Debug)]
struct PendingDismiss {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Owns the one dismissal timer. A new timer is only armed after the old one
/// has been aborted, under the same lock.
#[derive(Debug, Default)]
struct ToastState {
    visible: bool,
    message: String,
    generation: u64,
    pending_dismiss: Option<PendingDismiss>,
}

impl ToastState {
    fn cancel_pending(&mut self) {
        if let Some(pending) = self.pending_dismiss.take() {
            pending.handle.abort();
        }
    }
}

struct ToastInner {
    document: Document,
    root: Option<ElementId>,
    text: Option<ElementId>,
    dismiss_delay: Duration,
    state: Mutex<ToastState>,
}

impl ToastInner {
    fn state(&self) -> MutexGuard<'_, ToastState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn hide_locked(&self, state: &mut ToastState) {
        let Some(root) = self.root else {
            return;
        };
        self.document.remove_class(root, VISIBLE_CLASS);
        state.visible = false;
        state.cancel_pending();
    }

    // Timer callback; a superseded timer finds a different generation and
    // leaves the newer toast alone.
    fn dismiss(&self, generation: u64) {
        let mut state = self.state();
        let current = state
            .pending_dismiss
            .as_ref()
            .is_some_and(|pending| pending.generation == generation);
        if !current {
            return;
        }
        // Running inside this task; drop the handle instead of aborting it.
        state.pending_dismiss = None;
        debug!(generation, "toast auto-dismissed");
        self.hide_locked(&mut state);
    }
}

impl Drop for ToastInner {
    fn drop(&mut self) {
        self.state().cancel_pending();
    }
}

pub struct ToastController {
    inner: Arc<ToastInner>,
    close: Option<ElementId>,
    links: Vec<ElementId>,
}

impl ToastController {
    /// Resolves the toast elements and designated links once. Missing
    /// elements are tolerated here and reported when `show` is called.
    pub fn activate(document: Document, dismiss_delay: Duration) -> Result<Self, ClientError> {
        let root = document.get_element_by_id(TOAST_ROOT_ID);
        let text = document.get_element_by_id(TOAST_MESSAGE_ID);
        let close = document.get_element_by_id(TOAST_CLOSE_ID);
        let links = document.query_selector_all(&Selector::parse(TOAST_LINK_SELECTOR)?);
        debug!(
            root = root.is_some(),
            text = text.is_some(),
            close = close.is_some(),
            links = links.len(),
            "toast controller bound"
        );

        Ok(Self {
            inner: Arc::new(ToastInner {
                document,
                root,
                text,
                dismiss_delay,
                state: Mutex::new(ToastState::default()),
            }),
            close,
            links,
        })
    }

    /// Like [`ToastController::activate`], but fails when the toast root or
    /// message slot is missing from the page.
    pub fn try_activate(document: Document, dismiss_delay: Duration) -> Result<Self, ClientError> {
        let controller = Self::activate(document, dismiss_delay)?;
        if let Some(element) = controller.missing_element() {
            return Err(ConfigurationError::MissingElement { element }.into());
        }
        Ok(controller)
    }

    fn missing_element(&self) -> Option<&'static str> {
        if self.inner.root.is_none() {
            Some(TOAST_ROOT_ID)
        } else if self.inner.text.is_none() {
            Some(TOAST_MESSAGE_ID)
        } else {
            None
        }
    }

    pub fn links(&self) -> &[ElementId] {
        &self.links
    }

    pub fn close_control(&self) -> Option<ElementId> {
        self.close
    }

    pub fn show(&self, message: &str) -> Result<(), ConfigurationError> {
        let inner = &self.inner;
        let (Some(root), Some(text)) = (inner.root, inner.text) else {
            let err = ConfigurationError::MissingElement {
                element: self.missing_element().unwrap_or(TOAST_ROOT_ID),
            };
            error!("toast elements not found: {err}");
            return Err(err);
        };

        let mut state = inner.state();
        inner.document.set_text_content(text, message);
        inner.document.add_class(root, VISIBLE_CLASS);
        state.visible = true;
        state.message = message.to_string();

        state.cancel_pending();
        state.generation += 1;
        let generation = state.generation;

        match Handle::try_current() {
            Ok(runtime) => {
                let weak: Weak<ToastInner> = Arc::downgrade(&self.inner);
                let delay = inner.dismiss_delay;
                let handle = runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if let Some(inner) = weak.upgrade() {
                        inner.dismiss(generation);
                    }
                });
                state.pending_dismiss = Some(PendingDismiss { generation, handle });
            }
            Err(_) => warn!("no async runtime; toast will stay visible until hidden"),
        }
        Ok(())
    }

    /// Idempotent; a no-op when the page has no toast root.
    pub fn hide(&self) {
        let mut state = self.inner.state();
        self.inner.hide_locked(&mut state);
    }

    pub fn snapshot(&self) -> ToastSnapshot {
        let state = self.inner.state();
        ToastSnapshot {
            visible: state.visible,
            message: state.message.clone(),
            dismiss_pending: state.pending_dismiss.is_some(),
        }
    }

    /// Returns whether the click landed on the close control or a designated
    /// link.
    pub fn handle_click(&self, event: &DomEvent) -> bool {
        if event.kind() != EventKind::Click {
            return false;
        }
        let target = event.target();

        if self.close == Some(target) {
            self.hide();
            return true;
        }
        if !self.links.contains(&target) {
            return false;
        }

        event.prevent_default();
        let message = self
            .inner
            .document
            .data_attribute(target, TOAST_TEXT_KEY)
            .filter(|message| !message.is_empty());
        match message {
            Some(message) => {
                if let Err(err) = self.show(&message) {
                    debug!(%err, "link click left the toast hidden");
                }
            }
            None => warn!("no data-toast-text attribute found for clicked item"),
        }
        true
    }
}

#[cfg(test)]
#[path = "tests/toast_tests.rs"]
mod tests;
