use std::sync::atomic::{AtomicBool, Ordering};

use crate::document::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Submit,
    Click,
}

/// An event fired at one element. Handlers call [`DomEvent::prevent_default`]
/// to suppress the native action (form navigation, link following).
#[derive(Debug)]
pub struct DomEvent {
    kind: EventKind,
    target: ElementId,
    default_prevented: AtomicBool,
}

impl DomEvent {
    pub fn new(kind: EventKind, target: ElementId) -> Self {
        Self {
            kind,
            target,
            default_prevented: AtomicBool::new(false),
        }
    }

    pub fn submit(target: ElementId) -> Self {
        Self::new(EventKind::Submit, target)
    }

    pub fn click(target: ElementId) -> Self {
        Self::new(EventKind::Click, target)
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn target(&self) -> ElementId {
        self.target
    }

    pub fn prevent_default(&self) {
        self.default_prevented.store(true, Ordering::Relaxed);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.load(Ordering::Relaxed)
    }
}
