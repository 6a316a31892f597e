mod document;
mod event;
mod selector;

pub use document::{Content, ContentPart, Document, Element, ElementId};
pub use event::{DomEvent, EventKind};
pub use selector::{Selector, SelectorError};
