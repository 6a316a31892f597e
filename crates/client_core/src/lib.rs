use std::sync::Arc;

use dom::{Document, DomEvent, EventKind};
use shared::error::SubmissionError;
use tracing::{debug, info};

pub mod config;
pub mod error;
pub mod form;
pub mod markup;
pub mod toast;
pub mod transport;
pub mod validation;

pub use config::{load_settings, Settings};
pub use error::ClientError;
pub use form::FormSubmitController;
pub use toast::{ToastController, ToastSnapshot};
pub use transport::{ContactEndpoint, EndpointReply, HttpEndpoint, ReplyBody, TransportError};

/// What [`Site::dispatch`] did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Submitted(Result<(), SubmissionError>),
    Toast,
    Ignored,
}

/// Both page controllers, activated together once the page is loaded.
/// They share the document and nothing else.
pub struct Site {
    document: Document,
    forms: FormSubmitController,
    toast: ToastController,
}

impl Site {
    pub fn activate(document: Document, settings: &Settings) -> Result<Self, ClientError> {
        let endpoint = HttpEndpoint::from_settings(settings)?;
        info!(endpoint = %endpoint.url(), "contact form endpoint configured");
        Self::with_endpoint(document, Arc::new(endpoint), settings)
    }

    pub fn with_endpoint(
        document: Document,
        endpoint: Arc<dyn ContactEndpoint>,
        settings: &Settings,
    ) -> Result<Self, ClientError> {
        let forms = FormSubmitController::activate(document.clone(), endpoint)?;
        let toast = ToastController::activate(document.clone(), settings.toast_dismiss_delay())?;
        Ok(Self {
            document,
            forms,
            toast,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn forms(&self) -> &FormSubmitController {
        &self.forms
    }

    pub fn toast(&self) -> &ToastController {
        &self.toast
    }

    pub async fn dispatch(&self, event: &DomEvent) -> Dispatch {
        let dispatched = match event.kind() {
            EventKind::Submit => self
                .forms
                .handle_submit(event)
                .await
                .map(Dispatch::Submitted),
            EventKind::Click => self.toast.handle_click(event).then_some(Dispatch::Toast),
        };
        let dispatched = dispatched.unwrap_or(Dispatch::Ignored);
        debug!(kind = ?event.kind(), ?dispatched, "event dispatched");
        dispatched
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
