use std::sync::Arc;

use dom::{Content, Document, DomEvent, Element, ElementId, EventKind, Selector};
use shared::{
    domain::{FeedbackKind, FormSubmission},
    error::SubmissionError,
    protocol::SUCCESS_MESSAGE,
};
use tracing::{debug, error, info, warn};

use crate::{
    error::ClientError,
    markup::FORM_STYLESHEET,
    transport::{ContactEndpoint, ReplyBody},
    validation::validate_submission,
};

pub const CONTACT_FORM_SELECTOR: &str = "form#contact-form";
pub const MESSAGES_SELECTOR: &str = ".messages";
pub const SUBMIT_BUTTON_SELECTOR: &str = "button[type=\"submit\"]";
pub const FIELD_NAME_ID: &str = "form_name";
pub const FIELD_EMAIL_ID: &str = "form_email";
pub const FIELD_SUBJECT_ID: &str = "form_subject";
pub const FIELD_MESSAGE_ID: &str = "form_message";
pub const SPINNER_CLASS: &str = "form-spinner";
pub const LOADING_LABEL: &str = " Sending...";

struct Selectors {
    messages: Selector,
    submit_button: Selector,
    name: Selector,
    email: Selector,
    subject: Selector,
    message: Selector,
}

impl Selectors {
    fn new() -> Result<Self, dom::SelectorError> {
        let by_id = |id: &str| Selector::parse(&format!("#{id}"));
        Ok(Self {
            messages: Selector::parse(MESSAGES_SELECTOR)?,
            submit_button: Selector::parse(SUBMIT_BUTTON_SELECTOR)?,
            name: by_id(FIELD_NAME_ID)?,
            email: by_id(FIELD_EMAIL_ID)?,
            subject: by_id(FIELD_SUBJECT_ID)?,
            message: by_id(FIELD_MESSAGE_ID)?,
        })
    }
}

pub struct FormSubmitController {
    document: Document,
    endpoint: Arc<dyn ContactEndpoint>,
    forms: Vec<ElementId>,
    // One detached spinner per bound form, swapped into its button while a
    // request is in flight.
    spinners: Vec<ElementId>,
    selectors: Selectors,
}

impl FormSubmitController {
    /// Binds every contact form present now; forms added later are not seen.
    /// Also injects the alert/spinner stylesheet into the head.
    pub fn activate(
        document: Document,
        endpoint: Arc<dyn ContactEndpoint>,
    ) -> Result<Self, ClientError> {
        let selectors = Selectors::new()?;
        let forms = document.query_selector_all(&Selector::parse(CONTACT_FORM_SELECTOR)?);
        info!("found {} contact form(s)", forms.len());
        let spinners = forms
            .iter()
            .map(|_| document.create(Element::new("span").class(SPINNER_CLASS)))
            .collect();
        for (index, form) in forms.iter().enumerate() {
            debug!(
                form = index + 1,
                id = ?document.attribute(*form, "id"),
                "attaching submit listener"
            );
        }

        document.append(
            document.head(),
            Element::new("style").text(FORM_STYLESHEET),
        );
        debug!("alert and spinner stylesheet appended to head");

        Ok(Self {
            document,
            endpoint,
            forms,
            spinners,
            selectors,
        })
    }

    pub fn forms(&self) -> &[ElementId] {
        &self.forms
    }

    /// Runs one submit attempt. `None` when the event is not a submit on a
    /// bound form.
    pub async fn handle_submit(&self, event: &DomEvent) -> Option<Result<(), SubmissionError>> {
        if event.kind() != EventKind::Submit {
            return None;
        }
        let form = event.target();
        let index = self.forms.iter().position(|bound| *bound == form)?;
        event.prevent_default();
        debug!(form = index + 1, "submit event triggered");

        let doc = &self.document;
        let messages = doc.query_selector(form, &self.selectors.messages);
        let button = doc.query_selector(form, &self.selectors.submit_button);
        if button.is_none() {
            error!(form = index + 1, "submit button not found for this form");
        }
        match messages {
            Some(container) => doc.clear_children(container),
            None => warn!(
                form = index + 1,
                "messages container (.messages) not found; feedback will only be logged"
            ),
        }

        let submission = self.collect(form);
        debug!(?submission, "form data collected");

        if let Err(err) = validate_submission(&submission) {
            self.render(messages, err.user_message(), FeedbackKind::Error);
            return Some(Err(err.into()));
        }

        let spinner = self.spinners[index];
        let original = button.map(|button| {
            let original = doc.replace_content(
                button,
                Content::default()
                    .with_element(spinner)
                    .with_text(LOADING_LABEL),
            );
            doc.set_disabled(button, true);
            (button, original)
        });

        let outcome = match self.endpoint.post_submission(&submission).await {
            Ok(reply) => match reply.body {
                ReplyBody::NotJson { text } => {
                    error!(
                        status = reply.status,
                        body = %text,
                        "failed to parse server response as JSON"
                    );
                    Err(SubmissionError::ResponseParse {
                        status: reply.status,
                    })
                }
                ReplyBody::Json(response) => {
                    debug!(?response, "server response parsed");
                    response.verdict(reply.status)
                }
            },
            Err(err) => {
                error!("submission request failed before a response: {err}");
                Err(SubmissionError::Transport { reason: err.0 })
            }
        };

        match &outcome {
            Ok(()) => {
                self.render(messages, SUCCESS_MESSAGE, FeedbackKind::Success);
                doc.reset_form(form);
            }
            Err(err) => self.render(messages, err.user_message(), FeedbackKind::Error),
        }

        if let Some((button, original)) = original {
            doc.replace_content(button, original);
            doc.set_disabled(button, false);
        }
        debug!(nodes = doc.node_count(), "submit handling finished");

        Some(outcome)
    }

    fn collect(&self, form: ElementId) -> FormSubmission {
        let field = |selector: &Selector| {
            self.document
                .query_selector(form, selector)
                .and_then(|input| self.document.value(input))
                .unwrap_or_default()
        };

        FormSubmission {
            name: field(&self.selectors.name),
            email: field(&self.selectors.email),
            subject: field(&self.selectors.subject),
            message: field(&self.selectors.message),
        }
    }

    fn render(&self, container: Option<ElementId>, message: &str, kind: FeedbackKind) {
        debug!(?kind, text = message, found = container.is_some(), "displaying feedback");
        let Some(container) = container else {
            warn!(?kind, text = message, "feedback not displayed: no container");
            return;
        };

        self.document.clear_children(container);
        self.document.append(
            container,
            Element::new("div")
                .class("alert")
                .class(kind.alert_class())
                .text(message),
        );
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
