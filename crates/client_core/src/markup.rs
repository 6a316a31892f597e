use dom::{Document, Element};

use crate::{
    form::{FIELD_EMAIL_ID, FIELD_MESSAGE_ID, FIELD_NAME_ID, FIELD_SUBJECT_ID},
    toast::{TOAST_CLOSE_ID, TOAST_MESSAGE_ID, TOAST_ROOT_ID},
};

pub const FORM_STYLESHEET: &str = r#"
.alert {
    padding: 0.75rem 1.25rem;
    margin-bottom: 1rem;
    border: 1px solid transparent;
    border-radius: 0.25rem;
    font-size: 0.9rem;
    text-align: left;
}
.alert-success {
    color: #155724;
    background-color: #d4edda;
    border-color: #c3e6cb;
}
.alert-danger {
    color: #721c24;
    background-color: #f8d7da;
    border-color: #f5c6cb;
}
.form-spinner {
    display: inline-block;
    width: 1em;
    height: 1em;
    vertical-align: -0.125em;
    border: 0.2em solid currentColor;
    border-right-color: transparent;
    border-radius: 50%;
    animation: form-spinner-spin .75s linear infinite;
    margin-right: 0.5em;
}
@keyframes form-spinner-spin {
    to { transform: rotate(360deg); }
}
"#;

pub const SUBMIT_LABEL: &str = "Send Message";

/// A marquee entry; `toast_text: None` renders a link without annotation.
#[derive(Debug, Clone, Copy)]
pub struct MarqueeItem<'a> {
    pub label: &'a str,
    pub toast_text: Option<&'a str>,
}

pub const DEMO_MARQUEE: &[MarqueeItem<'static>] = &[
    MarqueeItem {
        label: "Acme Logistics",
        toast_text: Some("Acme Logistics: freight tracking rebuilt in 6 weeks."),
    },
    MarqueeItem {
        label: "Northwind",
        toast_text: Some("Northwind: checkout latency cut by 40%."),
    },
    MarqueeItem {
        label: "Placeholder",
        toast_text: None,
    },
];

pub fn contact_form() -> Element {
    let field = |tag: &str, id: &str, name: &str| Element::new(tag).id(id).attr("name", name);

    Element::new("form")
        .id("contact-form")
        .attr("method", "post")
        .child(Element::new("div").class("messages"))
        .child(field("input", FIELD_NAME_ID, "name").attr("type", "text"))
        .child(field("input", FIELD_EMAIL_ID, "email").attr("type", "email"))
        .child(field("input", FIELD_SUBJECT_ID, "subject").attr("type", "text"))
        .child(field("textarea", FIELD_MESSAGE_ID, "message"))
        .child(
            Element::new("button")
                .attr("type", "submit")
                .class("btn")
                .text(SUBMIT_LABEL),
        )
}

pub fn toast() -> Element {
    Element::new("div")
        .id(TOAST_ROOT_ID)
        .class("toast")
        .child(Element::new("span").id(TOAST_MESSAGE_ID))
        .child(
            Element::new("button")
                .id(TOAST_CLOSE_ID)
                .attr("type", "button")
                .text("×"),
        )
}

pub fn marquee(items: &[MarqueeItem<'_>]) -> Element {
    let mut box_ = Element::new("div").class("box");
    for item in items {
        let mut link = Element::new("a")
            .class("img")
            .attr("href", "#")
            .text(item.label);
        if let Some(text) = item.toast_text {
            link = link.attr("data-toast-text", text);
        }
        box_ = box_.child(Element::new("div").class("item").child(link));
    }

    Element::new("div")
        .class("brand-marq")
        .child(Element::new("div").class("slide-har").child(box_))
}

/// Contact form, marquee and toast on one page.
pub fn demo_page() -> Document {
    let document = Document::new();
    let body = document.body();
    document.append(body, marquee(DEMO_MARQUEE));
    document.append(body, contact_form());
    document.append(body, toast());
    document
}
