use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::selector::{Compound, Selector};

const FORM_CONTROLS: &[&str] = &["input", "textarea", "select"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

/// One piece of an element's content, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    Element(ElementId),
}

/// The ordered content of an element. Taken out of one element and put back
/// later with [`Document::replace_content`], e.g. to swap a button label for
/// a spinner and restore it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    parts: Vec<ContentPart>,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![ContentPart::Text(text.into())],
        }
    }

    pub fn with_element(mut self, element: ElementId) -> Self {
        self.parts.push(ContentPart::Element(element));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(ContentPart::Text(text.into()));
        self
    }
}

#[derive(Debug, Clone)]
enum Part {
    Text(String),
    Element(Element),
}

/// Detached description of an element subtree, inserted with
/// [`Document::append`] or [`Document::create`].
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    value: Option<String>,
    parts: Vec<Part>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            value: None,
            parts: Vec::new(),
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: &str) -> Self {
        for class in class.split_whitespace() {
            if !self.classes.iter().any(|existing| existing == class) {
                self.classes.push(class.to_string());
            }
        }
        self
    }

    pub fn attr(self, name: &str, value: impl Into<String>) -> Self {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        match name.as_str() {
            "id" => self.id(value),
            "class" => self.class(&value),
            _ => {
                let mut this = self;
                this.attributes.insert(name, value);
                this
            }
        }
    }

    /// Initial value of a form control; [`Document::reset_form`] returns to it.
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(Part::Text(text.into()));
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.parts.push(Part::Element(child));
        self
    }
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    value: Option<String>,
    default_value: String,
    disabled: bool,
    parent: Option<ElementId>,
    content: Vec<ContentPart>,
}

impl Node {
    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "class" if !self.classes.is_empty() => Some(self.classes.join(" ")),
            "class" => None,
            _ => self.attributes.get(name).cloned(),
        }
    }

    fn matches(&self, compound: &Compound) -> bool {
        if compound.tag.as_deref().is_some_and(|tag| tag != self.tag) {
            return false;
        }
        if compound
            .id
            .as_deref()
            .is_some_and(|id| self.id.as_deref() != Some(id))
        {
            return false;
        }
        if !compound
            .classes
            .iter()
            .all(|class| self.classes.iter().any(|own| own == class))
        {
            return false;
        }
        compound.attributes.iter().all(|attribute| {
            match (self.attribute(&attribute.name), &attribute.value) {
                (Some(_), None) => true,
                (Some(own), Some(expected)) => own == *expected,
                (None, _) => false,
            }
        })
    }
}

/// Slots of removed elements are tombstoned and reused, so ids of removed
/// elements may later name a different element.
#[derive(Debug)]
struct Tree {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    root: ElementId,
    head: ElementId,
    body: ElementId,
}

impl Tree {
    fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: ElementId(0),
            head: ElementId(0),
            body: ElementId(0),
        };
        tree.root = tree.insert(Element::new("html"), None);
        tree.head = tree.insert(Element::new("head"), Some(tree.root));
        tree.body = tree.insert(Element::new("body"), Some(tree.root));
        tree
    }

    fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn live_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    fn insert(&mut self, element: Element, parent: Option<ElementId>) -> ElementId {
        let is_control = FORM_CONTROLS.contains(&element.tag.as_str());
        let value = element
            .value
            .clone()
            .or_else(|| is_control.then(String::new));
        let parent = parent.filter(|parent| self.node(*parent).is_some());

        let node = Node {
            tag: element.tag,
            id: element.id,
            classes: element.classes,
            attributes: element.attributes,
            default_value: value.clone().unwrap_or_default(),
            value,
            disabled: false,
            parent,
            content: Vec::new(),
        };
        let id = match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = Some(node);
                ElementId(slot)
            }
            None => {
                self.nodes.push(Some(node));
                ElementId(self.nodes.len() - 1)
            }
        };
        if let Some(parent) = parent {
            if let Some(node) = self.node_mut(parent) {
                node.content.push(ContentPart::Element(id));
            }
        }

        for part in element.parts {
            match part {
                Part::Text(text) => {
                    if let Some(node) = self.node_mut(id) {
                        node.content.push(ContentPart::Text(text));
                    }
                }
                Part::Element(child) => {
                    self.insert(child, Some(id));
                }
            }
        }
        id
    }

    fn element_children(&self, id: ElementId) -> Vec<ElementId> {
        self.node(id)
            .map(|node| {
                node.content
                    .iter()
                    .filter_map(|part| match part {
                        ContentPart::Element(child) => Some(*child),
                        ContentPart::Text(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn descendants(&self, scope: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.element_children(scope).into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.element_children(id).into_iter().rev());
        }
        out
    }

    fn matches(&self, id: ElementId, selector: &Selector) -> bool {
        let Some((last, rest)) = selector.compounds.split_last() else {
            return false;
        };
        let Some(node) = self.node(id) else {
            return false;
        };
        if !node.matches(last) {
            return false;
        }

        let mut ancestor = node.parent;
        for compound in rest.iter().rev() {
            loop {
                let Some(candidate) = ancestor.and_then(|a| self.node(a)) else {
                    return false;
                };
                ancestor = candidate.parent;
                if candidate.matches(compound) {
                    break;
                }
            }
        }
        true
    }

    /// Frees `id` and everything below it. The caller detaches it first.
    fn remove_subtree(&mut self, id: ElementId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            stack.extend(self.element_children(current));
            if let Some(slot) = self.nodes.get_mut(current.0) {
                if slot.take().is_some() {
                    self.free.push(current.0);
                }
            }
        }
    }

    fn detach(&mut self, id: ElementId) {
        let Some(parent) = self.node(id).and_then(|node| node.parent) else {
            return;
        };
        if let Some(node) = self.node_mut(parent) {
            node.content
                .retain(|part| *part != ContentPart::Element(id));
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
        }
    }

    fn text_content(&self, id: ElementId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        for part in &node.content {
            match part {
                ContentPart::Text(text) => out.push_str(text),
                ContentPart::Element(child) => self.text_content(*child, out),
            }
        }
    }
}

/// Shared handle to one page. Clones refer to the same tree.
#[derive(Debug, Clone)]
pub struct Document {
    tree: Arc<Mutex<Tree>>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            tree: Arc::new(Mutex::new(Tree::new())),
        }
    }

    fn tree(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn head(&self) -> ElementId {
        self.tree().head
    }

    pub fn body(&self) -> ElementId {
        self.tree().body
    }

    pub fn append(&self, parent: ElementId, element: Element) -> ElementId {
        self.tree().insert(element, Some(parent))
    }

    /// Inserts a subtree without attaching it anywhere.
    pub fn create(&self, element: Element) -> ElementId {
        self.tree().insert(element, None)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<ElementId> {
        let tree = self.tree();
        let found = tree.descendants(tree.root).into_iter().find(|candidate| {
            tree.node(*candidate)
                .is_some_and(|node| node.id.as_deref() == Some(id))
        });
        found
    }

    pub fn query_selector_all(&self, selector: &Selector) -> Vec<ElementId> {
        let tree = self.tree();
        let matched = tree
            .descendants(tree.root)
            .into_iter()
            .filter(|candidate| tree.matches(*candidate, selector))
            .collect();
        matched
    }

    /// First descendant of `scope` matching `selector`. Ancestor compounds
    /// may match above `scope`, as with `Element.querySelector`.
    pub fn query_selector(&self, scope: ElementId, selector: &Selector) -> Option<ElementId> {
        let tree = self.tree();
        let found = tree
            .descendants(scope)
            .into_iter()
            .find(|candidate| tree.matches(*candidate, selector));
        found
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.tree().node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.tree().element_children(id)
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<String> {
        self.tree()
            .node(id)
            .and_then(|node| node.attribute(&name.to_ascii_lowercase()))
    }

    /// Reads a `data-*` attribute, e.g. `data_attribute(link, "toast-text")`.
    pub fn data_attribute(&self, id: ElementId, key: &str) -> Option<String> {
        self.attribute(id, &format!("data-{key}"))
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.tree()
            .node(id)
            .is_some_and(|node| node.classes.iter().any(|own| own == class))
    }

    pub fn add_class(&self, id: ElementId, class: &str) {
        if let Some(node) = self.tree().node_mut(id) {
            if !node.classes.iter().any(|own| own == class) {
                node.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&self, id: ElementId, class: &str) {
        if let Some(node) = self.tree().node_mut(id) {
            node.classes.retain(|own| own != class);
        }
    }

    /// Current value of a form control; `None` for elements without one.
    pub fn value(&self, id: ElementId) -> Option<String> {
        self.tree().node(id).and_then(|node| node.value.clone())
    }

    pub fn set_value(&self, id: ElementId, value: impl Into<String>) {
        if let Some(node) = self.tree().node_mut(id) {
            node.value = Some(value.into());
        }
    }

    pub fn is_disabled(&self, id: ElementId) -> bool {
        self.tree().node(id).is_some_and(|node| node.disabled)
    }

    pub fn set_disabled(&self, id: ElementId, disabled: bool) {
        if let Some(node) = self.tree().node_mut(id) {
            node.disabled = disabled;
        }
    }

    pub fn text_content(&self, id: ElementId) -> String {
        let mut out = String::new();
        self.tree().text_content(id, &mut out);
        out
    }

    /// Replaces the content of `id` with `text`; child elements are removed.
    pub fn set_text_content(&self, id: ElementId, text: impl Into<String>) {
        self.discard_content(id, Content::text(text));
    }

    /// Removes every child of `id` from the document.
    pub fn clear_children(&self, id: ElementId) {
        self.discard_content(id, Content::default());
    }

    fn discard_content(&self, id: ElementId, content: Content) {
        let mut tree = self.tree();
        let old = Self::swap_content(&mut tree, id, content);
        for part in old.parts {
            if let ContentPart::Element(child) = part {
                tree.remove_subtree(child);
            }
        }
    }

    /// Swaps the content of `id` for `content` and hands back what was there.
    /// Elements in the returned content are detached but stay valid.
    pub fn replace_content(&self, id: ElementId, content: Content) -> Content {
        Self::swap_content(&mut self.tree(), id, content)
    }

    fn swap_content(tree: &mut Tree, id: ElementId, content: Content) -> Content {
        if tree.node(id).is_none() {
            return Content::default();
        }

        for part in &content.parts {
            if let ContentPart::Element(child) = part {
                tree.detach(*child);
            }
        }

        let old = match tree.node_mut(id) {
            Some(node) => std::mem::replace(&mut node.content, content.parts),
            None => Vec::new(),
        };
        for part in &old {
            if let ContentPart::Element(child) = part {
                if let Some(node) = tree.node_mut(*child) {
                    node.parent = None;
                }
            }
        }

        let attached = tree.element_children(id);
        for child in attached {
            if let Some(node) = tree.node_mut(child) {
                node.parent = Some(id);
            }
        }
        Content { parts: old }
    }

    /// Returns every form control under `form` to its initial value.
    pub fn reset_form(&self, form: ElementId) {
        let mut tree = self.tree();
        for id in tree.descendants(form) {
            if let Some(node) = tree.node_mut(id) {
                if node.value.is_some() {
                    node.value = Some(node.default_value.clone());
                }
            }
        }
    }

    /// Number of elements currently held, attached or detached.
    pub fn node_count(&self) -> usize {
        self.tree().live_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector(raw: &str) -> Selector {
        Selector::parse(raw).expect("selector")
    }

    fn sample() -> (Document, ElementId) {
        let document = Document::new();
        let form = document.append(
            document.body(),
            Element::new("form")
                .id("contact-form")
                .child(Element::new("input").id("form_name").value("Ada"))
                .child(Element::new("div").class("messages"))
                .child(
                    Element::new("button")
                        .attr("type", "submit")
                        .text("Send Message"),
                ),
        );
        (document, form)
    }

    #[test]
    fn finds_elements_by_id_and_selector() {
        let (document, form) = sample();
        assert_eq!(document.get_element_by_id("contact-form"), Some(form));
        assert_eq!(
            document.query_selector_all(&selector("form#contact-form")),
            vec![form]
        );
        let input = document
            .query_selector(form, &selector("#form_name"))
            .expect("input");
        assert_eq!(document.value(input).as_deref(), Some("Ada"));
        assert!(document
            .query_selector(form, &selector("button[type=\"submit\"]"))
            .is_some());
        assert!(document
            .query_selector(form, &selector("button[type=\"reset\"]"))
            .is_none());
    }

    #[test]
    fn descendant_selector_requires_every_ancestor() {
        let document = Document::new();
        let marquee = document.append(
            document.body(),
            Element::new("div").class("brand-marq").child(
                Element::new("div")
                    .class("item")
                    .child(Element::new("a").class("img").attr("data-toast-text", "hi")),
            ),
        );
        document.append(document.body(), Element::new("a").class("img"));

        let links = document.query_selector_all(&selector(".brand-marq .item a.img"));
        assert_eq!(links.len(), 1);
        assert_eq!(document.parent(document.parent(links[0]).expect("item")), Some(marquee));
        assert_eq!(
            document.data_attribute(links[0], "toast-text").as_deref(),
            Some("hi")
        );
    }

    #[test]
    fn replace_content_round_trips_button_label() {
        let (document, form) = sample();
        let button = document
            .query_selector(form, &selector("button"))
            .expect("button");
        let spinner = document.create(Element::new("span").class("form-spinner"));

        let original = document.replace_content(
            button,
            Content::default().with_element(spinner).with_text(" Sending..."),
        );
        assert_eq!(document.text_content(button), " Sending...");
        assert_eq!(document.parent(spinner), Some(button));
        assert_eq!(document.children(button), vec![spinner]);

        document.replace_content(button, original);
        assert_eq!(document.text_content(button), "Send Message");
        assert_eq!(document.parent(spinner), None);
    }

    #[test]
    fn reset_form_restores_initial_values() {
        let (document, form) = sample();
        let input = document
            .query_selector(form, &selector("#form_name"))
            .expect("input");
        document.set_value(input, "Grace");
        document.reset_form(form);
        assert_eq!(document.value(input).as_deref(), Some("Ada"));
    }

    #[test]
    fn class_and_disabled_flags() {
        let (document, form) = sample();
        document.add_class(form, "busy");
        document.add_class(form, "busy");
        assert_eq!(document.attribute(form, "class").as_deref(), Some("busy"));
        document.remove_class(form, "busy");
        assert!(!document.has_class(form, "busy"));

        document.set_disabled(form, true);
        assert!(document.is_disabled(form));
    }

    #[test]
    fn cleared_elements_are_freed_and_slots_reused() {
        let (document, form) = sample();
        let messages = document
            .query_selector(form, &selector(".messages"))
            .expect("messages");
        let baseline = document.node_count();

        for _ in 0..100 {
            document.clear_children(messages);
            document.append(
                messages,
                Element::new("div")
                    .class("alert")
                    .child(Element::new("strong").text("!")),
            );
        }
        assert_eq!(document.node_count(), baseline + 2);

        document.set_text_content(messages, "plain");
        assert_eq!(document.node_count(), baseline);
        assert_eq!(document.text_content(messages), "plain");
        assert!(document.query_selector(form, &selector(".alert")).is_none());
    }

    #[test]
    fn replaced_content_survives_until_discarded() {
        let (document, form) = sample();
        let button = document
            .query_selector(form, &selector("button"))
            .expect("button");
        let spinner = document.create(Element::new("span").class("form-spinner"));
        let count = document.node_count();

        for _ in 0..10 {
            let original = document.replace_content(
                button,
                Content::default().with_element(spinner).with_text(" Sending..."),
            );
            document.replace_content(button, original);
        }
        assert_eq!(document.node_count(), count);
        assert!(document.has_class(spinner, "form-spinner"));
    }
}
