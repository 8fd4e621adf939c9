//! In-memory doubles for the browser capabilities.

use crate::dom::Dom;
use crate::notice::Notice;
use crate::page::Page;
use crate::transport::{FormPayload, Transport, TransportError};
use futures::channel::oneshot;
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FakeElement {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub style: BTreeMap<String, String>,
    pub attributes: BTreeMap<String, String>,
    pub text: String,
    pub value: Option<String>,
    pub checked: bool,
    pub disabled: bool,
    pub submissions: usize,
}

/// Element tree addressed by index; node 0 is `body`.
#[derive(Debug, Clone)]
pub struct FakeDom {
    elements: Rc<RefCell<Vec<FakeElement>>>,
}

impl FakeDom {
    pub fn new() -> Self {
        let body = FakeElement {
            tag: "body".to_string(),
            ..FakeElement::default()
        };
        Self {
            elements: Rc::new(RefCell::new(vec![body])),
        }
    }

    pub fn body_node(&self) -> usize {
        0
    }

    pub fn add(&self, parent: usize, tag: &str, id: Option<&str>, classes: &[&str]) -> usize {
        let mut elements = self.elements.borrow_mut();
        let node = elements.len();
        elements.push(FakeElement {
            tag: tag.to_string(),
            id: id.map(str::to_string),
            classes: classes.iter().map(|class| class.to_string()).collect(),
            parent: Some(parent),
            ..FakeElement::default()
        });
        elements[parent].children.push(node);
        node
    }

    pub fn set_value(&self, node: usize, value: &str) {
        self.elements.borrow_mut()[node].value = Some(value.to_string());
    }

    pub fn is_disabled(&self, node: usize) -> bool {
        self.elements.borrow()[node].disabled
    }

    pub fn text(&self, node: usize) -> String {
        self.elements.borrow()[node].text.clone()
    }

    pub fn submissions(&self, node: usize) -> usize {
        self.elements.borrow()[node].submissions
    }

    pub fn hidden_inputs(&self, form: usize) -> Vec<(String, String)> {
        let elements = self.elements.borrow();
        elements[form]
            .children
            .iter()
            .map(|child| &elements[*child])
            .filter(|child| child.attributes.get("type").map(String::as_str) == Some("hidden"))
            .map(|child| {
                (
                    child.attributes.get("name").cloned().unwrap_or_default(),
                    child.value.clone().unwrap_or_default(),
                )
            })
            .collect()
    }

    pub fn links(&self, parent: usize) -> Vec<(String, String)> {
        let elements = self.elements.borrow();
        elements[parent]
            .children
            .iter()
            .map(|child| &elements[*child])
            .filter(|child| child.tag == "a")
            .map(|child| {
                (
                    child.attributes.get("href").cloned().unwrap_or_default(),
                    child.text.clone(),
                )
            })
            .collect()
    }

    pub fn snapshot(&self) -> Vec<FakeElement> {
        self.elements.borrow().clone()
    }

    fn element_matches(element: &FakeElement, selector: &str) -> bool {
        if let Some(class) = selector.strip_prefix('.') {
            let class = unescape_identifier(class);
            element.classes.iter().any(|candidate| *candidate == class)
        } else if let Some(id) = selector.strip_prefix('#') {
            element.id.as_deref() == Some(id)
        } else {
            element.tag == selector
        }
    }

    fn descendants(&self, node: usize) -> Vec<usize> {
        let elements = self.elements.borrow();
        let mut found = Vec::new();
        let mut stack: Vec<usize> = elements[node].children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            found.push(current);
            stack.extend(elements[current].children.iter().rev().copied());
        }
        found
    }
}

impl Dom for FakeDom {
    type Node = usize;

    fn select(&self, selector: &str) -> Vec<usize> {
        let mut nodes = vec![self.body_node()];
        nodes.extend(self.descendants(self.body_node()));
        nodes.retain(|node| self.matches(node, selector));
        nodes
    }

    fn body(&self) -> Option<usize> {
        Some(self.body_node())
    }

    fn element_by_id(&self, id: &str) -> Option<usize> {
        self.select(&format!("#{id}")).into_iter().next()
    }

    fn create_element(&self, parent: &usize, tag: &str, id: Option<&str>, class: &str) -> Option<usize> {
        let classes: Vec<&str> = class.split_whitespace().collect();
        Some(self.add(*parent, tag, id, &classes))
    }

    fn clear(&self, node: &usize) {
        let mut elements = self.elements.borrow_mut();
        let children = std::mem::take(&mut elements[*node].children);
        for child in children {
            elements[child].parent = None;
        }
        elements[*node].text.clear();
    }

    fn class_attribute(&self, node: &usize) -> String {
        self.elements.borrow()[*node].classes.join(" ")
    }

    fn has_class(&self, node: &usize, class: &str) -> bool {
        self.elements.borrow()[*node].classes.iter().any(|candidate| candidate == class)
    }

    fn add_class(&self, node: &usize, class: &str) {
        if !self.has_class(node, class) {
            self.elements.borrow_mut()[*node].classes.push(class.to_string());
        }
    }

    fn remove_class(&self, node: &usize, class: &str) {
        self.elements.borrow_mut()[*node].classes.retain(|candidate| candidate != class);
    }

    fn style(&self, node: &usize, property: &str) -> Option<String> {
        self.elements.borrow()[*node].style.get(property).cloned()
    }

    fn computed_style(&self, node: &usize, property: &str) -> Option<String> {
        self.style(node, property)
    }

    fn set_style(&self, node: &usize, property: &str, value: &str) {
        let mut elements = self.elements.borrow_mut();
        if value.is_empty() {
            elements[*node].style.remove(property);
        } else {
            elements[*node].style.insert(property.to_string(), value.to_string());
        }
    }

    fn text_content(&self, node: &usize) -> String {
        self.text(*node)
    }

    fn set_text(&self, node: &usize, text: &str) {
        self.elements.borrow_mut()[*node].text = text.to_string();
    }

    fn value(&self, node: &usize) -> Option<String> {
        self.elements.borrow()[*node].value.clone()
    }

    fn is_checked(&self, node: &usize) -> bool {
        self.elements.borrow()[*node].checked
    }

    fn set_checked(&self, node: &usize, checked: bool) {
        self.elements.borrow_mut()[*node].checked = checked;
    }

    fn set_disabled(&self, node: &usize, disabled: bool) {
        self.elements.borrow_mut()[*node].disabled = disabled;
    }

    fn set_attribute(&self, node: &usize, name: &str, value: &str) {
        self.elements.borrow_mut()[*node]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn parent(&self, node: &usize) -> Option<usize> {
        self.elements.borrow()[*node].parent
    }

    fn closest(&self, node: &usize, selector: &str) -> Option<usize> {
        let mut current = Some(*node);
        while let Some(candidate) = current {
            if self.matches(&candidate, selector) {
                return Some(candidate);
            }
            current = self.parent(&candidate);
        }
        None
    }

    fn next_sibling(&self, node: &usize) -> Option<usize> {
        let parent = self.parent(node)?;
        let elements = self.elements.borrow();
        let siblings = &elements[parent].children;
        let position = siblings.iter().position(|sibling| sibling == node)?;
        siblings.get(position + 1).copied()
    }

    fn matches(&self, node: &usize, selector: &str) -> bool {
        Self::element_matches(&self.elements.borrow()[*node], selector)
    }

    fn find(&self, node: &usize, selector: &str) -> Vec<usize> {
        self.descendants(*node)
            .into_iter()
            .filter(|candidate| self.matches(candidate, selector))
            .collect()
    }

    fn children(&self, node: &usize) -> Vec<usize> {
        self.elements.borrow()[*node].children.clone()
    }

    fn append_hidden_input(&self, form: &usize, name: &str, value: &str) {
        let input = self.add(*form, "input", None, &[]);
        self.set_attribute(&input, "type", "hidden");
        self.set_attribute(&input, "name", name);
        self.set_value(input, value);
    }

    fn submit(&self, form: &usize) {
        self.elements.borrow_mut()[*form].submissions += 1;
    }

    fn append_link(&self, parent: &usize, href: &str, text: &str) {
        let link = self.add(*parent, "a", None, &[]);
        self.set_attribute(&link, "href", href);
        self.set_text(&link, text);
    }
}

/// Reverse of CSS identifier escaping: `\\` followed by 1-6 hex digits and
/// an optional space, or by any other character taken literally.
fn unescape_identifier(escaped: &str) -> String {
    let mut plain = String::new();
    let mut chars = escaped.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            plain.push(c);
            continue;
        }
        let mut hex = String::new();
        while hex.len() < 6 {
            match chars.peek() {
                Some(digit) if digit.is_ascii_hexdigit() => {
                    hex.push(*digit);
                    chars.next();
                }
                _ => break,
            }
        }
        if hex.is_empty() {
            plain.extend(chars.next());
        } else {
            if chars.peek() == Some(&' ') {
                chars.next();
            }
            let code = u32::from_str_radix(&hex, 16).unwrap_or(0xFFFD);
            plain.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
        }
    }
    plain
}

fn overlay_visible(dom: &FakeDom) -> bool {
    dom.element_by_id("COVER")
        .is_some_and(|overlay| !dom.has_class(&overlay, "invisible"))
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Navigated(String),
    ReloadScheduled(Duration),
}

/// Page double recording navigation, reload scheduling and notices.
#[derive(Debug, Default)]
pub struct RecordingPage {
    url: RefCell<String>,
    events: RefCell<Vec<PageEvent>>,
    notices: RefCell<Vec<Notice>>,
    watched: Option<FakeDom>,
    overlay_seen: RefCell<Vec<bool>>,
}

impl RecordingPage {
    /// Also record whether the loading overlay was visible when a reload
    /// got scheduled.
    pub fn watching(dom: FakeDom) -> Self {
        Self {
            watched: Some(dom),
            ..Self::default()
        }
    }

    pub fn set_current_url(&self, url: &str) {
        *self.url.borrow_mut() = url.to_string();
    }

    pub fn events(&self) -> Vec<PageEvent> {
        self.events.borrow().clone()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn overlay_seen(&self) -> Vec<bool> {
        self.overlay_seen.borrow().clone()
    }
}

impl Page for RecordingPage {
    fn current_url(&self) -> String {
        self.url.borrow().clone()
    }

    fn navigate(&self, url: &str) {
        self.events.borrow_mut().push(PageEvent::Navigated(url.to_string()));
    }

    fn schedule_reload(&self, delay: Duration) {
        if let Some(dom) = &self.watched {
            self.overlay_seen.borrow_mut().push(overlay_visible(dom));
        }
        self.events.borrow_mut().push(PageEvent::ReloadScheduled(delay));
    }

    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}

/// Releases a transport held by [`ScriptedTransport::hold`].
pub struct Gate(RefCell<Option<oneshot::Sender<()>>>);

impl Gate {
    pub fn release(&self) {
        if let Some(sender) = self.0.borrow_mut().take() {
            let _ = sender.send(());
        }
    }
}

/// Transport answering from a queue of scripted replies.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: RefCell<VecDeque<Result<serde_json::Value, TransportError>>>,
    requests: RefCell<Vec<(String, FormPayload)>>,
    watched: Option<FakeDom>,
    overlay_seen: RefCell<Vec<bool>>,
    gate: RefCell<Option<oneshot::Receiver<()>>>,
}

impl ScriptedTransport {
    /// Also record whether the loading overlay was visible during each request.
    pub fn watching(dom: FakeDom) -> Self {
        Self {
            watched: Some(dom),
            ..Self::default()
        }
    }

    pub fn push_reply(&self, reply: serde_json::Value) {
        self.replies.borrow_mut().push_back(Ok(reply));
    }

    pub fn push_error(&self, error: TransportError) {
        self.replies.borrow_mut().push_back(Err(error));
    }

    /// Make the next request wait until the returned gate is released.
    pub fn hold(&self) -> Gate {
        let (sender, receiver) = oneshot::channel();
        *self.gate.borrow_mut() = Some(receiver);
        Gate(RefCell::new(Some(sender)))
    }

    pub fn requests(&self) -> Vec<(String, FormPayload)> {
        self.requests.borrow().clone()
    }

    pub fn overlay_seen(&self) -> Vec<bool> {
        self.overlay_seen.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn post_form(
        &self,
        url: &str,
        fields: &FormPayload,
    ) -> Result<serde_json::Value, TransportError> {
        self.requests.borrow_mut().push((url.to_string(), fields.clone()));
        if let Some(dom) = &self.watched {
            self.overlay_seen.borrow_mut().push(overlay_visible(dom));
        }

        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted reply left".to_string())))
    }
}
