//! DOM capability consumed by the runtime.
//!
//! Selectors passed through this trait are always simple: `.class`, `#id` or
//! a tag name. Structural queries (`closest`, `next_sibling`, ...) are spelled
//! out as methods instead of compound selectors.

/// DOM events the behavior binder reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomEvent {
    Change,
    Click,
    HoverIn,
    HoverOut,
    FocusIn,
    FocusOut,
}

impl DomEvent {
    /// Name of the browser event to listen for.
    pub fn event_name(self) -> &'static str {
        match self {
            DomEvent::Change => "change",
            DomEvent::Click => "click",
            DomEvent::HoverIn => "mouseenter",
            DomEvent::HoverOut => "mouseleave",
            DomEvent::FocusIn => "focusin",
            DomEvent::FocusOut => "focusout",
        }
    }
}

pub trait Dom {
    type Node: Clone + PartialEq;

    fn select(&self, selector: &str) -> Vec<Self::Node>;
    fn body(&self) -> Option<Self::Node>;
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;
    /// Create an element and append it to `parent`.
    fn create_element(
        &self,
        parent: &Self::Node,
        tag: &str,
        id: Option<&str>,
        class: &str,
    ) -> Option<Self::Node>;
    fn clear(&self, node: &Self::Node);

    fn class_attribute(&self, node: &Self::Node) -> String;
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);

    fn toggle_class(&self, node: &Self::Node, class: &str) {
        if self.has_class(node, class) {
            self.remove_class(node, class);
        } else {
            self.add_class(node, class);
        }
    }

    /// Inline style property, `None` when unset.
    fn style(&self, node: &Self::Node, property: &str) -> Option<String>;
    fn computed_style(&self, node: &Self::Node, property: &str) -> Option<String>;
    /// Set an inline style property; an empty value removes it.
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);

    fn text_content(&self, node: &Self::Node) -> String;
    fn set_text(&self, node: &Self::Node, text: &str);
    fn value(&self, node: &Self::Node) -> Option<String>;
    fn is_checked(&self, node: &Self::Node) -> bool;
    fn set_checked(&self, node: &Self::Node, checked: bool);
    fn set_disabled(&self, node: &Self::Node, disabled: bool);
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
    fn closest(&self, node: &Self::Node, selector: &str) -> Option<Self::Node>;
    /// Next element sibling, whatever it is.
    fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;
    fn matches(&self, node: &Self::Node, selector: &str) -> bool;
    /// Descendants matching the selector, in document order.
    fn find(&self, node: &Self::Node, selector: &str) -> Vec<Self::Node>;
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn append_hidden_input(&self, form: &Self::Node, name: &str, value: &str);
    fn submit(&self, form: &Self::Node);
    fn append_link(&self, parent: &Self::Node, href: &str, text: &str);
}

/// Immediate next sibling when it matches the selector.
pub fn next_matching<D: Dom>(dom: &D, node: &D::Node, selector: &str) -> Option<D::Node> {
    dom.next_sibling(node)
        .filter(|sibling| dom.matches(sibling, selector))
}

/// Immediate parent when it matches the selector.
pub fn parent_matching<D: Dom>(dom: &D, node: &D::Node, selector: &str) -> Option<D::Node> {
    dom.parent(node).filter(|parent| dom.matches(parent, selector))
}

/// `.class` selector with the class serialized as a CSS identifier, so
/// server-provided names containing `.`, `:` or a leading digit stay literal.
pub fn class_selector(class: &str) -> String {
    let mut selector = String::with_capacity(class.len() + 1);
    selector.push('.');
    let chars: Vec<char> = class.chars().collect();
    for (index, &c) in chars.iter().enumerate() {
        let leading_digit = c.is_ascii_digit()
            && (index == 0 || (index == 1 && chars[0] == '-'));
        match c {
            '\0' => selector.push('\u{FFFD}'),
            c if c.is_ascii_control() || leading_digit => {
                selector.push_str(&format!("\\{:x} ", u32::from(c)));
            }
            '-' if chars.len() == 1 => selector.push_str("\\-"),
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii() => {
                selector.push(c);
            }
            c => {
                selector.push('\\');
                selector.push(c);
            }
        }
    }
    selector
}
