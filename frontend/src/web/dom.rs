use crate::dom::Dom;
use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlFormElement, NodeList, Window};

/// The live document.
#[derive(Clone)]
pub struct WebDom {
    window: Window,
    document: Document,
}

impl WebDom {
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    fn property(node: &Element, name: &str) -> Option<JsValue> {
        Reflect::get(node, &JsValue::from_str(name)).ok()
    }

    fn set_property(node: &Element, name: &str, value: &JsValue) {
        if Reflect::set(node, &JsValue::from_str(name), value).is_err() {
            tracing::warn!("cannot set '{name}' on <{}>", node.tag_name());
        }
    }

    fn append(&self, parent: &Element, tag: &str) -> Option<Element> {
        let element = self.document.create_element(tag).ok()?;
        parent.append_child(&element).ok()?;
        Some(element)
    }
}

fn matched(result: Result<NodeList, JsValue>, selector: &str) -> Vec<Element> {
    match result {
        Ok(list) => elements(list),
        Err(error) => {
            tracing::warn!("invalid selector '{selector}': {error:?}");
            Vec::new()
        }
    }
}

fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

impl Dom for WebDom {
    type Node = Element;

    fn select(&self, selector: &str) -> Vec<Element> {
        matched(self.document.query_selector_all(selector), selector)
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn create_element(
        &self,
        parent: &Element,
        tag: &str,
        id: Option<&str>,
        class: &str,
    ) -> Option<Element> {
        let element = self.append(parent, tag)?;
        if let Some(id) = id {
            element.set_id(id);
        }
        if !class.is_empty() {
            element.set_class_name(class);
        }
        Some(element)
    }

    fn clear(&self, node: &Element) {
        node.set_inner_html("");
    }

    fn class_attribute(&self, node: &Element) -> String {
        node.class_name()
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().add_1(class);
    }

    fn remove_class(&self, node: &Element, class: &str) {
        let _ = node.class_list().remove_1(class);
    }

    fn style(&self, node: &Element, property: &str) -> Option<String> {
        let element = node.dyn_ref::<HtmlElement>()?;
        element.style().get_property_value(property).ok().and_then(non_empty)
    }

    fn computed_style(&self, node: &Element, property: &str) -> Option<String> {
        self.window
            .get_computed_style(node)
            .ok()
            .flatten()?
            .get_property_value(property)
            .ok()
            .and_then(non_empty)
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) {
        let Some(element) = node.dyn_ref::<HtmlElement>() else {
            return;
        };
        let style = element.style();
        let result = if value.is_empty() {
            style.remove_property(property).map(|_| ())
        } else {
            style.set_property(property, value)
        };
        if result.is_err() {
            tracing::warn!("cannot set style '{property}' to '{value}'");
        }
    }

    fn set_text(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn text_content(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn value(&self, node: &Element) -> Option<String> {
        Self::property(node, "value")?.as_string()
    }

    fn is_checked(&self, node: &Element) -> bool {
        Self::property(node, "checked")
            .and_then(|checked| checked.as_bool())
            .unwrap_or(false)
    }

    fn set_checked(&self, node: &Element, checked: bool) {
        Self::set_property(node, "checked", &JsValue::from_bool(checked));
    }

    fn set_disabled(&self, node: &Element, disabled: bool) {
        Self::set_property(node, "disabled", &JsValue::from_bool(disabled));
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) {
        if node.set_attribute(name, value).is_err() {
            tracing::warn!("cannot set attribute '{name}'");
        }
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn closest(&self, node: &Element, selector: &str) -> Option<Element> {
        node.closest(selector).ok().flatten()
    }

    fn next_sibling(&self, node: &Element) -> Option<Element> {
        node.next_element_sibling()
    }

    fn matches(&self, node: &Element, selector: &str) -> bool {
        node.matches(selector).unwrap_or_else(|error| {
            tracing::warn!("invalid selector '{selector}': {error:?}");
            false
        })
    }

    fn find(&self, node: &Element, selector: &str) -> Vec<Element> {
        matched(node.query_selector_all(selector), selector)
    }

    fn children(&self, node: &Element) -> Vec<Element> {
        let children = node.children();
        (0..children.length())
            .filter_map(|index| children.item(index))
            .collect()
    }

    fn append_hidden_input(&self, form: &Element, name: &str, value: &str) {
        if let Some(input) = self.append(form, "input") {
            self.set_attribute(&input, "type", "hidden");
            self.set_attribute(&input, "name", name);
            Self::set_property(&input, "value", &JsValue::from_str(value));
        }
    }

    fn submit(&self, form: &Element) {
        match form.dyn_ref::<HtmlFormElement>() {
            Some(form) => {
                if form.submit().is_err() {
                    tracing::warn!("form submission failed");
                }
            }
            None => tracing::warn!("<{}> is not a form", form.tag_name()),
        }
    }

    fn append_link(&self, parent: &Element, href: &str, text: &str) {
        if let Some(link) = self.append(parent, "a") {
            self.set_attribute(&link, "href", href);
            link.set_text_content(Some(text));
            self.append(parent, "br");
        }
    }
}
