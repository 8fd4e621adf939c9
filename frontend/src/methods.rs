//! Processing/analysis method picker on the dataset pages.
//!
//! Each method type `t` has a list `.t_methods` the user opens and closes and
//! a `#t_selected` box that receives the choice: a caption, a hidden
//! `t-method` field and the submit button for that type.

use crate::dom::{Dom, class_selector};

pub const ANALYSIS_TYPE: &str = "analysis";
pub const SUBMIT_CLASS: &str = "formSubmit";
const COLLAPSED_GLYPH: char = '↧';
const EXPANDED_GLYPH: char = '↥';

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MethodError {
    #[error("no element with id '{0}'")]
    MissingElement(String),
}

pub fn methods_class(method_type: &str) -> String {
    format!("{method_type}_methods")
}

pub fn selected_id(method_type: &str) -> String {
    format!("{method_type}_selected")
}

/// Name and caption of the submit button for a method type.
pub fn submit_button(method_type: &str) -> (&'static str, &'static str) {
    if method_type == ANALYSIS_TYPE {
        ("startAnalyze", "Start Analysis")
    } else {
        ("startProcessing", "Start Processing")
    }
}

/// Show or hide the method list of `method_type`.
pub fn toggle_method<D: Dom>(dom: &D, method_type: &str, hidden_class: &str) {
    for list in dom.select(&class_selector(&methods_class(method_type))) {
        dom.toggle_class(&list, hidden_class);
    }
}

/// Record `name` as the chosen method of `method_type`, replacing any
/// previous choice, and optionally collapse the list.
pub fn select_method<D: Dom>(
    dom: &D,
    method_type: &str,
    name: &str,
    display: &str,
    toggle: bool,
    hidden_class: &str,
) -> Result<(), MethodError> {
    let id = selected_id(method_type);
    let selected = dom
        .element_by_id(&id)
        .ok_or(MethodError::MissingElement(id))?;

    dom.clear(&selected);
    dom.set_text(&selected, &format!("Selected: {display} "));
    dom.append_hidden_input(&selected, &format!("{method_type}-method"), name);

    let (field, caption) = submit_button(method_type);
    if let Some(button) = dom.create_element(&selected, "input", None, SUBMIT_CLASS) {
        dom.set_attribute(&button, "type", "submit");
        dom.set_attribute(&button, "name", field);
        dom.set_attribute(&button, "value", caption);
    }
    tracing::debug!("{method_type} method '{name}' selected");

    if toggle {
        toggle_method(dom, method_type, hidden_class);
    }
    Ok(())
}

/// Expand or collapse the details block `target_id`, flipping the arrow in
/// the text of `source`.
pub fn toggle_details<D: Dom>(
    dom: &D,
    source: &D::Node,
    target_id: &str,
    hidden_class: &str,
) -> Result<(), MethodError> {
    let target = dom
        .element_by_id(target_id)
        .ok_or_else(|| MethodError::MissingElement(target_id.to_string()))?;

    let text = dom.text_content(source);
    let text = if dom.has_class(&target, hidden_class) {
        text.replacen(COLLAPSED_GLYPH, &EXPANDED_GLYPH.to_string(), 1)
    } else {
        text.replacen(EXPANDED_GLYPH, &COLLAPSED_GLYPH.to_string(), 1)
    };
    dom.set_text(source, &text);
    dom.toggle_class(&target, hidden_class);
    Ok(())
}
