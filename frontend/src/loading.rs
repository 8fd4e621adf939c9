use crate::dom::Dom;
use shared::ClientConfig;

/// Blocking overlay shown while a request is in flight.
///
/// One persistent overlay element is created on first use and afterwards
/// only toggled with the hidden class.
#[derive(Debug, Clone)]
pub struct LoadingIndicator {
    overlay_id: String,
    overlay_class: String,
    hidden_class: String,
    saved_overflow: Option<String>,
    active: bool,
}

impl LoadingIndicator {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            overlay_id: config.overlay_id.clone(),
            overlay_class: config.overlay_class.clone(),
            hidden_class: config.hidden_class.clone(),
            saved_overflow: None,
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start<D: Dom>(&mut self, dom: &D, text: &str) {
        let Some(body) = dom.body() else {
            tracing::warn!("loading overlay skipped: document has no body");
            return;
        };

        if !self.active {
            self.saved_overflow = dom.style(&body, "overflow");
        }
        dom.set_style(&body, "overflow", "hidden");

        let overlay = dom.element_by_id(&self.overlay_id).or_else(|| {
            dom.create_element(&body, "div", Some(&self.overlay_id), &self.overlay_class)
        });
        let Some(overlay) = overlay else {
            tracing::warn!("loading overlay '{}' could not be created", self.overlay_id);
            return;
        };

        dom.set_text(&overlay, text);
        dom.remove_class(&overlay, &self.hidden_class);
        if let Some(height) = dom.computed_style(&overlay, "height") {
            dom.set_style(&overlay, "line-height", &height);
        }
        self.active = true;
    }

    pub fn done<D: Dom>(&mut self, dom: &D) {
        if let Some(overlay) = dom.element_by_id(&self.overlay_id) {
            dom.add_class(&overlay, &self.hidden_class);
        }
        if self.active {
            if let Some(body) = dom.body() {
                let overflow = self.saved_overflow.take().unwrap_or_default();
                dom.set_style(&body, "overflow", &overflow);
            }
        }
        self.active = false;
    }
}
