//! Declarative page behaviors driven by marker classes.
//!
//! `bind` parses every role-carrying element once into a [`Binding`]; the
//! host wires the DOM events listed by [`BehaviorBinder::events_for`] to
//! [`BehaviorBinder::handle`]. Nothing here touches the network: behaviors
//! that need the server hand back a [`FollowUp`] instead.

use crate::dom::{Dom, DomEvent, class_selector, next_matching, parent_matching};
use crate::notice::Notice;
use crate::page::Page;
use crate::plot::{ModelResolver, PlotError, curve_model_name};
use shared::markers::{
    BACK_BUTTON_FIELD, DISABLE_CONTAINER_CLASS, EXPAND_CONTAINER_CLASS, HIDEABLE_CLASS,
    NO_SELECTION, ParsedClassList, TO_DISABLE_CLASS, TO_EXPAND_CLASS, TO_SHOW_CLASS,
    display_group_class,
};
use shared::{ClientConfig, GlyphStyle, HighlightConfig, MarkerClass, MarkerError, MarkerFamily, Role};

pub type BindingId = usize;

/// One role on one element, with the markers it was parsed with.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding<N> {
    pub node: N,
    pub role: Role,
    pub markers: Vec<MarkerClass>,
}

/// Work the host must run after an event, outside the binder.
#[derive(Debug, Clone, PartialEq)]
pub enum FollowUp {
    /// Request shareable links for the page at `url`.
    ShareLinks { url: String },
    /// Open the dataset chooser for applying analysis model `model`.
    ChooseDataset { model: u32 },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Handled {
    pub prevent_default: bool,
    pub follow_ups: Vec<FollowUp>,
    /// Per-marker failures, every time they happen.
    pub skipped: Vec<BinderError>,
    /// User notices for failures not reported on this binding before. The
    /// host delivers them once it no longer borrows the binder.
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BinderError {
    #[error("no binding with id {0}")]
    UnknownBinding(BindingId),
    #[error(transparent)]
    Marker(#[from] MarkerError),
    #[error(transparent)]
    Plot(#[from] PlotError),
    #[error("back button is not inside a form")]
    MissingForm,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindReport {
    pub bound: usize,
    pub errors: Vec<MarkerError>,
}

/// Currently shown display group of the exclusive selector; `None` is the
/// "nothing selected" sentinel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplaySelection {
    current: Option<String>,
}

impl DisplaySelection {
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Switch the visible group. Returns `false` when `value` is already selected.
    pub fn select<D: Dom>(&mut self, dom: &D, value: &str) -> bool {
        let next = (value != NO_SELECTION).then(|| value.to_string());
        if next == self.current {
            return false;
        }

        if let Some(previous) = &self.current {
            for node in dom.select(&class_selector(&display_group_class(previous))) {
                dom.add_class(&node, HIDEABLE_CLASS);
            }
        }
        if let Some(next) = &next {
            for node in dom.select(&class_selector(&display_group_class(next))) {
                dom.remove_class(&node, HIDEABLE_CLASS);
            }
        }
        self.current = next;
        true
    }
}

/// Negative test used by the conditional enable/disable family. Values that
/// are not numbers never count as negative.
pub fn is_negative(value: &str) -> bool {
    value
        .trim()
        .parse::<f64>()
        .map(|value| value < 0.0)
        .unwrap_or(false)
}

pub struct BehaviorBinder<N> {
    bindings: Vec<Binding<N>>,
    selection: DisplaySelection,
    highlight: HighlightConfig,
    hidden_class: String,
    fail_fast: bool,
    reported: Vec<(BindingId, BinderError)>,
}

impl<N: Clone + PartialEq> BehaviorBinder<N> {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            bindings: Vec::new(),
            selection: DisplaySelection::default(),
            highlight: config.highlight.clone(),
            hidden_class: config.hidden_class.clone(),
            fail_fast: config.fail_fast,
            reported: Vec::new(),
        }
    }

    /// DOM events each role listens to.
    pub fn events_for(role: Role) -> &'static [DomEvent] {
        match role {
            Role::TestForNegative
            | Role::ChangeDisplay
            | Role::ToggleShow
            | Role::DisableCascade => &[DomEvent::Change],
            Role::UrlChanger
            | Role::BackButton
            | Role::Expand
            | Role::CloseX
            | Role::ApplyModel
            | Role::RequestLink => &[DomEvent::Click],
            Role::PlotHighlight => &[DomEvent::HoverIn, DomEvent::HoverOut],
            Role::PlotHighlightInput => &[DomEvent::FocusIn, DomEvent::FocusOut],
            Role::PreDisabled => &[],
        }
    }

    pub fn bindings(&self) -> impl Iterator<Item = (BindingId, &Binding<N>)> {
        self.bindings.iter().enumerate()
    }

    pub fn selection(&self) -> &DisplaySelection {
        &self.selection
    }

    /// Forget all bindings and the display selection (page teardown).
    pub fn reset(&mut self) {
        self.bindings.clear();
        self.selection = DisplaySelection::default();
        self.reported.clear();
    }

    /// Scan the document, build the binding table and apply initial state.
    pub fn bind<D: Dom<Node = N>>(&mut self, dom: &D, page: &dyn Page) -> BindReport {
        let mut report = BindReport::default();
        let mut reported: Vec<N> = Vec::new();

        for role in Role::ALL {
            for node in dom.select(&role.selector()) {
                let class_attribute = dom.class_attribute(&node);
                let parsed = ParsedClassList::parse(&class_attribute);

                let mut errors = Vec::new();
                if !reported.contains(&node) {
                    errors.extend(parsed.errors.iter().cloned());
                    reported.push(node.clone());
                }

                let url_count = parsed.markers_of(MarkerFamily::Url).count();
                if role == Role::UrlChanger && url_count > 1 {
                    errors.push(MarkerError::ConflictingUrls { count: url_count });
                }

                for error in errors {
                    let notice = Notice::from_marker_error(&class_attribute, &error);
                    self.escalate(&notice);
                    page.notify(notice);
                    report.errors.push(error);
                }

                if role == Role::UrlChanger && url_count > 1 {
                    continue;
                }
                if role == Role::PreDisabled {
                    dom.set_attribute(&node, "disabled", "disabled");
                    dom.set_disabled(&node, true);
                    continue;
                }

                self.bindings.push(Binding {
                    node,
                    role,
                    markers: parsed.markers,
                });
                report.bound += 1;
            }
        }

        for binding in &self.bindings {
            if binding.role == Role::TestForNegative {
                apply_negative_rules(dom, binding);
            }
        }

        tracing::debug!(
            "behavior binder bound {} elements, {} marker errors",
            report.bound,
            report.errors.len()
        );
        report
    }

    /// React to `event` on the element of binding `id`.
    ///
    /// Never calls [`Page::notify`]: a modal notice can fire further events
    /// on the same element, so notices travel back in [`Handled::notices`].
    pub fn handle<D: Dom<Node = N>>(
        &mut self,
        dom: &D,
        page: &dyn Page,
        models: &mut dyn ModelResolver,
        id: BindingId,
        event: DomEvent,
    ) -> Result<Handled, BinderError> {
        let binding = self
            .bindings
            .get(id)
            .cloned()
            .ok_or(BinderError::UnknownBinding(id))?;
        let mut handled = Handled::default();

        if !Self::events_for(binding.role).contains(&event) {
            return Ok(handled);
        }

        match binding.role {
            Role::TestForNegative => apply_negative_rules(dom, &binding),
            Role::UrlChanger => {
                if let Some(MarkerClass::Url(url)) = binding.markers_of(MarkerFamily::Url).last() {
                    tracing::debug!("url changer navigating to {url}");
                    page.navigate(url);
                }
            }
            Role::BackButton => {
                handled.prevent_default = true;
                match dom.closest(&binding.node, "form") {
                    Some(form) => {
                        dom.append_hidden_input(&form, BACK_BUTTON_FIELD, "1");
                        dom.submit(&form);
                    }
                    None => handled.skipped.push(BinderError::MissingForm),
                }
            }
            Role::ChangeDisplay => {
                let value = dom.value(&binding.node).unwrap_or_default();
                self.selection.select(dom, &value);
            }
            Role::PlotHighlight | Role::PlotHighlightInput => {
                let active = matches!(event, DomEvent::HoverIn | DomEvent::FocusIn);
                handled.skipped.extend(self.apply_highlight(dom, models, &binding, active));
            }
            Role::ToggleShow => {
                if let Some(target) = next_matching(dom, &binding.node, &class_selector(TO_SHOW_CLASS)) {
                    dom.toggle_class(&target, "invisible");
                    dom.toggle_class(&target, "visible");
                }
            }
            Role::Expand => {
                handled.prevent_default = true;
                let container =
                    next_matching(dom, &binding.node, &class_selector(EXPAND_CONTAINER_CLASS));
                for child in container.iter().flat_map(|container| dom.children(container)) {
                    if dom.has_class(&child, TO_EXPAND_CLASS) {
                        dom.toggle_class(&child, "visible");
                        dom.toggle_class(&child, "invisible");
                    }
                }
            }
            Role::DisableCascade => {
                let checked = dom.is_checked(&binding.node);
                let parent = dom.parent(&binding.node);
                let containers = parent
                    .iter()
                    .flat_map(|parent| dom.find(parent, &class_selector(DISABLE_CONTAINER_CLASS)));
                for container in containers {
                    for target in dom.find(&container, &class_selector(TO_DISABLE_CLASS)) {
                        dom.set_checked(&target, checked);
                        dom.set_disabled(&target, checked);
                    }
                }
            }
            Role::CloseX => {
                if let Some(panel) = parent_matching(dom, &binding.node, "div") {
                    dom.toggle_class(&panel, &self.hidden_class);
                }
            }
            Role::ApplyModel => {
                for marker in binding.markers_of(MarkerFamily::Model) {
                    if let MarkerClass::Model(model) = marker {
                        handled.follow_ups.push(FollowUp::ChooseDataset { model: *model });
                    }
                }
            }
            Role::RequestLink => {
                handled.follow_ups.push(FollowUp::ShareLinks {
                    url: page.current_url(),
                });
            }
            Role::PreDisabled => {}
        }

        for error in &handled.skipped {
            let key = (id, error.clone());
            if self.reported.contains(&key) {
                tracing::debug!("binding {id} failed again: {error}");
                continue;
            }
            let notice = Notice::from_binder_error(error);
            self.escalate(&notice);
            handled.notices.push(notice);
            self.reported.push(key);
        }
        Ok(handled)
    }

    fn apply_highlight<D: Dom<Node = N>>(
        &self,
        dom: &D,
        models: &mut dyn ModelResolver,
        binding: &Binding<N>,
        active: bool,
    ) -> Vec<BinderError> {
        let (style, background, foreground): (&GlyphStyle, &str, &str) = if active {
            (
                &self.highlight.highlighted,
                self.highlight.active_background.as_str(),
                self.highlight.active_foreground.as_str(),
            )
        } else {
            (
                &self.highlight.normal,
                self.highlight.idle_background.as_str(),
                self.highlight.idle_foreground.as_str(),
            )
        };

        dom.set_style(&binding.node, "background-color", background);
        dom.set_style(&binding.node, "color", foreground);

        binding
            .markers_of(MarkerFamily::HighlightCurve)
            .filter_map(|marker| match marker {
                MarkerClass::HighlightCurve(number) => Some(*number),
                _ => None,
            })
            .filter_map(|number| {
                models
                    .set_glyph_style(&curve_model_name(number), style)
                    .err()
                    .map(BinderError::from)
            })
            .collect()
    }

    fn escalate(&self, notice: &Notice) {
        if self.fail_fast {
            panic!("{}", notice.technical);
        }
        notice.log();
    }
}

impl<N> Binding<N> {
    pub fn markers_of(&self, family: MarkerFamily) -> impl Iterator<Item = &MarkerClass> {
        self.markers.iter().filter(move |marker| marker.family() == family)
    }
}

fn apply_negative_rules<D: Dom>(dom: &D, binding: &Binding<D::Node>) {
    let negative = is_negative(&dom.value(&binding.node).unwrap_or_default());
    for marker in &binding.markers {
        let (class, disabled) = match marker {
            MarkerClass::IfNegativeDisable(class) => (class, negative),
            MarkerClass::IfNegativeEnable(class) => (class, !negative),
            _ => continue,
        };
        for target in dom.select(&class_selector(class)) {
            dom.set_disabled(&target, disabled);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::MemoryModels;
    use crate::testing::{FakeDom, PageEvent, RecordingPage};

    fn bound(dom: &FakeDom) -> (BehaviorBinder<usize>, RecordingPage) {
        let page = RecordingPage::default();
        let mut binder = BehaviorBinder::new(&ClientConfig::default());
        binder.bind(dom, &page);
        (binder, page)
    }

    fn binding_of(binder: &BehaviorBinder<usize>, node: usize, role: Role) -> BindingId {
        binder
            .bindings()
            .find(|(_, binding)| binding.node == node && binding.role == role)
            .map(|(id, _)| id)
            .unwrap()
    }

    fn fire(
        binder: &mut BehaviorBinder<usize>,
        dom: &FakeDom,
        page: &RecordingPage,
        id: BindingId,
        event: DomEvent,
    ) -> Handled {
        let mut models = MemoryModels::default();
        binder.handle(dom, page, &mut models, id, event).unwrap()
    }

    #[test]
    fn negative_value_disables_targets_on_bind_and_on_change() {
        let dom = FakeDom::new();
        let body = dom.body_node();
        let input = dom.add(
            body,
            "input",
            None,
            &["_voltJS_testForNegative", "_voltJS_ifNegativeDisable@T", "_voltJS_ifNegativeEnable@U"],
        );
        dom.set_value(input, "-1");
        let t1 = dom.add(body, "input", None, &["T"]);
        let t2 = dom.add(body, "select", None, &["T"]);
        let u = dom.add(body, "input", None, &["U"]);

        let (mut binder, page) = bound(&dom);
        assert!(dom.is_disabled(t1) && dom.is_disabled(t2));
        assert!(!dom.is_disabled(u));

        let id = binding_of(&binder, input, Role::TestForNegative);
        dom.set_value(input, "0");
        fire(&mut binder, &dom, &page, id, DomEvent::Change);
        assert!(!dom.is_disabled(t1) && !dom.is_disabled(t2));
        assert!(dom.is_disabled(u));

        dom.set_value(input, "-1");
        fire(&mut binder, &dom, &page, id, DomEvent::Change);
        assert!(dom.is_disabled(t1));

        dom.set_value(input, "3");
        fire(&mut binder, &dom, &page, id, DomEvent::Change);
        assert!(!dom.is_disabled(t1));
    }

    #[test]
    fn non_numeric_values_are_not_negative() {
        assert!(is_negative("-0.5"));
        assert!(!is_negative(""));
        assert!(!is_negative("abc"));
        assert!(!is_negative("0"));
    }

    #[test]
    fn target_class_without_elements_is_not_an_error() {
        let dom = FakeDom::new();
        let input = dom.add(dom.body_node(), "input", None, &["_voltJS_testForNegative", "_voltJS_ifNegativeDisable@nothing"]);
        dom.set_value(input, "-4");

        let (_, page) = bound(&dom);

        assert!(page.notices().is_empty());
    }

    #[test]
    fn exclusive_display_selector_sequence() {
        let dom = FakeDom::new();
        let body = dom.body_node();
        let select = dom.add(body, "select", None, &["_voltJS_ChangeDispValue"]);
        let five = dom.add(body, "td", None, &["at_hideable", "_voltJS_changeValue_5"]);
        let seven = dom.add(body, "td", None, &["at_hideable", "_voltJS_changeValue_7"]);
        let (mut binder, page) = bound(&dom);
        let id = binding_of(&binder, select, Role::ChangeDisplay);
        assert_eq!(binder.selection().current(), None);

        dom.set_value(select, "5");
        fire(&mut binder, &dom, &page, id, DomEvent::Change);
        assert!(!dom.has_class(&five, "at_hideable"));
        assert!(dom.has_class(&seven, "at_hideable"));
        assert_eq!(binder.selection().current(), Some("5"));

        dom.set_value(select, "7");
        fire(&mut binder, &dom, &page, id, DomEvent::Change);
        assert!(dom.has_class(&five, "at_hideable"));
        assert!(!dom.has_class(&seven, "at_hideable"));

        let before = dom.snapshot();
        dom.set_value(select, "7");
        fire(&mut binder, &dom, &page, id, DomEvent::Change);
        assert_eq!(dom.snapshot(), before);
        assert_eq!(binder.selection().current(), Some("7"));

        dom.set_value(select, "-1");
        fire(&mut binder, &dom, &page, id, DomEvent::Change);
        assert!(dom.has_class(&seven, "at_hideable"));
        assert_eq!(binder.selection().current(), None);
    }

    #[test]
    fn display_selection_ignores_sentinel_when_nothing_selected() {
        let dom = FakeDom::new();
        let mut selection = DisplaySelection::default();
        assert!(!selection.select(&dom, NO_SELECTION));
        assert!(selection.select(&dom, "3"));
        assert!(!selection.select(&dom, "3"));
    }

    #[test]
    fn url_changer_navigates_to_decoded_url() {
        let dom = FakeDom::new();
        let button = dom.add(
            dom.body_node(),
            "button",
            None,
            &["_voltJS_urlChanger", "_voltJS_url@L21hbmFnZXIvYnJvd3NlLw=="],
        );
        let (mut binder, page) = bound(&dom);
        let id = binding_of(&binder, button, Role::UrlChanger);

        fire(&mut binder, &dom, &page, id, DomEvent::Click);

        assert_eq!(page.events(), vec![PageEvent::Navigated("/manager/browse/".to_string())]);
    }

    #[test]
    fn malformed_url_marker_is_reported_and_does_not_navigate() {
        let dom = FakeDom::new();
        let button = dom.add(dom.body_node(), "button", None, &["_voltJS_urlChanger", "_voltJS_url@***"]);
        let (mut binder, page) = bound(&dom);
        assert_eq!(page.notices().len(), 1);

        let id = binding_of(&binder, button, Role::UrlChanger);
        fire(&mut binder, &dom, &page, id, DomEvent::Click);

        assert!(page.events().iter().all(|event| !matches!(event, PageEvent::Navigated(_))));
    }

    #[test]
    fn several_url_markers_are_rejected_at_bind_time() {
        let dom = FakeDom::new();
        dom.add(
            dom.body_node(),
            "button",
            None,
            &["_voltJS_urlChanger", "_voltJS_url@L2Ev", "_voltJS_url@L2Iv"],
        );
        let page = RecordingPage::default();
        let mut binder = BehaviorBinder::new(&ClientConfig::default());

        let report = binder.bind(&dom, &page);

        assert_eq!(report.errors, vec![MarkerError::ConflictingUrls { count: 2 }]);
        assert_eq!(binder.bindings().count(), 0);
    }

    #[test]
    fn back_button_injects_field_and_submits_enclosing_form() {
        let dom = FakeDom::new();
        let form = dom.add(dom.body_node(), "form", None, &[]);
        let fieldset = dom.add(form, "div", None, &[]);
        let button = dom.add(fieldset, "button", None, &["_voltJS_backButton"]);
        let (mut binder, page) = bound(&dom);
        let id = binding_of(&binder, button, Role::BackButton);

        let handled = fire(&mut binder, &dom, &page, id, DomEvent::Click);

        assert!(handled.prevent_default);
        assert_eq!(
            dom.hidden_inputs(form),
            vec![("_voltJS_backButton".to_string(), "1".to_string())]
        );
        assert_eq!(dom.submissions(form), 1);
    }

    #[test]
    fn back_button_outside_form_is_skipped() {
        let dom = FakeDom::new();
        let button = dom.add(dom.body_node(), "button", None, &["_voltJS_backButton"]);
        let (mut binder, page) = bound(&dom);
        let id = binding_of(&binder, button, Role::BackButton);

        let handled = fire(&mut binder, &dom, &page, id, DomEvent::Click);

        assert_eq!(handled.skipped, vec![BinderError::MissingForm]);
        assert_eq!(handled.notices.len(), 1);
        assert!(page.notices().is_empty());
    }

    #[test]
    fn repeated_highlight_failure_is_noticed_once() {
        let dom = FakeDom::new();
        let row = dom.add(dom.body_node(), "tr", None, &["_voltJS_plotHighlight", "_voltJS_highlightCurve@3"]);
        let (mut binder, page) = bound(&dom);
        let id = binding_of(&binder, row, Role::PlotHighlight);
        let missing = BinderError::Plot(PlotError::UnknownModel("curve_3".to_string()));

        let first = fire(&mut binder, &dom, &page, id, DomEvent::HoverIn);
        let second = fire(&mut binder, &dom, &page, id, DomEvent::HoverIn);

        assert_eq!(first.skipped, vec![missing.clone()]);
        assert_eq!(first.notices.len(), 1);
        assert_eq!(second.skipped, vec![missing]);
        assert!(second.notices.is_empty());

        binder.reset();
        binder.bind(&dom, &page);
        let again = fire(&mut binder, &dom, &page, id, DomEvent::HoverIn);
        assert_eq!(again.notices.len(), 1);
    }

    #[test]
    fn server_supplied_classes_with_punctuation_are_matched_literally() {
        let dom = FakeDom::new();
        let body = dom.body_node();
        let input = dom.add(
            body,
            "input",
            None,
            &["_voltJS_testForNegative", "_voltJS_ifNegativeDisable@grp:1"],
        );
        dom.set_value(input, "-2");
        let target = dom.add(body, "input", None, &["grp:1"]);
        let bystander = dom.add(body, "input", None, &["grp"]);

        bound(&dom);

        assert!(dom.is_disabled(target));
        assert!(!dom.is_disabled(bystander));
    }

    #[test]
    fn highlight_pair_switches_presets() {
        let dom = FakeDom::new();
        let row = dom.add(
            dom.body_node(),
            "tr",
            None,
            &["_voltJS_plotHighlight", "_voltJS_highlightCurve@4", "_voltJS_highlightCurve@9"],
        );
        let (mut binder, page) = bound(&dom);
        let id = binding_of(&binder, row, Role::PlotHighlight);
        let config = HighlightConfig::default();
        let mut models = MemoryModels::with_models(["curve_4"], config.normal.clone());

        let handled = binder.handle(&dom, &page, &mut models, id, DomEvent::HoverIn).unwrap();
        assert_eq!(models.style("curve_4"), Some(&config.highlighted));
        assert_eq!(dom.style(&row, "background-color").as_deref(), Some("red"));
        assert_eq!(
            handled.skipped,
            vec![BinderError::Plot(PlotError::UnknownModel("curve_9".to_string()))]
        );

        binder.handle(&dom, &page, &mut models, id, DomEvent::HoverOut).unwrap();
        assert_eq!(models.style("curve_4"), Some(&config.normal));
        assert_eq!(dom.style(&row, "color").as_deref(), Some("black"));
    }

    #[test]
    fn highlight_input_reacts_to_focus_only() {
        let dom = FakeDom::new();
        let input = dom.add(
            dom.body_node(),
            "input",
            None,
            &["_voltJS_plotHighlightInput", "_voltJS_highlightCurve@1"],
        );
        let (mut binder, page) = bound(&dom);
        let id = binding_of(&binder, input, Role::PlotHighlightInput);
        let mut models = MemoryModels::with_models(["curve_1"], HighlightConfig::default().normal);

        binder.handle(&dom, &page, &mut models, id, DomEvent::HoverIn).unwrap();
        assert_eq!(models.style("curve_1"), Some(&HighlightConfig::default().normal));

        binder.handle(&dom, &page, &mut models, id, DomEvent::FocusIn).unwrap();
        assert_eq!(models.style("curve_1"), Some(&HighlightConfig::default().highlighted));
    }

    #[test]
    fn toggle_show_flips_next_sibling() {
        let dom = FakeDom::new();
        let body = dom.body_node();
        let checkbox = dom.add(body, "input", None, &["_voltJS_toggleShow"]);
        let panel = dom.add(body, "div", None, &["_voltJS_toShow", "invisible"]);
        let (mut binder, page) = bound(&dom);
        let id = binding_of(&binder, checkbox, Role::ToggleShow);

        fire(&mut binder, &dom, &page, id, DomEvent::Change);

        assert!(dom.has_class(&panel, "visible"));
        assert!(!dom.has_class(&panel, "invisible"));
    }

    #[test]
    fn expand_toggles_children_of_next_container() {
        let dom = FakeDom::new();
        let body = dom.body_node();
        let link = dom.add(body, "a", None, &["_voltJS_Expand"]);
        let container = dom.add(body, "div", None, &["_voltJS_expandContainer"]);
        let item = dom.add(container, "div", None, &["_voltJS_toExpand", "invisible"]);
        let other = dom.add(container, "div", None, &["invisible"]);
        let (mut binder, page) = bound(&dom);
        let id = binding_of(&binder, link, Role::Expand);

        let handled = fire(&mut binder, &dom, &page, id, DomEvent::Click);

        assert!(handled.prevent_default);
        assert!(dom.has_class(&item, "visible"));
        assert!(dom.has_class(&other, "invisible"));
    }

    #[test]
    fn disable_cascade_follows_source_checkbox() {
        let dom = FakeDom::new();
        let group = dom.add(dom.body_node(), "div", None, &[]);
        let source = dom.add(group, "input", None, &["_voltJS_Disable"]);
        let container = dom.add(group, "div", None, &["_voltJS_disableContainer"]);
        let target = dom.add(container, "input", None, &["_voltJS_toDisable"]);
        let (mut binder, page) = bound(&dom);
        let id = binding_of(&binder, source, Role::DisableCascade);

        dom.set_checked(&source, true);
        fire(&mut binder, &dom, &page, id, DomEvent::Change);
        assert!(dom.is_checked(&target));
        assert!(dom.is_disabled(target));

        dom.set_checked(&source, false);
        fire(&mut binder, &dom, &page, id, DomEvent::Change);
        assert!(!dom.is_checked(&target));
        assert!(!dom.is_disabled(target));
    }

    #[test]
    fn close_x_hides_parent_panel() {
        let dom = FakeDom::new();
        let panel = dom.add(dom.body_node(), "div", Some("share_link"), &[]);
        let close = dom.add(panel, "a", None, &["closeX"]);
        let (mut binder, page) = bound(&dom);
        let id = binding_of(&binder, close, Role::CloseX);

        fire(&mut binder, &dom, &page, id, DomEvent::Click);

        assert!(dom.has_class(&panel, "invisible"));
    }

    #[test]
    fn pre_disabled_elements_are_disabled_at_bind() {
        let dom = FakeDom::new();
        let input = dom.add(dom.body_node(), "input", None, &["_disabled"]);

        let (binder, _) = bound(&dom);

        assert!(dom.is_disabled(input));
        assert_eq!(binder.bindings().count(), 0);
    }

    #[test]
    fn server_backed_behaviors_return_follow_ups() {
        let dom = FakeDom::new();
        let body = dom.body_node();
        let share = dom.add(body, "button", None, &["_voltJS_requestLink"]);
        let apply = dom.add(body, "button", None, &["_voltJS_applyModel", "_voltJS_model@12"]);
        let (mut binder, page) = bound(&dom);
        page.set_current_url("/manager/show-file/3/");
        let share_id = binding_of(&binder, share, Role::RequestLink);
        let apply_id = binding_of(&binder, apply, Role::ApplyModel);

        let handled = fire(&mut binder, &dom, &page, share_id, DomEvent::Click);
        assert_eq!(
            handled.follow_ups,
            vec![FollowUp::ShareLinks { url: "/manager/show-file/3/".to_string() }]
        );

        let handled = fire(&mut binder, &dom, &page, apply_id, DomEvent::Click);
        assert_eq!(handled.follow_ups, vec![FollowUp::ChooseDataset { model: 12 }]);
    }

    #[test]
    fn marker_errors_are_reported_once_per_element() {
        let dom = FakeDom::new();
        dom.add(
            dom.body_node(),
            "tr",
            None,
            &["_voltJS_plotHighlight", "_voltJS_ChangeDispValue", "_voltJS_highlightCurve@x"],
        );

        let (binder, page) = bound(&dom);

        assert_eq!(page.notices().len(), 1);
        assert_eq!(binder.bindings().count(), 2);
    }

    #[test]
    fn unknown_binding_and_reset() {
        let dom = FakeDom::new();
        dom.add(dom.body_node(), "select", None, &["_voltJS_ChangeDispValue"]);
        let (mut binder, page) = bound(&dom);
        let mut models = MemoryModels::default();

        assert_eq!(
            binder.handle(&dom, &page, &mut models, 42, DomEvent::Change),
            Err(BinderError::UnknownBinding(42))
        );

        binder.reset();
        assert_eq!(binder.bindings().count(), 0);
        assert_eq!(binder.selection().current(), None);
    }
}
