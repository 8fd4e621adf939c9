//! Dataset search, share links and the apply-model dataset chooser.
//!
//! These endpoints answer with plain JSON payloads instead of commands, so
//! they bypass the dispatcher and its loading overlay.

use crate::binder::FollowUp;
use crate::dom::Dom;
use crate::notice::Notice;
use crate::page::Page;
use crate::transport::{FormPayload, Transport, TransportError};
use serde::de::DeserializeOwned;
use shared::{ClientConfig, EndpointConfig, SearchResults, ShareLinks};

pub const SHARE_PANEL_ID: &str = "share_link";
pub const CHOOSER_ID: &str = "id_ApplyModel";
pub const CHOOSER_CLASS: &str = "floatMenu";
pub const CHOOSER_SEARCH_ID: &str = "curveSearch";
pub const CHOOSER_LIST_ID: &str = "curve_list";
pub const CLOSE_CLASS: &str = "closeX";

/// One entry of the dataset chooser.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetLink {
    pub href: String,
    pub label: String,
}

/// Links applying analysis `model` to every dataset in `results`.
pub fn apply_model_links(prefix: &str, model: u32, results: &SearchResults) -> Vec<DatasetLink> {
    results
        .ordered()
        .into_iter()
        .map(|(id, label)| DatasetLink {
            href: format!("{prefix}{model}/{id}/"),
            label: format!("id{id}: {label}"),
        })
        .collect()
}

pub struct AuxiliaryApi<T> {
    transport: T,
    endpoints: EndpointConfig,
}

impl<T: Transport> AuxiliaryApi<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Self {
        Self {
            transport,
            endpoints: config.endpoints.clone(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn search_datasets(&self, term: &str) -> Result<SearchResults, TransportError> {
        let mut fields = FormPayload::new();
        fields.insert("search".to_string(), term.to_string());
        self.post(&self.endpoints.search_dataset, &fields).await
    }

    pub async fn share_links(&self, page_url: &str) -> Result<ShareLinks, TransportError> {
        let mut fields = FormPayload::new();
        fields.insert("to_share".to_string(), page_url.to_string());
        self.post(&self.endpoints.share_link, &fields).await
    }

    pub fn dataset_links(&self, model: u32, results: &SearchResults) -> Vec<DatasetLink> {
        apply_model_links(&self.endpoints.apply_model, model, results)
    }

    async fn post<R: DeserializeOwned>(
        &self,
        url: &str,
        fields: &FormPayload,
    ) -> Result<R, TransportError> {
        let reply = self.transport.post_form(url, fields).await?;
        serde_json::from_value(reply).map_err(|error| TransportError::Decode(error.to_string()))
    }

    /// Run a follow-up handed back by the binder.
    ///
    /// Failures are reported through `page` before being returned.
    pub async fn run<D: Dom, P: Page>(
        &self,
        dom: &D,
        page: &P,
        hidden_class: &str,
        follow_up: &FollowUp,
    ) -> Result<Rendered<D::Node>, TransportError> {
        let (url, result) = match follow_up {
            FollowUp::ShareLinks { url } => {
                let result = self
                    .share_links(url)
                    .await
                    .map(|links| Rendered::SharePanel {
                        close: render_share_links(dom, &links, hidden_class),
                    });
                (&self.endpoints.share_link, result)
            }
            FollowUp::ChooseDataset { model } => {
                let result = match open_dataset_chooser(dom, hidden_class) {
                    Chooser::Toggled { visible } => Ok(Rendered::ChooserToggled { visible }),
                    Chooser::Created { search, close } => self
                        .refresh_chooser(dom, *model)
                        .await
                        .map(|links| Rendered::ChooserOpened { search, close, links }),
                };
                (&self.endpoints.search_dataset, result)
            }
        };

        if let Err(error) = &result {
            let notice = Notice::from_transport_error(url, error);
            notice.log();
            page.notify(notice);
        }
        result
    }

    /// Search with the chooser's current term and re-render its link list.
    pub async fn refresh_chooser<D: Dom>(&self, dom: &D, model: u32) -> Result<usize, TransportError> {
        let term = dom
            .element_by_id(CHOOSER_SEARCH_ID)
            .and_then(|input| dom.value(&input))
            .unwrap_or_default();
        let results = self.search_datasets(&term).await?;
        let links = self.dataset_links(model, &results);
        tracing::debug!("dataset chooser for model {model}: {} matches for '{term}'", links.len());
        Ok(render_dataset_links(dom, &links))
    }
}

/// What a follow-up left on the page. Nodes are returned so the host can
/// attach listeners to elements created after binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered<N> {
    SharePanel { close: Option<N> },
    ChooserToggled { visible: bool },
    ChooserOpened { search: Option<N>, close: Option<N>, links: usize },
}

/// Fill and show the share panel. Returns its close button.
pub fn render_share_links<D: Dom>(dom: &D, links: &ShareLinks, hidden_class: &str) -> Option<D::Node> {
    let Some(panel) = dom.element_by_id(SHARE_PANEL_ID) else {
        tracing::warn!("share links received but #{SHARE_PANEL_ID} is missing");
        return None;
    };

    dom.clear(&panel);
    dom.remove_class(&panel, hidden_class);
    let close = dom.create_element(&panel, "a", None, CLOSE_CLASS);
    let lines = [
        "The following urls will allow to access the data without logging in:".to_string(),
        format!("Read only: {}", links.link_ro),
        format!("Editable: {}", links.link_rw),
    ];
    for line in &lines {
        if let Some(paragraph) = dom.create_element(&panel, "p", None, "") {
            dom.set_text(&paragraph, line);
        }
    }
    dom.set_style(&panel, "width", "50em");
    dom.set_style(&panel, "right", "10px");
    close
}

#[derive(Debug, Clone, PartialEq)]
pub enum Chooser<N> {
    /// The chooser already existed and was shown or hidden.
    Toggled { visible: bool },
    /// The chooser was built; its list is still empty.
    Created { search: Option<N>, close: Option<N> },
}

pub fn open_dataset_chooser<D: Dom>(dom: &D, hidden_class: &str) -> Chooser<D::Node> {
    if let Some(chooser) = dom.element_by_id(CHOOSER_ID) {
        dom.toggle_class(&chooser, hidden_class);
        return Chooser::Toggled {
            visible: !dom.has_class(&chooser, hidden_class),
        };
    }

    let Some(chooser) = dom
        .body()
        .and_then(|body| dom.create_element(&body, "div", Some(CHOOSER_ID), CHOOSER_CLASS))
    else {
        return Chooser::Created { search: None, close: None };
    };
    let close = dom.create_element(&chooser, "a", None, CLOSE_CLASS);
    if let Some(label) = dom.create_element(&chooser, "span", None, "") {
        dom.set_text(&label, "Search: ");
    }
    let search = dom.create_element(&chooser, "input", Some(CHOOSER_SEARCH_ID), "");
    if let Some(search) = &search {
        dom.set_attribute(search, "type", "text");
    }
    if let Some(label) = dom.create_element(&chooser, "div", None, "") {
        dom.set_text(&label, "Apply to:");
    }
    dom.create_element(&chooser, "div", Some(CHOOSER_LIST_ID), "");
    Chooser::Created { search, close }
}

/// Replace the chooser's link list. Returns the number of links rendered.
pub fn render_dataset_links<D: Dom>(dom: &D, links: &[DatasetLink]) -> usize {
    let Some(list) = dom.element_by_id(CHOOSER_LIST_ID) else {
        return 0;
    };
    dom.clear(&list);
    for link in links {
        dom.append_link(&list, &link.href, &link.label);
    }
    links.len()
}

/// Hide the panel owning a close button created by this module.
pub fn close_panel<D: Dom>(dom: &D, close: &D::Node, hidden_class: &str) {
    if let Some(panel) = dom.parent(close) {
        dom.add_class(&panel, hidden_class);
    }
}
