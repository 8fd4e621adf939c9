//! Browser host: capability implementations and the JavaScript entry points.
//!
//! Pages call `start_runtime` once the document is ready, then
//! `query_server` / `process_reply` and the method picker functions from
//! their own controls.

mod bokeh;
mod dom;
mod page;
mod transport;

pub use bokeh::{BokehCursor, BokehLineSource, BokehModels};
pub use dom::WebDom;
pub use page::WebPage;
pub use transport::FetchTransport;

use crate::binder::{BehaviorBinder, BindingId, FollowUp};
use crate::dispatcher::{CommandDispatcher, DispatchOutcome};
use crate::dom::DomEvent;
use crate::endpoints::{AuxiliaryApi, Rendered, close_panel};
use crate::interpreter::ReplyInterpreter;
use crate::methods;
use crate::notice::Notice;
use crate::page::Page;
use crate::plot::{LineDataSource, PlotContext, PlotCursor};
use crate::transport::FormPayload;
use indexmap::IndexMap;
use js_sys::Array;
use shared::ClientConfig;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event};

struct Runtime {
    config: ClientConfig,
    dom: WebDom,
    page: WebPage,
    dispatcher: CommandDispatcher<FetchTransport, WebDom, WebPage>,
    api: AuxiliaryApi<FetchTransport>,
    binder: RefCell<BehaviorBinder<Element>>,
}

thread_local! {
    static RUNTIME: RefCell<Option<Rc<Runtime>>> = const { RefCell::new(None) };
}

fn runtime() -> Result<Rc<Runtime>, JsValue> {
    RUNTIME
        .with(|cell| cell.borrow().clone())
        .ok_or_else(|| JsValue::from_str("runtime not started, call start_runtime first"))
}

fn js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Install logging, parse the configuration and bind page behaviors.
#[wasm_bindgen]
pub fn start_runtime(config_toml: Option<String>) -> Result<(), JsValue> {
    if RUNTIME.with(|cell| cell.borrow().is_some()) {
        tracing::warn!("start_runtime called twice, keeping the first runtime");
        return Ok(());
    }

    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    let config = match config_toml {
        Some(text) => ClientConfig::from_toml_str(&text).map_err(js_error)?,
        None => ClientConfig::default(),
    };
    let dom = WebDom::new().ok_or_else(|| JsValue::from_str("no document"))?;
    let page = WebPage::new().ok_or_else(|| JsValue::from_str("no window"))?;
    let transport = FetchTransport::new(&config.csrf_field);

    let runtime = Rc::new(Runtime {
        dispatcher: CommandDispatcher::new(transport.clone(), dom.clone(), page.clone(), &config),
        api: AuxiliaryApi::new(transport, &config),
        binder: RefCell::new(BehaviorBinder::new(&config)),
        config,
        dom,
        page,
    });

    let report = runtime.binder.borrow_mut().bind(&runtime.dom, &runtime.page);
    let listeners: Vec<(BindingId, Element, DomEvent)> = runtime
        .binder
        .borrow()
        .bindings()
        .flat_map(|(id, binding)| {
            BehaviorBinder::<Element>::events_for(binding.role)
                .iter()
                .map(move |event| (id, binding.node.clone(), *event))
        })
        .collect();
    for (id, node, event) in listeners {
        let handler = Rc::clone(&runtime);
        listen(&node, event.event_name(), move |dom_event| {
            handler.on_event(id, event, &dom_event);
        });
    }

    tracing::info!(
        "voltpy runtime started: {} behaviors bound, {} marker errors",
        report.bound,
        report.errors.len()
    );
    RUNTIME.with(|cell| *cell.borrow_mut() = Some(runtime));
    Ok(())
}

/// POST `payload` to `url` and apply the command the server answers with.
///
/// Resolves to `true` when the command was applied.
#[wasm_bindgen]
pub async fn query_server(
    url: String,
    payload: JsValue,
    line_data: JsValue,
    cursors: Array,
) -> Result<bool, JsValue> {
    let runtime = runtime()?;
    let fields: IndexMap<String, serde_json::Value> =
        serde_wasm_bindgen::from_value(payload).map_err(js_error)?;
    let fields: FormPayload = fields
        .into_iter()
        .map(|(name, value)| match value {
            serde_json::Value::String(text) => (name, text),
            other => (name, other.to_string()),
        })
        .collect();

    let context = RefCell::new(plot_context(line_data, &cursors));
    let outcome = runtime
        .dispatcher
        .send(&url, &fields, &context)
        .await
        .map_err(js_error)?;
    Ok(matches!(outcome, DispatchOutcome::Applied(_)))
}

/// Apply a reply the page obtained by other means.
#[wasm_bindgen]
pub fn process_reply(reply: JsValue, line_data: JsValue, cursors: Array) -> Result<bool, JsValue> {
    let runtime = runtime()?;
    let reply: serde_json::Value = serde_wasm_bindgen::from_value(reply).map_err(js_error)?;
    let mut context = plot_context(line_data, &cursors);
    let applied = ReplyInterpreter::new(&runtime.config).process(&reply, &mut context, &runtime.page);
    Ok(applied.is_ok())
}

fn plot_context(line_data: JsValue, cursors: &Array) -> PlotContext {
    let line_data = BokehLineSource::from_js(line_data)
        .map(|source| Box::new(source) as Box<dyn LineDataSource>);
    let cursors = cursors
        .iter()
        .map(|span| Box::new(BokehCursor::new(span)) as Box<dyn PlotCursor>)
        .collect();
    PlotContext::new(line_data, cursors)
}

/// Show or hide the list of `method_type` methods.
#[wasm_bindgen(js_name = toggleMethod)]
pub fn toggle_method(method_type: String) -> Result<(), JsValue> {
    let runtime = runtime()?;
    methods::toggle_method(&runtime.dom, &method_type, &runtime.config.hidden_class);
    Ok(())
}

/// Record the chosen method and add the matching submit button.
#[wasm_bindgen(js_name = selectMethod)]
pub fn select_method(
    method_type: String,
    name: String,
    display: String,
    toggle: Option<bool>,
) -> Result<(), JsValue> {
    let runtime = runtime()?;
    methods::select_method(
        &runtime.dom,
        &method_type,
        &name,
        &display,
        toggle.unwrap_or(true),
        &runtime.config.hidden_class,
    )
    .map_err(js_error)
}

/// Expand or collapse a details block; `target` is an id, with or without `#`.
#[wasm_bindgen(js_name = toggleDetails)]
pub fn toggle_details(source: Element, target: String) -> Result<(), JsValue> {
    let runtime = runtime()?;
    let target = target.strip_prefix('#').unwrap_or(&target);
    methods::toggle_details(&runtime.dom, &source, target, &runtime.config.hidden_class)
        .map_err(js_error)
}

fn listen(node: &Element, event: &str, handler: impl FnMut(Event) + 'static) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    if node
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .is_err()
    {
        tracing::warn!("cannot listen for '{event}' on <{}>", node.tag_name());
    }
    closure.forget();
}

impl Runtime {
    fn on_event(self: &Rc<Self>, id: BindingId, event: DomEvent, dom_event: &Event) {
        let mut models = BokehModels;
        let handled = {
            let Ok(mut binder) = self.binder.try_borrow_mut() else {
                tracing::debug!(
                    "'{}' on binding {id} dropped, fired while another event was handled",
                    event.event_name()
                );
                return;
            };
            binder.handle(&self.dom, &self.page, &mut models, id, event)
        };

        match handled {
            Ok(handled) => {
                if handled.prevent_default {
                    dom_event.prevent_default();
                }
                for notice in handled.notices {
                    self.page.notify(notice);
                }
                for follow_up in handled.follow_ups {
                    let runtime = Rc::clone(self);
                    wasm_bindgen_futures::spawn_local(async move {
                        runtime.follow_up(follow_up).await;
                    });
                }
            }
            Err(error) => tracing::warn!("event on binding {id} ignored: {error}"),
        }
    }

    async fn follow_up(self: Rc<Self>, follow_up: FollowUp) {
        let hidden_class = self.config.hidden_class.clone();
        let Ok(rendered) = self
            .api
            .run(&self.dom, &self.page, &hidden_class, &follow_up)
            .await
        else {
            return;
        };

        match rendered {
            Rendered::SharePanel { close } => {
                self.close_on_click(close);
            }
            Rendered::ChooserOpened { search, close, .. } => {
                self.close_on_click(close);
                if let (Some(search), FollowUp::ChooseDataset { model }) = (search, &follow_up) {
                    let model = *model;
                    let runtime = Rc::clone(&self);
                    listen(&search, "keyup", move |_| {
                        let runtime = Rc::clone(&runtime);
                        wasm_bindgen_futures::spawn_local(async move {
                            runtime.refresh_chooser(model).await;
                        });
                    });
                }
            }
            Rendered::ChooserToggled { .. } => {}
        }
    }

    async fn refresh_chooser(&self, model: u32) {
        if let Err(error) = self.api.refresh_chooser(&self.dom, model).await {
            let notice = Notice::from_transport_error(&self.config.endpoints.search_dataset, &error);
            notice.log();
            self.page.notify(notice);
        }
    }

    fn close_on_click(&self, close: Option<Element>) {
        let Some(close) = close else {
            return;
        };
        let dom = self.dom.clone();
        let hidden_class = self.config.hidden_class.clone();
        let target = close.clone();
        listen(&close, "click", move |_| close_panel(&dom, &target, &hidden_class));
    }
}
