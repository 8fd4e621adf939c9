use crate::transport::{FormPayload, Transport, TransportError};
use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response, UrlSearchParams, Window};

/// `fetch` POST with a form-encoded body and the page's CSRF token.
#[derive(Clone)]
pub struct FetchTransport {
    csrf_field: String,
}

impl FetchTransport {
    pub fn new(csrf_field: &str) -> Self {
        Self {
            csrf_field: csrf_field.to_string(),
        }
    }

    fn csrf_token(&self, window: &Window) -> Option<String> {
        let inputs = window.document()?.get_elements_by_name(&self.csrf_field);
        let input = inputs.item(0)?;
        Reflect::get(&input, &JsValue::from_str("value")).ok()?.as_string()
    }
}

fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn network(value: JsValue) -> TransportError {
    TransportError::Network(js_message(&value))
}

fn decode(value: JsValue) -> TransportError {
    TransportError::Decode(js_message(&value))
}

impl Transport for FetchTransport {
    async fn post_form(
        &self,
        url: &str,
        fields: &FormPayload,
    ) -> Result<serde_json::Value, TransportError> {
        let window =
            web_sys::window().ok_or_else(|| TransportError::Network("no window".to_string()))?;

        let body = UrlSearchParams::new().map_err(network)?;
        for (name, value) in fields {
            body.append(name, value);
        }
        if !fields.contains_key(&self.csrf_field) {
            match self.csrf_token(&window) {
                Some(token) => body.append(&self.csrf_field, &token),
                None => tracing::warn!("no '{}' input on the page", self.csrf_field),
            }
        }

        let headers = Headers::new().map_err(network)?;
        headers.set("X-Requested-With", "XMLHttpRequest").map_err(network)?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_headers(&headers);
        init.set_body(&body);

        let request = Request::new_with_str_and_init(url, &init).map_err(network)?;
        let response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(network)?;
        let response: Response = response
            .dyn_into()
            .map_err(|_| TransportError::Decode("fetch did not return a Response".to_string()))?;

        if !response.ok() {
            return Err(TransportError::Status {
                status: response.status(),
                url: url.to_string(),
            });
        }

        let json = JsFuture::from(response.json().map_err(decode)?)
            .await
            .map_err(decode)?;
        serde_wasm_bindgen::from_value(json).map_err(|error| TransportError::Decode(error.to_string()))
    }
}
