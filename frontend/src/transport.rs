use indexmap::IndexMap;

/// Form fields submitted with one request, in submission order.
pub type FormPayload = IndexMap<String, String>;

/// HTTP POST transport. Implementations append the CSRF field themselves.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn post_form(
        &self,
        url: &str,
        fields: &FormPayload,
    ) -> Result<serde_json::Value, TransportError>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server answered {url} with status {status}")]
    Status { status: u16, url: String },
    #[error("cannot decode reply: {0}")]
    Decode(String),
}
