mod http_transport;

pub use http_transport::{HttpTransport, DEFAULT_TIMEOUT_SECS};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

/// Body of a POST request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as a JSON document
    Json(Value),

    /// Sent verbatim, e.g. a resource id for `/modalities/{name}/store`
    Raw(String),
}

/// Trait for issuing requests against the archive's REST API.
///
/// Paths are absolute on the archive (`/patients/{id}`); implementations
/// prepend their base host. A successful response is decoded as JSON, an
/// empty success body decodes to `Value::Null`. Implementations must be
/// thread-safe so one transport can back every proxy built from a client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `path` with optional query parameters.
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, TransportError>;

    /// POST `body` to `path`.
    async fn post(&self, path: &str, body: RequestBody) -> Result<Value, TransportError>;

    /// DELETE `path`.
    async fn delete(&self, path: &str) -> Result<Value, TransportError>;

    /// Absolute URL for `path`, without issuing a request.
    fn url(&self, path: &str) -> String;
}
