use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{ResourceHandle, ResourceKind};
use crate::error::{ResourceError, TransportError};
use crate::transport::Transport;

/// Field holding the standardized DICOM metadata of a resource.
pub const MAIN_DICOM_TAGS: &str = "MainDicomTags";

/// Result of fetching a resource document.
#[derive(Debug, Clone)]
pub enum Document {
    /// The archive returned the document
    Found(Arc<Value>),

    /// The fetch failed; the cause is kept so callers can tell a 404 from
    /// an unreachable archive
    Missing(TransportError),
}

impl Document {
    pub fn exists(&self) -> bool {
        matches!(self, Document::Found(_))
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Document::Found(value) => Some(value),
            Document::Missing(_) => None,
        }
    }

    pub fn error(&self) -> Option<&TransportError> {
        match self {
            Document::Found(_) => None,
            Document::Missing(err) => Some(err),
        }
    }

    /// Top-level field, `None` when absent, null, or the document is missing.
    fn field(&self, name: &str) -> Option<&Value> {
        self.value()?.get(name).filter(|v| !v.is_null())
    }
}

/// Lazy proxy for one remote resource document.
///
/// The document is fetched on first access and cached until an explicit
/// [`reload`](Self::reload) or [`invalidate`](Self::invalidate). Clones share
/// the cache cell; proxies built from separate handles never do.
#[derive(Clone)]
pub struct ResourceProxy {
    handle: ResourceHandle,
    transport: Arc<dyn Transport>,
    cell: Arc<Mutex<Option<Document>>>,
}

impl ResourceProxy {
    pub fn new(transport: Arc<dyn Transport>, handle: ResourceHandle) -> Self {
        Self {
            handle,
            transport,
            cell: Arc::new(Mutex::new(None)),
        }
    }

    pub fn handle(&self) -> &ResourceHandle {
        &self.handle
    }

    pub fn kind(&self) -> ResourceKind {
        self.handle.kind()
    }

    pub fn id(&self) -> &str {
        self.handle.id()
    }

    pub fn path(&self) -> &str {
        self.handle.path()
    }

    /// Transport this proxy fetches through.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Ensure the document is loaded and return it.
    ///
    /// Issues a request only when the cell is empty or `force` is set. The
    /// cell stays locked for the duration of the fetch, so concurrent first
    /// accesses on the same proxy produce a single request.
    pub async fn load(&self, force: bool) -> Document {
        let mut cell = self.cell.lock().await;
        if !force {
            if let Some(document) = cell.as_ref() {
                return document.clone();
            }
        }

        let document = self.fetch().await;
        *cell = Some(document.clone());
        document
    }

    /// Fetch the document again, replacing the cached one.
    pub async fn reload(&self) -> Document {
        self.load(true).await
    }

    /// Drop the cached document; the next read fetches it again.
    pub async fn invalidate(&self) {
        *self.cell.lock().await = None;
    }

    /// Whether a document (found or missing) is currently cached.
    pub async fn is_loaded(&self) -> bool {
        self.cell.lock().await.is_some()
    }

    /// The cached document, loading it first if needed.
    pub async fn document(&self) -> Document {
        self.load(false).await
    }

    /// True iff the archive returned a document for this resource.
    pub async fn exists(&self) -> bool {
        self.document().await.exists()
    }

    /// Why the document is missing, if it is.
    pub async fn fetch_error(&self) -> Option<TransportError> {
        self.document().await.error().cloned()
    }

    /// Top-level document field.
    pub async fn field(&self, name: &str) -> Option<Value> {
        self.document().await.field(name).cloned()
    }

    pub async fn field_str(&self, name: &str) -> Option<String> {
        self.field(name).await?.as_str().map(str::to_string)
    }

    pub async fn field_u64(&self, name: &str) -> Option<u64> {
        self.field(name).await?.as_u64()
    }

    pub async fn field_bool(&self, name: &str) -> Option<bool> {
        self.field(name).await?.as_bool()
    }

    /// Raw value of a `MainDicomTags` entry.
    pub async fn tag(&self, name: &str) -> Option<String> {
        let document = self.document().await;
        document
            .field(MAIN_DICOM_TAGS)?
            .get(name)?
            .as_str()
            .map(str::to_string)
    }

    /// `MainDicomTags` entry passed through `transform`.
    ///
    /// `transform` runs only when the tag is present; it signals a value it
    /// cannot interpret by returning `None`.
    pub async fn tag_with<T, F>(&self, name: &str, transform: F) -> Option<T>
    where
        F: FnOnce(&str) -> Option<T> + Send,
    {
        let raw = self.tag(name).await?;
        transform(&raw)
    }

    /// Field that must be present for the caller to proceed.
    pub async fn require_field(&self, name: &'static str) -> Result<Value, ResourceError> {
        let document = self.document().await;
        if let Document::Missing(source) = &document {
            return Err(ResourceError::Unavailable {
                path: self.path().to_string(),
                source: source.clone(),
            });
        }

        document
            .field(name)
            .cloned()
            .ok_or_else(|| ResourceError::MissingField {
                path: self.path().to_string(),
                field: name,
            })
    }

    /// Single resource id stored in `name` (e.g. `ParentPatient`).
    pub async fn field_id(&self, name: &'static str) -> Result<String, ResourceError> {
        match self.require_field(name).await? {
            Value::String(id) => Ok(id),
            _ => Err(self.invalid_field(name, "a resource id")),
        }
    }

    /// List of resource ids stored in `name` (e.g. `Studies`).
    pub async fn field_ids(&self, name: &'static str) -> Result<Vec<String>, ResourceError> {
        let Value::Array(items) = self.require_field(name).await? else {
            return Err(self.invalid_field(name, "a list of resource ids"));
        };

        items
            .into_iter()
            .map(|item| match item {
                Value::String(id) => Ok(id),
                _ => Err(self.invalid_field(name, "a list of resource ids")),
            })
            .collect()
    }

    /// Delete the remote resource.
    ///
    /// The cached document is left in place; discard the proxy afterwards.
    pub async fn delete(&self) -> Result<Value, TransportError> {
        debug!(path = self.path(), "deleting resource");
        self.transport.delete(self.path()).await
    }

    async fn fetch(&self) -> Document {
        debug!(path = self.path(), "loading document");
        match self.transport.get(self.path(), &[]).await {
            Ok(Value::Null) => Document::Missing(TransportError::Decode {
                path: self.path().to_string(),
                message: "empty document".to_string(),
            }),
            Ok(value) => Document::Found(Arc::new(value)),
            Err(err) => {
                warn!(path = self.path(), error = %err, "document unavailable");
                Document::Missing(err)
            }
        }
    }

    fn invalid_field(&self, field: &'static str, expected: &'static str) -> ResourceError {
        ResourceError::InvalidField {
            path: self.path().to_string(),
            field,
            expected,
        }
    }
}

impl fmt::Debug for ResourceProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceProxy")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}
