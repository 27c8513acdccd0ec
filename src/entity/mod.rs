//! Typed entities of the imaging hierarchy.
//!
//! Each entity wraps a [`ResourceProxy`] and maps accessors onto fields or
//! `MainDicomTags` entries of its document. Traversal accessors build new,
//! unloaded proxies for parents and children:
//!
//! ```text
//! Patient ──studies──▶ Study ──series──▶ Series ──instances──▶ Instance
//!    ▲                   │ ▲                │ ▲                   │
//!    └─────patient───────┘ └─────study──────┘ └──────series───────┘
//! ```

mod instance;
mod patient;
mod series;
mod study;

pub use instance::Instance;
pub use patient::Patient;
pub use series::Series;
pub use study::{anonymization_request, Study, ANONYMIZE_KEEP};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::resource::{Document, ResourceKind, ResourceProxy};

/// Behavior shared by every entity.
#[async_trait]
pub trait Resource: Send + Sync {
    /// The proxy backing this entity.
    fn proxy(&self) -> &ResourceProxy;

    fn kind(&self) -> ResourceKind {
        self.proxy().kind()
    }

    fn id(&self) -> &str {
        self.proxy().id()
    }

    fn path(&self) -> &str {
        self.proxy().path()
    }

    /// True iff the archive returned a document for this entity.
    async fn exists(&self) -> bool {
        self.proxy().exists().await
    }

    /// Fetch the document again.
    ///
    /// Memoized child collections are kept; use the entity's own `refresh`
    /// to drop them too.
    async fn reload(&self) -> Document {
        self.proxy().reload().await
    }

    /// Delete the entity on the archive and return the raw response.
    async fn delete(&self) -> Result<Value, TransportError> {
        self.proxy().delete().await
    }
}
