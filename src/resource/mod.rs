//! Remote resource abstraction.
//!
//! Every entity of the imaging hierarchy is a proxy for one document on
//! the archive. The proxy fetches that document on first access, keeps it
//! in a single cache cell, and answers field and tag reads from it:
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │   Patient / Study / Series / Instance    │
//! │        (typed accessors, traversal)      │
//! └────────────────────┬─────────────────────┘
//!                      │
//!                      ▼
//! ┌──────────────────────────────────────────┐
//! │              ResourceProxy               │
//! │  (handle + lazily loaded document cell)  │
//! └────────────────────┬─────────────────────┘
//!                      │
//!                      ▼
//! ┌──────────────────────────────────────────┐
//! │             Transport Trait              │
//! └──────────────────────────────────────────┘
//! ```

mod date;
mod proxy;

pub use date::dicom_date;
pub use proxy::{Document, ResourceProxy, MAIN_DICOM_TAGS};

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

/// Level of the imaging hierarchy a resource lives at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ResourceKind {
    Patient,
    Study,
    Series,
    Instance,
}

impl ResourceKind {
    /// REST collection name (`/patients`, `/studies`, ...).
    pub fn path_segment(self) -> &'static str {
        match self {
            ResourceKind::Patient => "patients",
            ResourceKind::Study => "studies",
            ResourceKind::Series => "series",
            ResourceKind::Instance => "instances",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Patient => "Patient",
            ResourceKind::Study => "Study",
            ResourceKind::Series => "Series",
            ResourceKind::Instance => "Instance",
        };
        f.write_str(name)
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "patient" | "patients" => Ok(ResourceKind::Patient),
            "study" | "studies" => Ok(ResourceKind::Study),
            "series" => Ok(ResourceKind::Series),
            "instance" | "instances" => Ok(ResourceKind::Instance),
            other => Err(format!("unknown resource kind: {other}")),
        }
    }
}

/// Identity of a remote resource.
///
/// Two handles with equal fields refer to the same remote entity; they do
/// not share any cached state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceHandle {
    kind: ResourceKind,
    id: String,
    path: String,
}

impl ResourceHandle {
    /// Create a handle; the REST path is `/{collection}/{id}`.
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        let id = id.into();
        let path = format!("/{}/{}", kind.path_segment(), urlencoding::encode(&id));
        Self { kind, id, path }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}
