//! # orthanc-lazy
//!
//! A client-side object model over the REST API of an Orthanc medical
//! imaging archive.
//!
//! Patients, studies, series and instances are proxies for remote
//! documents. Nothing is fetched when an entity is created; the document
//! is requested on the first accessor call, cached on the entity, and
//! reused until it is explicitly reloaded.
//!
//! ## Architecture
//!
//! - [`transport`] - The `Transport` seam and its reqwest implementation
//! - [`resource`] - Resource handles, the lazy `ResourceProxy`, DICOM dates
//! - [`entity`] - Typed `Patient`, `Study`, `Series`, `Instance` wrappers
//! - [`changes`] - Lazy streams over the archive's change log
//! - [`client`] - The `Orthanc` facade
//! - [`config`] - CLI and connection settings
//!
//! ## Error policy
//!
//! A document that cannot be fetched makes the entity "not existing": tag
//! and field reads return `None`, and [`ResourceProxy::fetch_error`] tells
//! a 404 apart from an unreachable archive. Accessors that need a value
//! to proceed (traversals, `series_count`, `mid_instance`) return a
//! [`ResourceError`] instead.

pub mod changes;
pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod resource;
pub mod transport;

// Re-export commonly used types
pub use changes::{fetch_changes, Change, ChangeCursor, ChangePage, ChangeType, DEFAULT_CHANGE_LIMIT};
pub use client::Orthanc;
pub use config::{Cli, Command, ConnectionConfig, DEFAULT_HOST};
pub use entity::{anonymization_request, Instance, Patient, Resource, Series, Study, ANONYMIZE_KEEP};
pub use error::{ResourceError, TransportError};
pub use resource::{dicom_date, Document, ResourceHandle, ResourceKind, ResourceProxy, MAIN_DICOM_TAGS};
pub use transport::{HttpTransport, RequestBody, Transport, DEFAULT_TIMEOUT_SECS};
