//! Entry point to an archive.
//!
//! # Example
//!
//! ```rust,no_run
//! use orthanc_lazy::{Orthanc, Resource};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let orthanc = Orthanc::from_host("http://localhost:8042")?;
//!
//! let patient = orthanc.patient("0946fcb6-cf12ab43-bad958c1-bf057ad5-0fc6f54c");
//! if patient.exists().await {
//!     for study in patient.studies().await?.iter() {
//!         println!("{:?} {:?}", study.date().await, study.description().await);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::changes::{fetch_changes, ChangeCursor, ChangePage};
use crate::config::ConnectionConfig;
use crate::entity::{Instance, Patient, Series, Study};
use crate::error::TransportError;
use crate::transport::{HttpTransport, RequestBody, Transport};

/// Client for one archive.
///
/// Cheap to clone: clones share the transport. Entities built from it are
/// independent proxies with their own cache cells.
#[derive(Clone)]
pub struct Orthanc {
    transport: Arc<dyn Transport>,
    new_data: ChangeCursor,
}

impl Orthanc {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::from_transport(Arc::new(transport))
    }

    pub fn from_transport(transport: Arc<dyn Transport>) -> Self {
        let new_data = ChangeCursor::new(Arc::clone(&transport));
        Self {
            transport,
            new_data,
        }
    }

    /// Connect to `host` without credentials.
    pub fn from_host(host: &str) -> Result<Self, TransportError> {
        Ok(Self::new(HttpTransport::new(host)?))
    }

    /// Build a client from validated connection settings.
    pub fn connect(config: &ConnectionConfig) -> Result<Self, TransportError> {
        let mut transport =
            HttpTransport::with_timeout(&config.host, Duration::from_secs(config.timeout))?;
        if let Some(user) = &config.user {
            transport = transport.with_credentials(user.clone(), config.password.clone());
        }

        Ok(Self::new(transport).with_change_limit(config.change_limit))
    }

    /// Page size used by the change cursor.
    pub fn with_change_limit(mut self, limit: u32) -> Self {
        self.new_data = ChangeCursor::with_limit(Arc::clone(&self.transport), limit);
        self
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Raw GET on any archive path.
    pub async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Value, TransportError> {
        self.transport.get(path, params).await
    }

    /// Raw POST on any archive path.
    pub async fn post(&self, path: &str, body: RequestBody) -> Result<Value, TransportError> {
        self.transport.post(path, body).await
    }

    /// Raw DELETE on any archive path.
    pub async fn delete(&self, path: &str) -> Result<Value, TransportError> {
        self.transport.delete(path).await
    }

    /// Absolute URL for `path`, for consumers that fetch it themselves.
    pub fn get_url(&self, path: &str) -> String {
        self.transport.url(path)
    }

    /// One page of the change log.
    pub async fn changes(&self, limit: u32, since: u64) -> Result<ChangePage, TransportError> {
        fetch_changes(self.transport.as_ref(), limit, since).await
    }

    /// Cursor over resources that recently became stable.
    pub fn new_data(&self) -> &ChangeCursor {
        &self.new_data
    }

    pub fn patient(&self, id: impl Into<String>) -> Patient {
        Patient::new(Arc::clone(&self.transport), id)
    }

    pub fn study(&self, id: impl Into<String>) -> Study {
        Study::new(Arc::clone(&self.transport), id)
    }

    pub fn series(&self, id: impl Into<String>) -> Series {
        Series::new(Arc::clone(&self.transport), id)
    }

    pub fn instance(&self, id: impl Into<String>) -> Instance {
        Instance::new(Arc::clone(&self.transport), id)
    }

    /// Names of the remote modalities configured on the archive.
    pub async fn modalities(&self) -> Result<Vec<String>, TransportError> {
        let value = self.transport.get("/modalities", &[]).await?;
        serde_json::from_value(value).map_err(|e| TransportError::Decode {
            path: "/modalities".to_string(),
            message: e.to_string(),
        })
    }
}
