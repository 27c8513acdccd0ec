//! Change feed cursor.
//!
//! The archive exposes an append-only log of resource transitions at
//! `GET /changes?limit&since`. Each page reports the entries after `since`,
//! the sequence number to resume from (`Last`) and whether the end of the
//! log was reached (`Done`).
//!
//! [`ChangeCursor`] turns that into lazy streams of resources that became
//! stable. Every call starts its own scan from the beginning of the log;
//! no position is kept between calls.
//!
//! # Example
//!
//! ```ignore
//! use futures::TryStreamExt;
//!
//! let patients: Vec<Patient> = orthanc.new_data().patients().try_collect().await?;
//! ```

use std::sync::Arc;

use clap::ValueEnum;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::entity::{Patient, Series, Study};
use crate::error::TransportError;
use crate::transport::Transport;

/// Default number of entries requested per page.
pub const DEFAULT_CHANGE_LIMIT: u32 = 10;

/// Change types the cursor can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ChangeType {
    StablePatient,
    StableStudy,
    StableSeries,
}

impl ChangeType {
    /// Name used by the archive in the `ChangeType` field.
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeType::StablePatient => "StablePatient",
            ChangeType::StableStudy => "StableStudy",
            ChangeType::StableSeries => "StableSeries",
        }
    }
}

/// One entry of the change log.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Change {
    #[serde(rename = "ID")]
    pub id: String,

    /// Kept as a string: the log carries many types besides the stable ones.
    pub change_type: String,

    #[serde(default)]
    pub seq: Option<u64>,

    #[serde(default)]
    pub resource_type: Option<String>,

    #[serde(default)]
    pub path: Option<String>,
}

impl Change {
    /// True if this entry has the given change type.
    pub fn is(&self, change_type: ChangeType) -> bool {
        self.change_type == change_type.as_str()
    }
}

/// One page of `GET /changes`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangePage {
    pub changes: Vec<Change>,
    pub done: bool,
    pub last: u64,
}

impl ChangePage {
    /// Decode a raw `/changes` response.
    pub fn from_value(value: Value) -> Result<Self, TransportError> {
        serde_json::from_value(value).map_err(|e| TransportError::Decode {
            path: "/changes".to_string(),
            message: e.to_string(),
        })
    }
}

/// Fetch one page of the change log.
pub async fn fetch_changes(
    transport: &dyn Transport,
    limit: u32,
    since: u64,
) -> Result<ChangePage, TransportError> {
    debug!(limit, since, "fetching change page");
    let query = [("limit", limit.to_string()), ("since", since.to_string())];
    let value = transport.get("/changes", &query).await?;
    ChangePage::from_value(value)
}

/// Scan position of one stream.
struct ScanState {
    since: u64,
    done: bool,
}

/// Produces lazy streams of newly stabilized resources.
#[derive(Clone)]
pub struct ChangeCursor {
    transport: Arc<dyn Transport>,
    limit: u32,
}

impl ChangeCursor {
    /// Cursor using [`DEFAULT_CHANGE_LIMIT`] entries per page.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_limit(transport, DEFAULT_CHANGE_LIMIT)
    }

    /// Create a cursor requesting `limit` entries per page.
    pub fn with_limit(transport: Arc<dyn Transport>, limit: u32) -> Self {
        Self {
            transport,
            limit: limit.max(1),
        }
    }

    /// Entries requested per page.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Ids of every resource whose change entry matches `change_type`.
    ///
    /// Pages are requested only as the stream is polled, starting from
    /// offset 0, until the archive reports `Done`. A page whose `Last` does
    /// not move past the requested offset also ends the scan. A failed page
    /// request is yielded as an error and ends the stream.
    pub fn ids(&self, change_type: ChangeType) -> BoxStream<'static, Result<String, TransportError>> {
        let transport = Arc::clone(&self.transport);
        let limit = self.limit;

        stream::try_unfold(
            ScanState {
                since: 0,
                done: false,
            },
            move |state| {
                let transport = Arc::clone(&transport);
                async move {
                    if state.done {
                        return Ok(None);
                    }

                    let page = match fetch_changes(transport.as_ref(), limit, state.since).await {
                        Ok(page) => page,
                        Err(err) => return Err(err),
                    };
                    let next = ScanState {
                        since: page.last,
                        done: page.done || page.last <= state.since,
                    };
                    let ids: Vec<String> = page
                        .changes
                        .into_iter()
                        .filter(|change| change.is(change_type))
                        .map(|change| change.id)
                        .collect();
                    Ok(Some((ids, next)))
                }
            },
        )
        .map_ok(|ids| stream::iter(ids.into_iter().map(Ok::<_, TransportError>)))
        .try_flatten()
        .boxed()
    }

    /// Patients that became stable.
    pub fn patients(&self) -> BoxStream<'static, Result<Patient, TransportError>> {
        let transport = Arc::clone(&self.transport);
        self.ids(ChangeType::StablePatient)
            .map_ok(move |id| Patient::new(Arc::clone(&transport), id))
            .boxed()
    }

    /// Studies that became stable.
    pub fn studies(&self) -> BoxStream<'static, Result<Study, TransportError>> {
        let transport = Arc::clone(&self.transport);
        self.ids(ChangeType::StableStudy)
            .map_ok(move |id| Study::new(Arc::clone(&transport), id))
            .boxed()
    }

    /// Series that became stable.
    pub fn series(&self) -> BoxStream<'static, Result<Series, TransportError>> {
        let transport = Arc::clone(&self.transport);
        self.ids(ChangeType::StableSeries)
            .map_ok(move |id| Series::new(Arc::clone(&transport), id))
            .boxed()
    }
}
