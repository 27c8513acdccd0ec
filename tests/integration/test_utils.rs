//! Test utilities for integration tests.
//!
//! Provides an in-memory archive that records every request it receives,
//! plus fixture documents shaped like the archive's responses.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use orthanc_lazy::{Orthanc, RequestBody, Transport, TransportError};

// =============================================================================
// Mock Transport with Request Tracking
// =============================================================================

/// A request seen by the mock archive.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

/// In-memory archive keyed by request path.
///
/// GET on a path without a document answers `NotFound`. Change pages are
/// keyed by their `since` parameter. Clones share the request log.
#[derive(Clone, Default)]
pub struct MockTransport {
    documents: Arc<Mutex<HashMap<String, Value>>>,
    change_pages: HashMap<u64, Value>,
    post_responses: HashMap<String, Value>,
    failing_paths: HashMap<String, TransportError>,
    request_count: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, path: impl Into<String>, document: Value) -> Self {
        self.documents
            .lock()
            .unwrap()
            .insert(path.into(), document);
        self
    }

    pub fn with_change_page(mut self, since: u64, page: Value) -> Self {
        self.change_pages.insert(since, page);
        self
    }

    pub fn with_post_response(mut self, path: impl Into<String>, response: Value) -> Self {
        self.post_responses.insert(path.into(), response);
        self
    }

    pub fn with_failure(mut self, path: impl Into<String>, error: TransportError) -> Self {
        self.failing_paths.insert(path.into(), error);
        self
    }

    /// Replace a document after construction, e.g. to simulate a change on the archive.
    pub fn set_document(&self, path: impl Into<String>, document: Value) {
        self.documents
            .lock()
            .unwrap()
            .insert(path.into(), document);
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of GETs issued for `path`.
    pub fn get_count(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == "GET" && r.path == path)
            .count()
    }

    /// `since` values of every `/changes` request, in order.
    pub fn change_offsets(&self) -> Vec<u64> {
        self.requests()
            .iter()
            .filter(|r| r.path == "/changes")
            .filter_map(|r| {
                r.query
                    .iter()
                    .find(|(k, _)| k == "since")
                    .and_then(|(_, v)| v.parse().ok())
            })
            .collect()
    }

    /// Client backed by this mock; the mock keeps observing its requests.
    pub fn client(&self) -> Orthanc {
        let transport: Arc<dyn Transport> = Arc::new(self.clone());
        Orthanc::from_transport(transport)
    }

    fn record(&self, method: &'static str, path: &str, query: &[(&str, String)], body: Option<RequestBody>) {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            body,
        });
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, TransportError> {
        self.record("GET", path, query, None);

        if let Some(err) = self.failing_paths.get(path) {
            return Err(err.clone());
        }

        if path == "/changes" {
            let since = query
                .iter()
                .find(|(k, _)| *k == "since")
                .and_then(|(_, v)| v.parse::<u64>().ok())
                .unwrap_or(0);
            return self
                .change_pages
                .get(&since)
                .cloned()
                .ok_or_else(|| TransportError::NotFound(format!("/changes?since={since}")));
        }

        self.documents
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(path.to_string()))
    }

    async fn post(&self, path: &str, body: RequestBody) -> Result<Value, TransportError> {
        self.record("POST", path, &[], Some(body));

        if let Some(err) = self.failing_paths.get(path) {
            return Err(err.clone());
        }
        Ok(self
            .post_responses
            .get(path)
            .cloned()
            .unwrap_or_else(|| json!({})))
    }

    async fn delete(&self, path: &str) -> Result<Value, TransportError> {
        self.record("DELETE", path, &[], None);

        if let Some(err) = self.failing_paths.get(path) {
            return Err(err.clone());
        }
        Ok(json!({}))
    }

    fn url(&self, path: &str) -> String {
        format!("http://archive.test{path}")
    }
}

// =============================================================================
// Fixture Documents
// =============================================================================

pub fn patient_document(studies: &[&str]) -> Value {
    json!({
        "ID": "p1",
        "Type": "Patient",
        "IsStable": true,
        "MainDicomTags": {
            "PatientName": "DOE^JANE",
            "PatientID": "MRN-0042",
            "PatientSex": "F",
            "PatientBirthDate": "19800215"
        },
        "Studies": studies
    })
}

pub fn study_document(series: &[&str]) -> Value {
    json!({
        "ID": "s1",
        "Type": "Study",
        "ParentPatient": "p1",
        "MainDicomTags": {
            "StudyDate": "20200101",
            "StudyDescription": "MRI BRAIN",
            "StudyID": "A1234",
            "StudyInstanceUID": "1.2.840.113619.2.1",
            "StudyTime": "083000"
        },
        "Series": series
    })
}

pub fn series_document(instances: &[&str]) -> Value {
    json!({
        "ID": "se1",
        "Type": "Series",
        "ParentStudy": "s1",
        "Status": "Complete",
        "IsStable": true,
        "MainDicomTags": {
            "Manufacturer": "SIEMENS",
            "Modality": "MR",
            "ProtocolName": "t1_mprage",
            "SequenceName": "*tfl3d1",
            "SeriesDescription": "T1 MPRAGE",
            "SeriesNumber": "3",
            "SeriesInstanceUID": "1.2.840.113619.2.1.3",
            "SeriesDate": "20200101",
            "SeriesTime": "084512"
        },
        "Instances": instances
    })
}

pub fn instance_document() -> Value {
    json!({
        "ID": "i1",
        "Type": "Instance",
        "ParentSeries": "se1",
        "FileUuid": "b3a9c0d2-8a1f-4b6e-9a55-2f1e6f7a0c11",
        "FileSize": 526482,
        "IndexInSeries": 7,
        "MainDicomTags": {
            "AcquisitionNumber": "1",
            "InstanceNumber": "7",
            "SOPInstanceUID": "1.2.840.113619.2.1.3.7"
        }
    })
}

/// A change-log entry.
pub fn change(id: &str, change_type: &str) -> Value {
    json!({ "ID": id, "ChangeType": change_type })
}

/// A change-log page.
pub fn change_page(changes: Vec<Value>, done: bool, last: u64) -> Value {
    json!({ "Changes": changes, "Done": done, "Last": last })
}
