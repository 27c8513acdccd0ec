use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::info;

use super::{Patient, Resource, Series};
use crate::error::{ResourceError, TransportError};
use crate::resource::{dicom_date, ResourceHandle, ResourceKind, ResourceProxy};
use crate::transport::{RequestBody, Transport};

/// Tags copied unchanged into an anonymized study.
pub const ANONYMIZE_KEEP: [&str; 2] = ["StudyDescription", "SeriesDescription"];

/// Body of `POST /studies/{id}/anonymize`.
///
/// Patient name and id are both replaced by `obscure_id`.
pub fn anonymization_request(obscure_id: &str) -> Value {
    json!({
        "Replace": {
            "PatientName": obscure_id,
            "PatientID": obscure_id,
        },
        "Keep": ANONYMIZE_KEEP,
    })
}

/// A study on the archive.
#[derive(Debug)]
pub struct Study {
    proxy: ResourceProxy,
}

impl Study {
    /// Lazy handle on `/studies/{id}`.
    pub fn new(transport: Arc<dyn Transport>, id: impl Into<String>) -> Self {
        Self {
            proxy: ResourceProxy::new(transport, ResourceHandle::new(ResourceKind::Study, id)),
        }
    }

    /// StudyDate, parsed from `YYYYMMDD`.
    pub async fn date(&self) -> Option<NaiveDate> {
        self.proxy.tag_with("StudyDate", dicom_date).await
    }

    /// StudyDescription.
    pub async fn description(&self) -> Option<String> {
        self.proxy.tag("StudyDescription").await
    }

    /// The DICOM StudyID.
    pub async fn study_id(&self) -> Option<String> {
        self.proxy.tag("StudyID").await
    }

    /// StudyInstanceUID.
    pub async fn instance_uid(&self) -> Option<String> {
        self.proxy.tag("StudyInstanceUID").await
    }

    /// Raw DICOM TM value.
    pub async fn time(&self) -> Option<String> {
        self.proxy.tag("StudyTime").await
    }

    /// Series of this study, built fresh from the `Series` field on each call.
    pub async fn series(&self) -> Result<Vec<Series>, ResourceError> {
        let ids = self.proxy.field_ids("Series").await?;
        let transport = self.proxy.transport();
        Ok(ids
            .into_iter()
            .map(|id| Series::new(Arc::clone(transport), id))
            .collect())
    }

    /// Number of series; the study must exist.
    pub async fn series_count(&self) -> Result<usize, ResourceError> {
        Ok(self.proxy.field_ids("Series").await?.len())
    }

    /// Parent patient, taken from `ParentPatient`.
    pub async fn patient(&self) -> Result<Patient, ResourceError> {
        let id = self.proxy.field_id("ParentPatient").await?;
        Ok(Patient::new(Arc::clone(self.proxy.transport()), id))
    }

    /// Id of the study this one was anonymized from, if any.
    pub async fn is_anonymized(&self) -> Option<String> {
        self.proxy.field_str("AnonymizedFrom").await
    }

    /// Ask the archive for an anonymized copy of this study.
    ///
    /// Returns the archive's response, which names the new study. `self`
    /// keeps pointing at the original.
    pub async fn anonymize(&self, obscure_id: &str) -> Result<Value, TransportError> {
        let path = format!("{}/anonymize", self.proxy.path());
        info!(study = self.proxy.id(), "requesting anonymized copy");
        self.proxy
            .transport()
            .post(&path, RequestBody::Json(anonymization_request(obscure_id)))
            .await
    }

    /// Push this study to a configured modality.
    pub async fn send_to(&self, modality: &str) -> Result<Value, TransportError> {
        let path = format!("/modalities/{}/store", urlencoding::encode(modality));
        info!(study = self.proxy.id(), modality, "sending study");
        self.proxy
            .transport()
            .post(&path, RequestBody::Raw(self.proxy.id().to_string()))
            .await
    }
}

impl Resource for Study {
    fn proxy(&self) -> &ResourceProxy {
        &self.proxy
    }
}
