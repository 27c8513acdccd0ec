use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::OnceCell;

use super::{Resource, Study};
use crate::error::ResourceError;
use crate::resource::{dicom_date, Document, ResourceHandle, ResourceKind, ResourceProxy};
use crate::transport::Transport;

/// A patient on the archive.
#[derive(Debug)]
pub struct Patient {
    proxy: ResourceProxy,
    studies: OnceCell<Arc<Vec<Study>>>,
}

impl Patient {
    /// Lazy handle on `/patients/{id}`; nothing is fetched yet.
    pub fn new(transport: Arc<dyn Transport>, id: impl Into<String>) -> Self {
        Self {
            proxy: ResourceProxy::new(transport, ResourceHandle::new(ResourceKind::Patient, id)),
            studies: OnceCell::new(),
        }
    }

    /// PatientName as stored, e.g. `DOE^JANE`.
    pub async fn name(&self) -> Option<String> {
        self.proxy.tag("PatientName").await
    }

    /// Birth date, `None` if absent or not a valid `YYYYMMDD` value.
    pub async fn dob(&self) -> Option<NaiveDate> {
        self.proxy.tag_with("PatientBirthDate", dicom_date).await
    }

    /// PatientSex (`M`, `F`, `O`).
    pub async fn sex(&self) -> Option<String> {
        self.proxy.tag("PatientSex").await
    }

    /// The DICOM PatientID, as opposed to the archive's resource id.
    pub async fn patient_id(&self) -> Option<String> {
        self.proxy.tag("PatientID").await
    }

    /// Studies of this patient.
    ///
    /// Built once from the `Studies` field and memoized: later calls return
    /// the same list even after [`Resource::reload`].
    pub async fn studies(&self) -> Result<Arc<Vec<Study>>, ResourceError> {
        self.studies
            .get_or_try_init(|| async {
                let ids = self.proxy.field_ids("Studies").await?;
                let transport = self.proxy.transport();
                let studies: Vec<Study> = ids
                    .into_iter()
                    .map(|id| Study::new(Arc::clone(transport), id))
                    .collect();
                Ok::<_, ResourceError>(Arc::new(studies))
            })
            .await
            .cloned()
    }

    /// Reload the document and drop the memoized studies.
    pub async fn refresh(&mut self) -> Document {
        self.studies = OnceCell::new();
        self.proxy.reload().await
    }
}

impl Resource for Patient {
    fn proxy(&self) -> &ResourceProxy {
        &self.proxy
    }
}
