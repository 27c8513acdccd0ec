use std::sync::Arc;

use super::{Resource, Series};
use crate::error::ResourceError;
use crate::resource::{ResourceHandle, ResourceKind, ResourceProxy};
use crate::transport::Transport;

/// A single DICOM instance on the archive.
///
/// Clones share the cached document.
#[derive(Debug, Clone)]
pub struct Instance {
    proxy: ResourceProxy,
}

impl Instance {
    /// Lazy handle on `/instances/{id}`.
    pub fn new(transport: Arc<dyn Transport>, id: impl Into<String>) -> Self {
        Self {
            proxy: ResourceProxy::new(transport, ResourceHandle::new(ResourceKind::Instance, id)),
        }
    }

    /// Storage area uuid of the attached DICOM file.
    pub async fn file_uid(&self) -> Option<String> {
        self.proxy.field_str("FileUuid").await
    }

    /// Size of the attached DICOM file in bytes.
    pub async fn filesize(&self) -> Option<u64> {
        self.proxy.field_u64("FileSize").await
    }

    /// Position within the parent series.
    pub async fn index(&self) -> Option<u64> {
        self.proxy.field_u64("IndexInSeries").await
    }

    /// AcquisitionNumber (an IS string).
    pub async fn acquisition_number(&self) -> Option<String> {
        self.proxy.tag("AcquisitionNumber").await
    }

    /// InstanceNumber (an IS string).
    pub async fn instance_number(&self) -> Option<String> {
        self.proxy.tag("InstanceNumber").await
    }

    /// SOPInstanceUID.
    pub async fn sop_instance_uid(&self) -> Option<String> {
        self.proxy.tag("SOPInstanceUID").await
    }

    /// Parent series, taken from `ParentSeries`.
    pub async fn series(&self) -> Result<Series, ResourceError> {
        let id = self.proxy.field_id("ParentSeries").await?;
        Ok(Series::new(Arc::clone(self.proxy.transport()), id))
    }

    /// Absolute URL of the rendered preview image.
    ///
    /// Built locally for handing to a viewer; nothing is fetched.
    pub fn preview(&self) -> String {
        let path = format!("{}/preview", self.proxy.path());
        self.proxy.transport().url(&path)
    }
}

impl Resource for Instance {
    fn proxy(&self) -> &ResourceProxy {
        &self.proxy
    }
}
