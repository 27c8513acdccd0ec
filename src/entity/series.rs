use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::OnceCell;

use super::{Instance, Resource, Study};
use crate::error::ResourceError;
use crate::resource::{dicom_date, Document, ResourceHandle, ResourceKind, ResourceProxy};
use crate::transport::Transport;

/// A series on the archive.
#[derive(Debug)]
pub struct Series {
    proxy: ResourceProxy,
    instances: OnceCell<Arc<Vec<Instance>>>,
}

impl Series {
    /// Lazy handle on `/series/{id}`.
    pub fn new(transport: Arc<dyn Transport>, id: impl Into<String>) -> Self {
        Self {
            proxy: ResourceProxy::new(transport, ResourceHandle::new(ResourceKind::Series, id)),
            instances: OnceCell::new(),
        }
    }

    /// Equipment manufacturer.
    pub async fn manufacturer(&self) -> Option<String> {
        self.proxy.tag("Manufacturer").await
    }

    /// Modality code (`CT`, `MR`, ...).
    pub async fn modality(&self) -> Option<String> {
        self.proxy.tag("Modality").await
    }

    /// ProtocolName.
    pub async fn protocol(&self) -> Option<String> {
        self.proxy.tag("ProtocolName").await
    }

    /// SequenceName.
    pub async fn sequence(&self) -> Option<String> {
        self.proxy.tag("SequenceName").await
    }

    /// SeriesDescription.
    pub async fn description(&self) -> Option<String> {
        self.proxy.tag("SeriesDescription").await
    }

    /// SeriesNumber as stored (an IS string).
    pub async fn number(&self) -> Option<String> {
        self.proxy.tag("SeriesNumber").await
    }

    /// SeriesInstanceUID.
    pub async fn instance_uid(&self) -> Option<String> {
        self.proxy.tag("SeriesInstanceUID").await
    }

    /// SeriesDate, `None` unless a valid `YYYYMMDD` value.
    pub async fn date(&self) -> Option<NaiveDate> {
        self.proxy.tag_with("SeriesDate", dicom_date).await
    }

    /// Raw SeriesTime.
    pub async fn time(&self) -> Option<String> {
        self.proxy.tag("SeriesTime").await
    }

    /// Parent study, taken from `ParentStudy`.
    pub async fn study(&self) -> Result<Study, ResourceError> {
        let id = self.proxy.field_id("ParentStudy").await?;
        Ok(Study::new(Arc::clone(self.proxy.transport()), id))
    }

    /// Completeness reported by the archive (`Complete`, `Missing`, `Unknown`, ...).
    pub async fn status(&self) -> Option<String> {
        self.proxy.field_str("Status").await
    }

    /// Whether the archive considers the series complete.
    pub async fn is_stable(&self) -> Option<bool> {
        self.proxy.field_bool("IsStable").await
    }

    /// Instances of this series, in the order the archive lists them.
    ///
    /// Built once from the `Instances` field and memoized.
    pub async fn instances(&self) -> Result<Arc<Vec<Instance>>, ResourceError> {
        self.instances
            .get_or_try_init(|| async {
                let ids = self.proxy.field_ids("Instances").await?;
                let transport = self.proxy.transport();
                let instances: Vec<Instance> = ids
                    .into_iter()
                    .map(|id| Instance::new(Arc::clone(transport), id))
                    .collect();
                Ok::<_, ResourceError>(Arc::new(instances))
            })
            .await
            .cloned()
    }

    /// Number of instances; the series must exist.
    pub async fn num_instances(&self) -> Result<usize, ResourceError> {
        Ok(self.instances().await?.len())
    }

    /// The instance halfway through the series (index `n / 2`).
    ///
    /// Fails with [`ResourceError::EmptySeries`] when there are no instances.
    pub async fn mid_instance(&self) -> Result<Instance, ResourceError> {
        let instances = self.instances().await?;
        instances
            .get(instances.len() / 2)
            .cloned()
            .ok_or_else(|| ResourceError::EmptySeries(self.proxy.id().to_string()))
    }

    /// Preview URL of [`mid_instance`](Self::mid_instance).
    ///
    /// Whether that is a slice through the middle of the volume depends on
    /// the acquisition's slice order.
    pub async fn preview(&self) -> Result<String, ResourceError> {
        Ok(self.mid_instance().await?.preview())
    }

    /// Reload the document and drop the memoized instances.
    pub async fn refresh(&mut self) -> Document {
        self.instances = OnceCell::new();
        self.proxy.reload().await
    }
}

impl Resource for Series {
    fn proxy(&self) -> &ResourceProxy {
        &self.proxy
    }
}
