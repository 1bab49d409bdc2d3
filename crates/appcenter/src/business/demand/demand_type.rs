use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::repository::DemandTypeRepository;
use crate::business::reference::ReferenceList;
use crate::business::RepositoryError;
use crate::rbac::{ResourceType, ResourceTypeRegistry};
use crate::workflow::WorkflowId;

pub const RBAC_RESOURCE_DEMAND_TYPE: &str = "APPCENTER_DEMAND_TYPE";
pub const DEMAND_TYPE_PERMISSION_VIEW: &str = "VIEW";

const RESOURCE_TYPE_LABEL_KEY: &str = "appcenter.rbac.demand_type.resourceType";
const PERMISSION_VIEW_TITLE_KEY: &str = "appcenter.rbac.demand_type.permission.view";

/// Kind of demand, bound to the workflow that processes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemandType {
    pub id_demand_type: String,
    pub label: String,
    pub id_workflow: Option<WorkflowId>,
}

impl DemandType {
    pub fn new(id_demand_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id_demand_type: id_demand_type.into(),
            label: label.into(),
            id_workflow: None,
        }
    }

    pub fn with_workflow(mut self, workflow: WorkflowId) -> Self {
        self.id_workflow = Some(workflow);
        self
    }
}

/// Demand type configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum DemandTypeError {
    #[error("demand type `{0}` is not defined")]
    UnknownType(String),
    #[error("demand type `{0}` has no workflow")]
    NoWorkflow(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Lookups over demand type definitions.
pub struct DemandTypeService<T> {
    repository: Arc<T>,
}

impl<T> DemandTypeService<T>
where
    T: DemandTypeRepository + 'static,
{
    pub fn new(repository: Arc<T>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<T> {
        &self.repository
    }

    pub fn get(&self, demand_type: &str) -> Result<DemandType, DemandTypeError> {
        self.repository
            .find(demand_type)?
            .ok_or_else(|| DemandTypeError::UnknownType(demand_type.to_string()))
    }

    pub fn workflow_id(&self, demand_type: &str) -> Result<WorkflowId, DemandTypeError> {
        self.get(demand_type)?
            .id_workflow
            .ok_or_else(|| DemandTypeError::NoWorkflow(demand_type.to_string()))
    }

    pub fn label(&self, demand_type: &str) -> Result<String, DemandTypeError> {
        Ok(self.get(demand_type)?.label)
    }
}

/// Exposes demand types as permission resources.
pub struct DemandTypeIdService<T> {
    repository: Arc<T>,
}

impl<T> DemandTypeIdService<T>
where
    T: DemandTypeRepository + 'static,
{
    pub fn new(repository: Arc<T>) -> Self {
        Self { repository }
    }

    /// Declare the demand type resource and its VIEW permission.
    pub fn register(registry: &dyn ResourceTypeRegistry) {
        let mut resource_type = ResourceType::new(RBAC_RESOURCE_DEMAND_TYPE, RESOURCE_TYPE_LABEL_KEY);
        resource_type.register_permission(DEMAND_TYPE_PERMISSION_VIEW, PERMISSION_VIEW_TITLE_KEY);
        registry.register_resource_type(resource_type);
        info!(resource_type = RBAC_RESOURCE_DEMAND_TYPE, "demand type resource registered");
    }

    pub fn resource_id_list(&self) -> Result<ReferenceList, RepositoryError> {
        let mut list = ReferenceList::new();
        for demand_type in self.repository.list()? {
            list.add_item(demand_type.id_demand_type, demand_type.label);
        }
        Ok(list)
    }

    pub fn title(&self, id_demand_type: &str) -> Result<Option<String>, RepositoryError> {
        Ok(self
            .repository
            .find(id_demand_type)?
            .map(|demand_type| demand_type.label))
    }
}
