use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info, warn};

use super::demand_type::{DemandTypeError, DemandTypeService};
use super::domain::{Demand, DemandId, NewDemand, DEMAND_WORKFLOW_RESOURCE_TYPE};
use super::repository::{DemandRepository, DemandTypeRepository};
use crate::business::application::{Application, ApplicationId};
use crate::business::RepositoryError;
use crate::workflow::{WorkflowEngine, WorkflowError, WorkflowResource};

/// Persists demands and starts the workflow bound to their type.
pub struct DemandService<D, T, W: ?Sized> {
    demands: Arc<D>,
    demand_types: DemandTypeService<T>,
    workflow: Arc<W>,
}

impl<D, T, W> DemandService<D, T, W>
where
    D: DemandRepository + 'static,
    T: DemandTypeRepository + 'static,
    W: WorkflowEngine + ?Sized + 'static,
{
    pub fn new(demands: Arc<D>, demand_types: Arc<T>, workflow: Arc<W>) -> Self {
        Self {
            demands,
            demand_types: DemandTypeService::new(demand_types),
            workflow,
        }
    }

    pub fn demands(&self) -> &Arc<D> {
        &self.demands
    }

    pub fn demand_types(&self) -> &DemandTypeService<T> {
        &self.demand_types
    }

    /// Persist the demand, then initialize and advance its workflow.
    ///
    /// The row is kept when the workflow step fails; the error carries its id.
    pub fn save<P: Serialize>(
        &self,
        demand: &NewDemand<P>,
        application: &Application,
    ) -> Result<Demand, DemandServiceError> {
        if !application.id.is_assigned() {
            return Err(DemandServiceError::UnsavedApplication);
        }

        let demand_data = match serde_json::to_string(&demand.payload) {
            Ok(json) => Some(json),
            Err(err) => {
                error!(
                    application_id = %application.id,
                    demand_type = %demand.demand_type,
                    error = %err,
                    "unable to serialize demand payload"
                );
                None
            }
        };

        let created = self.demands.create(Demand::new(
            application.id,
            demand.demand_type.clone(),
            demand_data,
        ))?;

        let workflow_id = self
            .demand_types
            .workflow_id(&created.demand_type)
            .map_err(|source| DemandServiceError::DemandType {
                demand_id: created.id,
                source,
            })?;

        let resource = WorkflowResource::new(
            application.id.0,
            DEMAND_WORKFLOW_RESOURCE_TYPE,
            workflow_id,
        );
        let workflow_failed = |source: WorkflowError| DemandServiceError::Workflow {
            demand_id: created.id,
            source,
        };
        self.workflow.get_state(&resource).map_err(workflow_failed)?;
        self.workflow
            .execute_automatic_actions(&resource)
            .map_err(workflow_failed)?;

        info!(
            demand_id = %created.id,
            application_id = %application.id,
            workflow_id = %workflow_id,
            "demand workflow started"
        );
        Ok(created)
    }

    /// Typed payloads of one demand type; undecodable rows are logged and skipped.
    pub fn list_by_application_and_type<P: DeserializeOwned>(
        &self,
        application: ApplicationId,
        demand_type: &str,
    ) -> Result<Vec<P>, RepositoryError> {
        Ok(self
            .decode_by_application_and_type(application, demand_type)?
            .entries)
    }

    /// Decode every demand of one type, reporting which rows could not be read.
    pub fn decode_by_application_and_type<P: DeserializeOwned>(
        &self,
        application: ApplicationId,
        demand_type: &str,
    ) -> Result<DecodedDemands<P>, RepositoryError> {
        let mut decoded = DecodedDemands {
            entries: Vec::new(),
            failures: Vec::new(),
        };
        for demand in self
            .demands
            .list_by_application_and_type(application, demand_type)?
        {
            match decode_payload(&demand) {
                Ok(payload) => decoded.entries.push(payload),
                Err(reason) => {
                    error!(demand_id = %demand.id, %reason, "unable to decode demand payload");
                    decoded.failures.push(DemandDecodeFailure {
                        demand_id: demand.id,
                        reason,
                    });
                }
            }
        }
        if !decoded.failures.is_empty() {
            warn!(
                application_id = %application,
                demand_type,
                skipped = decoded.failures.len(),
                "demands skipped while decoding"
            );
        }
        Ok(decoded)
    }
}

fn decode_payload<P: DeserializeOwned>(demand: &Demand) -> Result<P, String> {
    let data = demand
        .demand_data
        .as_deref()
        .filter(|data| !data.trim().is_empty())
        .ok_or_else(|| "empty payload".to_string())?;
    serde_json::from_str(data).map_err(|err| err.to_string())
}

/// Outcome of a lossy decode.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedDemands<P> {
    pub entries: Vec<P>,
    pub failures: Vec<DemandDecodeFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandDecodeFailure {
    pub demand_id: DemandId,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DemandServiceError {
    #[error("application must be saved before demands are attached")]
    UnsavedApplication,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("demand {demand_id} saved but its type is misconfigured: {source}")]
    DemandType {
        demand_id: DemandId,
        #[source]
        source: DemandTypeError,
    },
    #[error("demand {demand_id} saved but its workflow failed: {source}")]
    Workflow {
        demand_id: DemandId,
        #[source]
        source: WorkflowError,
    },
}
