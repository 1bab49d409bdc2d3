//! Demands: typed JSON requests attached to an application and processed by a workflow.

pub mod demand_type;
pub mod domain;
pub mod repository;
pub mod service;
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use demand_type::{
    DemandType, DemandTypeError, DemandTypeIdService, DemandTypeService,
    DEMAND_TYPE_PERMISSION_VIEW, RBAC_RESOURCE_DEMAND_TYPE,
};
pub use domain::{Demand, DemandId, NewDemand, DEMAND_WORKFLOW_RESOURCE_TYPE};
pub use repository::{DemandRepository, DemandTypeRepository};
pub use service::{DecodedDemands, DemandDecodeFailure, DemandService, DemandServiceError};
pub use sqlite::{SqliteDemandRepository, SqliteDemandTypeRepository};
