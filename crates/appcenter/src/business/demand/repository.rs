use super::demand_type::DemandType;
use super::domain::{Demand, DemandId};
use crate::business::application::ApplicationId;
use crate::business::RepositoryError;

/// Storage abstraction for demand rows.
pub trait DemandRepository: Send + Sync {
    /// Persist a demand, returning it with the id assigned by the store.
    fn create(&self, demand: Demand) -> Result<Demand, RepositoryError>;

    fn find(&self, id: DemandId) -> Result<Option<Demand>, RepositoryError>;

    /// Demands of one type for one application, oldest first.
    fn list_by_application_and_type(
        &self,
        application: ApplicationId,
        demand_type: &str,
    ) -> Result<Vec<Demand>, RepositoryError>;

    fn list_by_application(&self, application: ApplicationId)
        -> Result<Vec<Demand>, RepositoryError>;

    fn delete(&self, id: DemandId) -> Result<(), RepositoryError>;
}

/// Storage abstraction for demand type definitions.
pub trait DemandTypeRepository: Send + Sync {
    fn find(&self, id_demand_type: &str) -> Result<Option<DemandType>, RepositoryError>;

    fn list(&self) -> Result<Vec<DemandType>, RepositoryError>;

    fn insert(&self, demand_type: &DemandType) -> Result<(), RepositoryError>;
}
