use std::sync::Arc;

use tracing::info;

use super::data::{data_subset, merge_data_subset, DataSubset, DataSubsetError};
use super::domain::{Application, ApplicationFilter, ApplicationId};
use super::repository::ApplicationRepository;
use crate::business::RepositoryError;

/// Facade over the application store used by the HTTP layer and feature modules.
pub struct ApplicationService<R> {
    repository: Arc<R>,
}

impl<R> ApplicationService<R>
where
    R: ApplicationRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn create(&self, application: Application) -> Result<Application, ApplicationServiceError> {
        Ok(self.repository.insert(application)?)
    }

    pub fn get(&self, id: ApplicationId) -> Result<Application, ApplicationServiceError> {
        let application = self
            .repository
            .load(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(application)
    }

    pub fn get_by_code(&self, code: &str) -> Result<Application, ApplicationServiceError> {
        let application = self
            .repository
            .load_by_code(code)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(application)
    }

    pub fn update(&self, application: &Application) -> Result<(), ApplicationServiceError> {
        Ok(self.repository.store(application)?)
    }

    pub fn remove(&self, id: ApplicationId) -> Result<(), ApplicationServiceError> {
        Ok(self.repository.delete(id)?)
    }

    pub fn search(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, ApplicationServiceError> {
        Ok(self.repository.list_by_filter(filter)?)
    }

    /// Replace the raw data blob.
    pub fn save_data(&self, id: ApplicationId, data: &str) -> Result<(), ApplicationServiceError> {
        Ok(self.repository.store_data(id, data)?)
    }

    /// Write one subset into the application's data blob, keeping the other subsets.
    pub fn save_data_subset<S: DataSubset>(
        &self,
        id: ApplicationId,
        subset: &S,
    ) -> Result<String, ApplicationServiceError> {
        let application = self.get(id)?;
        let data = merge_data_subset(application.application_data.as_deref(), subset)?;
        self.repository.store_data(id, &data)?;
        info!(application_id = %id, subset = S::NAME, "application data subset saved");
        Ok(data)
    }

    pub fn data_subset<S: DataSubset>(
        &self,
        id: ApplicationId,
    ) -> Result<Option<S>, ApplicationServiceError> {
        let application = self.get(id)?;
        Ok(data_subset(application.application_data.as_deref())?)
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Data(#[from] DataSubsetError),
}
