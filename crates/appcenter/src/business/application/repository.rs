use std::collections::BTreeMap;

use super::domain::{Application, ApplicationFilter, ApplicationId};
use crate::business::reference::ReferenceList;
use crate::business::RepositoryError;

/// Storage abstraction for applications, their environments and user roles.
///
/// Bulk listings return summary views: only `load` and `load_by_code` populate the
/// environment set.
pub trait ApplicationRepository: Send + Sync {
    /// One more than the highest stored id, `1` for an empty store.
    fn next_id(&self) -> Result<ApplicationId, RepositoryError>;

    /// Persist a new application and its environments, returning it with its assigned id.
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;

    fn load(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;

    fn load_by_code(&self, code: &str) -> Result<Option<Application>, RepositoryError>;

    /// Remove the application with its environment and user role rows.
    fn delete(&self, id: ApplicationId) -> Result<(), RepositoryError>;

    /// Update every field except the data blob and replace the whole environment set.
    fn store(&self, application: &Application) -> Result<(), RepositoryError>;

    /// Update only the data blob.
    fn store_data(&self, id: ApplicationId, data: &str) -> Result<(), RepositoryError>;

    fn list_all(&self) -> Result<Vec<Application>, RepositoryError>;

    fn list_by_filter(&self, filter: &ApplicationFilter)
        -> Result<Vec<Application>, RepositoryError>;

    fn list_as_reference_list(&self) -> Result<ReferenceList, RepositoryError>;

    fn list_as_map_by_id(&self) -> Result<BTreeMap<ApplicationId, Application>, RepositoryError>;

    /// Role of `user_id` on the application, or `default_role` when none is stored.
    fn user_role(
        &self,
        id: ApplicationId,
        user_id: &str,
        default_role: i64,
    ) -> Result<i64, RepositoryError>;

    fn assign_user_role(
        &self,
        id: ApplicationId,
        user_id: &str,
        role: i64,
    ) -> Result<(), RepositoryError>;
}
