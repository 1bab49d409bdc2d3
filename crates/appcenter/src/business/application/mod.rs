//! Applications, their deployment environments and per-user roles.

pub mod data;
pub mod domain;
pub mod repository;
pub mod service;
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use data::{data_subset, merge_data_subset, DataSubset, DataSubsetError};
pub use domain::{
    Application, ApplicationFilter, ApplicationId, OrganizationManagerId, PhysicalFile,
};
pub use repository::ApplicationRepository;
pub use service::{ApplicationService, ApplicationServiceError};
pub use sqlite::SqliteApplicationRepository;
