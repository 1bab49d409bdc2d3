//! Application center back end.
//!
//! Persists applications (with their deployment environments, per-user roles and a free-form
//! JSON data blob) and demands (typed JSON payloads attached to an application), and advances
//! the workflow configured for each demand type through an injected [`workflow::WorkflowEngine`].

pub mod business;
pub mod config;
pub mod error;
pub mod modules;
pub mod rbac;
pub mod router;
pub mod storage;
pub mod telemetry;
pub mod workflow;

pub use business::application::{
    Application, ApplicationFilter, ApplicationId, ApplicationRepository, ApplicationService,
    SqliteApplicationRepository,
};
pub use business::demand::{
    Demand, DemandId, DemandRepository, DemandService, DemandType, DemandTypeRepository,
    DemandTypeService, NewDemand, SqliteDemandRepository, SqliteDemandTypeRepository,
};
pub use business::environment::Environment;
pub use business::RepositoryError;
pub use storage::Database;
