use appcenter::business::demand::DemandTypeIdService;
use appcenter::rbac::InMemoryResourceTypeRegistry;
use appcenter::router::AppCenter;
use appcenter::workflow::{StateId, WorkflowEngine, WorkflowError, WorkflowId, WorkflowResource};
use appcenter::{
    ApplicationService, Database, DemandService, SqliteApplicationRepository,
    SqliteDemandRepository, SqliteDemandTypeRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type SqliteAppCenter = AppCenter<
    SqliteApplicationRepository,
    SqliteDemandRepository,
    SqliteDemandTypeRepository,
    InProcessWorkflowEngine,
>;

type ResourceKey = (i64, String, WorkflowId);

/// Workflow engine kept in process memory.
///
/// Every workflow starts resources on `StateId(1)`; automatic actions are counted, not run.
#[derive(Default)]
pub(crate) struct InProcessWorkflowEngine {
    states: Mutex<HashMap<ResourceKey, StateId>>,
    automatic_runs: Mutex<HashMap<ResourceKey, u32>>,
}

pub(crate) const INITIAL_STATE: StateId = StateId(1);

impl InProcessWorkflowEngine {
    fn key(resource: &WorkflowResource) -> ResourceKey {
        (
            resource.resource_id,
            resource.resource_type.clone(),
            resource.workflow_id,
        )
    }

    pub(crate) fn automatic_runs(&self, resource: &WorkflowResource) -> u32 {
        self.automatic_runs
            .lock()
            .map(|runs| runs.get(&Self::key(resource)).copied().unwrap_or(0))
            .unwrap_or(0)
    }
}

impl WorkflowEngine for InProcessWorkflowEngine {
    fn get_state(&self, resource: &WorkflowResource) -> Result<Option<StateId>, WorkflowError> {
        let mut states = self
            .states
            .lock()
            .map_err(|_| WorkflowError::Unavailable("state table poisoned".to_string()))?;
        let state = *states.entry(Self::key(resource)).or_insert_with(|| {
            info!(
                resource_id = resource.resource_id,
                resource_type = %resource.resource_type,
                workflow_id = %resource.workflow_id,
                "workflow resource initialized"
            );
            INITIAL_STATE
        });
        Ok(Some(state))
    }

    fn execute_automatic_actions(&self, resource: &WorkflowResource) -> Result<(), WorkflowError> {
        let mut runs = self
            .automatic_runs
            .lock()
            .map_err(|_| WorkflowError::Unavailable("action log poisoned".to_string()))?;
        *runs.entry(Self::key(resource)).or_default() += 1;
        Ok(())
    }
}

/// Wire the SQLite stores, the in-process engine and the permission registry together.
pub(crate) fn build_appcenter(
    db: &Database,
    engine: Arc<InProcessWorkflowEngine>,
    registry: &InMemoryResourceTypeRegistry,
) -> SqliteAppCenter {
    DemandTypeIdService::<SqliteDemandTypeRepository>::register(registry);
    AppCenter::new(
        ApplicationService::new(Arc::new(SqliteApplicationRepository::new(db.clone()))),
        DemandService::new(
            Arc::new(SqliteDemandRepository::new(db.clone())),
            Arc::new(SqliteDemandTypeRepository::new(db.clone())),
            engine,
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use appcenter::business::demand::{DEMAND_WORKFLOW_RESOURCE_TYPE, RBAC_RESOURCE_DEMAND_TYPE};

    #[test]
    fn engine_initializes_once_and_counts_actions() {
        let engine = InProcessWorkflowEngine::default();
        let resource = WorkflowResource::new(4, DEMAND_WORKFLOW_RESOURCE_TYPE, WorkflowId(2));

        assert_eq!(engine.get_state(&resource).expect("state"), Some(INITIAL_STATE));
        assert_eq!(engine.get_state(&resource).expect("state"), Some(INITIAL_STATE));
        engine
            .execute_automatic_actions(&resource)
            .expect("actions");
        assert_eq!(engine.automatic_runs(&resource), 1);
    }

    #[test]
    fn build_registers_demand_type_resource() {
        let db = Database::in_memory().expect("database");
        let registry = InMemoryResourceTypeRegistry::default();
        build_appcenter(&db, Arc::new(InProcessWorkflowEngine::default()), &registry);
        assert!(registry.get(RBAC_RESOURCE_DEMAND_TYPE).is_some());
    }
}
