use std::sync::{Arc, Mutex};

use crate::business::application::{
    Application, ApplicationRepository, SqliteApplicationRepository,
};
use crate::business::demand::{
    DemandService, DemandType, DemandTypeRepository, SqliteDemandRepository,
    SqliteDemandTypeRepository,
};
use crate::storage::Database;
use crate::workflow::{StateId, WorkflowEngine, WorkflowError, WorkflowId, WorkflowResource};

pub(super) type TestDemandService<W> =
    DemandService<SqliteDemandRepository, SqliteDemandTypeRepository, W>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum WorkflowCall {
    GetState(WorkflowResource),
    ExecuteAutomaticActions(WorkflowResource),
}

#[derive(Debug, Default)]
pub(super) struct RecordingWorkflowEngine {
    calls: Mutex<Vec<WorkflowCall>>,
}

impl RecordingWorkflowEngine {
    pub(super) fn calls(&self) -> Vec<WorkflowCall> {
        self.calls.lock().expect("calls lock").clone()
    }
}

impl WorkflowEngine for RecordingWorkflowEngine {
    fn get_state(&self, resource: &WorkflowResource) -> Result<Option<StateId>, WorkflowError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(WorkflowCall::GetState(resource.clone()));
        Ok(Some(StateId(1)))
    }

    fn execute_automatic_actions(&self, resource: &WorkflowResource) -> Result<(), WorkflowError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(WorkflowCall::ExecuteAutomaticActions(resource.clone()));
        Ok(())
    }
}

/// Engine whose every call fails as if the workflow definition were missing.
pub(super) struct FailingWorkflowEngine;

impl WorkflowEngine for FailingWorkflowEngine {
    fn get_state(&self, resource: &WorkflowResource) -> Result<Option<StateId>, WorkflowError> {
        Err(WorkflowError::UnknownWorkflow(resource.workflow_id))
    }

    fn execute_automatic_actions(&self, resource: &WorkflowResource) -> Result<(), WorkflowError> {
        Err(WorkflowError::UnknownWorkflow(resource.workflow_id))
    }
}

pub(super) struct Fixture<W> {
    pub db: Database,
    pub service: TestDemandService<W>,
    pub engine: Arc<W>,
    pub application: Application,
}

pub(super) fn fixture<W: WorkflowEngine + 'static>(engine: W) -> Fixture<W> {
    let db = Database::in_memory().expect("in-memory database");
    let applications = SqliteApplicationRepository::new(db.clone());
    let application = applications
        .insert(Application::new("APP1", "First"))
        .expect("insert application");

    let demand_types = Arc::new(SqliteDemandTypeRepository::new(db.clone()));
    demand_types
        .insert(&DemandType::new("T1", "Type one").with_workflow(WorkflowId(3)))
        .expect("insert demand type");
    demand_types
        .insert(&DemandType::new("MANUAL", "No workflow"))
        .expect("insert demand type without workflow");

    let engine = Arc::new(engine);
    let service = DemandService::new(
        Arc::new(SqliteDemandRepository::new(db.clone())),
        demand_types,
        Arc::clone(&engine),
    );
    Fixture {
        db,
        service,
        engine,
        application,
    }
}
