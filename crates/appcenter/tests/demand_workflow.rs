//! End-to-end scenarios for applications and demands through the public API of the crate.
//!
//! Each scenario works against a file-backed database so reopened connections see the same rows.

mod common {
    use std::sync::{Arc, Mutex};

    use appcenter::workflow::{StateId, WorkflowEngine, WorkflowError, WorkflowResource};

    #[derive(Default)]
    pub struct RecordingEngine {
        pub initialized: Mutex<Vec<WorkflowResource>>,
        pub executed: Mutex<Vec<WorkflowResource>>,
    }

    impl RecordingEngine {
        pub fn shared() -> Arc<Self> {
            Arc::new(Self::default())
        }
    }

    impl WorkflowEngine for RecordingEngine {
        fn get_state(
            &self,
            resource: &WorkflowResource,
        ) -> Result<Option<StateId>, WorkflowError> {
            self.initialized
                .lock()
                .expect("lock")
                .push(resource.clone());
            Ok(Some(StateId(10)))
        }

        fn execute_automatic_actions(
            &self,
            resource: &WorkflowResource,
        ) -> Result<(), WorkflowError> {
            self.executed.lock().expect("lock").push(resource.clone());
            Ok(())
        }
    }
}

use std::sync::Arc;

use appcenter::business::demand::DEMAND_WORKFLOW_RESOURCE_TYPE;
use appcenter::workflow::WorkflowId;
use appcenter::{
    Application, ApplicationFilter, ApplicationRepository, Database, DemandService, DemandType,
    DemandTypeRepository, Environment, NewDemand, SqliteApplicationRepository,
    SqliteDemandRepository, SqliteDemandTypeRepository,
};
use common::RecordingEngine;
use serde_json::{json, Value};

#[test]
fn demand_on_new_application_triggers_its_workflow_once() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("appcenter.db");
    let db = Database::open(&path).expect("open database");

    let applications = SqliteApplicationRepository::new(db.clone());
    let application = applications
        .insert(Application::new("APP1", "First").with_environments([Environment::Development]))
        .expect("insert application");

    let demand_types = SqliteDemandTypeRepository::new(db.clone());
    demand_types
        .insert(&DemandType::new("T1", "Type one").with_workflow(WorkflowId(5)))
        .expect("insert demand type");

    let engine = RecordingEngine::shared();
    let service = DemandService::new(
        Arc::new(SqliteDemandRepository::new(db.clone())),
        Arc::new(demand_types),
        Arc::clone(&engine),
    );

    service
        .save(&NewDemand::new("T1", json!({ "x": 1 })), &application)
        .expect("save demand");

    let initialized = engine.initialized.lock().expect("lock").clone();
    let executed = engine.executed.lock().expect("lock").clone();
    assert_eq!(initialized.len(), 1);
    assert_eq!(executed, initialized);
    assert_eq!(initialized[0].resource_id, application.id.0);
    assert_eq!(initialized[0].resource_type, DEMAND_WORKFLOW_RESOURCE_TYPE);
    assert_eq!(initialized[0].workflow_id, WorkflowId(5));
    assert_eq!(initialized[0].external_parent_id, None);

    drop(service);
    drop(applications);
    drop(db);

    let reopened = Database::open(&path).expect("reopen database");
    let applications = SqliteApplicationRepository::new(reopened.clone());
    let loaded = applications
        .load_by_code("APP1")
        .expect("load")
        .expect("application persisted");
    assert_eq!(
        loaded.environments.into_iter().collect::<Vec<_>>(),
        vec![Environment::Development]
    );

    let service = DemandService::new(
        Arc::new(SqliteDemandRepository::new(reopened.clone())),
        Arc::new(SqliteDemandTypeRepository::new(reopened)),
        RecordingEngine::shared(),
    );
    let payloads: Vec<Value> = service
        .list_by_application_and_type(application.id, "T1")
        .expect("list demands");
    assert_eq!(payloads, vec![json!({ "x": 1 })]);
}

#[test]
fn search_and_reference_list_follow_store_contents() {
    let db = Database::in_memory().expect("in-memory database");
    let applications = SqliteApplicationRepository::new(db);
    for (code, name) in [("PORTAL", "Citizen portal"), ("BACK", "Back office")] {
        applications
            .insert(Application::new(code, name))
            .expect("insert application");
    }

    let found = applications
        .list_by_filter(&ApplicationFilter::search("portal"))
        .expect("search");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, "PORTAL");

    let everything = applications
        .list_by_filter(&ApplicationFilter::default())
        .expect("list all");
    assert_eq!(everything.len(), 2);

    let references = applications
        .list_as_reference_list()
        .expect("reference list");
    assert_eq!(references.len(), 2);
    assert!(references
        .items()
        .iter()
        .any(|item| item.name == "Back office"));
}
