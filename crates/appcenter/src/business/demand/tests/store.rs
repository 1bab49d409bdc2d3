use chrono::Utc;

use crate::business::application::ApplicationId;
use crate::business::demand::{
    Demand, DemandId, DemandRepository, DemandType, DemandTypeRepository,
    SqliteDemandRepository, SqliteDemandTypeRepository,
};
use crate::business::RepositoryError;
use crate::storage::Database;
use crate::workflow::WorkflowId;

fn stores() -> (SqliteDemandRepository, SqliteDemandTypeRepository) {
    let db = Database::in_memory().expect("in-memory database");
    (
        SqliteDemandRepository::new(db.clone()),
        SqliteDemandTypeRepository::new(db),
    )
}

#[test]
fn create_assigns_increasing_ids_and_keeps_fields() {
    let (demands, _) = stores();
    let first = demands
        .create(Demand::new(ApplicationId(1), "T1", Some(r#"{"x":1}"#.to_string())))
        .expect("create first demand");
    let second = demands
        .create(Demand::new(ApplicationId(1), "T1", None))
        .expect("create second demand");

    assert!(first.id.0 > 0);
    assert!(second.id > first.id);

    let loaded = demands.find(first.id).expect("find").expect("demand exists");
    assert_eq!(loaded.id_application, ApplicationId(1));
    assert_eq!(loaded.demand_type, "T1");
    assert_eq!(loaded.demand_data.as_deref(), Some(r#"{"x":1}"#));
    assert_eq!(loaded.creation_date, first.creation_date);
    assert!(loaded.creation_date <= Utc::now());
}

#[test]
fn listing_filters_by_application_and_type_in_creation_order() {
    let (demands, _) = stores();
    let a = demands
        .create(Demand::new(ApplicationId(1), "T1", Some("1".to_string())))
        .expect("create");
    demands
        .create(Demand::new(ApplicationId(1), "T2", Some("2".to_string())))
        .expect("create");
    demands
        .create(Demand::new(ApplicationId(2), "T1", Some("3".to_string())))
        .expect("create");
    let d = demands
        .create(Demand::new(ApplicationId(1), "T1", Some("4".to_string())))
        .expect("create");

    let ids: Vec<DemandId> = demands
        .list_by_application_and_type(ApplicationId(1), "T1")
        .expect("list")
        .into_iter()
        .map(|demand| demand.id)
        .collect();
    assert_eq!(ids, vec![a.id, d.id]);
    assert_eq!(
        demands
            .list_by_application(ApplicationId(1))
            .expect("list by application")
            .len(),
        3
    );
    assert!(demands
        .list_by_application_and_type(ApplicationId(9), "T1")
        .expect("list")
        .is_empty());
}

#[test]
fn delete_removes_only_the_target_demand() {
    let (demands, _) = stores();
    let kept = demands
        .create(Demand::new(ApplicationId(1), "T1", None))
        .expect("create");
    let removed = demands
        .create(Demand::new(ApplicationId(1), "T1", None))
        .expect("create");

    demands.delete(removed.id).expect("delete");

    assert!(demands.find(removed.id).expect("find").is_none());
    assert!(demands.find(kept.id).expect("find").is_some());
}

#[test]
fn demand_types_round_trip_with_optional_workflow() {
    let (_, types) = stores();
    types
        .insert(&DemandType::new("T1", "Type one").with_workflow(WorkflowId(4)))
        .expect("insert T1");
    types
        .insert(&DemandType::new("A0", "Manual"))
        .expect("insert A0");

    let t1 = types.find("T1").expect("find").expect("T1 exists");
    assert_eq!(t1.id_workflow, Some(WorkflowId(4)));
    assert_eq!(types.find("A0").expect("find").and_then(|t| t.id_workflow), None);
    assert!(types.find("NOPE").expect("find").is_none());

    let ids: Vec<String> = types
        .list()
        .expect("list")
        .into_iter()
        .map(|t| t.id_demand_type)
        .collect();
    assert_eq!(ids, vec!["A0".to_string(), "T1".to_string()]);
}

#[test]
fn duplicate_demand_type_is_a_conflict() {
    let (_, types) = stores();
    types.insert(&DemandType::new("T1", "Type one")).expect("insert");
    assert!(matches!(
        types.insert(&DemandType::new("T1", "Again")),
        Err(RepositoryError::Conflict(_))
    ));
}
