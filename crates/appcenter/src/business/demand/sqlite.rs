use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};

use super::demand_type::DemandType;
use super::domain::{Demand, DemandId};
use super::repository::{DemandRepository, DemandTypeRepository};
use crate::business::application::ApplicationId;
use crate::business::RepositoryError;
use crate::storage::Database;
use crate::workflow::WorkflowId;

const SQL_QUERY_INSERT: &str = "INSERT INTO appcenter_demand (id_application, demand_type, demand_data, creation_date) VALUES (?1, ?2, ?3, ?4)";
const SQL_QUERY_SELECT: &str = "SELECT id_demand, id_application, demand_type, demand_data, creation_date FROM appcenter_demand WHERE id_demand = ?1";
const SQL_QUERY_SELECT_BY_APPLICATION_AND_TYPE: &str = "SELECT id_demand, id_application, demand_type, demand_data, creation_date FROM appcenter_demand WHERE id_application = ?1 AND demand_type = ?2 ORDER BY id_demand";
const SQL_QUERY_SELECT_BY_APPLICATION: &str = "SELECT id_demand, id_application, demand_type, demand_data, creation_date FROM appcenter_demand WHERE id_application = ?1 ORDER BY id_demand";
const SQL_QUERY_DELETE: &str = "DELETE FROM appcenter_demand WHERE id_demand = ?1";

const SQL_QUERY_INSERT_TYPE: &str =
    "INSERT INTO appcenter_demand_type (id_demand_type, label, id_workflow) VALUES (?1, ?2, ?3)";
const SQL_QUERY_SELECT_TYPE: &str = "SELECT id_demand_type, label, id_workflow FROM appcenter_demand_type WHERE id_demand_type = ?1";
const SQL_QUERY_SELECTALL_TYPE: &str =
    "SELECT id_demand_type, label, id_workflow FROM appcenter_demand_type ORDER BY id_demand_type";

/// `DemandRepository` over the shared SQLite database.
#[derive(Clone)]
pub struct SqliteDemandRepository {
    db: Database,
}

impl SqliteDemandRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl DemandRepository for SqliteDemandRepository {
    fn create(&self, mut demand: Demand) -> Result<Demand, RepositoryError> {
        let demand = self.db.transaction(|conn| {
            conn.execute(
                SQL_QUERY_INSERT,
                params![
                    demand.id_application.0,
                    demand.demand_type,
                    demand.demand_data,
                    demand.creation_date,
                ],
            )?;
            demand.id = DemandId(conn.last_insert_rowid());
            Ok(demand)
        })?;

        info!(
            demand_id = %demand.id,
            application_id = %demand.id_application,
            demand_type = %demand.demand_type,
            "demand created"
        );
        Ok(demand)
    }

    fn find(&self, id: DemandId) -> Result<Option<Demand>, RepositoryError> {
        self.db.with_connection(|conn| {
            Ok(conn
                .query_row(SQL_QUERY_SELECT, params![id.0], map_demand)
                .optional()?)
        })
    }

    fn list_by_application_and_type(
        &self,
        application: ApplicationId,
        demand_type: &str,
    ) -> Result<Vec<Demand>, RepositoryError> {
        debug!(application_id = %application, demand_type, "listing demands");
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(SQL_QUERY_SELECT_BY_APPLICATION_AND_TYPE)?;
            let rows = stmt.query_map(params![application.0, demand_type], map_demand)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }

    fn list_by_application(
        &self,
        application: ApplicationId,
    ) -> Result<Vec<Demand>, RepositoryError> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(SQL_QUERY_SELECT_BY_APPLICATION)?;
            let rows = stmt.query_map(params![application.0], map_demand)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }

    fn delete(&self, id: DemandId) -> Result<(), RepositoryError> {
        self.db.transaction(|conn| {
            conn.execute(SQL_QUERY_DELETE, params![id.0])?;
            Ok(())
        })?;
        info!(demand_id = %id, "demand deleted");
        Ok(())
    }
}

fn map_demand(row: &Row<'_>) -> rusqlite::Result<Demand> {
    Ok(Demand {
        id: DemandId(row.get(0)?),
        id_application: ApplicationId(row.get(1)?),
        demand_type: row.get(2)?,
        demand_data: row.get(3)?,
        creation_date: row.get(4)?,
    })
}

/// `DemandTypeRepository` over the shared SQLite database.
#[derive(Clone)]
pub struct SqliteDemandTypeRepository {
    db: Database,
}

impl SqliteDemandTypeRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl DemandTypeRepository for SqliteDemandTypeRepository {
    fn find(&self, id_demand_type: &str) -> Result<Option<DemandType>, RepositoryError> {
        self.db.with_connection(|conn| {
            Ok(conn
                .query_row(SQL_QUERY_SELECT_TYPE, params![id_demand_type], map_demand_type)
                .optional()?)
        })
    }

    fn list(&self) -> Result<Vec<DemandType>, RepositoryError> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(SQL_QUERY_SELECTALL_TYPE)?;
            let rows = stmt.query_map([], map_demand_type)?;
            Ok(rows.collect::<Result<Vec<_>, _>>()?)
        })
    }

    fn insert(&self, demand_type: &DemandType) -> Result<(), RepositoryError> {
        self.db.transaction(|conn| {
            conn.execute(
                SQL_QUERY_INSERT_TYPE,
                params![
                    demand_type.id_demand_type,
                    demand_type.label,
                    demand_type.id_workflow.map(|workflow| workflow.0),
                ],
            )?;
            Ok(())
        })?;
        info!(demand_type = %demand_type.id_demand_type, "demand type created");
        Ok(())
    }
}

fn map_demand_type(row: &Row<'_>) -> rusqlite::Result<DemandType> {
    let id_workflow: Option<i64> = row.get(2)?;
    Ok(DemandType {
        id_demand_type: row.get(0)?,
        label: row.get(1)?,
        id_workflow: id_workflow.map(WorkflowId),
    })
}
