use std::collections::{BTreeMap, BTreeSet};

use rusqlite::{params, Connection, OptionalExtension, Params, Row};
use tracing::{debug, info, warn};

use super::domain::{
    Application, ApplicationFilter, ApplicationId, OrganizationManagerId, PhysicalFile,
};
use super::repository::ApplicationRepository;
use crate::business::environment::Environment;
use crate::business::reference::ReferenceList;
use crate::business::RepositoryError;
use crate::storage::Database;

const SQL_QUERY_NEW_PK: &str = "SELECT MAX(id_application) FROM appcenter_application";
const SQL_QUERY_SELECT: &str = "SELECT a.id_application, a.name, a.description, a.id_organization_manager, a.application_data, a.code, a.logo, a.front_url, a.back_url, e.environment_code FROM appcenter_application a LEFT JOIN appcenter_application_environment e ON a.id_application = e.id_application WHERE a.id_application = ?1 ORDER BY e.environment_code";
const SQL_QUERY_SELECT_BY_CODE: &str = "SELECT a.id_application, a.name, a.description, a.id_organization_manager, a.application_data, a.code, a.logo, a.front_url, a.back_url, e.environment_code FROM appcenter_application a LEFT JOIN appcenter_application_environment e ON a.id_application = e.id_application WHERE a.code = ?1 ORDER BY e.environment_code";
const SQL_QUERY_INSERT: &str = "INSERT INTO appcenter_application (id_application, name, description, id_organization_manager, application_data, code, logo, front_url, back_url) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";
const SQL_QUERY_DELETE: &str = "DELETE FROM appcenter_application WHERE id_application = ?1";
const SQL_QUERY_UPDATE: &str = "UPDATE appcenter_application SET name = ?1, description = ?2, id_organization_manager = ?3, code = ?4, logo = ?5, front_url = ?6, back_url = ?7 WHERE id_application = ?8";
const SQL_QUERY_UPDATE_DATA: &str =
    "UPDATE appcenter_application SET application_data = ?1 WHERE id_application = ?2";
const SQL_QUERY_SELECTALL: &str = "SELECT id_application, name, description, id_organization_manager, application_data, code, logo, front_url, back_url FROM appcenter_application";
const SQL_QUERY_ORDER: &str = " ORDER BY id_application";
const SQL_QUERY_WHERE_SEARCH: &str = " WHERE (appcenter_fold(code) LIKE ?1 ESCAPE '\\' OR appcenter_fold(name) LIKE ?2 ESCAPE '\\')";
const SQL_QUERY_DELETE_AUTHORIZED: &str =
    "DELETE FROM appcenter_user_application_role WHERE id_application = ?1";
const SQL_QUERY_SELECT_USER_ROLE: &str = "SELECT id_role FROM appcenter_user_application_role WHERE id_application = ?1 AND id_user = ?2";
const SQL_QUERY_UPSERT_USER_ROLE: &str = "INSERT INTO appcenter_user_application_role (id_application, id_user, id_role) VALUES (?1, ?2, ?3) ON CONFLICT (id_application, id_user) DO UPDATE SET id_role = excluded.id_role";
const SQL_QUERY_INSERT_ENVIRONMENT: &str =
    "INSERT INTO appcenter_application_environment (id_application, environment_code) VALUES (?1, ?2)";
const SQL_QUERY_DELETE_ENVIRONMENT: &str =
    "DELETE FROM appcenter_application_environment WHERE id_application = ?1";

const ENVIRONMENT_CODE_COLUMN: usize = 9;

/// `ApplicationRepository` over the shared SQLite database.
#[derive(Clone)]
pub struct SqliteApplicationRepository {
    db: Database,
}

impl SqliteApplicationRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl ApplicationRepository for SqliteApplicationRepository {
    fn next_id(&self) -> Result<ApplicationId, RepositoryError> {
        self.db.with_connection(new_primary_key)
    }

    fn insert(&self, mut application: Application) -> Result<Application, RepositoryError> {
        let application = self.db.transaction(|conn| {
            application.id = new_primary_key(conn)?;
            conn.execute(
                SQL_QUERY_INSERT,
                params![
                    application.id.0,
                    application.name,
                    application.description,
                    application.organization_manager.map(|manager| manager.0),
                    application.application_data,
                    application.code,
                    application.logo.value(),
                    application.front_url,
                    application.back_url,
                ],
            )?;
            insert_environments(conn, application.id, &application.environments)?;
            Ok(application)
        })?;

        info!(
            application_id = %application.id,
            code = %application.code,
            environments = application.environments.len(),
            "application created"
        );
        Ok(application)
    }

    fn load(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        debug!(application_id = %id, "loading application");
        self.db
            .with_connection(|conn| load_with_environments(conn, SQL_QUERY_SELECT, params![id.0]))
    }

    fn load_by_code(&self, code: &str) -> Result<Option<Application>, RepositoryError> {
        debug!(code, "loading application by code");
        self.db.with_connection(|conn| {
            load_with_environments(conn, SQL_QUERY_SELECT_BY_CODE, params![code])
        })
    }

    fn delete(&self, id: ApplicationId) -> Result<(), RepositoryError> {
        self.db.transaction(|conn| {
            conn.execute(SQL_QUERY_DELETE, params![id.0])?;
            conn.execute(SQL_QUERY_DELETE_ENVIRONMENT, params![id.0])?;
            conn.execute(SQL_QUERY_DELETE_AUTHORIZED, params![id.0])?;
            Ok(())
        })?;

        info!(application_id = %id, "application deleted");
        Ok(())
    }

    fn store(&self, application: &Application) -> Result<(), RepositoryError> {
        self.db.transaction(|conn| {
            let updated = conn.execute(
                SQL_QUERY_UPDATE,
                params![
                    application.name,
                    application.description,
                    application.organization_manager.map(|manager| manager.0),
                    application.code,
                    application.logo.value(),
                    application.front_url,
                    application.back_url,
                    application.id.0,
                ],
            )?;
            if updated == 0 {
                return Err(RepositoryError::NotFound);
            }

            conn.execute(SQL_QUERY_DELETE_ENVIRONMENT, params![application.id.0])?;
            insert_environments(conn, application.id, &application.environments)
        })?;

        info!(
            application_id = %application.id,
            environments = application.environments.len(),
            "application updated"
        );
        Ok(())
    }

    fn store_data(&self, id: ApplicationId, data: &str) -> Result<(), RepositoryError> {
        let updated = self
            .db
            .transaction(|conn| Ok(conn.execute(SQL_QUERY_UPDATE_DATA, params![data, id.0])?))?;
        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }

        info!(application_id = %id, bytes = data.len(), "application data updated");
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Application>, RepositoryError> {
        let sql = format!("{SQL_QUERY_SELECTALL}{SQL_QUERY_ORDER}");
        self.db
            .with_connection(|conn| select_applications(conn, &sql, []))
    }

    fn list_by_filter(
        &self,
        filter: &ApplicationFilter,
    ) -> Result<Vec<Application>, RepositoryError> {
        match filter.search_term() {
            Some(term) => {
                let sql = format!("{SQL_QUERY_SELECTALL}{SQL_QUERY_WHERE_SEARCH}{SQL_QUERY_ORDER}");
                let pattern = like_pattern(&term.to_lowercase());
                self.db.with_connection(|conn| {
                    select_applications(conn, &sql, params![pattern, pattern])
                })
            }
            None => self.list_all(),
        }
    }

    fn list_as_reference_list(&self) -> Result<ReferenceList, RepositoryError> {
        let applications = self.list_all()?;
        let mut list = ReferenceList::new();
        for application in applications {
            list.add_item(application.id, application.name);
        }
        Ok(list)
    }

    fn list_as_map_by_id(&self) -> Result<BTreeMap<ApplicationId, Application>, RepositoryError> {
        Ok(self
            .list_all()?
            .into_iter()
            .map(|application| (application.id, application))
            .collect())
    }

    fn user_role(
        &self,
        id: ApplicationId,
        user_id: &str,
        default_role: i64,
    ) -> Result<i64, RepositoryError> {
        let stored = self.db.with_connection(|conn| {
            Ok(conn
                .query_row(SQL_QUERY_SELECT_USER_ROLE, params![id.0, user_id], |row| {
                    row.get::<_, i64>(0)
                })
                .optional()?)
        })?;
        Ok(stored.unwrap_or(default_role))
    }

    fn assign_user_role(
        &self,
        id: ApplicationId,
        user_id: &str,
        role: i64,
    ) -> Result<(), RepositoryError> {
        self.db.transaction(|conn| {
            conn.execute(SQL_QUERY_UPSERT_USER_ROLE, params![id.0, user_id, role])?;
            Ok(())
        })?;
        info!(application_id = %id, user_id, role, "user role assigned");
        Ok(())
    }
}

fn new_primary_key(conn: &Connection) -> Result<ApplicationId, RepositoryError> {
    let max: Option<i64> = conn.query_row(SQL_QUERY_NEW_PK, [], |row| row.get(0))?;
    Ok(ApplicationId(max.unwrap_or(0) + 1))
}

fn insert_environments(
    conn: &Connection,
    id: ApplicationId,
    environments: &BTreeSet<Environment>,
) -> Result<(), RepositoryError> {
    let mut stmt = conn.prepare(SQL_QUERY_INSERT_ENVIRONMENT)?;
    for environment in environments {
        stmt.execute(params![id.0, environment.prefix()])?;
    }
    Ok(())
}

fn map_application(row: &Row<'_>) -> rusqlite::Result<Application> {
    let organization_manager: Option<i64> = row.get(3)?;
    let logo: Option<Vec<u8>> = row.get(6)?;
    Ok(Application {
        id: ApplicationId(row.get(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        organization_manager: organization_manager.map(OrganizationManagerId),
        application_data: row.get(4)?,
        code: row.get(5)?,
        logo: PhysicalFile::new(logo.unwrap_or_default()),
        front_url: row.get(7)?,
        back_url: row.get(8)?,
        environments: BTreeSet::new(),
    })
}

fn select_applications<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<Application>, RepositoryError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map_application)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// The join yields one row per environment; scalar fields come from the first row and the
/// environment codes of every row are folded into one set.
fn load_with_environments<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Option<Application>, RepositoryError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| {
        let code: Option<String> = row.get(ENVIRONMENT_CODE_COLUMN)?;
        Ok((map_application(row)?, code))
    })?;

    let mut application: Option<Application> = None;
    let mut codes = Vec::new();
    for row in rows {
        let (candidate, code) = row?;
        application.get_or_insert(candidate);
        codes.extend(code);
    }

    Ok(application.map(|mut application| {
        application.environments = decode_environments(application.id, &codes);
        application
    }))
}

fn decode_environments(id: ApplicationId, codes: &[String]) -> BTreeSet<Environment> {
    codes
        .iter()
        .filter_map(|code| {
            let environment = Environment::from_code(code);
            if environment.is_none() {
                warn!(application_id = %id, code = %code, "skipping unknown environment code");
            }
            environment
        })
        .collect()
}

fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
