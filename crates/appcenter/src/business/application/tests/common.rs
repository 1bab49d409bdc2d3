use rusqlite::params;

use crate::business::application::domain::{
    Application, ApplicationId, OrganizationManagerId, PhysicalFile,
};
use crate::business::application::sqlite::SqliteApplicationRepository;
use crate::business::environment::Environment;
use crate::storage::Database;

pub(super) fn repository() -> (Database, SqliteApplicationRepository) {
    let db = Database::in_memory().expect("in-memory database");
    let repository = SqliteApplicationRepository::new(db.clone());
    (db, repository)
}

pub(super) fn application(code: &str, name: &str) -> Application {
    Application {
        description: format!("{name} description"),
        organization_manager: Some(OrganizationManagerId(7)),
        application_data: Some(r#"{"sources":{"siteRepository":"https://scm/site"}}"#.to_string()),
        logo: PhysicalFile::new(vec![0x89, b'P', b'N', b'G', 0, 1, 2]),
        front_url: format!("https://{}.example.org", code.to_lowercase()),
        back_url: format!("https://{}.example.org/admin", code.to_lowercase()),
        ..Application::new(code, name)
    }
    .with_environments([Environment::Development, Environment::Production])
}

pub(super) fn count_rows(db: &Database, table: &str, id: ApplicationId) -> i64 {
    let sql = format!("SELECT COUNT(*) FROM {table} WHERE id_application = ?1");
    db.with_connection(|conn| Ok(conn.query_row(&sql, params![id.0], |row| row.get(0))?))
        .expect("count rows")
}

pub(super) fn insert_raw_environment(db: &Database, id: ApplicationId, code: &str) {
    db.transaction(|conn| {
        conn.execute(
            "INSERT INTO appcenter_application_environment (id_application, environment_code) VALUES (?1, ?2)",
            params![id.0, code],
        )?;
        Ok(())
    })
    .expect("insert raw environment row");
}
