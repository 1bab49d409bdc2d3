//! DDL for the application center tables.

pub(crate) const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS appcenter_application (
    id_application INTEGER NOT NULL PRIMARY KEY,
    name TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    id_organization_manager INTEGER NULL,
    application_data TEXT NULL,
    code TEXT NOT NULL UNIQUE,
    logo BLOB NULL,
    front_url TEXT NOT NULL DEFAULT '',
    back_url TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS appcenter_application_environment (
    id_application INTEGER NOT NULL,
    environment_code TEXT NOT NULL,
    PRIMARY KEY (id_application, environment_code)
);

CREATE TABLE IF NOT EXISTS appcenter_user_application_role (
    id_application INTEGER NOT NULL,
    id_user TEXT NOT NULL,
    id_role INTEGER NOT NULL,
    PRIMARY KEY (id_application, id_user)
);

CREATE TABLE IF NOT EXISTS appcenter_demand_type (
    id_demand_type TEXT NOT NULL PRIMARY KEY,
    label TEXT NOT NULL DEFAULT '',
    id_workflow INTEGER NULL
);

CREATE TABLE IF NOT EXISTS appcenter_demand (
    id_demand INTEGER PRIMARY KEY AUTOINCREMENT,
    id_application INTEGER NOT NULL,
    demand_type TEXT NOT NULL,
    demand_data TEXT NULL,
    creation_date TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_appcenter_demand_application_type
    ON appcenter_demand (id_application, demand_type);
";
