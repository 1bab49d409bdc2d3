//! HTTP endpoints over applications and their demands.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::business::application::{
    Application, ApplicationFilter, ApplicationId, ApplicationRepository, ApplicationService,
    ApplicationServiceError,
};
use crate::business::demand::{
    DemandRepository, DemandService, DemandServiceError, DemandTypeRepository, NewDemand,
};
use crate::business::environment::Environment;
use crate::business::RepositoryError;
use crate::workflow::WorkflowEngine;

/// Services shared by every handler.
pub struct AppCenter<A, D, T, W: ?Sized> {
    pub applications: ApplicationService<A>,
    pub demands: DemandService<D, T, W>,
}

impl<A, D, T, W> AppCenter<A, D, T, W>
where
    A: ApplicationRepository + 'static,
    D: DemandRepository + 'static,
    T: DemandTypeRepository + 'static,
    W: WorkflowEngine + ?Sized + 'static,
{
    pub fn new(applications: ApplicationService<A>, demands: DemandService<D, T, W>) -> Self {
        Self {
            applications,
            demands,
        }
    }
}

/// Listing entry; omits the logo and data blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationSummary {
    pub id: ApplicationId,
    pub code: String,
    pub name: String,
    pub description: String,
    pub environments: BTreeSet<Environment>,
}

impl From<Application> for ApplicationSummary {
    fn from(application: Application) -> Self {
        Self {
            id: application.id,
            code: application.code,
            name: application.name,
            description: application.description,
            environments: application.environments,
        }
    }
}

pub fn appcenter_router<A, D, T, W>(state: Arc<AppCenter<A, D, T, W>>) -> Router
where
    A: ApplicationRepository + 'static,
    D: DemandRepository + 'static,
    T: DemandTypeRepository + 'static,
    W: WorkflowEngine + ?Sized + 'static,
{
    Router::new()
        .route(
            "/api/v1/applications",
            get(list_handler::<A, D, T, W>).post(create_handler::<A, D, T, W>),
        )
        .route(
            "/api/v1/applications/:id",
            get(get_handler::<A, D, T, W>)
                .put(update_handler::<A, D, T, W>)
                .delete(delete_handler::<A, D, T, W>),
        )
        .route(
            "/api/v1/applications/code/:code",
            get(get_by_code_handler::<A, D, T, W>),
        )
        .route(
            "/api/v1/applications/:id/data",
            put(save_data_handler::<A, D, T, W>),
        )
        .route(
            "/api/v1/applications/:id/demands",
            post(submit_demand_handler::<A, D, T, W>),
        )
        .route(
            "/api/v1/applications/:id/demands/:demand_type",
            get(list_demands_handler::<A, D, T, W>),
        )
        .with_state(state)
}

pub(crate) async fn list_handler<A, D, T, W>(
    State(state): State<Arc<AppCenter<A, D, T, W>>>,
    Query(filter): Query<ApplicationFilter>,
) -> Response
where
    A: ApplicationRepository + 'static,
    D: DemandRepository + 'static,
    T: DemandTypeRepository + 'static,
    W: WorkflowEngine + ?Sized + 'static,
{
    blocking(move || match state.applications.search(&filter) {
        Ok(applications) => {
            let views: Vec<ApplicationSummary> =
                applications.into_iter().map(ApplicationSummary::from).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(err) => application_error(err),
    })
    .await
}

pub(crate) async fn create_handler<A, D, T, W>(
    State(state): State<Arc<AppCenter<A, D, T, W>>>,
    Json(mut application): Json<Application>,
) -> Response
where
    A: ApplicationRepository + 'static,
    D: DemandRepository + 'static,
    T: DemandTypeRepository + 'static,
    W: WorkflowEngine + ?Sized + 'static,
{
    application.id = ApplicationId::UNASSIGNED;
    blocking(move || match state.applications.create(application) {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(err) => application_error(err),
    })
    .await
}

pub(crate) async fn get_handler<A, D, T, W>(
    State(state): State<Arc<AppCenter<A, D, T, W>>>,
    Path(id): Path<i64>,
) -> Response
where
    A: ApplicationRepository + 'static,
    D: DemandRepository + 'static,
    T: DemandTypeRepository + 'static,
    W: WorkflowEngine + ?Sized + 'static,
{
    blocking(move || match state.applications.get(ApplicationId(id)) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(err) => application_error(err),
    })
    .await
}

pub(crate) async fn get_by_code_handler<A, D, T, W>(
    State(state): State<Arc<AppCenter<A, D, T, W>>>,
    Path(code): Path<String>,
) -> Response
where
    A: ApplicationRepository + 'static,
    D: DemandRepository + 'static,
    T: DemandTypeRepository + 'static,
    W: WorkflowEngine + ?Sized + 'static,
{
    blocking(move || match state.applications.get_by_code(&code) {
        Ok(application) => (StatusCode::OK, Json(application)).into_response(),
        Err(err) => application_error(err),
    })
    .await
}

/// Updates everything but the data blob, which only `PUT /data` writes, and answers with the
/// stored application.
pub(crate) async fn update_handler<A, D, T, W>(
    State(state): State<Arc<AppCenter<A, D, T, W>>>,
    Path(id): Path<i64>,
    Json(mut application): Json<Application>,
) -> Response
where
    A: ApplicationRepository + 'static,
    D: DemandRepository + 'static,
    T: DemandTypeRepository + 'static,
    W: WorkflowEngine + ?Sized + 'static,
{
    application.id = ApplicationId(id);
    blocking(move || {
        let stored = state
            .applications
            .update(&application)
            .and_then(|()| state.applications.get(application.id));
        match stored {
            Ok(stored) => (StatusCode::OK, Json(stored)).into_response(),
            Err(err) => application_error(err),
        }
    })
    .await
}

pub(crate) async fn delete_handler<A, D, T, W>(
    State(state): State<Arc<AppCenter<A, D, T, W>>>,
    Path(id): Path<i64>,
) -> Response
where
    A: ApplicationRepository + 'static,
    D: DemandRepository + 'static,
    T: DemandTypeRepository + 'static,
    W: WorkflowEngine + ?Sized + 'static,
{
    blocking(move || match state.applications.remove(ApplicationId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => application_error(err),
    })
    .await
}

pub(crate) async fn save_data_handler<A, D, T, W>(
    State(state): State<Arc<AppCenter<A, D, T, W>>>,
    Path(id): Path<i64>,
    Json(data): Json<Value>,
) -> Response
where
    A: ApplicationRepository + 'static,
    D: DemandRepository + 'static,
    T: DemandTypeRepository + 'static,
    W: WorkflowEngine + ?Sized + 'static,
{
    blocking(move || {
        match state
            .applications
            .save_data(ApplicationId(id), &data.to_string())
        {
            Ok(()) => StatusCode::NO_CONTENT.into_response(),
            Err(err) => application_error(err),
        }
    })
    .await
}

pub(crate) async fn submit_demand_handler<A, D, T, W>(
    State(state): State<Arc<AppCenter<A, D, T, W>>>,
    Path(id): Path<i64>,
    Json(demand): Json<NewDemand<Value>>,
) -> Response
where
    A: ApplicationRepository + 'static,
    D: DemandRepository + 'static,
    T: DemandTypeRepository + 'static,
    W: WorkflowEngine + ?Sized + 'static,
{
    blocking(move || {
        let application = match state.applications.get(ApplicationId(id)) {
            Ok(application) => application,
            Err(err) => return application_error(err),
        };

        match state.demands.save(&demand, &application) {
            Ok(created) => (StatusCode::ACCEPTED, Json(created)).into_response(),
            Err(err) => demand_error(err),
        }
    })
    .await
}

pub(crate) async fn list_demands_handler<A, D, T, W>(
    State(state): State<Arc<AppCenter<A, D, T, W>>>,
    Path((id, demand_type)): Path<(i64, String)>,
) -> Response
where
    A: ApplicationRepository + 'static,
    D: DemandRepository + 'static,
    T: DemandTypeRepository + 'static,
    W: WorkflowEngine + ?Sized + 'static,
{
    blocking(move || {
        match state
            .demands
            .list_by_application_and_type::<Value>(ApplicationId(id), &demand_type)
        {
            Ok(payloads) => (StatusCode::OK, Json(payloads)).into_response(),
            Err(err) => repository_error(err),
        }
    })
    .await
}

/// Run store work on the blocking pool; SQLite calls may wait on the connection lock or the
/// busy timeout.
async fn blocking<F>(work: F) -> Response
where
    F: FnOnce() -> Response + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(response) => response,
        Err(err) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("request worker failed: {err}"),
        ),
    }
}

fn demand_error(err: DemandServiceError) -> Response {
    match err {
        DemandServiceError::DemandType { demand_id, source } => {
            warn!(%demand_id, error = %source, "demand saved with misconfigured type");
            let payload = json!({
                "error": source.to_string(),
                "demand_id": demand_id,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        DemandServiceError::Workflow { demand_id, source } => {
            warn!(%demand_id, error = %source, "demand saved but workflow failed");
            let payload = json!({
                "error": source.to_string(),
                "demand_id": demand_id,
            });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
        DemandServiceError::UnsavedApplication => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            DemandServiceError::UnsavedApplication.to_string(),
        ),
        DemandServiceError::Repository(err) => repository_error(err),
    }
}

fn application_error(err: ApplicationServiceError) -> Response {
    match err {
        ApplicationServiceError::Repository(err) => repository_error(err),
        ApplicationServiceError::Data(err) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
        }
    }
}

fn repository_error(err: RepositoryError) -> Response {
    let status = match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Conflict(_) => StatusCode::CONFLICT,
        RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
