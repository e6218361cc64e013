use crate::error::{AppError, Envelope, NoData};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use schema_scout::{
    probe_connection, read_tables, synthesize, Lookup, SchemaName, TableMetadata, TableName,
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::instrument;

type ApiResult<T> = Result<Json<Envelope<T>>, AppError>;

/// The complete application, with middleware applied.
pub fn app() -> Router {
    with_middleware(api_routes())
}

fn api_routes() -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/db/test-connection", post(test_connection))
        .route("/api/v1/db/get-schemas", get(get_schemas))
        .route("/api/v1/db/get-tables", get(get_tables))
        .route("/api/v1/db/get-metadata", post(get_metadata))
}

fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::Internal(detail).into_response()
}

#[derive(Debug, Deserialize)]
pub struct ConnectionRequest {
    pub db_url: String,
}

#[derive(Debug, Deserialize)]
pub struct TablesRequest {
    pub db_url: String,
    pub table_schema: String,
}

#[derive(Debug, Deserialize)]
pub struct MetadataRequest {
    pub db_url: String,
    pub table_schema: String,
    pub tables: Vec<TableName>,
}

#[derive(Debug, Serialize)]
pub struct Schemas {
    pub schemas: Vec<SchemaName>,
}

#[derive(Debug, Serialize)]
pub struct Tables {
    pub tables: Vec<TableName>,
}

#[derive(Debug, Serialize)]
pub struct Metadata {
    pub metadata: Vec<TableMetadata>,
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }

    Ok(())
}

async fn health() -> Json<Envelope<NoData>> {
    Json(Envelope::status(StatusCode::OK, "API is running"))
}

#[instrument(skip_all)]
async fn test_connection(
    request: Result<Json<ConnectionRequest>, JsonRejection>,
) -> ApiResult<Schemas> {
    let Json(request) = request?;
    require("db_url", &request.db_url)?;

    let schemas = probe_schemas(&request.db_url).await?;
    Ok(Json(Envelope::ok("Database connection successful", schemas)))
}

#[instrument(skip_all)]
async fn get_schemas(
    request: Result<Query<ConnectionRequest>, QueryRejection>,
) -> ApiResult<Schemas> {
    let Query(request) = request?;
    require("db_url", &request.db_url)?;

    let schemas = probe_schemas(&request.db_url).await?;
    Ok(Json(Envelope::ok("Schemas fetched successfully", schemas)))
}

async fn probe_schemas(db_url: &str) -> Result<Schemas, AppError> {
    let probe = probe_connection(db_url).await;
    if !probe.reachable {
        return Err(AppError::ConnectionFailed);
    }

    Ok(Schemas {
        schemas: probe.schemas,
    })
}

#[instrument(skip_all)]
async fn get_tables(request: Result<Query<TablesRequest>, QueryRejection>) -> ApiResult<Tables> {
    let Query(request) = request?;
    require("db_url", &request.db_url)?;
    require("table_schema", &request.table_schema)?;

    match read_tables(&request.db_url, &request.table_schema).await {
        Lookup::Unreachable => Err(AppError::ConnectionFailed),
        Lookup::Found(tables) if tables.is_empty() => Err(AppError::NotFound("No tables found")),
        Lookup::Found(tables) => Ok(Json(Envelope::ok(
            "Tables fetched successfully",
            Tables { tables },
        ))),
    }
}

#[instrument(skip_all)]
async fn get_metadata(
    request: Result<Json<MetadataRequest>, JsonRejection>,
) -> ApiResult<Metadata> {
    let Json(request) = request?;
    require("db_url", &request.db_url)?;
    require("table_schema", &request.table_schema)?;

    match synthesize(&request.db_url, &request.table_schema, &request.tables).await {
        Lookup::Unreachable => Err(AppError::ConnectionFailed),
        Lookup::Found(metadata) if metadata.is_empty() => {
            Err(AppError::NotFound("No metadata found"))
        }
        Lookup::Found(metadata) => Ok(Json(Envelope::ok(
            "Metadata fetched successfully",
            Metadata { metadata },
        ))),
    }
}
