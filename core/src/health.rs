use std::sync::Arc;

use actix_web::{HttpResponse, get, web};
use common::error::{AppError, DependencyKind};
use db::{Store, TableCounts};
use serde::Serialize;

#[derive(Serialize)]
struct Healthy {
    status: &'static str,
    database: &'static str,
    counts: TableCounts,
}

#[derive(Serialize)]
struct Unhealthy {
    status: &'static str,
    database: &'static str,
    error: String,
}

/// Store health with row counts. Failures answer 500 with the failure kind
/// in `database` so operators can tell a missing migration from an outage.
#[get("/health")]
pub async fn get_health(store: web::Data<Arc<dyn Store>>) -> HttpResponse {
    match store.count_rows().await {
        Ok(counts) => HttpResponse::Ok().json(Healthy {
            status: "ok",
            database: "connected",
            counts,
        }),
        Err(err) => {
            let kind = match &err {
                AppError::Dependency { kind, .. } => *kind,
                _ => DependencyKind::Other,
            };
            log::error!("Health check failed: {}", err);
            HttpResponse::InternalServerError().json(Unhealthy {
                status: "error",
                database: kind.as_str(),
                error: describe(kind, &err),
            })
        }
    }
}

fn describe(kind: DependencyKind, err: &AppError) -> String {
    match kind {
        DependencyKind::SchemaNotInitialized => {
            "Database tables do not exist, run the migrations".to_string()
        }
        DependencyKind::Unreachable => "Cannot reach database server".to_string(),
        DependencyKind::Other if cfg!(debug_assertions) => err.to_string(),
        DependencyKind::Other => "Database error".to_string(),
    }
}
