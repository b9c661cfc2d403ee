//! Report store, chart and health endpoints consumed by the page controllers.

use super::AppState;
use crate::error::{PortalError, PortalResult};
use crate::models::auth::PasswordQuery;
use crate::models::report::{ActionResponse, ReportForm, SubmitResponse};
use crate::services::charts::chart_file_name;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, info};

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "charts_folder": state.charts.folder().display().to_string(),
        "available_charts": state.charts.available().await,
        "folder_exists": state.charts.folder_exists(),
    }))
}

pub async fn get_chart(
    State(state): State<AppState>,
    Path(chart_name): Path<String>,
) -> PortalResult<Response> {
    let chart_name = chart_file_name(&chart_name);
    info!("Chart requested: {}", chart_name);

    match state.charts.read(&chart_name).await? {
        Some(bytes) => Ok(([(header::CONTENT_TYPE, "image/png")], bytes).into_response()),
        None => {
            let available = state.charts.available().await;
            let message = format!(
                "Chart not found: {}. Available charts: {}",
                chart_name,
                available.join(", ")
            );
            error!("{}", message);

            Ok((
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": message,
                    "requested": chart_name,
                    "available_charts": available,
                    "folder": state.charts.folder().display().to_string(),
                    "folder_exists": state.charts.folder_exists(),
                })),
            )
                .into_response())
        }
    }
}

pub async fn submit_report(
    State(state): State<AppState>,
    Json(form): Json<ReportForm>,
) -> PortalResult<impl IntoResponse> {
    let report = state.reports.create(form).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            success: true,
            report_id: Some(report.id),
            message: Some("Report submitted successfully".to_string()),
            error: None,
        }),
    ))
}

pub async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<PasswordQuery>,
) -> PortalResult<impl IntoResponse> {
    state.auth.check(&query.password)?;

    let reports = state.reports.list().await?;
    let count = reports.len();
    Ok(Json(json!({ "reports": reports, "count": count })))
}

pub async fn delete_report(
    State(state): State<AppState>,
    Path(report_id): Path<u64>,
    Query(query): Query<PasswordQuery>,
) -> PortalResult<impl IntoResponse> {
    state.auth.check(&query.password)?;

    state.reports.delete(report_id).await?;
    Ok(Json(ActionResponse::ok("Report deleted successfully")))
}

pub async fn delete_all_reports(
    State(state): State<AppState>,
    Query(query): Query<PasswordQuery>,
) -> PortalResult<impl IntoResponse> {
    state.auth.check(&query.password)?;

    state.reports.delete_all().await?;
    Ok(Json(ActionResponse::ok("All reports deleted successfully")))
}

pub async fn export_reports(
    State(state): State<AppState>,
    Query(query): Query<PasswordQuery>,
) -> PortalResult<Response> {
    state.auth.check(&query.password)?;

    let csv = state.reports.export_csv().await?;

    Response::builder()
        .header(header::CONTENT_TYPE, "text/csv")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=crime_reports.csv",
        )
        .body(Body::from(csv))
        .map_err(|e| PortalError::Internal(e.to_string()))
}
