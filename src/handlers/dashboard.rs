// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::Subject,
    models::dashboard::DashboardResponse,
};

// GET /api/admin/dashboard
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Admin",
    responses(
        (status = 200, description = "Totais de pedidos, lojas, produtos e receita", body = DashboardResponse),
        (status = 401, description = "Not authorized"),
        (status = 400, description = "Falha ao ler os dados")
    ),
    security(
        ("api_jwt" = [])
    )
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    Subject(subject_id): Subject,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = app_state.dashboard_service
        .compute_dashboard(&subject_id)
        .await?;

    Ok((StatusCode::OK, Json(DashboardResponse { dashboard_data: snapshot })))
}
