use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::dashboard::{DashboardSummary, Series},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    response::ApiResponse,
    routes::params::SeriesQuery,
    services::dashboard_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(summary))
        .route("/series", get(series))
}

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses((status = 200, description = "Stat cards", body = ApiResponse<DashboardSummary>)),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DashboardSummary>>> {
    ensure_admin(&user)?;
    let resp = dashboard_service::get_summary(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/dashboard/series",
    params(
        ("metric" = String, Query, description = "sales or revenue"),
        ("period" = Option<String>, Query, description = "monthly (default) or yearly")
    ),
    responses((status = 200, description = "Chart series", body = ApiResponse<Series>)),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn series(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SeriesQuery>,
) -> AppResult<Json<ApiResponse<Series>>> {
    ensure_admin(&user)?;
    let resp = dashboard_service::get_series(&state, query.metric, query.period).await?;
    Ok(Json(resp))
}
