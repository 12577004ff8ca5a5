use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::AuditQuery,
    services::admin_service::{self, AuditList},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/audit", get(list_audit_log))
}

#[utoipa::path(
    get,
    path = "/api/admin/audit",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "Audit trail (admin only)", body = ApiResponse<AuditList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_audit_log(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<ApiResponse<AuditList>>> {
    let resp =
        admin_service::list_audit_log(&state, &user, query.pagination(), query.sort_order).await?;
    Ok(Json(resp))
}
