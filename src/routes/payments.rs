use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};

use crate::{
    dto::payments::{PaymentDraft, PaymentList, PaymentView, ReceiptView},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    response::ApiResponse,
    routes::params::DeleteParams,
    services::{catalog_service::DeleteOutcome, payment_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments).post(record_payment))
        .route("/{id}", get(get_payment).delete(delete_payment))
        .route("/{id}/paid", post(mark_paid))
        .route("/{id}/unpaid", post(mark_unpaid))
        .route("/{id}/receipt", get(get_receipt))
        .route("/{id}/receipt/export", post(export_receipt))
}

#[utoipa::path(
    get,
    path = "/api/payments",
    responses(
        (status = 200, description = "List payments with totals", body = ApiResponse<PaymentList>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn list_payments(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PaymentList>>> {
    ensure_admin(&user)?;
    let resp = payment_service::list_payments(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    params(("id" = String, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Get payment", body = ApiResponse<PaymentView>),
        (status = 404, description = "Payment not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn get_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<PaymentView>>> {
    ensure_admin(&user)?;
    let resp = payment_service::get_payment(&state, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments",
    request_body = PaymentDraft,
    responses(
        (status = 200, description = "Payment recorded", body = ApiResponse<PaymentView>),
        (status = 422, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn record_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<PaymentDraft>,
) -> AppResult<Json<ApiResponse<PaymentView>>> {
    let resp = payment_service::record_payment(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/paid",
    params(("id" = String, Path, description = "Payment ID")),
    responses((status = 200, description = "Marked as paid, data is null for unknown ids", body = ApiResponse<PaymentView>)),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn mark_paid(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Option<PaymentView>>>> {
    let resp = payment_service::set_paid(&state, &user, &id, true).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/unpaid",
    params(("id" = String, Path, description = "Payment ID")),
    responses((status = 200, description = "Marked as unpaid, data is null for unknown ids", body = ApiResponse<PaymentView>)),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn mark_unpaid(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Option<PaymentView>>>> {
    let resp = payment_service::set_paid(&state, &user, &id, false).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/payments/{id}",
    params(
        ("id" = String, Path, description = "Payment ID"),
        ("confirm" = Option<bool>, Query, description = "Must be true to delete")
    ),
    responses((status = 200, description = "Deleted, absent or cancelled", body = ApiResponse<DeleteOutcome>)),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn delete_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> AppResult<Json<ApiResponse<DeleteOutcome>>> {
    let resp = payment_service::delete_payment(&state, &user, &id, params.confirm).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/payments/{id}/receipt",
    params(("id" = String, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Rendered receipt fragment", body = ApiResponse<ReceiptView>),
        (status = 404, description = "Payment not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn get_receipt(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<ReceiptView>>> {
    ensure_admin(&user)?;
    let resp = payment_service::receipt(&state, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/payments/{id}/receipt/export",
    params(("id" = String, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Receipt exported"),
        (status = 404, description = "Payment not found"),
        (status = 502, description = "Exporter failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payments"
)]
pub async fn export_receipt(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = payment_service::export_payment_receipt(&state, &user, &id).await?;
    Ok(Json(resp))
}
