use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::AuditEntry,
    response::{ApiResponse, Meta},
    routes::params::{Pagination, SortOrder},
    state::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct AuditList {
    pub items: Vec<AuditEntry>,
}

/// Pages through the audit trail, newest first unless asked otherwise.
pub async fn list_audit_log(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
    sort_order: Option<SortOrder>,
) -> AppResult<ApiResponse<AuditList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let mut entries = state.audit.entries().await;
    if sort_order.unwrap_or(SortOrder::Desc) == SortOrder::Desc {
        entries.reverse();
    }
    let total = i64::try_from(entries.len()).unwrap_or(i64::MAX);

    let items = entries
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(0))
        .take(usize::try_from(limit).unwrap_or(0))
        .collect();

    Ok(ApiResponse::success(
        "Audit log",
        AuditList { items },
        Some(Meta::new(page, limit, total)),
    ))
}
