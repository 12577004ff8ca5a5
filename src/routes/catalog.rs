use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, header},
    routing::{get, post},
};

use crate::{
    dto::products::{ProductDraft, ProductList, SetFieldRequest},
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::{ImageRef, ProductId, ProductRecord},
    response::ApiResponse,
    routes::params::{CatalogKind, DeleteParams},
    services::{
        catalog_service::{self, DeleteOutcome, ProductForm},
        image_service::ImageUpload,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{kind}", get(list_products).post(create_product))
        .route(
            "/{kind}/form",
            get(get_form).patch(set_form_field).delete(reset_form),
        )
        .route("/{kind}/images", post(upload_image))
        .route(
            "/{kind}/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/{kind}/{id}/edit", post(edit_product))
}

#[utoipa::path(
    get,
    path = "/api/catalog/{kind}",
    params(("kind" = CatalogKind, Path, description = "unit or grouped")),
    responses(
        (status = 200, description = "List catalog items", body = ApiResponse<ProductList>),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn list_products(
    State(state): State<AppState>,
    user: AuthUser,
    Path(kind): Path<CatalogKind>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    ensure_admin(&user)?;
    let resp = catalog_service::list_products(&state, kind).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/catalog/{kind}/{id}",
    params(
        ("kind" = CatalogKind, Path, description = "unit or grouped"),
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get catalog item", body = ApiResponse<ProductRecord>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn get_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path((kind, id)): Path<(CatalogKind, ProductId)>,
) -> AppResult<Json<ApiResponse<ProductRecord>>> {
    ensure_admin(&user)?;
    let resp = catalog_service::get_product(&state, kind, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/catalog/{kind}",
    params(("kind" = CatalogKind, Path, description = "unit or grouped")),
    request_body = ProductDraft,
    responses(
        (status = 200, description = "Create catalog item", body = ApiResponse<ProductRecord>),
        (status = 422, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(kind): Path<CatalogKind>,
    Json(payload): Json<ProductDraft>,
) -> AppResult<Json<ApiResponse<ProductRecord>>> {
    let resp = catalog_service::create_product(&state, &user, kind, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/catalog/{kind}/{id}",
    params(
        ("kind" = CatalogKind, Path, description = "unit or grouped"),
        ("id" = i64, Path, description = "Product ID")
    ),
    request_body = ProductDraft,
    responses(
        (status = 200, description = "Updated catalog item", body = ApiResponse<ProductRecord>),
        (status = 404, description = "Product not found"),
        (status = 422, description = "Validation failed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path((kind, id)): Path<(CatalogKind, ProductId)>,
    Json(payload): Json<ProductDraft>,
) -> AppResult<Json<ApiResponse<ProductRecord>>> {
    let resp = catalog_service::update_product(&state, &user, kind, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/catalog/{kind}/{id}",
    params(
        ("kind" = CatalogKind, Path, description = "unit or grouped"),
        ("id" = i64, Path, description = "Product ID"),
        ("confirm" = Option<bool>, Query, description = "Must be true to delete")
    ),
    responses(
        (status = 200, description = "Deleted, absent or cancelled", body = ApiResponse<DeleteOutcome>)
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path((kind, id)): Path<(CatalogKind, ProductId)>,
    Query(params): Query<DeleteParams>,
) -> AppResult<Json<ApiResponse<DeleteOutcome>>> {
    let resp = catalog_service::delete_product(&state, &user, kind, id, params.confirm).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/catalog/{kind}/{id}/edit",
    params(
        ("kind" = CatalogKind, Path, description = "unit or grouped"),
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Record loaded into the editor", body = ApiResponse<ProductForm>),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn edit_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path((kind, id)): Path<(CatalogKind, ProductId)>,
) -> AppResult<Json<ApiResponse<ProductForm>>> {
    let resp = catalog_service::edit_product(&state, &user, kind, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/catalog/{kind}/form",
    params(("kind" = CatalogKind, Path, description = "unit or grouped")),
    responses((status = 200, description = "Editor state", body = ApiResponse<ProductForm>)),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn get_form(
    State(state): State<AppState>,
    user: AuthUser,
    Path(kind): Path<CatalogKind>,
) -> AppResult<Json<ApiResponse<ProductForm>>> {
    let resp = catalog_service::get_form(&state, &user, kind).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/catalog/{kind}/form",
    params(("kind" = CatalogKind, Path, description = "unit or grouped")),
    request_body = SetFieldRequest,
    responses((status = 200, description = "Field changed, its error cleared", body = ApiResponse<ProductForm>)),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn set_form_field(
    State(state): State<AppState>,
    user: AuthUser,
    Path(kind): Path<CatalogKind>,
    Json(payload): Json<SetFieldRequest>,
) -> AppResult<Json<ApiResponse<ProductForm>>> {
    let resp = catalog_service::set_form_field(&state, &user, kind, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/catalog/{kind}/form",
    params(("kind" = CatalogKind, Path, description = "unit or grouped")),
    responses((status = 200, description = "Editor cleared", body = ApiResponse<ProductForm>)),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn reset_form(
    State(state): State<AppState>,
    user: AuthUser,
    Path(kind): Path<CatalogKind>,
) -> AppResult<Json<ApiResponse<ProductForm>>> {
    let resp = catalog_service::reset_form(&state, &user, kind).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/catalog/{kind}/images",
    params(("kind" = CatalogKind, Path, description = "unit or grouped")),
    request_body(content = Vec<u8>, content_type = "image/*"),
    responses(
        (status = 200, description = "Image encoded into the draft", body = ApiResponse<ImageRef>),
        (status = 422, description = "Too large or not an image"),
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    user: AuthUser,
    Path(kind): Path<CatalogKind>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ApiResponse<ImageRef>>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let upload = ImageUpload {
        content_type,
        bytes: &body,
    };
    let resp = catalog_service::upload_image(&state, &user, kind, upload).await?;
    Ok(Json(resp))
}
