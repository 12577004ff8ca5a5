use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse},
        dashboard::{DashboardSummary, Series, SeriesMetric, SeriesPeriod, SeriesPoint},
        payments::{LineItemDraft, PaymentDraft, PaymentList, PaymentView, ReceiptView},
        products::{PriceInput, ProductDraft, ProductField, ProductList, SetFieldRequest},
    },
    models::{AuditEntry, ImageRef, LineItem, PaymentMethod, PaymentRecord, ProductId, ProductRecord},
    response::{ApiResponse, Meta},
    routes::{admin, auth, catalog, dashboard, health, params, payments},
    services::{
        admin_service::AuditList,
        catalog_service::{DeleteOutcome, ProductForm},
    },
    validation::FieldErrors,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        catalog::list_products,
        catalog::get_product,
        catalog::create_product,
        catalog::update_product,
        catalog::delete_product,
        catalog::edit_product,
        catalog::get_form,
        catalog::set_form_field,
        catalog::reset_form,
        catalog::upload_image,
        payments::list_payments,
        payments::get_payment,
        payments::record_payment,
        payments::mark_paid,
        payments::mark_unpaid,
        payments::delete_payment,
        payments::get_receipt,
        payments::export_receipt,
        dashboard::summary,
        dashboard::series,
        admin::list_audit_log
    ),
    components(
        schemas(
            ProductId,
            ImageRef,
            ProductRecord,
            PaymentMethod,
            LineItem,
            PaymentRecord,
            AuditEntry,
            PriceInput,
            ProductDraft,
            ProductField,
            SetFieldRequest,
            ProductList,
            ProductForm,
            DeleteOutcome,
            FieldErrors,
            LineItemDraft,
            PaymentDraft,
            PaymentView,
            PaymentList,
            ReceiptView,
            DashboardSummary,
            SeriesMetric,
            SeriesPeriod,
            SeriesPoint,
            Series,
            AuditList,
            LoginRequest,
            LoginResponse,
            params::CatalogKind,
            params::Pagination,
            params::SortOrder,
            Meta,
            ApiResponse<ProductRecord>,
            ApiResponse<ProductList>,
            ApiResponse<PaymentView>,
            ApiResponse<PaymentList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Admin login"),
        (name = "Catalog", description = "Unit and grouped catalog endpoints"),
        (name = "Payments", description = "Payment ledger and receipts"),
        (name = "Dashboard", description = "Stat cards and chart series"),
        (name = "Admin", description = "Audit trail"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
