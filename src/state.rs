use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    audit::{AuditLog, DEFAULT_AUDIT_LIMIT},
    middleware::auth::AuthSettings,
    receipt::DocumentExporter,
    services::{
        catalog_service::{CatalogService, GroupedCatalog, UnitCatalog},
        payment_service::PaymentLedger,
    },
    store::RecordStore,
};

/// Each list sits behind its own lock; a mutation holds it until the list
/// has been written back.
pub type Shared<T> = Arc<Mutex<T>>;

#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
    pub unit: Shared<CatalogService<UnitCatalog>>,
    pub grouped: Shared<CatalogService<GroupedCatalog>>,
    pub payments: Shared<PaymentLedger>,
    pub audit: Arc<AuditLog>,
    pub exporter: Arc<dyn DocumentExporter>,
    pub auth: AuthSettings,
}

impl AppState {
    /// Reads every slot once, keeping the default audit trail length.
    pub async fn load(
        store: RecordStore,
        exporter: Arc<dyn DocumentExporter>,
        auth: AuthSettings,
    ) -> Self {
        Self::load_with_audit_limit(store, exporter, auth, DEFAULT_AUDIT_LIMIT).await
    }

    pub async fn load_with_audit_limit(
        store: RecordStore,
        exporter: Arc<dyn DocumentExporter>,
        auth: AuthSettings,
        audit_limit: usize,
    ) -> Self {
        let unit = CatalogService::load(store.clone()).await;
        let grouped = CatalogService::load(store.clone()).await;
        let payments = PaymentLedger::load(store.clone()).await;
        let audit = AuditLog::load(store.clone(), audit_limit).await;

        Self {
            store,
            unit: Arc::new(Mutex::new(unit)),
            grouped: Arc::new(Mutex::new(grouped)),
            payments: Arc::new(Mutex::new(payments)),
            audit: Arc::new(audit),
            exporter,
            auth,
        }
    }
}
