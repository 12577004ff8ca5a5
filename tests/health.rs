use std::sync::Arc;

use admin_panel_api::{
    middleware::auth::AuthSettings,
    receipt::UnavailableExporter,
    routes::health::health_check,
    state::AppState,
    store::{RecordStore, SlotStore, StoreError},
};
use async_trait::async_trait;
use axum::extract::State;

/// A backend whose disk has gone away.
struct BrokenStore;

#[async_trait]
impl SlotStore for BrokenStore {
    async fn read(&self, _slot: &str) -> Result<Option<String>, StoreError> {
        Err(std::io::Error::other("disk unplugged").into())
    }

    async fn write(&self, _slot: &str, _blob: String) -> Result<(), StoreError> {
        Err(std::io::Error::other("disk unplugged").into())
    }
}

async fn state_with(store: RecordStore) -> AppState {
    let auth = AuthSettings {
        jwt_secret: "health-secret".into(),
        admin_email: "admin@example.com".into(),
        admin_password_hash: String::new(),
    };
    AppState::load(store, Arc::new(UnavailableExporter), auth).await
}

#[tokio::test]
async fn health_check_returns_ok() {
    let state = state_with(RecordStore::memory()).await;
    let response = health_check(State(state)).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn unreadable_store_reports_degraded() {
    let state = state_with(RecordStore::new(BrokenStore)).await;

    // The services still start, on their defaults.
    assert_eq!(state.payments.lock().await.list().len(), 4);

    let data = health_check(State(state)).await.0.data.expect("health data");
    assert_eq!(data.status, "degraded");
    assert_eq!(data.store, "storage io error");
}
