use chrono::Utc;
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    models::AuditEntry,
    store::{AUDIT_SLOT, RecordStore, StoreError},
};

/// Entries kept when `AUDIT_LIMIT` is not set.
pub const DEFAULT_AUDIT_LIMIT: usize = 500;

/// Trail of admin mutations, mirrored to its own slot.
///
/// Only the newest `limit` entries are kept, so the slot shares the store
/// with the catalogs and the ledger without crowding them out.
#[derive(Debug)]
pub struct AuditLog {
    store: RecordStore,
    limit: usize,
    entries: Mutex<Vec<AuditEntry>>,
}

impl AuditLog {
    pub async fn load(store: RecordStore, limit: usize) -> Self {
        let mut entries: Vec<AuditEntry> = store.load(AUDIT_SLOT).await.unwrap_or_default();
        keep_newest(&mut entries, limit);
        Self {
            store,
            limit,
            entries: Mutex::new(entries),
        }
    }

    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().await.clone()
    }
}

fn keep_newest(entries: &mut Vec<AuditEntry>, limit: usize) {
    let excess = entries.len().saturating_sub(limit);
    entries.drain(..excess);
}

pub async fn log_audit(
    log: &AuditLog,
    actor: Option<&str>,
    action: &str,
    resource: Option<&str>,
    metadata: Option<Value>,
) -> Result<(), StoreError> {
    let mut entries = log.entries.lock().await;
    entries.push(AuditEntry {
        id: Uuid::new_v4(),
        actor: actor.map(str::to_owned),
        action: action.to_owned(),
        resource: resource.map(str::to_owned),
        metadata,
        created_at: Utc::now(),
    });
    keep_newest(&mut entries, log.limit);
    log.store.save(AUDIT_SLOT, &entries).await
}
