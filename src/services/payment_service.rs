use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    confirm::{Confirmer, Preapproved},
    dto::payments::{PaymentDraft, PaymentList, PaymentView, ReceiptView},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{LineItem, PaymentMethod, PaymentRecord},
    receipt::{export_receipt, receipt_file_name, render_receipt},
    response::{ApiResponse, Meta},
    services::catalog_service::DeleteOutcome,
    state::AppState,
    store::{PAYMENTS_SLOT, Persisted, RecordStore},
    validation::validate_payment,
};

/// Sum of `qty × price` over the items. Never stored.
pub fn compute_total(record: &PaymentRecord) -> f64 {
    record.items.iter().map(LineItem::subtotal).sum()
}

#[derive(Debug)]
pub struct PaymentLedger {
    store: RecordStore,
    payments: Vec<PaymentRecord>,
}

impl PaymentLedger {
    /// Reads the slot once, falling back to [`default_payments`].
    pub async fn load(store: RecordStore) -> Self {
        let payments = match store.load(PAYMENTS_SLOT).await {
            Some(payments) => payments,
            None => {
                tracing::info!("payment slot empty, using seed data");
                default_payments()
            }
        };
        Self { store, payments }
    }

    pub fn list(&self) -> &[PaymentRecord] {
        &self.payments
    }

    pub fn get(&self, id: &str) -> Option<&PaymentRecord> {
        self.payments.iter().find(|p| p.id == id)
    }

    pub async fn mark_paid(&mut self, id: &str) -> Persisted<Option<PaymentRecord>> {
        self.set_paid(id, true).await
    }

    pub async fn mark_unpaid(&mut self, id: &str) -> Persisted<Option<PaymentRecord>> {
        self.set_paid(id, false).await
    }

    async fn set_paid(&mut self, id: &str, is_paid: bool) -> Persisted<Option<PaymentRecord>> {
        let Some(payment) = self.payments.iter_mut().find(|p| p.id == id) else {
            return Persisted::clean(None);
        };
        payment.is_paid = is_paid;
        let payment = payment.clone();

        let warning = self.persist().await;
        tracing::debug!(id, is_paid, "payment status set");
        Persisted {
            value: Some(payment),
            warning,
        }
    }

    pub async fn delete(&mut self, id: &str, confirmer: &impl Confirmer) -> Persisted<DeleteOutcome> {
        if !confirmer.confirm("Are you sure you want to delete this payment?") {
            return Persisted::clean(DeleteOutcome::Cancelled);
        }

        let before = self.payments.len();
        self.payments.retain(|p| p.id != id);
        if self.payments.len() == before {
            return Persisted::clean(DeleteOutcome::Absent);
        }

        let warning = self.persist().await;
        Persisted {
            value: DeleteOutcome::Deleted,
            warning,
        }
    }

    /// Appends a new unpaid payment. Invoice numbers are not checked for
    /// uniqueness.
    pub async fn record(&mut self, draft: PaymentDraft) -> AppResult<Persisted<PaymentRecord>> {
        let errors = validate_payment(&draft);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let items = draft
            .items
            .into_iter()
            .map(|item| {
                let qty = u32::try_from(item.qty).map_err(|_| {
                    AppError::BadRequest(format!("quantity {} is out of range", item.qty))
                })?;
                Ok(LineItem {
                    name: item.name,
                    qty,
                    price: item.price,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let id = Uuid::new_v4();
        let now = Utc::now();
        let payment = PaymentRecord {
            id: id.to_string(),
            buyer_name: draft.buyer_name,
            invoice_number: build_invoice_number(id, now),
            payment_method: draft.payment_method,
            is_paid: false,
            created_at: now,
            user_id: draft.user_id.unwrap_or_default(),
            items,
        };
        self.payments.push(payment.clone());
        let warning = self.persist().await;

        Ok(Persisted {
            value: payment,
            warning,
        })
    }

    async fn persist(&self) -> Option<String> {
        match self.store.save(PAYMENTS_SLOT, &self.payments).await {
            Ok(()) => None,
            Err(err) => {
                tracing::warn!(error = %err, "payments not saved");
                Some(format!("Failed to save payment data: {err}"))
            }
        }
    }
}

fn build_invoice_number(id: Uuid, at: DateTime<Utc>) -> String {
    let date = at.format("%Y%m%d");
    let suffix = id.simple().to_string();
    format!("INV-{}-{}", date, &suffix[..8])
}

fn seed_time(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 18, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

fn item(name: &str, qty: u32, price: f64) -> LineItem {
    LineItem {
        name: name.to_owned(),
        qty,
        price,
    }
}

/// Ledger contents on first run.
pub fn default_payments() -> Vec<PaymentRecord> {
    vec![
        PaymentRecord {
            id: "uuid-1".into(),
            buyer_name: "Budi Santoso".into(),
            invoice_number: "INV-20250618-001".into(),
            payment_method: PaymentMethod::Qris,
            is_paid: true,
            created_at: seed_time(10, 0),
            user_id: "user123".into(),
            items: vec![
                item("Alat Pijat Getar", 1, 150000.0),
                item("Charger Universal", 2, 35000.0),
            ],
        },
        PaymentRecord {
            id: "uuid-2".into(),
            buyer_name: "Siti Aminah".into(),
            invoice_number: "INV-20250618-002".into(),
            payment_method: PaymentMethod::Cod,
            is_paid: false,
            created_at: seed_time(10, 30),
            user_id: "user456".into(),
            items: vec![
                item("Speaker Bluetooth Mini", 1, 85000.0),
                item("Headset Gaming RGB", 1, 210000.0),
            ],
        },
        PaymentRecord {
            id: "uuid-3".into(),
            buyer_name: "Joko Susilo".into(),
            invoice_number: "INV-20250618-003".into(),
            payment_method: PaymentMethod::Qris,
            is_paid: false,
            created_at: seed_time(11, 0),
            user_id: "user123".into(),
            items: vec![item("Kabel USB C 2 Meter", 3, 25000.0)],
        },
        PaymentRecord {
            id: "uuid-4".into(),
            buyer_name: "Dewi Lestari".into(),
            invoice_number: "INV-20250618-004".into(),
            payment_method: PaymentMethod::Qris,
            is_paid: true,
            created_at: seed_time(11, 45),
            user_id: "user789".into(),
            items: vec![
                item("Smartwatch Sport", 1, 380000.0),
                item("Power Bank 10000mAh", 1, 120000.0),
                item("Case HP Premium", 1, 75000.0),
            ],
        },
    ]
}

fn view(payment: PaymentRecord) -> PaymentView {
    let total = compute_total(&payment);
    PaymentView { payment, total }
}

async fn audit(state: &AppState, user: &AuthUser, action: &str, id: &str) {
    if let Err(err) = log_audit(
        &state.audit,
        Some(&user.user_id),
        action,
        Some(PAYMENTS_SLOT),
        Some(serde_json::json!({ "payment_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }
}

pub async fn list_payments(state: &AppState) -> AppResult<ApiResponse<PaymentList>> {
    let payments = state.payments.lock().await.list().to_vec();
    let items: Vec<PaymentView> = payments.into_iter().map(view).collect();
    let meta = Meta::listing(items.len());
    Ok(ApiResponse::success("Payments", PaymentList { items }, Some(meta)))
}

pub async fn get_payment(state: &AppState, id: &str) -> AppResult<ApiResponse<PaymentView>> {
    let payment = state.payments.lock().await.get(id).cloned();
    let payment = payment.ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Payment", view(payment), None))
}

pub async fn record_payment(
    state: &AppState,
    user: &AuthUser,
    draft: PaymentDraft,
) -> AppResult<ApiResponse<PaymentView>> {
    ensure_admin(user)?;
    let persisted = state.payments.lock().await.record(draft).await?;
    audit(state, user, "payment_record", &persisted.value.id).await;

    Ok(
        ApiResponse::success("Payment recorded", view(persisted.value), Some(Meta::empty()))
            .with_warning(persisted.warning),
    )
}

/// Sets the paid flag. An unknown id answers with `data: null`.
pub async fn set_paid(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    is_paid: bool,
) -> AppResult<ApiResponse<Option<PaymentView>>> {
    ensure_admin(user)?;
    let persisted = {
        let mut ledger = state.payments.lock().await;
        if is_paid {
            ledger.mark_paid(id).await
        } else {
            ledger.mark_unpaid(id).await
        }
    };
    if persisted.value.is_some() {
        let action = if is_paid { "payment_paid" } else { "payment_unpaid" };
        audit(state, user, action, id).await;
    }

    let message = if is_paid { "Marked as paid" } else { "Marked as unpaid" };
    Ok(
        ApiResponse::success(message, persisted.value.map(view), Some(Meta::empty()))
            .with_warning(persisted.warning),
    )
}

pub async fn delete_payment(
    state: &AppState,
    user: &AuthUser,
    id: &str,
    confirm: bool,
) -> AppResult<ApiResponse<DeleteOutcome>> {
    ensure_admin(user)?;
    let persisted = state
        .payments
        .lock()
        .await
        .delete(id, &Preapproved(confirm))
        .await;
    if persisted.value == DeleteOutcome::Deleted {
        audit(state, user, "payment_delete", id).await;
    }

    let message = match persisted.value {
        DeleteOutcome::Cancelled => "Cancelled",
        DeleteOutcome::Deleted | DeleteOutcome::Absent => "Deleted",
    };
    Ok(
        ApiResponse::success(message, persisted.value, Some(Meta::empty()))
            .with_warning(persisted.warning),
    )
}

pub async fn receipt(state: &AppState, id: &str) -> AppResult<ApiResponse<ReceiptView>> {
    let payment = state.payments.lock().await.get(id).cloned();
    let payment = payment.ok_or(AppError::NotFound)?;

    let data = ReceiptView {
        total: compute_total(&payment),
        html: render_receipt(&payment),
        invoice_number: payment.invoice_number,
    };
    Ok(ApiResponse::success("Receipt", data, None))
}

/// Hands the rendered receipt to the configured exporter. The ledger lock is
/// released before the export starts.
pub async fn export_payment_receipt(
    state: &AppState,
    user: &AuthUser,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let payment = state.payments.lock().await.get(id).cloned();
    let payment = payment.ok_or(AppError::NotFound)?;

    export_receipt(&payment, state.exporter.as_ref()).await?;

    Ok(ApiResponse::success(
        "Receipt exported",
        serde_json::json!({ "file": receipt_file_name(&payment) }),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_invoice_two_totals_295000() {
        let payments = default_payments();
        let inv = payments
            .iter()
            .find(|p| p.invoice_number == "INV-20250618-002")
            .unwrap();
        assert_eq!(compute_total(inv), 295000.0);
    }

    #[test]
    fn invoice_number_uses_date_and_id_prefix() {
        let id = Uuid::parse_str("a1b2c3d4-0000-4000-8000-000000000000").unwrap();
        let at = Utc.with_ymd_and_hms(2025, 6, 18, 9, 0, 0).unwrap();
        assert_eq!(build_invoice_number(id, at), "INV-20250618-a1b2c3d4");
    }

    #[tokio::test]
    async fn toggles_on_unknown_id_do_not_persist() {
        let store = RecordStore::memory();
        let mut ledger = PaymentLedger::load(store.clone()).await;
        let persisted = ledger.mark_paid("missing").await;
        assert_eq!(persisted, Persisted::clean(None));
        assert!(store.load::<PaymentRecord>(PAYMENTS_SLOT).await.is_none());
    }

    #[tokio::test]
    async fn emptied_ledger_is_not_reseeded() {
        let store = RecordStore::memory();
        let mut ledger = PaymentLedger::load(store.clone()).await;
        for id in ["uuid-1", "uuid-2", "uuid-3", "uuid-4"] {
            ledger.delete(id, &Preapproved(true)).await;
        }
        let reloaded = PaymentLedger::load(store).await;
        assert!(reloaded.list().is_empty());
    }
}
