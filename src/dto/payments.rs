use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{PaymentMethod, PaymentRecord};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LineItemDraft {
    #[serde(default)]
    pub name: String,
    pub qty: i64,
    pub price: f64,
}

/// A payment captured at the counter, before it enters the ledger.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaymentDraft {
    #[serde(default)]
    pub buyer_name: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItemDraft>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentView {
    #[serde(flatten)]
    pub payment: PaymentRecord,
    pub total: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentList {
    pub items: Vec<PaymentView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReceiptView {
    pub invoice_number: String,
    pub total: f64,
    pub html: String,
}
