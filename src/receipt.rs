//! Receipt rendering and export.
//!
//! The receipt is an HTML fragment. Turning it into a downloadable document
//! is the job of a [`DocumentExporter`]; the ledger only learns whether that
//! worked.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::TempDir;
use thiserror::Error;
use tokio::fs;

use crate::{models::PaymentRecord, services::payment_service::compute_total};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("document exporter unavailable: {0}")]
    Unavailable(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("export io error")]
    Io(#[from] std::io::Error),
}

/// Working area holding the page to convert. Removed on drop.
#[derive(Debug)]
pub struct RenderScaffold {
    dir: TempDir,
    page: PathBuf,
}

impl RenderScaffold {
    pub async fn create(html: &str) -> Result<Self, ExportError> {
        let dir = tempfile::Builder::new().prefix("receipt-").tempdir()?;
        let page = dir.path().join("receipt.html");
        fs::write(&page, wrap_page(html)).await?;
        Ok(Self { dir, page })
    }

    pub fn page(&self) -> &Path {
        &self.page
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

#[async_trait]
pub trait DocumentExporter: Send + Sync {
    async fn export(&self, scaffold: &RenderScaffold, file_name: &str) -> Result<(), ExportError>;
}

/// Used when no export target is configured.
#[derive(Debug, Default)]
pub struct UnavailableExporter;

#[async_trait]
impl DocumentExporter for UnavailableExporter {
    async fn export(&self, _scaffold: &RenderScaffold, _file_name: &str) -> Result<(), ExportError> {
        Err(ExportError::Unavailable(
            "receipt export is disabled".into(),
        ))
    }
}

/// Copies the rendered page into an output directory.
#[derive(Debug, Clone)]
pub struct HtmlFileExporter {
    out_dir: PathBuf,
}

impl HtmlFileExporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }
}

#[async_trait]
impl DocumentExporter for HtmlFileExporter {
    async fn export(&self, scaffold: &RenderScaffold, file_name: &str) -> Result<(), ExportError> {
        fs::create_dir_all(&self.out_dir).await?;
        let target = self.out_dir.join(file_name);
        fs::copy(scaffold.page(), &target).await?;
        tracing::info!(path = %target.display(), "receipt exported");
        Ok(())
    }
}

pub fn receipt_file_name(payment: &PaymentRecord) -> String {
    let safe: String = payment
        .invoice_number
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("receipt_{safe}.html")
}

/// Renders and exports. The scaffold is dropped whichever way this returns.
pub async fn export_receipt(
    payment: &PaymentRecord,
    exporter: &dyn DocumentExporter,
) -> Result<(), ExportError> {
    let scaffold = RenderScaffold::create(&render_receipt(payment)).await?;
    let result = exporter.export(&scaffold, &receipt_file_name(payment)).await;
    if let Err(err) = &result {
        tracing::warn!(invoice = %payment.invoice_number, error = %err, "receipt export failed");
    }
    drop(scaffold);
    result
}

/// Formats a whole-rupiah amount, e.g. `Rp 295.000`.
pub fn format_idr(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    if rounded < 0.0 {
        format!("-Rp {grouped}")
    } else {
        format!("Rp {grouped}")
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn wrap_page(fragment: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Receipt</title></head>\
         <body style=\"width: 210mm; padding: 20mm; background: white;\">{fragment}</body></html>\n"
    )
}

const CELL: &str = "padding: 8px; border-bottom: 1px solid #eee;";

pub fn render_receipt(payment: &PaymentRecord) -> String {
    let status = if payment.is_paid { "Paid" } else { "Unpaid" };
    let date = payment.created_at.format("%d %B %Y %H:%M UTC");

    let rows: String = payment
        .items
        .iter()
        .map(|item| {
            format!(
                "<tr><td style=\"{CELL} text-align: left;\">{}</td>\
                 <td style=\"{CELL} text-align: left;\">{}</td>\
                 <td style=\"{CELL} text-align: right;\">{}</td>\
                 <td style=\"{CELL} text-align: right;\">{}</td></tr>",
                escape_html(&item.name),
                item.qty,
                format_idr(item.price),
                format_idr(item.subtotal()),
            )
        })
        .collect();

    format!(
        r#"<div style="font-family: 'Inter', sans-serif; color: #333;">
  <div style="text-align: center; margin-bottom: 20px;">
    <h3 style="font-size: 24px; font-weight: bold; margin-bottom: 5px;">PAYMENT RECEIPT</h3>
    <p style="font-size: 12px; color: #555;">Admin Panel</p>
  </div>
  <div style="margin-bottom: 20px; font-size: 14px;">
    <p><strong>Invoice Number:</strong> {invoice}</p>
    <p><strong>Buyer Name:</strong> {buyer}</p>
    <p><strong>Payment Method:</strong> {method}</p>
    <p><strong>Payment Status:</strong> {status}</p>
    <p><strong>Transaction Date:</strong> {date}</p>
  </div>
  <h4 style="font-size: 18px; font-weight: 600; margin-bottom: 10px;">Items:</h4>
  <table style="width: 100%; border-collapse: collapse; margin-bottom: 20px; font-size: 13px;">
    <thead><tr style="background-color: #f5f5f5;"><th>Product</th><th>Qty</th><th>Unit Price</th><th>Subtotal</th></tr></thead>
    <tbody>{rows}</tbody>
    <tfoot><tr><td colspan="3" style="padding: 8px; text-align: right; font-weight: bold;">Total:</td><td style="padding: 8px; text-align: right; font-weight: bold;">{total}</td></tr></tfoot>
  </table>
  <p style="text-align: center; font-size: 12px; color: #555; margin-top: 20px;">Thank you for your order!</p>
</div>"#,
        invoice = escape_html(&payment.invoice_number),
        buyer = escape_html(&payment.buyer_name),
        method = payment.payment_method.as_str(),
        total = format_idr(compute_total(payment)),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::services::payment_service::default_payments;

    #[test]
    fn formats_rupiah_with_dot_grouping() {
        assert_eq!(format_idr(295000.0), "Rp 295.000");
        assert_eq!(format_idr(0.0), "Rp 0");
        assert_eq!(format_idr(999.0), "Rp 999");
        assert_eq!(format_idr(1234567.4), "Rp 1.234.567");
        assert_eq!(format_idr(-5000.0), "-Rp 5.000");
    }

    #[test]
    fn receipt_lists_items_and_total() {
        let payment = &default_payments()[1];
        let html = render_receipt(payment);
        assert!(html.contains("INV-20250618-002"));
        assert!(html.contains("Speaker Bluetooth Mini"));
        assert!(html.contains("Rp 295.000"));
        assert!(html.contains("Unpaid"));
    }

    #[test]
    fn receipt_escapes_buyer_input() {
        let mut payment = default_payments()[0].clone();
        payment.buyer_name = "<script>x</script>".into();
        let html = render_receipt(&payment);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    /// Remembers where the scaffold lived, then fails.
    #[derive(Default)]
    struct FailingExporter {
        seen: Mutex<Option<PathBuf>>,
    }

    #[async_trait]
    impl DocumentExporter for FailingExporter {
        async fn export(&self, scaffold: &RenderScaffold, _: &str) -> Result<(), ExportError> {
            assert!(scaffold.page().exists());
            *self.seen.lock().unwrap() = Some(scaffold.dir().to_path_buf());
            Err(ExportError::Render("canvas unavailable".into()))
        }
    }

    #[tokio::test]
    async fn scaffold_is_removed_after_failed_export() {
        let exporter = FailingExporter::default();
        let err = export_receipt(&default_payments()[0], &exporter)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Render(_)));

        let dir = exporter.seen.lock().unwrap().clone().unwrap();
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn html_exporter_writes_receipt_file() {
        let out = tempfile::tempdir().unwrap();
        let exporter = HtmlFileExporter::new(out.path());
        let payment = &default_payments()[3];

        export_receipt(payment, &exporter).await.unwrap();

        let written = out.path().join("receipt_INV-20250618-004.html");
        let html = std::fs::read_to_string(written).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Rp 575.000"));
    }

    #[tokio::test]
    async fn unavailable_exporter_reports_failure() {
        let err = export_receipt(&default_payments()[0], &UnavailableExporter)
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Unavailable(_)));
    }
}
