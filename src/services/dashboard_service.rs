use chrono::Datelike;

use crate::{
    dto::dashboard::{DashboardSummary, Series, SeriesMetric, SeriesPeriod, SeriesPoint},
    error::AppResult,
    models::PaymentRecord,
    response::ApiResponse,
    services::payment_service::compute_total,
    state::AppState,
};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

pub fn summarize(unit_items: usize, grouped_items: usize, payments: &[PaymentRecord]) -> DashboardSummary {
    let paid: Vec<&PaymentRecord> = payments.iter().filter(|p| p.is_paid).collect();
    DashboardSummary {
        unit_items,
        grouped_items,
        catalog_items: unit_items + grouped_items,
        paid_payments: paid.len(),
        unpaid_payments: payments.len() - paid.len(),
        total_revenue: paid.iter().map(|p| compute_total(p)).sum(),
    }
}

fn measure(payment: &PaymentRecord, metric: SeriesMetric) -> f64 {
    match metric {
        SeriesMetric::Sales => payment.items.iter().map(|i| f64::from(i.qty)).sum(),
        SeriesMetric::Revenue => compute_total(payment),
    }
}

/// Buckets paid payments by month of the latest year seen, or by year.
pub fn series(payments: &[PaymentRecord], metric: SeriesMetric, period: SeriesPeriod) -> Series {
    let paid = payments.iter().filter(|p| p.is_paid);

    let points = match period {
        SeriesPeriod::Monthly => {
            let year = payments.iter().map(|p| p.created_at.year()).max();
            let mut values = [0.0_f64; 12];
            for payment in paid.filter(|p| Some(p.created_at.year()) == year) {
                let month = payment.created_at.month0() as usize;
                if let Some(slot) = values.get_mut(month) {
                    *slot += measure(payment, metric);
                }
            }
            MONTHS
                .iter()
                .zip(values)
                .map(|(label, value)| SeriesPoint {
                    label: (*label).to_string(),
                    value,
                })
                .collect()
        }
        SeriesPeriod::Yearly => {
            let mut years: Vec<(i32, f64)> = Vec::new();
            for payment in paid {
                let year = payment.created_at.year();
                match years.iter_mut().find(|(y, _)| *y == year) {
                    Some((_, value)) => *value += measure(payment, metric),
                    None => years.push((year, measure(payment, metric))),
                }
            }
            years.sort_by_key(|(year, _)| *year);
            years
                .into_iter()
                .map(|(year, value)| SeriesPoint {
                    label: year.to_string(),
                    value,
                })
                .collect()
        }
    };

    Series {
        metric,
        period,
        points,
    }
}

pub async fn get_summary(state: &AppState) -> AppResult<ApiResponse<DashboardSummary>> {
    let unit_items = state.unit.lock().await.list().len();
    let grouped_items = state.grouped.lock().await.list().len();
    let payments = state.payments.lock().await.list().to_vec();
    Ok(ApiResponse::success(
        "Dashboard",
        summarize(unit_items, grouped_items, &payments),
        None,
    ))
}

pub async fn get_series(
    state: &AppState,
    metric: SeriesMetric,
    period: SeriesPeriod,
) -> AppResult<ApiResponse<Series>> {
    let payments = state.payments.lock().await.list().to_vec();
    Ok(ApiResponse::success(
        "Series",
        series(&payments, metric, period),
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::payment_service::default_payments;

    #[test]
    fn summary_counts_seed_ledger() {
        let summary = summarize(2, 1, &default_payments());
        assert_eq!(summary.catalog_items, 3);
        assert_eq!(summary.paid_payments, 2);
        assert_eq!(summary.unpaid_payments, 2);
        assert_eq!(summary.total_revenue, 795000.0);
    }

    #[test]
    fn monthly_revenue_lands_in_june() {
        let s = series(&default_payments(), SeriesMetric::Revenue, SeriesPeriod::Monthly);
        assert_eq!(s.points.len(), 12);
        assert_eq!(s.points[5].label, "Jun");
        assert_eq!(s.points[5].value, 795000.0);
        assert_eq!(s.points.iter().map(|p| p.value).sum::<f64>(), 795000.0);
    }

    #[test]
    fn yearly_sales_count_units() {
        let s = series(&default_payments(), SeriesMetric::Sales, SeriesPeriod::Yearly);
        assert_eq!(
            s.points,
            vec![SeriesPoint {
                label: "2025".into(),
                value: 6.0,
            }]
        );
    }

    #[test]
    fn empty_ledger_has_zeroed_months() {
        let s = series(&[], SeriesMetric::Sales, SeriesPeriod::Monthly);
        assert!(s.points.iter().all(|p| p.value == 0.0));
    }
}
