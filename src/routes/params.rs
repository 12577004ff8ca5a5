use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    dto::dashboard::{SeriesMetric, SeriesPeriod},
    services::catalog_service::{Catalog, GroupedCatalog, UnitCatalog},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

// Query strings are decoded as text, so the paging fields are listed here
// rather than flattened in.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AuditQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub sort_order: Option<SortOrder>,
}

impl AuditQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Which catalog a `/catalog/{kind}` route addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Unit,
    Grouped,
}

impl CatalogKind {
    pub fn slot(&self) -> &'static str {
        match self {
            CatalogKind::Unit => UnitCatalog::SLOT,
            CatalogKind::Grouped => GroupedCatalog::SLOT,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DeleteParams {
    /// Must be `true` for the delete to go ahead.
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SeriesQuery {
    pub metric: SeriesMetric,
    #[serde(default)]
    pub period: SeriesPeriod,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_clamps_inputs() {
        let p = Pagination {
            page: Some(0),
            per_page: Some(1000),
        };
        assert_eq!(p.normalize(), (1, 100, 0));

        let p = Pagination {
            page: Some(3),
            per_page: None,
        };
        assert_eq!(p.normalize(), (3, 20, 40));
    }
}
