//! List query parameters: `p`, `pp`, `s`, `f`, `q` and per-resource filters.

use std::collections::BTreeMap;

use serde::Deserialize;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::{FilterExpr, FilterField, FilterPayload, FilterValue, ListQuery};

/// Page size used when `pp` is absent.
pub const DEFAULT_PER_PAGE: u64 = 25;

/// Raw list parameters.
///
/// Numbers are taken as strings so that bad input becomes a
/// `VALIDATION_ERROR` rather than an extractor rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    /// Page, 1-based.
    pub p: Option<String>,
    /// Per page. `0` or negative means unlimited.
    pub pp: Option<String>,
    /// Sort order, e.g. `-created_at,+id`.
    pub s: Option<String>,
    /// JSON filter document.
    pub f: Option<String>,
    /// Prefix search across the resource's search columns.
    pub q: Option<String>,
    /// Everything else; only names listed in the [`ListColumns`] are used.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// Which query parameters a list endpoint understands besides the generic ones.
#[derive(Debug, Clone, Copy)]
pub struct ListColumns {
    /// Parameters turned into equality filters on the column of the same name.
    pub filters: &'static [&'static str],
    /// Columns matched by `q`.
    pub search: &'static [&'static str],
}

impl ListParams {
    /// Build the list query for an endpoint.
    pub fn into_query(self, columns: &ListColumns) -> AppResult<ListQuery> {
        let page = match parse_int("p", self.p.as_deref())? {
            Some(p) if p > 1 => p as u64,
            _ => 1,
        };
        let per_page = match parse_int("pp", self.pp.as_deref())? {
            Some(pp) if pp > 0 => pp as u64,
            Some(_) => 0,
            None => DEFAULT_PER_PAGE,
        };
        ensure_page_in_range(page, per_page)?;

        let mut filter = match self.f.as_deref() {
            Some(raw) => FilterPayload::parse(raw)?,
            None => FilterPayload::Empty,
        };

        for (name, value) in self.extra {
            if columns.filters.contains(&name.as_str()) && !value.trim().is_empty() {
                filter = filter.and_field(name, FilterValue::String(value));
            }
        }

        if let Some(term) = self.q.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            if !columns.search.is_empty() {
                let any = columns
                    .search
                    .iter()
                    .map(|column| FilterExpr::Field(FilterField::startswith(*column, term)))
                    .collect();
                filter = filter.and_expr(FilterExpr::or(any))?;
            }
        }

        Ok(ListQuery::new(page, per_page)
            .with_sort(self.s.as_deref().unwrap_or_default())
            .with_filter(filter))
    }
}

/// The last row of the requested page must be addressable as a signed
/// 64-bit offset.
fn ensure_page_in_range(page: u64, per_page: u64) -> AppResult<()> {
    if per_page == 0 {
        return Ok(());
    }
    (page - 1)
        .checked_mul(per_page)
        .and_then(|offset| offset.checked_add(per_page))
        .filter(|end| i64::try_from(*end).is_ok())
        .map(|_| ())
        .ok_or_else(|| AppError::validation("Query parameters 'p' and 'pp' are out of range"))
}

fn parse_int(name: &str, raw: Option<&str>) -> AppResult<Option<i64>> {
    match raw.map(str::trim).filter(|r| !r.is_empty()) {
        None => Ok(None),
        Some(r) => r
            .parse()
            .map(Some)
            .map_err(|_| AppError::validation(format!("Query parameter '{name}' must be an integer"))),
    }
}
