//! Query condition translator.
//!
//! Turns an untrusted [`ListQuery`] into a parameterized predicate, an
//! ordering clause and paging values. Column names are checked against a
//! per-resource [`ColumnSet`] and quoted; every caller-supplied value is
//! bound, never concatenated.

pub mod columns;
pub mod condition;
pub mod ident;
pub mod render;
pub mod value;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::{ListQuery, SortField};

pub use self::columns::{ColumnKind, ColumnSet, SESSIONS, USERS};
pub use self::condition::{CompareOp, Condition};
pub use self::ident::quote_identifier;
pub use self::render::Renderer;
pub use self::value::SqlValue;

/// The translated form of a [`ListQuery`].
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedQuery {
    /// The validated condition tree, if any.
    pub condition: Option<Condition>,
    /// Predicate text with `$1..$n` placeholders.
    pub predicate: Option<String>,
    /// Values for the predicate placeholders, in order.
    pub binds: Vec<SqlValue>,
    /// Validated sort fields (unknown columns dropped).
    pub sort: Vec<SortField>,
    /// `ORDER BY` body.
    pub order_by: Option<String>,
    /// Row cap; `None` is unlimited.
    pub limit: Option<u64>,
    /// Rows to skip.
    pub offset: u64,
    /// Whether a count was requested.
    pub count: bool,
}

/// Translate a list query against the given column allowlist.
pub fn translate(query: &ListQuery, columns: &ColumnSet) -> AppResult<TranslatedQuery> {
    let condition = condition::build(&query.filter, columns)?;
    let (predicate, binds) = match &condition {
        Some(cond) => {
            let (sql, binds) = Renderer::render(cond)?;
            (Some(sql), binds)
        }
        None => (None, Vec::new()),
    };

    let sort: Vec<SortField> = query
        .sort
        .iter()
        .filter(|s| columns.kind(&s.field).is_some())
        .cloned()
        .collect();
    let order_by = render::render_order(&sort)?;

    let limit = query.limit();
    let offset = query.offset();
    // LIMIT and OFFSET are bigint in PostgreSQL.
    if limit.is_some_and(|l| l > i64::MAX as u64) || offset > i64::MAX as u64 {
        return Err(AppError::validation("Requested page is out of range"));
    }

    Ok(TranslatedQuery {
        condition,
        predicate,
        binds,
        sort,
        order_by,
        limit,
        offset,
        count: query.count,
    })
}

impl TranslatedQuery {
    /// Full `SELECT` statement for the row page.
    pub fn select_sql(&self, columns: &ColumnSet) -> AppResult<String> {
        let mut sql = format!("SELECT * FROM {}", quote_identifier(columns.table())?);
        if let Some(predicate) = &self.predicate {
            sql.push_str(" WHERE ");
            sql.push_str(predicate);
        }
        if let Some(order_by) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
            if self.offset > 0 {
                sql.push_str(&format!(" OFFSET {}", self.offset));
            }
        }
        Ok(sql)
    }

    /// `COUNT(*)` statement sharing the predicate; ignores order and paging.
    pub fn count_sql(&self, columns: &ColumnSet) -> AppResult<String> {
        let mut sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(columns.table())?);
        if let Some(predicate) = &self.predicate {
            sql.push_str(" WHERE ");
            sql.push_str(predicate);
        }
        Ok(sql)
    }
}
