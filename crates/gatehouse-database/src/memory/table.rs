//! A process-local table keyed by UUID.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_core::types::ListQuery;

use super::matcher::{compare_rows, matches};
use crate::query::{self, ColumnSet};

/// Rows of one resource, filtered through the same translator as the
/// PostgreSQL stores.
#[derive(Debug)]
pub struct MemoryTable<T> {
    columns: ColumnSet,
    rows: RwLock<BTreeMap<Uuid, T>>,
}

impl<T> MemoryTable<T>
where
    T: Serialize + Clone + Send + Sync,
{
    /// Create an empty table.
    pub fn new(columns: ColumnSet) -> Self {
        Self {
            columns,
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    /// Shared access to the rows.
    pub async fn read(&self) -> tokio::sync::RwLockReadGuard<'_, BTreeMap<Uuid, T>> {
        self.rows.read().await
    }

    /// Exclusive access to the rows.
    pub async fn write(&self) -> tokio::sync::RwLockWriteGuard<'_, BTreeMap<Uuid, T>> {
        self.rows.write().await
    }

    /// One page of matching rows plus the total match count.
    pub async fn list(&self, query: &ListQuery) -> AppResult<(Vec<T>, u64)> {
        let translated = query::translate(query, &self.columns)?;
        let rows = self.rows.read().await;

        let mut matched = Vec::new();
        for row in rows.values() {
            let json = to_json(row)?;
            let keep = translated
                .condition
                .as_ref()
                .is_none_or(|cond| matches(&json, cond, &self.columns));
            if keep {
                matched.push((json, row));
            }
        }

        let total = if translated.count {
            matched.len() as u64
        } else {
            0
        };

        if !translated.sort.is_empty() {
            matched.sort_by(|(a, _), (b, _)| compare_rows(a, b, &translated.sort, &self.columns));
        }

        let skip = usize::try_from(translated.offset).unwrap_or(usize::MAX);
        let take = translated
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));

        let page = matched
            .into_iter()
            .skip(skip)
            .take(take)
            .map(|(_, row)| row.clone())
            .collect();
        Ok((page, total))
    }

    /// Number of rows matching the query filter.
    pub async fn count(&self, query: &ListQuery) -> AppResult<u64> {
        let translated = query::translate(query, &self.columns)?;
        let rows = self.rows.read().await;
        let Some(condition) = translated.condition else {
            return Ok(rows.len() as u64);
        };

        let mut total = 0;
        for row in rows.values() {
            if matches(&to_json(row)?, &condition, &self.columns) {
                total += 1;
            }
        }
        Ok(total)
    }
}

fn to_json<T: Serialize>(row: &T) -> AppResult<Value> {
    serde_json::to_value(row)
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Failed to serialize row", e))
}
