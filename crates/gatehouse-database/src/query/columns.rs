//! Per-resource column allowlists.

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;

/// How filter values for a column are coerced before binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Free text; the only kind that supports pattern operators.
    Text,
    /// UUID.
    Uuid,
    /// 64-bit integer.
    Integer,
    /// Boolean.
    Boolean,
    /// Timestamp with time zone (RFC 3339 or unix seconds).
    Timestamp,
}

/// The filterable and sortable columns of one table.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSet {
    table: &'static str,
    primary: &'static str,
    columns: &'static [(&'static str, ColumnKind)],
}

impl ColumnSet {
    /// Describe a table. `primary` must be one of `columns`.
    pub const fn new(
        table: &'static str,
        primary: &'static str,
        columns: &'static [(&'static str, ColumnKind)],
    ) -> Self {
        Self {
            table,
            primary,
            columns,
        }
    }

    /// Table name.
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Primary identifier column, the target of the bare-string shorthand.
    pub fn primary(&self) -> &'static str {
        self.primary
    }

    /// Kind of an allowlisted column.
    pub fn kind(&self, column: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, kind)| *kind)
    }

    /// Kind of a column used in a filter; unknown columns are rejected.
    pub fn require(&self, column: &str) -> AppResult<ColumnKind> {
        self.kind(column)
            .ok_or_else(|| AppError::validation(format!("Unknown filter column: '{column}'")))
    }
}

/// Columns of the `users` table.
pub const USERS: ColumnSet = ColumnSet::new(
    "users",
    "id",
    &[
        ("id", ColumnKind::Uuid),
        ("email", ColumnKind::Text),
        ("phone", ColumnKind::Text),
        ("first_name", ColumnKind::Text),
        ("last_name", ColumnKind::Text),
        ("role", ColumnKind::Text),
        ("status", ColumnKind::Text),
        ("last_login_at", ColumnKind::Timestamp),
        ("created_at", ColumnKind::Timestamp),
        ("updated_at", ColumnKind::Timestamp),
    ],
);

/// Columns of the `sessions` table.
pub const SESSIONS: ColumnSet = ColumnSet::new(
    "sessions",
    "id",
    &[
        ("id", ColumnKind::Uuid),
        ("user_id", ColumnKind::Uuid),
        ("ip_address", ColumnKind::Text),
        ("user_agent", ColumnKind::Text),
        ("is_blocked", ColumnKind::Boolean),
        ("expires_at", ColumnKind::Timestamp),
        ("created_at", ColumnKind::Timestamp),
        ("updated_at", ColumnKind::Timestamp),
    ],
);
