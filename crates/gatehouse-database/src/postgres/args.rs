//! Binding translated values to sqlx arguments.

use sqlx::Arguments;
use sqlx::postgres::PgArguments;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;

use crate::query::SqlValue;

/// Build positional arguments for a translated predicate.
pub fn bind_all(values: &[SqlValue]) -> AppResult<PgArguments> {
    let mut args = PgArguments::default();
    for value in values {
        let result = match value {
            SqlValue::Null => args.add(Option::<String>::None),
            SqlValue::Bool(b) => args.add(*b),
            SqlValue::Int(i) => args.add(*i),
            SqlValue::Float(f) => args.add(*f),
            SqlValue::Text(s) => args.add(s.clone()),
            SqlValue::Uuid(u) => args.add(*u),
            SqlValue::Timestamp(t) => args.add(*t),
        };
        result.map_err(|e| AppError::internal(format!("Failed to bind query argument: {e}")))?;
    }
    Ok(args)
}

/// Map a sqlx error to an internal application error.
pub fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(gatehouse_core::error::ErrorKind::Internal, context, e)
}

/// Whether the error is a unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
