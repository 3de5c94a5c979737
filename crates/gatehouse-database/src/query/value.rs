//! Typed bind values and coercion from caller-supplied filter values.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::FilterValue;

use super::columns::ColumnKind;

/// A value bound to a query placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL `NULL`.
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit integer.
    Int(i64),
    /// Double precision float.
    Float(f64),
    /// Text.
    Text(String),
    /// UUID.
    Uuid(Uuid),
    /// Timestamp with time zone.
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// Coerce a filter value to the kind of the column it is compared with.
    pub fn coerce(value: &FilterValue, kind: ColumnKind, column: &str) -> AppResult<Self> {
        let mismatch = || {
            AppError::validation(format!(
                "Invalid value for column '{column}': expected {}",
                kind_name(kind)
            ))
        };

        if let FilterValue::Null = value {
            return Ok(Self::Null);
        }

        match (kind, value) {
            (_, FilterValue::List(_)) => Err(AppError::validation(format!(
                "Column '{column}' does not accept a list here"
            ))),
            (ColumnKind::Text, FilterValue::String(s)) => Ok(Self::Text(s.clone())),
            (ColumnKind::Text, FilterValue::Integer(i)) => Ok(Self::Text(i.to_string())),
            (ColumnKind::Text, FilterValue::Float(f)) => Ok(Self::Text(f.to_string())),
            (ColumnKind::Text, FilterValue::Boolean(b)) => Ok(Self::Text(b.to_string())),
            (ColumnKind::Uuid, FilterValue::String(s)) => {
                Uuid::parse_str(s.trim()).map(Self::Uuid).map_err(|_| mismatch())
            }
            (ColumnKind::Integer, FilterValue::Integer(i)) => Ok(Self::Int(*i)),
            (ColumnKind::Integer, FilterValue::String(s)) => {
                s.trim().parse().map(Self::Int).map_err(|_| mismatch())
            }
            (ColumnKind::Boolean, FilterValue::Boolean(b)) => Ok(Self::Bool(*b)),
            (ColumnKind::Boolean, FilterValue::Integer(i @ (0 | 1))) => Ok(Self::Bool(*i == 1)),
            (ColumnKind::Boolean, FilterValue::String(s)) => match s.trim().to_lowercase().as_str() {
                "true" | "1" => Ok(Self::Bool(true)),
                "false" | "0" => Ok(Self::Bool(false)),
                _ => Err(mismatch()),
            },
            (ColumnKind::Timestamp, FilterValue::String(s)) => DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| Self::Timestamp(dt.with_timezone(&Utc)))
                .map_err(|_| mismatch()),
            (ColumnKind::Timestamp, FilterValue::Integer(secs)) => DateTime::from_timestamp(*secs, 0)
                .map(Self::Timestamp)
                .ok_or_else(mismatch),
            _ => Err(mismatch()),
        }
    }

    /// Order two values of the same variant. Mixed variants are unordered.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Uuid(a), Self::Uuid(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

fn kind_name(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Text => "text",
        ColumnKind::Uuid => "a uuid",
        ColumnKind::Integer => "an integer",
        ColumnKind::Boolean => "a boolean",
        ColumnKind::Timestamp => "an RFC 3339 timestamp or unix seconds",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_by_kind() {
        assert_eq!(
            SqlValue::coerce(&"1 OR 1=1".into(), ColumnKind::Text, "role").unwrap(),
            SqlValue::Text("1 OR 1=1".into())
        );
        assert_eq!(
            SqlValue::coerce(&"false".into(), ColumnKind::Boolean, "is_blocked").unwrap(),
            SqlValue::Bool(false)
        );
        assert!(matches!(
            SqlValue::coerce(&"2024-01-02T03:04:05Z".into(), ColumnKind::Timestamp, "created_at"),
            Ok(SqlValue::Timestamp(_))
        ));
    }

    #[test]
    fn test_coerce_rejects_mismatch() {
        assert!(SqlValue::coerce(&"not-a-uuid".into(), ColumnKind::Uuid, "id").is_err());
        assert!(SqlValue::coerce(&FilterValue::Integer(7), ColumnKind::Boolean, "b").is_err());
        assert!(SqlValue::coerce(&"yesterday".into(), ColumnKind::Timestamp, "t").is_err());
    }
}
