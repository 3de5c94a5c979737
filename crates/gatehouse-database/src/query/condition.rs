//! Filter payload → condition tree.
//!
//! Each payload shape has its own pure builder. The resulting
//! [`Condition`] holds validated column names and coerced values only; it
//! is rendered to SQL by `render` and evaluated directly by the memory
//! driver.

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::{FilterExpr, FilterField, FilterOp, FilterPayload, FilterValue};

use super::columns::{ColumnKind, ColumnSet};
use super::ident::is_valid_identifier;
use super::value::SqlValue;

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
}

impl CompareOp {
    /// SQL operator text.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// A validated predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column op value`
    Compare {
        /// Allowlisted column.
        column: String,
        /// Operator.
        op: CompareOp,
        /// Coerced value.
        value: SqlValue,
    },
    /// `column [I]LIKE pattern ESCAPE '\'`
    Like {
        /// Allowlisted text column.
        column: String,
        /// Escaped pattern including wildcards.
        pattern: String,
        /// Use `ILIKE`.
        case_insensitive: bool,
    },
    /// `column IN (values)`
    In {
        /// Allowlisted column.
        column: String,
        /// Coerced, non-empty list.
        values: Vec<SqlValue>,
    },
    /// `column IS [NOT] NULL`
    IsNull {
        /// Allowlisted column.
        column: String,
        /// `IS NOT NULL` when set.
        negated: bool,
    },
    /// Conjunction.
    And(Vec<Condition>),
    /// Disjunction.
    Or(Vec<Condition>),
    /// Negation.
    Not(Box<Condition>),
    /// A constant, e.g. `IN ()` on an empty list.
    Const(bool),
}

/// Build the condition for a payload. `Empty` yields `None`.
pub fn build(payload: &FilterPayload, columns: &ColumnSet) -> AppResult<Option<Condition>> {
    match payload {
        FilterPayload::Empty => Ok(None),
        FilterPayload::Id(id) => from_id(id, columns).map(Some),
        FilterPayload::Fields(fields) => from_fields(fields, columns),
        FilterPayload::Expr(expr) => from_expr(expr, columns).map(Some),
    }
}

/// Bare string shorthand: equality on the primary identifier column.
///
/// A string that cannot be an identifier of the column's type matches
/// nothing.
pub fn from_id(id: &str, columns: &ColumnSet) -> AppResult<Condition> {
    let column = columns.primary();
    let kind = columns.require(column)?;
    match SqlValue::coerce(&FilterValue::String(id.to_string()), kind, column) {
        Ok(value) => Ok(Condition::Compare {
            column: column.to_string(),
            op: CompareOp::Eq,
            value,
        }),
        Err(_) => Ok(Condition::Const(false)),
    }
}

/// Flat map: every entry becomes one leaf, ANDed in key order.
pub fn from_fields<'a>(
    fields: impl IntoIterator<Item = (&'a String, &'a FilterValue)>,
    columns: &ColumnSet,
) -> AppResult<Option<Condition>> {
    let mut leaves = fields
        .into_iter()
        .map(|(key, value)| leaf(&FilterField::from_key(key, value.clone())?, columns))
        .collect::<AppResult<Vec<_>>>()?;

    Ok(match leaves.len() {
        0 => None,
        1 => leaves.pop(),
        _ => Some(Condition::And(leaves)),
    })
}

/// Expression tree: translated node for node.
pub fn from_expr(expr: &FilterExpr, columns: &ColumnSet) -> AppResult<Condition> {
    match expr {
        FilterExpr::Field(field) => leaf(field, columns),
        FilterExpr::And { and } => Ok(Condition::And(children(and, columns)?)),
        FilterExpr::Or { or } => Ok(Condition::Or(children(or, columns)?)),
        FilterExpr::Not { not } => Ok(Condition::Not(Box::new(from_expr(not, columns)?))),
    }
}

fn children(exprs: &[FilterExpr], columns: &ColumnSet) -> AppResult<Vec<Condition>> {
    if exprs.is_empty() {
        return Err(AppError::validation(
            "Logical filter operators require at least one operand",
        ));
    }
    exprs.iter().map(|e| from_expr(e, columns)).collect()
}

fn leaf(field: &FilterField, columns: &ColumnSet) -> AppResult<Condition> {
    let name = field.field.as_str();
    if !is_valid_identifier(name) {
        return Err(AppError::validation(format!("Invalid filter column: '{name}'")));
    }
    let kind = columns.require(name)?;
    let column = name.to_string();

    match field.op {
        FilterOp::Eq => compare(field, kind, column, CompareOp::Eq),
        FilterOp::Ne => compare(field, kind, column, CompareOp::Ne),
        FilterOp::Gt => compare(field, kind, column, CompareOp::Gt),
        FilterOp::Gte => compare(field, kind, column, CompareOp::Gte),
        FilterOp::Lt => compare(field, kind, column, CompareOp::Lt),
        FilterOp::Lte => compare(field, kind, column, CompareOp::Lte),
        FilterOp::Contains | FilterOp::IContains | FilterOp::StartsWith | FilterOp::EndsWith => {
            like(field, kind, column)
        }
        FilterOp::In => {
            let items = match &field.value {
                FilterValue::List(items) => items.as_slice(),
                scalar => std::slice::from_ref(scalar),
            };
            if items.is_empty() {
                return Ok(Condition::Const(false));
            }
            let values = items
                .iter()
                .map(|item| SqlValue::coerce(item, kind, name))
                .collect::<AppResult<Vec<_>>>()?;
            if values.contains(&SqlValue::Null) {
                return Err(AppError::validation(format!(
                    "Filter '{name}' list must not contain null"
                )));
            }
            Ok(Condition::In { column, values })
        }
        FilterOp::IsNull => Ok(Condition::IsNull {
            column,
            negated: false,
        }),
        FilterOp::IsNotNull => Ok(Condition::IsNull {
            column,
            negated: true,
        }),
    }
}

fn compare(
    field: &FilterField,
    kind: ColumnKind,
    column: String,
    op: CompareOp,
) -> AppResult<Condition> {
    let value = SqlValue::coerce(&field.value, kind, &column)?;
    Ok(match (op, value) {
        (CompareOp::Eq, SqlValue::Null) => Condition::IsNull {
            column,
            negated: false,
        },
        (CompareOp::Ne, SqlValue::Null) => Condition::IsNull {
            column,
            negated: true,
        },
        (_, SqlValue::Null) => {
            return Err(AppError::validation(format!(
                "Filter on '{column}' cannot order against null"
            )));
        }
        (op, value) => Condition::Compare { column, op, value },
    })
}

fn like(field: &FilterField, kind: ColumnKind, column: String) -> AppResult<Condition> {
    if kind != ColumnKind::Text {
        return Err(AppError::validation(format!(
            "Pattern filters are only supported on text columns, not '{column}'"
        )));
    }
    let FilterValue::String(needle) = &field.value else {
        return Err(AppError::validation(format!(
            "Pattern filter on '{column}' expects a string"
        )));
    };
    let escaped = escape_like(needle);
    let pattern = match field.op {
        FilterOp::StartsWith => format!("{escaped}%"),
        FilterOp::EndsWith => format!("%{escaped}"),
        _ => format!("%{escaped}%"),
    };
    Ok(Condition::Like {
        column,
        pattern,
        case_insensitive: field.op == FilterOp::IContains,
    })
}

/// Escape `\`, `%` and `_` so the caller's text matches literally.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::query::columns::USERS;

    fn fields(pairs: &[(&str, FilterValue)]) -> FilterPayload {
        FilterPayload::Fields(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn test_suffix_operators() {
        let cond = build(
            &fields(&[
                ("email__icontains", "X.SKY".into()),
                ("last_login_at__null", true.into()),
            ]),
            &USERS,
        )
        .unwrap()
        .unwrap();

        assert_eq!(
            cond,
            Condition::And(vec![
                Condition::Like {
                    column: "email".into(),
                    pattern: "%X.SKY%".into(),
                    case_insensitive: true,
                },
                Condition::IsNull {
                    column: "last_login_at".into(),
                    negated: false,
                },
            ])
        );
    }

    #[test]
    fn test_unknown_column_rejected() {
        let err = build(&fields(&[("password_hash", "x".into())]), &USERS).unwrap_err();
        assert_eq!(err.kind, gatehouse_core::error::ErrorKind::Validation);

        let err = build(&fields(&[("email__regex", "x".into())]), &USERS).unwrap_err();
        assert!(err.message.contains("email__regex"));
    }

    #[test]
    fn test_pattern_requires_text_column() {
        assert!(build(&fields(&[("created_at__contains", "2024".into())]), &USERS).is_err());
    }

    #[test]
    fn test_empty_in_is_false() {
        let cond = build(&fields(&[("role__in", FilterValue::List(vec![]))]), &USERS).unwrap();
        assert_eq!(cond, Some(Condition::Const(false)));
    }

    #[test]
    fn test_eq_null_is_is_null() {
        let cond = build(&fields(&[("phone", FilterValue::Null)]), &USERS).unwrap();
        assert_eq!(
            cond,
            Some(Condition::IsNull {
                column: "phone".into(),
                negated: false
            })
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like(r"100%_a\b"), r"100\%\_a\\b");
    }
}
