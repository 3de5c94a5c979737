//! Filter types for dynamic query building.
//!
//! A caller-supplied filter arrives as one of three shapes, modelled by
//! [`FilterPayload`]: nothing, a bare identifier string, a flat
//! column→value map, or a structured [`FilterExpr`] tree. None of these
//! types know anything about SQL; translation happens in the database crate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::result::AppResult;

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Exact equality.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Case-sensitive substring match.
    Contains,
    /// Case-insensitive substring match.
    #[serde(rename = "icontains")]
    IContains,
    /// Case-sensitive prefix match.
    #[serde(rename = "startswith")]
    StartsWith,
    /// Case-sensitive suffix match.
    #[serde(rename = "endswith")]
    EndsWith,
    /// List membership.
    In,
    /// Value is null.
    #[serde(rename = "isnull")]
    IsNull,
    /// Value is not null.
    #[serde(rename = "isnotnull")]
    IsNotNull,
}

impl FilterOp {
    /// Parse the operator part of a `column__op` flat filter key.
    ///
    /// `null` is handled by the caller because its meaning depends on the value.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        let op = match suffix {
            "eq" => Self::Eq,
            "ne" | "neq" => Self::Ne,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            "contains" => Self::Contains,
            "icontains" => Self::IContains,
            "startswith" => Self::StartsWith,
            "endswith" => Self::EndsWith,
            "in" => Self::In,
            _ => return None,
        };
        Some(op)
    }

    /// Whether the operator takes no right-hand value.
    pub fn is_unary(&self) -> bool {
        matches!(self, Self::IsNull | Self::IsNotNull)
    }
}

/// A dynamic filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Null / no value.
    Null,
    /// A boolean value.
    Boolean(bool),
    /// An integer value.
    Integer(i64),
    /// A floating-point value.
    Float(f64),
    /// A string value.
    String(String),
    /// A list of scalars (for the `in` operator).
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Convert a JSON value into a filter value. Objects are rejected, and
    /// lists may only hold scalars.
    pub fn from_json(value: Value) -> AppResult<Self> {
        Ok(match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Boolean(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::Array(_) | Value::Object(_) => Err(AppError::validation(
                            "Filter lists may only contain scalar values",
                        )),
                        other => Self::from_json(other),
                    })
                    .collect::<AppResult<Vec<_>>>()?,
            ),
            Value::Object(_) => {
                return Err(AppError::validation("Filter values must not be objects"));
            }
        })
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

/// A single filter condition on a named field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterField {
    /// The column or field name to filter on.
    pub field: String,
    /// The comparison operator.
    pub op: FilterOp,
    /// The value to compare against.
    #[serde(default = "null_value")]
    pub value: FilterValue,
}

impl FilterField {
    /// Create a new filter field.
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// Shorthand for an equality filter.
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    /// Shorthand for a case-insensitive substring filter.
    pub fn icontains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::new(field, FilterOp::IContains, FilterValue::String(needle.into()))
    }

    /// Shorthand for a prefix filter.
    pub fn startswith(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::new(field, FilterOp::StartsWith, FilterValue::String(prefix.into()))
    }

    /// Build a leaf from a flat `column` or `column__op` key.
    ///
    /// `column__null` takes `true` (is null) or `false` (is not null).
    /// Unknown suffixes stay on the column name, which then fails the
    /// column allowlist.
    pub fn from_key(key: &str, value: FilterValue) -> AppResult<Self> {
        let Some((column, suffix)) = key.rsplit_once("__") else {
            return Ok(Self::eq(key, value));
        };
        if suffix == "null" {
            return match value {
                FilterValue::Boolean(true) => Ok(Self::new(column, FilterOp::IsNull, FilterValue::Null)),
                FilterValue::Boolean(false) => Ok(Self::new(column, FilterOp::IsNotNull, FilterValue::Null)),
                _ => Err(AppError::validation(format!(
                    "Filter '{key}' expects true or false"
                ))),
            };
        }
        Ok(match FilterOp::from_suffix(suffix) {
            Some(op) => Self::new(column, op, value),
            None => Self::eq(key, value),
        })
    }
}

fn null_value() -> FilterValue {
    FilterValue::Null
}

/// A structured filter expression. Tree shape is preserved by translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterExpr {
    /// A leaf comparison.
    Field(FilterField),
    /// Every child must hold.
    And {
        /// Conjuncts.
        and: Vec<FilterExpr>,
    },
    /// At least one child must hold.
    Or {
        /// Disjuncts.
        or: Vec<FilterExpr>,
    },
    /// The child must not hold.
    Not {
        /// Negated expression.
        not: Box<FilterExpr>,
    },
}

impl FilterExpr {
    /// Conjunction of the given expressions.
    pub fn and(children: Vec<FilterExpr>) -> Self {
        Self::And { and: children }
    }

    /// Disjunction of the given expressions.
    pub fn or(children: Vec<FilterExpr>) -> Self {
        Self::Or { or: children }
    }

    /// Negation of the given expression.
    pub fn not(child: FilterExpr) -> Self {
        Self::Not {
            not: Box::new(child),
        }
    }

    /// Decode an expression tree from JSON.
    pub fn from_json(value: Value) -> AppResult<Self> {
        let Value::Object(mut map) = value else {
            return Err(AppError::validation("Filter expression must be an object"));
        };

        if map.len() == 1 {
            if let Some(children) = map.remove("and") {
                return Ok(Self::and(Self::children(children)?));
            }
            if let Some(children) = map.remove("or") {
                return Ok(Self::or(Self::children(children)?));
            }
            if let Some(child) = map.remove("not") {
                return Ok(Self::not(Self::from_json(child)?));
            }
        }

        let field = match map.remove("field") {
            Some(Value::String(field)) => field,
            _ => return Err(AppError::validation("Filter expression is missing 'field'")),
        };
        let op: FilterOp = match map.remove("op") {
            Some(op) => serde_json::from_value(op)
                .map_err(|e| AppError::validation(format!("Unknown filter operator: {e}")))?,
            None => FilterOp::Eq,
        };
        let value = FilterValue::from_json(map.remove("value").unwrap_or(Value::Null))?;
        if let Some(extra) = map.keys().next() {
            return Err(AppError::validation(format!(
                "Unexpected key '{extra}' in filter expression"
            )));
        }

        Ok(Self::Field(FilterField { field, op, value }))
    }

    fn children(value: Value) -> AppResult<Vec<Self>> {
        match value {
            Value::Array(items) if !items.is_empty() => {
                items.into_iter().map(Self::from_json).collect()
            }
            _ => Err(AppError::validation(
                "Logical filter operators require a non-empty array",
            )),
        }
    }

    fn looks_like(map: &serde_json::Map<String, Value>) -> bool {
        if map.len() == 1 {
            return match map.iter().next() {
                Some((key, Value::Array(_))) => key == "and" || key == "or",
                Some((key, Value::Object(_))) => key == "not",
                _ => false,
            };
        }
        map.contains_key("field") && map.contains_key("op")
    }
}

/// The normalized, caller-supplied filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FilterPayload {
    /// No predicate.
    #[default]
    Empty,
    /// Legacy shorthand: equality on the primary identifier column.
    Id(String),
    /// Column (optionally `column__op`) → value, ANDed together.
    Fields(BTreeMap<String, FilterValue>),
    /// A structured expression tree.
    Expr(FilterExpr),
}

impl FilterPayload {
    /// Classify a raw JSON filter document.
    ///
    /// `null`, `""`, `{}` and `[]` are empty. A string is the identifier
    /// shorthand. An object is an expression when it is shaped like one,
    /// otherwise a flat map.
    pub fn from_json(value: Value) -> AppResult<Self> {
        match value {
            Value::Null => Ok(Self::Empty),
            Value::String(s) if s.is_empty() => Ok(Self::Empty),
            Value::String(s) => Ok(Self::Id(s)),
            Value::Array(items) if items.is_empty() => Ok(Self::Empty),
            Value::Array(_) => Err(AppError::validation(
                "Filter must be an object, not an array",
            )),
            Value::Object(map) if map.is_empty() => Ok(Self::Empty),
            Value::Object(map) if FilterExpr::looks_like(&map) => {
                FilterExpr::from_json(Value::Object(map)).map(Self::Expr)
            }
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| FilterValue::from_json(v).map(|v| (k, v)))
                .collect::<AppResult<BTreeMap<_, _>>>()
                .map(Self::Fields),
            Value::Bool(_) | Value::Number(_) => Err(AppError::validation(
                "Filter must be a string or an object",
            )),
        }
    }

    /// Parse the raw `f` query parameter. Blank input is empty.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(Self::Empty);
        }
        let value: Value = serde_json::from_str(raw)?;
        Self::from_json(value)
    }

    /// AND an extra flat condition onto this payload.
    ///
    /// Used by list endpoints that expose resource-specific filter
    /// parameters alongside the generic `f` document.
    pub fn and_field(self, key: impl Into<String>, value: FilterValue) -> Self {
        let key = key.into();
        match self {
            Self::Empty => Self::Fields(BTreeMap::from([(key, value)])),
            Self::Fields(mut map) => {
                map.insert(key, value);
                Self::Fields(map)
            }
            Self::Id(id) => Self::Expr(FilterExpr::and(vec![
                FilterExpr::Field(FilterField::eq("id", id)),
                FilterExpr::Field(FilterField::eq(key, value)),
            ])),
            Self::Expr(expr) => Self::Expr(FilterExpr::and(vec![
                expr,
                FilterExpr::Field(FilterField::eq(key, value)),
            ])),
        }
    }

    /// AND an expression onto this payload.
    pub fn and_expr(self, expr: FilterExpr) -> AppResult<Self> {
        let base = match self {
            Self::Empty => return Ok(Self::Expr(expr)),
            Self::Id(id) => vec![FilterExpr::Field(FilterField::eq("id", id))],
            Self::Fields(map) => map
                .into_iter()
                .map(|(k, v)| FilterField::from_key(&k, v).map(FilterExpr::Field))
                .collect::<AppResult<Vec<_>>>()?,
            Self::Expr(existing) => vec![existing],
        };
        let mut children = base;
        children.push(expr);
        Ok(Self::Expr(FilterExpr::and(children)))
    }

    /// Whether no predicate should be produced.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_shapes() {
        for raw in [json!(null), json!(""), json!({}), json!([])] {
            assert_eq!(FilterPayload::from_json(raw).unwrap(), FilterPayload::Empty);
        }
        assert_eq!(FilterPayload::parse("   ").unwrap(), FilterPayload::Empty);
    }

    #[test]
    fn test_bare_string_is_identifier() {
        let payload = FilterPayload::from_json(json!("1 OR 1=1")).unwrap();
        assert_eq!(payload, FilterPayload::Id("1 OR 1=1".to_string()));
    }

    #[test]
    fn test_flat_map() {
        let payload = FilterPayload::parse(r#"{"role":"admin","age__gte":18}"#).unwrap();
        let FilterPayload::Fields(map) = payload else {
            panic!("expected flat map");
        };
        assert_eq!(map["role"], FilterValue::String("admin".into()));
        assert_eq!(map["age__gte"], FilterValue::Integer(18));
    }

    #[test]
    fn test_expression_tree() {
        let payload = FilterPayload::from_json(json!({
            "or": [
                {"field": "role", "op": "eq", "value": "admin"},
                {"not": {"field": "email", "op": "icontains", "value": "@x.sky"}}
            ]
        }))
        .unwrap();

        let expected = FilterExpr::or(vec![
            FilterExpr::Field(FilterField::eq("role", "admin")),
            FilterExpr::not(FilterExpr::Field(FilterField::icontains("email", "@x.sky"))),
        ]);
        assert_eq!(payload, FilterPayload::Expr(expected));
    }

    #[test]
    fn test_field_named_and_is_flat() {
        let payload = FilterPayload::from_json(json!({"and": "x"})).unwrap();
        assert!(matches!(payload, FilterPayload::Fields(_)));
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(FilterPayload::from_json(json!([1, 2])).is_err());
        assert!(FilterPayload::from_json(json!(42)).is_err());
        assert!(FilterPayload::from_json(json!({"role": {"nested": true}})).is_err());
        assert!(FilterPayload::from_json(json!({"or": []})).is_err());
        assert!(FilterPayload::from_json(json!({"field": "a", "op": "regex"})).is_err());
        assert!(FilterPayload::parse("{not json").is_err());
    }

    #[test]
    fn test_and_field_merges() {
        let payload = FilterPayload::Empty
            .and_field("role", "user".into())
            .and_field("status", "active".into());
        let FilterPayload::Fields(map) = payload else {
            panic!("expected flat map");
        };
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_from_key_suffixes() {
        let field = FilterField::from_key("age__gte", FilterValue::Integer(18)).unwrap();
        assert_eq!(field, FilterField::new("age", FilterOp::Gte, 18i64));

        let field = FilterField::from_key("deleted_at__null", true.into()).unwrap();
        assert_eq!(field.op, FilterOp::IsNull);
        assert!(FilterField::from_key("deleted_at__null", "yes".into()).is_err());

        let field = FilterField::from_key("name__regex", "x".into()).unwrap();
        assert_eq!(field.field, "name__regex");
        assert_eq!(field.op, FilterOp::Eq);
    }

    #[test]
    fn test_and_expr_keeps_suffixed_keys() {
        let search = FilterExpr::or(vec![
            FilterExpr::Field(FilterField::startswith("email", "ann")),
            FilterExpr::Field(FilterField::startswith("last_name", "ann")),
        ]);
        let payload = FilterPayload::Empty
            .and_field("age__lt", 30i64.into())
            .and_expr(search.clone())
            .unwrap();

        let expected = FilterExpr::and(vec![
            FilterExpr::Field(FilterField::new("age", FilterOp::Lt, 30i64)),
            search,
        ]);
        assert_eq!(payload, FilterPayload::Expr(expected));
    }
}
