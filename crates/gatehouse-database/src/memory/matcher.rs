//! In-process evaluation of a translated condition against JSON rows.
//!
//! Mirrors PostgreSQL semantics closely enough for tests and local use:
//! comparisons with `NULL` are unknown, `NOT` of unknown is unknown, and
//! `NULL` sorts last ascending and first descending.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use gatehouse_core::types::{SortDirection, SortField};

use crate::query::{ColumnKind, ColumnSet, Condition, SqlValue};

/// Read a column of a serialized row as a typed value.
pub fn column_value(row: &Value, column: &str, columns: &ColumnSet) -> SqlValue {
    let raw = row.get(column).unwrap_or(&Value::Null);
    let kind = columns.kind(column).unwrap_or(ColumnKind::Text);
    match (kind, raw) {
        (_, Value::Null) => SqlValue::Null,
        (ColumnKind::Text, Value::String(s)) => SqlValue::Text(s.clone()),
        (ColumnKind::Text, other) => SqlValue::Text(other.to_string()),
        (ColumnKind::Uuid, Value::String(s)) => {
            Uuid::parse_str(s).map_or(SqlValue::Null, SqlValue::Uuid)
        }
        (ColumnKind::Integer, Value::Number(n)) => n.as_i64().map_or(SqlValue::Null, SqlValue::Int),
        (ColumnKind::Boolean, Value::Bool(b)) => SqlValue::Bool(*b),
        (ColumnKind::Timestamp, Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .map_or(SqlValue::Null, |dt| SqlValue::Timestamp(dt.with_timezone(&Utc))),
        _ => SqlValue::Null,
    }
}

/// Whether the row satisfies the condition (unknown counts as no).
pub fn matches(row: &Value, condition: &Condition, columns: &ColumnSet) -> bool {
    eval(row, condition, columns) == Some(true)
}

fn eval(row: &Value, condition: &Condition, columns: &ColumnSet) -> Option<bool> {
    use crate::query::CompareOp::*;

    match condition {
        Condition::Compare { column, op, value } => {
            let left = column_value(row, column, columns);
            if left == SqlValue::Null {
                return None;
            }
            let ordering = left.compare(value)?;
            Some(match op {
                Eq => ordering == Ordering::Equal,
                Ne => ordering != Ordering::Equal,
                Gt => ordering == Ordering::Greater,
                Gte => ordering != Ordering::Less,
                Lt => ordering == Ordering::Less,
                Lte => ordering != Ordering::Greater,
            })
        }
        Condition::Like {
            column,
            pattern,
            case_insensitive,
        } => match column_value(row, column, columns) {
            SqlValue::Text(text) if *case_insensitive => {
                Some(like_match(&text.to_lowercase(), &pattern.to_lowercase()))
            }
            SqlValue::Text(text) => Some(like_match(&text, pattern)),
            _ => None,
        },
        Condition::In { column, values } => {
            let left = column_value(row, column, columns);
            if left == SqlValue::Null {
                return None;
            }
            Some(
                values
                    .iter()
                    .any(|v| left.compare(v) == Some(Ordering::Equal)),
            )
        }
        Condition::IsNull { column, negated } => {
            let is_null = column_value(row, column, columns) == SqlValue::Null;
            Some(is_null != *negated)
        }
        Condition::And(children) => {
            let mut unknown = false;
            for child in children {
                match eval(row, child, columns) {
                    Some(false) => return Some(false),
                    None => unknown = true,
                    Some(true) => {}
                }
            }
            (!unknown).then_some(true)
        }
        Condition::Or(children) => {
            let mut unknown = false;
            for child in children {
                match eval(row, child, columns) {
                    Some(true) => return Some(true),
                    None => unknown = true,
                    Some(false) => {}
                }
            }
            (!unknown).then_some(false)
        }
        Condition::Not(child) => eval(row, child, columns).map(|b| !b),
        Condition::Const(value) => Some(*value),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Literal(char),
    One,
    Many,
}

fn tokenize(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '\\' => Token::Literal(chars.next().unwrap_or('\\')),
            '%' => Token::Many,
            '_' => Token::One,
            other => Token::Literal(other),
        });
    }
    tokens
}

/// `LIKE` matching with backslash as the escape character.
pub fn like_match(text: &str, pattern: &str) -> bool {
    let tokens = tokenize(pattern);
    let n = tokens.len();

    // reachable[j]: the text consumed so far matches tokens[..j]
    let mut reachable = vec![false; n + 1];
    reachable[0] = true;
    close_over_many(&tokens, &mut reachable);

    for c in text.chars() {
        let mut next = vec![false; n + 1];
        for (j, token) in tokens.iter().enumerate() {
            if !reachable[j] {
                continue;
            }
            match token {
                Token::Many => next[j] = true,
                Token::One => next[j + 1] = true,
                Token::Literal(l) if *l == c => next[j + 1] = true,
                Token::Literal(_) => {}
            }
        }
        close_over_many(&tokens, &mut next);
        reachable = next;
    }
    reachable[n]
}

fn close_over_many(tokens: &[Token], set: &mut [bool]) {
    for (j, token) in tokens.iter().enumerate() {
        if *token == Token::Many && set[j] {
            set[j + 1] = true;
        }
    }
}

/// Order two rows by the given sort fields.
pub fn compare_rows(a: &Value, b: &Value, sort: &[SortField], columns: &ColumnSet) -> Ordering {
    for field in sort {
        let left = column_value(a, &field.field, columns);
        let right = column_value(b, &field.field, columns);
        let ordering = match (&left, &right) {
            (SqlValue::Null, SqlValue::Null) => Ordering::Equal,
            (SqlValue::Null, _) => Ordering::Greater,
            (_, SqlValue::Null) => Ordering::Less,
            _ => left.compare(&right).unwrap_or(Ordering::Equal),
        };
        let ordering = match field.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
