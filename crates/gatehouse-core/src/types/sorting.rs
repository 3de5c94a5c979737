//! Sorting types for list endpoints.

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Asc,
    /// Descending order.
    Desc,
}

impl SortDirection {
    /// Return the SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A sort specification consisting of a field name and direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    /// Column or field name to sort by.
    pub field: String,
    /// Sort direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortField {
    /// Create a new sort field.
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Create an ascending sort on the given field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    /// Create a descending sort on the given field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }
}

/// Parse a comma-separated sort spec such as `-created_at,+id,email`.
///
/// Tokens are trimmed; empty tokens and lone `+`/`-` are skipped. Column
/// names are not validated here.
pub fn parse_sort_spec(spec: &str) -> Vec<SortField> {
    spec.split(',')
        .filter_map(|token| {
            let token = token.trim();
            let (direction, name) = if let Some(rest) = token.strip_prefix('-') {
                (SortDirection::Desc, rest)
            } else if let Some(rest) = token.strip_prefix('+') {
                (SortDirection::Asc, rest)
            } else {
                (SortDirection::Asc, token)
            };
            let name = name.trim();
            (!name.is_empty()).then(|| SortField::new(name, direction))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sort_spec() {
        let sort = parse_sort_spec("-created_at,+id");
        assert_eq!(
            sort,
            vec![SortField::desc("created_at"), SortField::asc("id")]
        );
    }

    #[test]
    fn test_parse_sort_spec_skips_blanks() {
        assert!(parse_sort_spec("").is_empty());
        assert!(parse_sort_spec(" , + ,-").is_empty());
        assert_eq!(parse_sort_spec(" email ,"), vec![SortField::asc("email")]);
    }
}
