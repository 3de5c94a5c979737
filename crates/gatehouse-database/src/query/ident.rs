//! Identifier validation and quoting.
//!
//! Column names reach SQL text only through [`quote_identifier`]; values
//! never do.

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;

/// Whether `name` is a plain (optionally dotted) SQL identifier:
/// `[A-Za-z_][A-Za-z0-9_]*` per segment.
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_valid_segment)
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate and double-quote an identifier, segment by segment.
pub fn quote_identifier(name: &str) -> AppResult<String> {
    if !is_valid_identifier(name) {
        return Err(AppError::validation(format!("Invalid identifier: '{name}'")));
    }
    Ok(name
        .split('.')
        .map(|segment| format!("\"{segment}\""))
        .collect::<Vec<_>>()
        .join("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("created_at").unwrap(), "\"created_at\"");
        assert_eq!(quote_identifier("u.email").unwrap(), "\"u\".\"email\"");
    }

    #[test]
    fn test_rejects_injection() {
        for bad in ["", "1col", "id; DROP TABLE users", "na\"me", "a..b", "role--", "a b"] {
            assert!(quote_identifier(bad).is_err(), "accepted {bad:?}");
        }
    }
}
