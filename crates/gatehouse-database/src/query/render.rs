//! Condition tree → parameterized PostgreSQL text.

use gatehouse_core::result::AppResult;
use gatehouse_core::types::SortField;

use super::condition::Condition;
use super::ident::quote_identifier;
use super::value::SqlValue;

/// Accumulates SQL text and the values bound to its `$n` placeholders.
#[derive(Debug, Default)]
pub struct Renderer {
    sql: String,
    binds: Vec<SqlValue>,
}

impl Renderer {
    /// Render one condition tree.
    pub fn render(condition: &Condition) -> AppResult<(String, Vec<SqlValue>)> {
        let mut renderer = Self::default();
        renderer.push_condition(condition)?;
        Ok((renderer.sql, renderer.binds))
    }

    fn bind(&mut self, value: &SqlValue) {
        self.binds.push(value.clone());
        self.sql.push('$');
        self.sql.push_str(&self.binds.len().to_string());
    }

    fn push_condition(&mut self, condition: &Condition) -> AppResult<()> {
        match condition {
            Condition::Compare { column, op, value } => {
                self.sql.push_str(&quote_identifier(column)?);
                self.sql.push(' ');
                self.sql.push_str(op.as_sql());
                self.sql.push(' ');
                self.bind(value);
            }
            Condition::Like {
                column,
                pattern,
                case_insensitive,
            } => {
                self.sql.push_str(&quote_identifier(column)?);
                self.sql
                    .push_str(if *case_insensitive { " ILIKE " } else { " LIKE " });
                self.bind(&SqlValue::Text(pattern.clone()));
                self.sql.push_str(" ESCAPE '\\'");
            }
            Condition::In { column, values } => {
                self.sql.push_str(&quote_identifier(column)?);
                self.sql.push_str(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        self.sql.push_str(", ");
                    }
                    self.bind(value);
                }
                self.sql.push(')');
            }
            Condition::IsNull { column, negated } => {
                self.sql.push_str(&quote_identifier(column)?);
                self.sql
                    .push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Condition::And(children) => self.push_group(children, " AND ", "TRUE")?,
            Condition::Or(children) => self.push_group(children, " OR ", "FALSE")?,
            Condition::Not(child) => {
                self.sql.push_str("NOT (");
                self.push_condition(child)?;
                self.sql.push(')');
            }
            Condition::Const(value) => self.sql.push_str(if *value { "TRUE" } else { "FALSE" }),
        }
        Ok(())
    }

    fn push_group(&mut self, children: &[Condition], joiner: &str, empty: &str) -> AppResult<()> {
        if children.is_empty() {
            self.sql.push_str(empty);
            return Ok(());
        }
        self.sql.push('(');
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                self.sql.push_str(joiner);
            }
            self.push_condition(child)?;
        }
        self.sql.push(')');
        Ok(())
    }
}

/// Render an `ORDER BY` body such as `"created_at" DESC, "id" ASC`.
pub fn render_order(sort: &[SortField]) -> AppResult<Option<String>> {
    if sort.is_empty() {
        return Ok(None);
    }
    let parts = sort
        .iter()
        .map(|s| Ok(format!("{} {}", quote_identifier(&s.field)?, s.direction.as_sql())))
        .collect::<AppResult<Vec<_>>>()?;
    Ok(Some(parts.join(", ")))
}
