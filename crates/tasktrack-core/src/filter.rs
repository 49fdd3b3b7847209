//! Structured filter expressions for record-store queries.
//!
//! Filters are built as a small AST of `field <op> value` comparisons joined by
//! `&&`, and rendered to the record store's expression syntax only at the
//! boundary. Values are quoted and escaped during rendering and field names are
//! checked against an identifier grammar, so caller input can never change the
//! shape of the expression.

use crate::{TrackError, TrackResult};
use std::fmt;

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Substring match.
    Like,
}

impl Operator {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "~",
        }
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Integer(i64),
    Bool(bool),
    Null,
}

impl FilterValue {
    fn render(&self) -> TrackResult<String> {
        match self {
            Self::Text(text) => {
                // The store's scanner treats `\` as an escape for the next
                // character, so a trailing backslash would swallow the closing quote.
                if text.contains('\\') {
                    return Err(TrackError::validation(
                        "filter values may not contain backslashes",
                    ));
                }
                Ok(format!("'{}'", text.replace('\'', "\\'")))
            }
            Self::Integer(number) => Ok(number.to_string()),
            Self::Bool(flag) => Ok(flag.to_string()),
            Self::Null => Ok("null".to_string()),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for FilterValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// A single `field <op> value` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: Operator,
    pub value: FilterValue,
}

/// A conjunction of conditions. The empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// The filter matching every record.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// A single comparison.
    #[must_use]
    pub fn compare(field: impl Into<String>, op: Operator, value: impl Into<FilterValue>) -> Self {
        Self {
            conditions: vec![Condition {
                field: field.into(),
                op,
                value: value.into(),
            }],
        }
    }

    /// `field = value`.
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::compare(field, Operator::Eq, value)
    }

    /// Appends every condition of `other` with `&&`.
    #[must_use]
    pub fn and(mut self, other: Self) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    /// Appends `field = value` with `&&`.
    #[must_use]
    pub fn and_eq(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.and(Self::eq(field, value))
    }

    /// Returns true when the filter has no conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// The conditions, in the order they were added.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Renders the filter in the record store's expression syntax.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::Validation`] for field names that are not plain
    /// identifiers and for text values that cannot be quoted safely.
    pub fn render(&self) -> TrackResult<String> {
        let parts = self
            .conditions
            .iter()
            .map(|condition| {
                validate_field(&condition.field)?;
                Ok(format!(
                    "{} {} {}",
                    condition.field,
                    condition.op.as_str(),
                    condition.value.render()?
                ))
            })
            .collect::<TrackResult<Vec<_>>>()?;

        Ok(parts.join(" && "))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(rendered) if rendered.is_empty() => f.write_str("<all>"),
            Ok(rendered) => f.write_str(&rendered),
            Err(_) => f.write_str("<invalid filter>"),
        }
    }
}

/// Checks a field path such as `email` or `expand.owner.name`.
fn validate_field(field: &str) -> TrackResult<()> {
    let valid = !field.is_empty()
        && field.split('.').all(|segment| {
            let mut chars = segment.chars();
            matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        });

    if valid {
        Ok(())
    } else {
        Err(TrackError::validation(format!(
            "invalid filter field: {:?}",
            field
        )))
    }
}

/// Checks a sort expression such as `-created,title`.
///
/// # Errors
///
/// Returns [`TrackError::Validation`] when a sort key is not a plain field path.
pub fn validate_sort(sort: &str) -> TrackResult<()> {
    sort.split(',')
        .map(str::trim)
        .map(|key| key.strip_prefix(['-', '+']).unwrap_or(key))
        .try_for_each(validate_field)
}
