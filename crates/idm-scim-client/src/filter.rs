//! SCIM filter expressions (RFC 7644 Section 3.4.2.2).
//!
//! A [`FilterExpression`] is an immutable tree that renders to the single-line
//! filter grammar understood by SCIM servers. [`FilterExpression::Null`] renders
//! to the empty string and means "no filter applied".

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;

/// Attribute compared against the Unix epoch by [`FilterExpression::all_resources`].
pub const LAST_MODIFIED_ATTRIBUTE: &str = "meta.lastModified";

/// Comparison operators supported by the filter builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// `eq`
    Equal,
    /// `eq_ci`, equality ignoring case.
    EqualCaseInsensitive,
    /// `ne`
    NotEqual,
    /// `co`
    Contains,
    /// `sw`
    StartsWith,
    /// `ew`
    EndsWith,
    /// `gt`
    GreaterThan,
}

impl FilterOperator {
    /// Wire representation of the operator.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equal => "eq",
            FilterOperator::EqualCaseInsensitive => "eq_ci",
            FilterOperator::NotEqual => "ne",
            FilterOperator::Contains => "co",
            FilterOperator::StartsWith => "sw",
            FilterOperator::EndsWith => "ew",
            FilterOperator::GreaterThan => "gt",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A SCIM filter expression.
///
/// The [`fmt::Display`] impl produces the wire form. Comparison values are
/// always double-quoted and are not escaped, so callers must only pass values
/// that are safe to embed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterExpression {
    /// No filter. Renders as `""`.
    #[default]
    Null,

    /// `{attribute} {operator} "{value}"`
    Comparison {
        attribute: String,
        operator: FilterOperator,
        value: String,
    },

    /// Parenthesized conjunction of the children.
    And(Vec<FilterExpression>),

    /// Parenthesized disjunction of the children.
    Or(Vec<FilterExpression>),

    /// Negation of the child, rendered as `not {child}`.
    Not(Box<FilterExpression>),
}

impl FilterExpression {
    /// Build a comparison expression.
    pub fn comparison(
        attribute: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Self {
        Self::Comparison {
            attribute: attribute.into(),
            operator,
            value: value.into(),
        }
    }

    /// Build an `eq` comparison.
    pub fn eq(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::comparison(attribute, FilterOperator::Equal, value)
    }

    /// Conjunction of `expressions`.
    pub fn and(expressions: impl IntoIterator<Item = FilterExpression>) -> Self {
        Self::And(expressions.into_iter().collect())
    }

    /// Disjunction of `expressions`.
    pub fn or(expressions: impl IntoIterator<Item = FilterExpression>) -> Self {
        Self::Or(expressions.into_iter().collect())
    }

    /// Negation of `expression`.
    pub fn not(expression: FilterExpression) -> Self {
        Self::Not(Box::new(expression))
    }

    /// A filter that every resource satisfies: last modified after the Unix epoch.
    ///
    /// Some servers reject an empty filter on the `.search` endpoint but accept
    /// any comparison, so this stands in for "list everything".
    #[must_use]
    pub fn all_resources() -> Self {
        let epoch = DateTime::<Utc>::UNIX_EPOCH.to_rfc3339_opts(SecondsFormat::Secs, true);
        Self::comparison(LAST_MODIFIED_ATTRIBUTE, FilterOperator::GreaterThan, epoch)
    }

    /// Whether this is the [`FilterExpression::Null`] variant.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, FilterExpression::Null)
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpression::Null => Ok(()),
            FilterExpression::Comparison {
                attribute,
                operator,
                value,
            } => write!(f, "{attribute} {operator} \"{value}\""),
            FilterExpression::And(expressions) => write_group(f, expressions, " and "),
            FilterExpression::Or(expressions) => write_group(f, expressions, " or "),
            FilterExpression::Not(expression) => write!(f, "not {expression}"),
        }
    }
}

fn write_group(
    f: &mut fmt::Formatter<'_>,
    expressions: &[FilterExpression],
    separator: &str,
) -> fmt::Result {
    f.write_str("(")?;
    for (i, expression) in expressions.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{expression}")?;
    }
    f.write_str(")")
}
