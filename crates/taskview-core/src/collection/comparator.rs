//! Comparator tokens and the operand coercion each field type accepts.

use super::date::parse_date;
use super::field::{FieldType, TaskField};
use crate::error::{CollectionError, CollectionResult};
use std::cmp::Ordering;
use std::fmt;

/// A filter comparator as named in `filter_comparator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Equals,
    NotEquals,
    Greater,
    GreaterEquals,
    Less,
    LessEquals,
    Like,
    In,
}

impl Comparator {
    pub const ALL: [Self; 8] = [
        Self::Equals,
        Self::NotEquals,
        Self::Greater,
        Self::GreaterEquals,
        Self::Less,
        Self::LessEquals,
        Self::Like,
        Self::In,
    ];

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::Greater => "greater",
            Self::GreaterEquals => "greater_equals",
            Self::Less => "less",
            Self::LessEquals => "less_equals",
            Self::Like => "like",
            Self::In => "in",
        }
    }

    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.token() == token)
    }

    /// SQL operator for plain column comparisons.
    #[must_use]
    pub const fn sql_operator(self) -> Option<&'static str> {
        match self {
            Self::Equals => Some("="),
            Self::NotEquals => Some("!="),
            Self::Greater => Some(">"),
            Self::GreaterEquals => Some(">="),
            Self::Less => Some("<"),
            Self::LessEquals => Some("<="),
            Self::Like | Self::In => None,
        }
    }

    /// Whether `ordering` (field value against operand) satisfies an
    /// ordering comparator. Always false for `like` and `in`.
    #[must_use]
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Equals => ordering == Ordering::Equal,
            Self::NotEquals => ordering != Ordering::Equal,
            Self::Greater => ordering == Ordering::Greater,
            Self::GreaterEquals => ordering != Ordering::Less,
            Self::Less => ordering == Ordering::Less,
            Self::LessEquals => ordering != Ordering::Greater,
            Self::Like | Self::In => false,
        }
    }

    /// Whether this comparator is defined for a field type.
    #[must_use]
    pub const fn supports(self, field_type: FieldType) -> bool {
        match field_type {
            FieldType::Integer => !matches!(self, Self::Like),
            FieldType::Float | FieldType::Date => !matches!(self, Self::Like | Self::In),
            FieldType::Bool => matches!(self, Self::Equals | Self::NotEquals),
            FieldType::Text => matches!(
                self,
                Self::Equals | Self::NotEquals | Self::Like | Self::In
            ),
            FieldType::IdSet => matches!(self, Self::Equals | Self::In),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A filter value coerced to its field's semantic type.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Integer(i64),
    Float(f64),
    /// Epoch seconds.
    Date(i64),
    Bool(bool),
    Text(String),
    Integers(Vec<i64>),
    Texts(Vec<String>),
}

/// Builds one filter clause for a resolved field/comparator pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredicateBuilder {
    pub field: TaskField,
    pub comparator: Comparator,
}

/// Resolve a comparator token against a field.
///
/// # Errors
///
/// [`CollectionError::InvalidTaskFilterValue`] for unknown tokens and for
/// comparators the field's type does not support.
pub fn resolve(field: TaskField, token: &str) -> CollectionResult<PredicateBuilder> {
    let comparator = Comparator::parse(token).ok_or_else(|| {
        CollectionError::filter_value(field.name(), format!("unknown comparator '{token}'"))
    })?;
    if !comparator.supports(field.field_type()) {
        return Err(CollectionError::filter_value(
            field.name(),
            format!("comparator '{comparator}' is not supported for this field"),
        ));
    }
    Ok(PredicateBuilder { field, comparator })
}

impl PredicateBuilder {
    /// Coerce a raw value to the operand this clause compares against.
    ///
    /// `in` takes a comma-separated list; empty entries are skipped.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidTaskFilterValue`] if the value does not
    /// parse as the field's type.
    pub fn operand(&self, raw: &str) -> CollectionResult<Operand> {
        let field = self.field.name();
        let field_type = match self.field.field_type() {
            // Set membership compares identifiers.
            FieldType::IdSet => FieldType::Integer,
            other => other,
        };

        if self.comparator == Comparator::In {
            let items = raw.split(',').map(str::trim).filter(|item| !item.is_empty());
            return match field_type {
                FieldType::Text => Ok(Operand::Texts(items.map(str::to_string).collect())),
                _ => items
                    .map(|item| parse_integer(field, item))
                    .collect::<CollectionResult<Vec<_>>>()
                    .map(Operand::Integers),
            };
        }

        match field_type {
            FieldType::Integer | FieldType::IdSet => parse_integer(field, raw).map(Operand::Integer),
            FieldType::Float => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(Operand::Float)
                .ok_or_else(|| {
                    CollectionError::filter_value(field, format!("'{raw}' is not a number"))
                }),
            FieldType::Date => parse_date(raw)
                .map(|ts| Operand::Date(ts.timestamp()))
                .map_err(|err| CollectionError::filter_value(field, err.to_string())),
            FieldType::Bool => parse_bool(raw).map(Operand::Bool).ok_or_else(|| {
                CollectionError::filter_value(field, format!("'{raw}' is not a boolean"))
            }),
            FieldType::Text => Ok(Operand::Text(raw.to_string())),
        }
    }
}

fn parse_integer(field: &str, raw: &str) -> CollectionResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| CollectionError::filter_value(field, format!("'{raw}' is not an integer")))
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
