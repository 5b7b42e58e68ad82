//! Sort compilation: `(field, order)` pairs to a total task ordering.

use super::field::{FieldValue, TaskField};
use super::params::SortPair;
use crate::error::{CollectionError, CollectionResult};
use crate::model::task::Task;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Exactly `asc` or `desc`.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    const fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: TaskField,
    pub direction: SortDirection,
}

/// Explicit sort keys followed by an implicit `id ASC` tie-break.
///
/// Unset dates sort after every set date regardless of direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskOrdering {
    keys: Vec<SortKey>,
}

impl TaskOrdering {
    /// Compile pairs in order; each pair checks its field, then its order.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidTaskField`] for unknown or set-valued
    /// fields, [`CollectionError::InvalidSortOrder`] for orders other than
    /// `asc`/`desc`.
    pub fn compile(pairs: &[SortPair]) -> CollectionResult<Self> {
        let keys = pairs
            .iter()
            .map(|pair| {
                let field = TaskField::parse(&pair.field)
                    .filter(|field| field.is_sortable())
                    .ok_or_else(|| CollectionError::InvalidTaskField {
                        field: pair.field.clone(),
                    })?;
                let direction = match pair.order.as_deref() {
                    None => SortDirection::Asc,
                    Some(token) => parse_order(token)?,
                };
                Ok(SortKey { field, direction })
            })
            .collect::<CollectionResult<Vec<_>>>()?;
        Ok(Self { keys })
    }

    #[must_use]
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Stored keys first, then these.
    #[must_use]
    pub fn then(mut self, other: Self) -> Self {
        self.keys.extend(other.keys);
        self
    }

    /// Compare two tasks exactly as the rendered `ORDER BY` would.
    #[must_use]
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        self.keys
            .iter()
            .map(|key| compare_key(*key, a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }

    /// `ORDER BY` clause against the `tasks t` alias.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut terms = Vec::with_capacity(self.keys.len() + 1);
        for key in &self.keys {
            let Some(col) = key.field.column() else {
                continue;
            };
            if key.field.is_nullable() {
                terms.push(format!("{col} IS NULL"));
            }
            terms.push(format!("{col} {}", key.direction.sql()));
        }
        terms.push("t.id ASC".to_string());
        format!("ORDER BY {}", terms.join(", "))
    }
}

/// Validate `order_by` entries that have no matching `sort_by`.
///
/// # Errors
///
/// [`CollectionError::InvalidSortOrder`] for the first invalid token.
pub fn validate_orders(orders: &[String]) -> CollectionResult<()> {
    orders.iter().try_for_each(|order| parse_order(order).map(|_| ()))
}

fn parse_order(token: &str) -> CollectionResult<SortDirection> {
    SortDirection::parse(token).ok_or_else(|| CollectionError::InvalidSortOrder {
        order: token.to_string(),
    })
}

fn compare_key(key: SortKey, a: &Task, b: &Task) -> Ordering {
    match (key.field.value(a), key.field.value(b)) {
        (FieldValue::Date(x), FieldValue::Date(y)) => match (x, y) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => key.direction.apply(x.cmp(&y)),
        },
        (FieldValue::Integer(x), FieldValue::Integer(y)) => key.direction.apply(x.cmp(&y)),
        (FieldValue::Float(x), FieldValue::Float(y)) => key.direction.apply(x.partial_cmp(&y).unwrap_or(Ordering::Equal)),
        (FieldValue::Bool(x), FieldValue::Bool(y)) => key.direction.apply(x.cmp(&y)),
        (FieldValue::Text(x), FieldValue::Text(y)) => key.direction.apply(x.cmp(y)),
        _ => Ordering::Equal,
    }
}
