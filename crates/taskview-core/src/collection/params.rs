//! Request parameter boundary.
//!
//! Query strings carry filters and sorts as positional parallel arrays
//! (`filter_by[]`, `filter_comparator[]`, `filter_value[]`, `sort_by[]`,
//! `order_by[]`). They are turned into typed triples and pairs here and
//! nowhere else.

use super::comparator::parse_bool;
use crate::config::PaginationConfig;
use crate::error::{CollectionError, CollectionResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One `filter_by[i]`, `filter_comparator[i]`, `filter_value[i]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterTriple {
    pub field: String,
    pub comparator: String,
    pub value: String,
}

/// One `sort_by[i]` entry with its positional `order_by[i]`, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortPair {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

/// Parsed collection request parameters, still unvalidated against the
/// field allow-list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionParams {
    pub search: Option<String>,
    pub filters: Vec<FilterTriple>,
    pub filter_include_nulls: bool,
    pub sort: Vec<SortPair>,
    /// `order_by` entries beyond the last `sort_by`.
    pub surplus_orders: Vec<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl CollectionParams {
    /// Build parameters from decoded query pairs.
    ///
    /// Array keys may be written with or without a `[]` suffix. Unknown keys
    /// are ignored.
    ///
    /// # Errors
    ///
    /// [`CollectionError::InvalidPagination`] for non-integer `page` or
    /// `per_page`, [`CollectionError::InvalidTaskFilterValue`] for mismatched
    /// filter arrays or a non-boolean `filter_include_nulls`.
    pub fn from_pairs<I, K, V>(pairs: I) -> CollectionResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        let mut filter_by = Vec::new();
        let mut filter_comparator = Vec::new();
        let mut filter_value = Vec::new();
        let mut sort_by = Vec::new();
        let mut order_by = Vec::new();

        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.as_ref().to_string();
            match key.strip_suffix("[]").unwrap_or(key) {
                "s" => params.search = Some(value),
                "filter_by" => filter_by.push(value),
                "filter_comparator" => filter_comparator.push(value),
                "filter_value" => filter_value.push(value),
                "sort_by" => sort_by.push(value),
                "order_by" => order_by.push(value),
                "filter_include_nulls" => {
                    params.filter_include_nulls = parse_bool(&value).ok_or_else(|| {
                        CollectionError::filter_value(
                            "filter_include_nulls",
                            format!("'{value}' is not a boolean"),
                        )
                    })?;
                }
                "page" => params.page = Some(parse_pagination("page", &value)?),
                "per_page" => params.per_page = Some(parse_pagination("per_page", &value)?),
                other => debug!(key = other, "ignoring unrecognized collection parameter"),
            }
        }

        params.filters = zip_filter_triples(&filter_by, &filter_comparator, &filter_value)?;
        let mut orders = order_by.into_iter();
        params.sort = sort_by
            .into_iter()
            .map(|field| SortPair {
                field,
                order: orders.next(),
            })
            .collect();
        params.surplus_orders = orders.collect();
        Ok(params)
    }

    /// Non-empty search text, if any.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether the caller supplied any filter, sort or search criteria.
    #[must_use]
    pub fn has_criteria(&self) -> bool {
        !self.filters.is_empty() || !self.sort.is_empty() || self.search_term().is_some()
    }
}

/// Pair up the three filter arrays.
///
/// # Errors
///
/// [`CollectionError::InvalidTaskFilterValue`] when the arrays differ in
/// length.
pub fn zip_filter_triples(
    fields: &[String],
    comparators: &[String],
    values: &[String],
) -> CollectionResult<Vec<FilterTriple>> {
    if fields.len() != comparators.len() || fields.len() != values.len() {
        return Err(CollectionError::filter_value(
            "filter_by",
            format!(
                "filter_by, filter_comparator and filter_value must have the same length (got {}, {}, {})",
                fields.len(),
                comparators.len(),
                values.len()
            ),
        ));
    }
    Ok(fields
        .iter()
        .zip(comparators)
        .zip(values)
        .map(|((field, comparator), value)| FilterTriple {
            field: field.clone(),
            comparator: comparator.clone(),
            value: value.clone(),
        })
        .collect())
}

fn parse_pagination(param: &'static str, raw: &str) -> CollectionResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| CollectionError::InvalidPagination {
            param,
            value: raw.to_string(),
        })
}

/// A resolved page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    /// Apply defaults and clamps: `page < 1` becomes 1, a missing or
    /// non-positive `per_page` uses the configured default, and anything
    /// above the configured maximum is clamped to it.
    #[must_use]
    pub fn resolve(page: Option<i64>, per_page: Option<i64>, config: &PaginationConfig) -> Self {
        let page = page
            .filter(|p| *p >= 1)
            .map_or(1, |p| u32::try_from(p).unwrap_or(u32::MAX));
        let max = config.max_per_page.max(1);
        let per_page = per_page
            .filter(|n| *n >= 1)
            .map_or(config.default_per_page, |n| {
                u32::try_from(n).unwrap_or(u32::MAX)
            })
            .clamp(1, max);
        Self { page, per_page }
    }

    #[must_use]
    pub fn offset(self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.per_page)
    }

    #[must_use]
    pub fn limit(self) -> i64 {
        i64::from(self.per_page)
    }
}
