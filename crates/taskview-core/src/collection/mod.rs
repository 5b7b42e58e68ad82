//! Collection queries: scope, filter, sort, search and paginate tasks.
//!
//! Requests are compiled in stages before any storage access:
//! parameters, then filters (per triple: field, comparator, value), then
//! sorts (per pair: field, order). Only then is the scope resolved and the
//! store queried.

pub mod comparator;
pub mod date;
pub mod executor;
pub mod field;
pub mod filter;
pub mod params;
pub mod saved_filter;
pub mod scope;
pub mod sort;
pub mod sql;
pub mod visibility;

use crate::error::CollectionResult;
use crate::model::task::Task;
use filter::{TaskPredicate, fold_case};
use params::{CollectionParams, FilterTriple, SortPair};
use sort::{TaskOrdering, validate_orders};

pub use executor::{CollectionPage, CollectionRequest, ResolvedScope, execute, read_collection};
pub use scope::Scope;

/// Filters, search terms and ordering compiled from one set of criteria.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledQuery {
    pub predicate: TaskPredicate,
    /// Title substrings; all must match.
    pub search: Vec<String>,
    pub ordering: TaskOrdering,
}

impl CompiledQuery {
    /// Compile request parameters.
    ///
    /// # Errors
    ///
    /// The first filter error, else the first sort error.
    pub fn compile(params: &CollectionParams) -> CollectionResult<Self> {
        Self::from_parts(
            &params.filters,
            params.filter_include_nulls,
            &params.sort,
            &params.surplus_orders,
            params.search_term(),
        )
    }

    pub(crate) fn from_parts(
        filters: &[FilterTriple],
        include_nulls: bool,
        sort: &[SortPair],
        surplus_orders: &[String],
        search: Option<&str>,
    ) -> CollectionResult<Self> {
        let predicate = TaskPredicate::compile(filters, include_nulls)?;
        let ordering = TaskOrdering::compile(sort)?;
        validate_orders(surplus_orders)?;
        Ok(Self {
            predicate,
            search: search
                .filter(|term| !term.is_empty())
                .map(str::to_string)
                .into_iter()
                .collect(),
            ordering,
        })
    }

    /// In-memory counterpart of the SQL `WHERE` clause, scope excluded.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.predicate.matches(task)
            && self
                .search
                .iter()
                .all(|term| fold_case(&task.title).contains(&fold_case(term)))
    }
}
