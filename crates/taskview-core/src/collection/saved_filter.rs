//! Saved filters: stored criteria addressed through negative list ids.

use super::CompiledQuery;
use super::params::{FilterTriple, SortPair};
use super::visibility::resolve_readable_lists;
use crate::config::SavedFilterPrecedence;
use crate::db::query::fetch_saved_filter;
use crate::error::{CollectionError, CollectionResult};
use crate::model::access::Actor;
use crate::model::{ListId, SavedFilterId, UserId};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Criteria stored with a saved filter, as JSON.
///
/// ```json
/// {"filters": [{"field": "done", "comparator": "equals", "value": "false"}],
///  "sort": [{"field": "due_date", "order": "asc"}],
///  "search": "release",
///  "filter_include_nulls": false}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedFilterCriteria {
    #[serde(default)]
    pub filters: Vec<FilterTriple>,
    #[serde(default)]
    pub filter_include_nulls: bool,
    #[serde(default)]
    pub sort: Vec<SortPair>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl SavedFilterCriteria {
    /// Compile through the same filter and sort compilers as request
    /// parameters.
    ///
    /// # Errors
    ///
    /// Any filter or sort compilation error in the stored criteria.
    pub fn compile(&self) -> CollectionResult<CompiledQuery> {
        CompiledQuery::from_parts(
            &self.filters,
            self.filter_include_nulls,
            &self.sort,
            &[],
            self.search.as_deref(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedFilter {
    pub id: SavedFilterId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub criteria: SavedFilterCriteria,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// A saved filter resolved for one actor.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledScope {
    /// Every list the owner can read at request time.
    pub lists: BTreeSet<ListId>,
    pub query: CompiledQuery,
}

/// Load a saved filter and compile its criteria for its owner.
///
/// # Errors
///
/// [`CollectionError::SavedFilterNotFound`] if the filter does not exist or
/// belongs to someone else, compilation errors from the stored criteria, and
/// storage failures.
pub fn expand(conn: &Connection, id: SavedFilterId, actor: &Actor) -> CollectionResult<CompiledScope> {
    let Some(filter) = fetch_saved_filter(conn, id)?.filter(|f| f.owner_id == actor.user_id) else {
        warn!(
            saved_filter = id.get(),
            user_id = actor.user_id.get(),
            "saved filter missing or not owned by actor"
        );
        return Err(CollectionError::SavedFilterNotFound(id));
    };

    let query = filter.criteria.compile()?;
    let lists = resolve_readable_lists(conn, actor)?;
    debug!(
        saved_filter = id.get(),
        clauses = query.predicate.clauses().len(),
        lists = lists.len(),
        "expanded saved filter"
    );
    Ok(CompiledScope { lists, query })
}

/// Combine stored criteria with criteria supplied on the request.
#[must_use]
pub fn combine(
    stored: CompiledQuery,
    supplied: CompiledQuery,
    precedence: SavedFilterPrecedence,
) -> CompiledQuery {
    match precedence {
        SavedFilterPrecedence::Stored => stored,
        SavedFilterPrecedence::Supplied => supplied,
        SavedFilterPrecedence::Merge => CompiledQuery {
            predicate: stored.predicate.and(supplied.predicate),
            search: stored.search.into_iter().chain(supplied.search).collect(),
            ordering: stored.ordering.then(supplied.ordering),
        },
    }
}
