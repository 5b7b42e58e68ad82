//! Collection execution: scope resolution, counting and paging in one
//! read transaction.

use super::params::{CollectionParams, PageRequest};
use super::saved_filter::{combine, expand};
use super::visibility::resolve_readable_lists;
use super::{CompiledQuery, Scope};
use crate::config::EngineConfig;
use crate::db::query::{TaskQuery, count_tasks, fetch_tasks};
use crate::error::{CollectionError, CollectionResult};
use crate::model::access::Actor;
use crate::model::task::Task;
use crate::model::{ListId, UserId};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{info, warn};

/// A collection request as received from a transport.
#[derive(Debug, Clone)]
pub struct CollectionRequest {
    pub actor: Actor,
    pub scope: Scope,
    pub params: CollectionParams,
}

/// One page of a collection plus totals for pagination headers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionPage {
    pub tasks: Vec<Task>,
    /// Matching tasks across all pages.
    pub total_count: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u64,
}

/// The concrete task source a scope resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedScope {
    pub lists: BTreeSet<ListId>,
    pub favorites_of: Option<UserId>,
}

/// Resolve the scope and run the request inside one read transaction.
///
/// # Errors
///
/// Compilation errors (before any storage access), then
/// [`CollectionError::ListNotFound`] or
/// [`CollectionError::SavedFilterNotFound`] for unreadable scopes, then
/// storage failures.
pub fn read_collection(
    conn: &Connection,
    config: &EngineConfig,
    request: &CollectionRequest,
) -> CollectionResult<CollectionPage> {
    let supplied = CompiledQuery::compile(&request.params)?;
    let page = PageRequest::resolve(
        request.params.page,
        request.params.per_page,
        &config.pagination,
    );

    let tx = conn.unchecked_transaction()?;
    let (scope, query) = resolve_scope(&tx, config, &request.actor, request.scope, supplied)?;
    let result = execute(&tx, request.actor.user_id, &scope, &query, page)?;
    tx.commit()?;

    info!(
        user_id = request.actor.user_id.get(),
        scope = %request.scope,
        total = result.total_count,
        page = result.page,
        returned = result.tasks.len(),
        "read task collection"
    );
    Ok(result)
}

fn resolve_scope(
    conn: &Connection,
    config: &EngineConfig,
    actor: &Actor,
    scope: Scope,
    supplied: CompiledQuery,
) -> CollectionResult<(ResolvedScope, CompiledQuery)> {
    match scope {
        Scope::AllVisible => {
            let lists = resolve_readable_lists(conn, actor)?;
            Ok((
                ResolvedScope {
                    lists,
                    favorites_of: None,
                },
                supplied,
            ))
        }
        Scope::ConcreteList(list_id) => {
            if !resolve_readable_lists(conn, actor)?.contains(&list_id) {
                warn!(
                    user_id = actor.user_id.get(),
                    list_id = list_id.get(),
                    "list missing or not readable"
                );
                return Err(CollectionError::ListNotFound(list_id));
            }
            Ok((
                ResolvedScope {
                    lists: BTreeSet::from([list_id]),
                    favorites_of: None,
                },
                supplied,
            ))
        }
        Scope::Favorites => {
            let lists = resolve_readable_lists(conn, actor)?;
            Ok((
                ResolvedScope {
                    lists,
                    favorites_of: Some(actor.user_id),
                },
                supplied,
            ))
        }
        Scope::SavedFilter(id) => {
            let stored = expand(conn, id, actor)?;
            let query = combine(stored.query, supplied, config.saved_filters.precedence);
            Ok((
                ResolvedScope {
                    lists: stored.lists,
                    favorites_of: None,
                },
                query,
            ))
        }
    }
}

/// Count and fetch one page for an already resolved scope.
///
/// The caller owns the transaction; both statements must see the same
/// snapshot.
///
/// # Errors
///
/// Storage failures, unchanged.
pub fn execute(
    conn: &Connection,
    viewer: UserId,
    scope: &ResolvedScope,
    query: &CompiledQuery,
    page: PageRequest,
) -> CollectionResult<CollectionPage> {
    let task_query = TaskQuery {
        lists: &scope.lists,
        favorites_of: scope.favorites_of,
        predicate: &query.predicate,
        search: &query.search,
        ordering: &query.ordering,
        viewer,
        limit: page.limit(),
        offset: page.offset(),
    };

    let total_count = count_tasks(conn, &task_query)?;
    let tasks = if page.offset() >= i64::try_from(total_count).unwrap_or(i64::MAX) {
        Vec::new()
    } else {
        fetch_tasks(conn, &task_query)?
    };

    Ok(CollectionPage {
        tasks,
        total_count,
        page: page.page,
        per_page: page.per_page,
        total_pages: total_count.div_ceil(u64::from(page.per_page)),
    })
}
