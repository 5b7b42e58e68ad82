//! Readable-list resolution.
//!
//! A list is readable by an actor if any of these holds:
//! - the actor owns the list
//! - the list is shared with the actor
//! - the list is shared with a team the actor belongs to
//! - the actor owns the list's namespace
//! - the namespace is shared with the actor or one of their teams
//!
//! Each relation is a separate query; the readable set is their union.
//! Namespace relations are evaluated against current list membership, so a
//! namespace grant covers lists created after it.

use crate::model::ListId;
use crate::model::access::{Actor, Privilege};
use rusqlite::{Connection, params};
use std::collections::BTreeSet;
use tracing::debug;

/// One way a list becomes visible to an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisibilityPath {
    ListOwner,
    ListUserShare,
    ListTeamShare,
    NamespaceOwner,
    NamespaceUserShare,
    NamespaceTeamShare,
}

// Parameters: ?1 user id, ?2 team ids (JSON array), ?3 minimum privilege.
const LIST_OWNER_SQL: &str = "SELECT l.id FROM lists l WHERE l.owner_id = ?1";

const LIST_USER_SHARE_SQL: &str =
    "SELECT s.list_id FROM list_user_shares s WHERE s.user_id = ?1 AND s.privilege >= ?3";

const LIST_TEAM_SHARE_SQL: &str = "SELECT s.list_id FROM list_team_shares s \
     WHERE s.team_id IN (SELECT value FROM json_each(?2)) AND s.privilege >= ?3";

const NAMESPACE_OWNER_SQL: &str = "SELECT l.id FROM lists l \
     JOIN namespaces n ON n.id = l.namespace_id WHERE n.owner_id = ?1";

const NAMESPACE_USER_SHARE_SQL: &str = "SELECT l.id FROM lists l \
     JOIN namespace_user_shares s ON s.namespace_id = l.namespace_id \
     WHERE s.user_id = ?1 AND s.privilege >= ?3";

const NAMESPACE_TEAM_SHARE_SQL: &str = "SELECT l.id FROM lists l \
     JOIN namespace_team_shares s ON s.namespace_id = l.namespace_id \
     WHERE s.team_id IN (SELECT value FROM json_each(?2)) AND s.privilege >= ?3";

impl VisibilityPath {
    pub const ALL: [Self; 6] = [
        Self::ListOwner,
        Self::ListUserShare,
        Self::ListTeamShare,
        Self::NamespaceOwner,
        Self::NamespaceUserShare,
        Self::NamespaceTeamShare,
    ];

    /// Stable snake_case name for display and JSON output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ListOwner => "list_owner",
            Self::ListUserShare => "list_user_share",
            Self::ListTeamShare => "list_team_share",
            Self::NamespaceOwner => "namespace_owner",
            Self::NamespaceUserShare => "namespace_user_share",
            Self::NamespaceTeamShare => "namespace_team_share",
        }
    }

    const fn sql(self) -> &'static str {
        match self {
            Self::ListOwner => LIST_OWNER_SQL,
            Self::ListUserShare => LIST_USER_SHARE_SQL,
            Self::ListTeamShare => LIST_TEAM_SHARE_SQL,
            Self::NamespaceOwner => NAMESPACE_OWNER_SQL,
            Self::NamespaceUserShare => NAMESPACE_USER_SHARE_SQL,
            Self::NamespaceTeamShare => NAMESPACE_TEAM_SHARE_SQL,
        }
    }

    /// Ownership implies every privilege.
    const fn is_ownership(self) -> bool {
        matches!(self, Self::ListOwner | Self::NamespaceOwner)
    }
}

/// Lists reachable through one relation at `min` privilege or higher.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn lists_via(
    conn: &Connection,
    actor: &Actor,
    path: VisibilityPath,
    min: Privilege,
) -> rusqlite::Result<BTreeSet<ListId>> {
    let mut stmt = conn.prepare(path.sql())?;
    let rows = if path.is_ownership() {
        stmt.query_map(params![actor.user_id], |row| row.get::<_, ListId>(0))?
            .collect::<rusqlite::Result<BTreeSet<_>>>()?
    } else {
        stmt.query_map(params![actor.user_id, teams_json(actor), min.as_i64()], |row| {
            row.get::<_, ListId>(0)
        })?
        .collect::<rusqlite::Result<BTreeSet<_>>>()?
    };
    Ok(rows)
}

/// Every list the actor can see at `min` privilege or higher, in one query.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn resolve_lists_with_privilege(
    conn: &Connection,
    actor: &Actor,
    min: Privilege,
) -> rusqlite::Result<BTreeSet<ListId>> {
    let union = VisibilityPath::ALL
        .iter()
        .map(|path| path.sql())
        .collect::<Vec<_>>()
        .join("\nUNION\n");
    let mut stmt = conn.prepare(&union)?;
    let lists = stmt
        .query_map(params![actor.user_id, teams_json(actor), min.as_i64()], |row| {
            row.get::<_, ListId>(0)
        })?
        .collect::<rusqlite::Result<BTreeSet<_>>>()?;
    debug!(
        user_id = actor.user_id.get(),
        teams = actor.team_ids.len(),
        lists = lists.len(),
        %min,
        "resolved visible lists"
    );
    Ok(lists)
}

/// Every list the actor can read. Read is the lowest privilege, so any
/// grant or ownership suffices.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn resolve_readable_lists(conn: &Connection, actor: &Actor) -> rusqlite::Result<BTreeSet<ListId>> {
    resolve_lists_with_privilege(conn, actor, Privilege::Read)
}

fn teams_json(actor: &Actor) -> String {
    let ids: Vec<i64> = actor.team_ids.iter().map(|id| id.get()).collect();
    serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string())
}
