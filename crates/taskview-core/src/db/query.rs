//! `SQLite` query helpers for the taskview store.
//!
//! All functions take a shared `&Connection` and return typed structs. Task
//! queries are assembled from the compiled predicate and ordering; request
//! text only ever reaches SQLite as a bound parameter.

use crate::collection::filter::{FOLD_FUNCTION, TaskPredicate, like_pattern};
use crate::collection::saved_filter::{SavedFilter, SavedFilterCriteria};
use crate::collection::sort::TaskOrdering;
use crate::collection::sql::SqlParams;
use crate::model::access::{Actor, Privilege, ShareGrant, ShareTarget, Subject};
use crate::model::task::{Label, Task};
use crate::model::{
    LabelId, ListId, NamespaceId, SavedFilterId, TaskId, TeamId, UserId, from_epoch,
};
use chrono::{DateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

// ---------------------------------------------------------------------------
// Task collections
// ---------------------------------------------------------------------------

/// Everything needed to select one page of tasks.
#[derive(Debug, Clone, Copy)]
pub struct TaskQuery<'a> {
    /// Lists whose tasks are in scope.
    pub lists: &'a BTreeSet<ListId>,
    /// Restrict to tasks this user marked favorite.
    pub favorites_of: Option<UserId>,
    pub predicate: &'a TaskPredicate,
    /// Title substrings; every term must match.
    pub search: &'a [String],
    pub ordering: &'a TaskOrdering,
    /// User whose favorites populate `Task::is_favorite`.
    pub viewer: UserId,
    pub limit: i64,
    pub offset: i64,
}

const TASK_COLUMNS: &str = "t.id, t.title, t.description, t.done, t.done_at, t.due_date, \
     t.start_date, t.end_date, t.priority, t.percent_done, t.hex_color, t.list_id, \
     t.task_index, t.position, t.bucket_id, t.repeat_after, t.created_by, t.created, t.updated";

fn where_clause(query: &TaskQuery<'_>, params: &mut SqlParams) -> String {
    let list_ids: Vec<i64> = query.lists.iter().map(|id| id.get()).collect();
    let n = params.push_json_array(&list_ids);
    let mut conditions = vec![format!("t.list_id IN (SELECT value FROM json_each(?{n}))")];

    if let Some(user) = query.favorites_of {
        let n = params.push(Value::Integer(user.get()));
        conditions.push(format!(
            "EXISTS (SELECT 1 FROM favorites f WHERE f.task_id = t.id AND f.user_id = ?{n})"
        ));
    }

    conditions.extend(query.predicate.to_sql_conditions(params));

    for term in query.search.iter().filter(|term| !term.is_empty()) {
        let n = params.push(Value::Text(like_pattern(term)));
        conditions.push(format!("{FOLD_FUNCTION}(t.title) LIKE ?{n} ESCAPE '\\'"));
    }

    format!(" WHERE {}", conditions.join(" AND "))
}

/// Count every task matching the query, ignoring the page window.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_tasks(conn: &Connection, query: &TaskQuery<'_>) -> rusqlite::Result<u64> {
    let mut params = SqlParams::default();
    let where_sql = where_clause(query, &mut params);
    let sql = format!("SELECT COUNT(*) FROM tasks t{where_sql}");
    let count: i64 = conn.query_row(&sql, params_from_iter(params.values()), |row| row.get(0))?;
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Fetch one ordered page of hydrated tasks.
///
/// # Errors
///
/// Returns an error if any query fails.
pub fn fetch_tasks(conn: &Connection, query: &TaskQuery<'_>) -> rusqlite::Result<Vec<Task>> {
    let mut params = SqlParams::default();
    let where_sql = where_clause(query, &mut params);
    let viewer = params.push(Value::Integer(query.viewer.get()));
    let limit = params.push(Value::Integer(query.limit));
    let offset = params.push(Value::Integer(query.offset));

    let sql = format!(
        "SELECT {TASK_COLUMNS}, \
         EXISTS (SELECT 1 FROM favorites fv WHERE fv.task_id = t.id AND fv.user_id = ?{viewer}) \
         FROM tasks t{where_sql} {} LIMIT ?{limit} OFFSET ?{offset}",
        query.ordering.to_sql()
    );

    let mut stmt = conn.prepare(&sql)?;
    let mut tasks = stmt
        .query_map(params_from_iter(params.values()), row_to_task)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    hydrate(conn, &mut tasks)?;
    Ok(tasks)
}

fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let date = |idx: usize| -> rusqlite::Result<Option<DateTime<Utc>>> {
        row.get::<_, Option<i64>>(idx)?
            .map(|secs| stored_timestamp(idx, secs))
            .transpose()
    };
    let created: i64 = row.get(17)?;
    let updated: i64 = row.get(18)?;

    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        done: row.get::<_, i64>(3)? != 0,
        done_at: date(4)?,
        due_date: date(5)?,
        reminder_dates: Vec::new(),
        start_date: date(6)?,
        end_date: date(7)?,
        priority: row.get(8)?,
        percent_done: row.get(9)?,
        hex_color: row.get(10)?,
        list_id: row.get(11)?,
        index: row.get(12)?,
        position: row.get(13)?,
        bucket_id: row.get(14)?,
        repeat_after: row.get(15)?,
        assignees: Vec::new(),
        labels: Vec::new(),
        is_favorite: row.get::<_, i64>(19)? != 0,
        created_by: row.get(16)?,
        created: stored_timestamp(17, created)?,
        updated: stored_timestamp(18, updated)?,
    })
}

/// Attach assignees, labels and reminders to a page of tasks.
/// Epoch seconds read from `column`, rejecting values chrono cannot represent.
fn stored_timestamp(column: usize, secs: i64) -> rusqlite::Result<DateTime<Utc>> {
    from_epoch(secs).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            Type::Integer,
            format!("timestamp {secs} is out of range").into(),
        )
    })
}

fn hydrate(conn: &Connection, tasks: &mut [Task]) -> rusqlite::Result<()> {
    if tasks.is_empty() {
        return Ok(());
    }
    let ids: Vec<i64> = tasks.iter().map(|task| task.id.get()).collect();
    let ids_json = serde_json::to_string(&ids).unwrap_or_else(|_| "[]".to_string());

    let mut assignees: HashMap<TaskId, Vec<UserId>> = HashMap::new();
    let mut stmt = conn.prepare(
        "SELECT task_id, user_id FROM task_assignees \
         WHERE task_id IN (SELECT value FROM json_each(?1)) \
         ORDER BY task_id, user_id",
    )?;
    let rows = stmt.query_map([&ids_json], |row| Ok((row.get(0)?, row.get(1)?)))?;
    for row in rows {
        let (task_id, user_id): (TaskId, UserId) = row?;
        assignees.entry(task_id).or_default().push(user_id);
    }

    let mut labels: HashMap<TaskId, Vec<Label>> = HashMap::new();
    let mut stmt = conn.prepare(
        "SELECT tl.task_id, l.id, l.title FROM task_labels tl \
         JOIN labels l ON l.id = tl.label_id \
         WHERE tl.task_id IN (SELECT value FROM json_each(?1)) \
         ORDER BY tl.task_id, l.id",
    )?;
    let rows = stmt.query_map([&ids_json], |row| {
        Ok((
            row.get::<_, TaskId>(0)?,
            Label {
                id: row.get::<_, LabelId>(1)?,
                title: row.get(2)?,
            },
        ))
    })?;
    for row in rows {
        let (task_id, label) = row?;
        labels.entry(task_id).or_default().push(label);
    }

    let mut reminders: HashMap<TaskId, Vec<DateTime<Utc>>> = HashMap::new();
    let mut stmt = conn.prepare(
        "SELECT task_id, reminder FROM task_reminders \
         WHERE task_id IN (SELECT value FROM json_each(?1)) \
         ORDER BY task_id, reminder",
    )?;
    let rows = stmt.query_map([&ids_json], |row| {
        Ok((row.get::<_, TaskId>(0)?, row.get::<_, i64>(1)?))
    })?;
    for row in rows {
        let (task_id, secs) = row?;
        reminders
            .entry(task_id)
            .or_default()
            .push(stored_timestamp(1, secs)?);
    }

    for task in tasks {
        task.assignees = assignees.remove(&task.id).unwrap_or_default();
        task.labels = labels.remove(&task.id).unwrap_or_default();
        task.reminder_dates = reminders.remove(&task.id).unwrap_or_default();
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Saved filters
// ---------------------------------------------------------------------------

/// Fetch a saved filter by id, regardless of owner.
///
/// # Errors
///
/// Returns an error if the query fails or the stored criteria are not valid
/// criteria JSON.
pub fn fetch_saved_filter(
    conn: &Connection,
    id: SavedFilterId,
) -> rusqlite::Result<Option<SavedFilter>> {
    let row = conn
        .query_row(
            "SELECT id, owner_id, title, description, criteria_json, created, updated \
             FROM saved_filters WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, SavedFilterId>(0)?,
                    row.get::<_, UserId>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, i64>(5)?,
                    row.get::<_, i64>(6)?,
                ))
            },
        )
        .optional()?;

    let Some((id, owner_id, title, description, criteria_json, created, updated)) = row else {
        return Ok(None);
    };
    let criteria: SavedFilterCriteria = serde_json::from_str(&criteria_json)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(err)))?;

    Ok(Some(SavedFilter {
        id,
        owner_id,
        title,
        description,
        criteria,
        created: stored_timestamp(5, created)?,
        updated: stored_timestamp(6, updated)?,
    }))
}

// ---------------------------------------------------------------------------
// Identity and grants
// ---------------------------------------------------------------------------

/// Load a user and the teams they belong to.
///
/// Unknown users load with no teams and therefore see nothing.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn load_actor(conn: &Connection, user_id: UserId) -> rusqlite::Result<Actor> {
    let mut stmt =
        conn.prepare("SELECT team_id FROM team_members WHERE user_id = ?1 ORDER BY team_id")?;
    let teams = stmt
        .query_map(params![user_id], |row| row.get::<_, TeamId>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(Actor::new(user_id, teams))
}

impl Actor {
    /// Load an actor from the identity tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn load(conn: &Connection, user_id: UserId) -> rusqlite::Result<Self> {
        load_actor(conn, user_id)
    }
}

const GRANTS_SQL: &str = "
SELECT 'user', s.user_id, 'list', s.list_id, s.privilege
FROM list_user_shares s WHERE s.user_id = ?1
UNION ALL
SELECT 'team', s.team_id, 'list', s.list_id, s.privilege
FROM list_team_shares s WHERE s.team_id IN (SELECT value FROM json_each(?2))
UNION ALL
SELECT 'user', s.user_id, 'namespace', s.namespace_id, s.privilege
FROM namespace_user_shares s WHERE s.user_id = ?1
UNION ALL
SELECT 'team', s.team_id, 'namespace', s.namespace_id, s.privilege
FROM namespace_team_shares s WHERE s.team_id IN (SELECT value FROM json_each(?2))
ORDER BY 3, 4, 1, 2
";

/// Every explicit share naming the actor or one of their teams.
///
/// Ownership is not a grant and is not listed.
///
/// # Errors
///
/// Returns an error if the query fails or a stored privilege is out of range.
pub fn fetch_grants(conn: &Connection, actor: &Actor) -> rusqlite::Result<Vec<ShareGrant>> {
    let team_ids: Vec<i64> = actor.team_ids.iter().map(|id| id.get()).collect();
    let teams_json = serde_json::to_string(&team_ids).unwrap_or_else(|_| "[]".to_string());

    let mut stmt = conn.prepare(GRANTS_SQL)?;
    let rows = stmt.query_map(params![actor.user_id, teams_json], |row| {
        let subject_kind: String = row.get(0)?;
        let subject_id: i64 = row.get(1)?;
        let target_kind: String = row.get(2)?;
        let target_id: i64 = row.get(3)?;
        let raw_privilege: i64 = row.get(4)?;

        let privilege = Privilege::from_i64(raw_privilege).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                Type::Integer,
                format!("unknown privilege level {raw_privilege}").into(),
            )
        })?;
        let subject = if subject_kind == "team" {
            Subject::Team(TeamId(subject_id))
        } else {
            Subject::User(UserId(subject_id))
        };
        let target = if target_kind == "namespace" {
            ShareTarget::Namespace(NamespaceId(target_id))
        } else {
            ShareTarget::List(ListId(target_id))
        };
        Ok(ShareGrant {
            subject,
            target,
            privilege,
        })
    })?;
    rows.collect()
}

// ---------------------------------------------------------------------------
// Lists
// ---------------------------------------------------------------------------

/// A list as shown by the `lists` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListSummary {
    pub id: ListId,
    pub title: String,
    pub owner_id: UserId,
    pub namespace_id: NamespaceId,
}

/// Fetch list rows for the given ids, ordered by id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn fetch_lists(conn: &Connection, ids: &BTreeSet<ListId>) -> rusqlite::Result<Vec<ListSummary>> {
    let raw: Vec<i64> = ids.iter().map(|id| id.get()).collect();
    let ids_json = serde_json::to_string(&raw).unwrap_or_else(|_| "[]".to_string());
    let mut stmt = conn.prepare(
        "SELECT id, title, owner_id, namespace_id FROM lists \
         WHERE id IN (SELECT value FROM json_each(?1)) ORDER BY id",
    )?;
    let rows = stmt.query_map([&ids_json], |row| {
        Ok(ListSummary {
            id: row.get(0)?,
            title: row.get(1)?,
            owner_id: row.get(2)?,
            namespace_id: row.get(3)?,
        })
    })?;
    rows.collect()
}
