//! Canonical SQLite schema for the taskview store.
//!
//! - `users`, `teams` and `team_members` stand in for the identity service
//! - `namespaces` group `lists`; both carry an owning user
//! - four share tables grant a privilege (`0` read, `1` write, `2` admin) to a
//!   user or team on a list or namespace
//! - `tasks` keeps scalar attributes; edge tables model assignees, labels,
//!   reminders and favorites
//! - `saved_filters` stores criteria as JSON
//!
//! All dates are Unix epoch seconds; unset dates are `NULL`.

/// Migration v1: identity, sharing, tasks and saved filters.
pub const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE CHECK (length(trim(username)) > 0)
);

CREATE TABLE IF NOT EXISTS teams (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS team_members (
    team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    PRIMARY KEY (team_id, user_id)
);

CREATE TABLE IF NOT EXISTS namespaces (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    owner_id INTEGER NOT NULL REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS lists (
    id INTEGER PRIMARY KEY CHECK (id > 0),
    title TEXT NOT NULL,
    owner_id INTEGER NOT NULL REFERENCES users(id),
    namespace_id INTEGER NOT NULL REFERENCES namespaces(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS list_user_shares (
    list_id INTEGER NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    privilege INTEGER NOT NULL CHECK (privilege IN (0, 1, 2)),
    PRIMARY KEY (list_id, user_id)
);

CREATE TABLE IF NOT EXISTS list_team_shares (
    list_id INTEGER NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
    team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
    privilege INTEGER NOT NULL CHECK (privilege IN (0, 1, 2)),
    PRIMARY KEY (list_id, team_id)
);

CREATE TABLE IF NOT EXISTS namespace_user_shares (
    namespace_id INTEGER NOT NULL REFERENCES namespaces(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    privilege INTEGER NOT NULL CHECK (privilege IN (0, 1, 2)),
    PRIMARY KEY (namespace_id, user_id)
);

CREATE TABLE IF NOT EXISTS namespace_team_shares (
    namespace_id INTEGER NOT NULL REFERENCES namespaces(id) ON DELETE CASCADE,
    team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
    privilege INTEGER NOT NULL CHECK (privilege IN (0, 1, 2)),
    PRIMARY KEY (namespace_id, team_id)
);

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    done INTEGER NOT NULL DEFAULT 0 CHECK (done IN (0, 1)),
    done_at INTEGER,
    due_date INTEGER,
    start_date INTEGER,
    end_date INTEGER,
    priority INTEGER NOT NULL DEFAULT 0,
    percent_done REAL NOT NULL DEFAULT 0 CHECK (percent_done BETWEEN 0 AND 1),
    hex_color TEXT NOT NULL DEFAULT '',
    list_id INTEGER NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
    task_index INTEGER NOT NULL DEFAULT 0,
    position REAL NOT NULL DEFAULT 0,
    bucket_id INTEGER NOT NULL DEFAULT 0,
    repeat_after INTEGER NOT NULL DEFAULT 0,
    created_by INTEGER NOT NULL REFERENCES users(id),
    created INTEGER NOT NULL,
    updated INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS labels (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    created_by INTEGER NOT NULL REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS task_labels (
    task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    label_id INTEGER NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
    PRIMARY KEY (task_id, label_id)
);

CREATE TABLE IF NOT EXISTS task_assignees (
    task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    PRIMARY KEY (task_id, user_id)
);

CREATE TABLE IF NOT EXISTS task_reminders (
    task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    reminder INTEGER NOT NULL,
    PRIMARY KEY (task_id, reminder)
);

CREATE TABLE IF NOT EXISTS favorites (
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, task_id)
);

CREATE TABLE IF NOT EXISTS saved_filters (
    id INTEGER PRIMARY KEY CHECK (id > 0),
    owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    criteria_json TEXT NOT NULL CHECK (json_valid(criteria_json)),
    created INTEGER NOT NULL,
    updated INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT OR IGNORE INTO store_meta (id, schema_version) VALUES (1, 1);
";

/// Migration v2: indexes for the visibility union and common task filters.
pub const MIGRATION_V2_SQL: &str = r"
CREATE INDEX IF NOT EXISTS idx_team_members_user
    ON team_members(user_id);

CREATE INDEX IF NOT EXISTS idx_lists_owner
    ON lists(owner_id);

CREATE INDEX IF NOT EXISTS idx_lists_namespace
    ON lists(namespace_id);

CREATE INDEX IF NOT EXISTS idx_namespaces_owner
    ON namespaces(owner_id);

CREATE INDEX IF NOT EXISTS idx_list_user_shares_user
    ON list_user_shares(user_id, list_id);

CREATE INDEX IF NOT EXISTS idx_list_team_shares_team
    ON list_team_shares(team_id, list_id);

CREATE INDEX IF NOT EXISTS idx_namespace_user_shares_user
    ON namespace_user_shares(user_id, namespace_id);

CREATE INDEX IF NOT EXISTS idx_namespace_team_shares_team
    ON namespace_team_shares(team_id, namespace_id);

CREATE INDEX IF NOT EXISTS idx_tasks_list_id
    ON tasks(list_id, id);

CREATE INDEX IF NOT EXISTS idx_tasks_due_date
    ON tasks(due_date);

CREATE INDEX IF NOT EXISTS idx_task_labels_label
    ON task_labels(label_id, task_id);

CREATE INDEX IF NOT EXISTS idx_task_assignees_user
    ON task_assignees(user_id, task_id);

CREATE INDEX IF NOT EXISTS idx_saved_filters_owner
    ON saved_filters(owner_id);
";

/// Indexes expected after all migrations.
pub const REQUIRED_INDEXES: &[&str] = &[
    "idx_team_members_user",
    "idx_lists_owner",
    "idx_lists_namespace",
    "idx_namespaces_owner",
    "idx_list_user_shares_user",
    "idx_list_team_shares_team",
    "idx_namespace_user_shares_user",
    "idx_namespace_team_shares_team",
    "idx_tasks_list_id",
    "idx_tasks_due_date",
    "idx_task_labels_label",
    "idx_task_assignees_user",
    "idx_saved_filters_owner",
];
