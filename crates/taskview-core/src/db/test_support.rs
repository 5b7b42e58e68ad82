//! Small seeded store shared by unit tests.
//!
//! User 1 owns list 1 and reads list 2 through team 1 and list 3 through a
//! namespace share. List 4 belongs to user 3 and is not shared.

use super::open_in_memory;
use rusqlite::Connection;

pub struct Seed;

impl Seed {
    pub const LIST_A: i64 = 1;
    pub const LIST_B: i64 = 2;
    pub const LIST_NS_SHARED: i64 = 3;
    pub const LIST_HIDDEN: i64 = 4;
    pub const DUE: i64 = 1_543_636_724;
}

const SEED_SQL: &str = r#"
INSERT INTO users (id, username) VALUES (1, 'user1'), (2, 'user2'), (3, 'user3');
INSERT INTO teams (id, name) VALUES (1, 'team1');
INSERT INTO team_members (team_id, user_id) VALUES (1, 1), (1, 2);

INSERT INTO namespaces (id, title, owner_id) VALUES (1, 'ns1', 1), (2, 'ns2', 2), (3, 'ns3', 3);
INSERT INTO lists (id, title, owner_id, namespace_id) VALUES
    (1, 'own list', 1, 1),
    (2, 'team list', 2, 2),
    (3, 'namespace list', 2, 2),
    (4, 'hidden list', 3, 3);
INSERT INTO list_team_shares (list_id, team_id, privilege) VALUES (2, 1, 1);
INSERT INTO namespace_user_shares (namespace_id, user_id, privilege) VALUES (2, 1, 0);

INSERT INTO tasks (id, title, priority, due_date, list_id, created_by, created, updated) VALUES
    (1, 'write the docs', 0, NULL, 1, 1, 1543622400, 1543622400),
    (2, 'review', 5, 1543636724, 1, 1, 1543622400, 1543622400),
    (3, 'ship at 100% quality', 0, NULL, 1, 1, 1543622400, 1543622400),
    (4, 'deploy', 3, NULL, 2, 2, 1543622400, 1543622400),
    (5, '1000 cuts', 0, NULL, 1, 1, 1543622400, 1543622400),
    (6, 'hidden work', 9, NULL, 4, 3, 1543622400, 1543622400);

INSERT INTO labels (id, title, created_by) VALUES (1, 'urgent', 1);
INSERT INTO task_labels (task_id, label_id) VALUES (1, 1);
INSERT INTO task_assignees (task_id, user_id) VALUES (1, 1);
INSERT INTO task_reminders (task_id, reminder) VALUES (1, 1543700000);
INSERT INTO favorites (user_id, task_id) VALUES (1, 1), (1, 6);

INSERT INTO saved_filters (id, owner_id, title, criteria_json, created, updated) VALUES
    (1, 1, 'prioritized', '{"filters":[{"field":"priority","comparator":"greater","value":"0"}]}', 1543622400, 1543622400);
"#;

pub fn seeded_store() -> Connection {
    let conn = open_in_memory().expect("open in-memory store");
    conn.execute_batch(SEED_SQL).expect("seed store");
    conn
}
