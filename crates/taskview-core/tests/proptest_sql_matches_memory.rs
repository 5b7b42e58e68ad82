//! The SQL executor and the in-memory predicate/ordering agree on every
//! generated task set and request.

use proptest::prelude::*;
use proptest::sample::{select, subsequence};
use rusqlite::{Connection, params};
use taskview_core::collection::params::{CollectionParams, FilterTriple, SortPair};
use taskview_core::collection::{CollectionRequest, CompiledQuery, Scope, read_collection};
use taskview_core::config::EngineConfig;
use taskview_core::db::open_in_memory;
use taskview_core::model::access::Actor;
use taskview_core::model::task::Task;
use taskview_core::model::{ListId, UserId};

#[derive(Debug, Clone)]
struct TaskSpec {
    title: String,
    done: bool,
    priority: i64,
    due: Option<i64>,
    start: Option<i64>,
    percent: f64,
    labels: Vec<i64>,
    assignees: Vec<i64>,
}

const ORDERING_COMPARATORS: [&str; 6] = [
    "equals",
    "not_equals",
    "greater",
    "greater_equals",
    "less",
    "less_equals",
];

const DATES: [i64; 3] = [100, 200, 300];
const PERCENTS: [f64; 4] = [0.0, 0.25, 0.5, 1.0];

fn arb_task() -> impl Strategy<Value = TaskSpec> {
    (
        "[a-zA-ZäÄöÖ #%_]{0,10}",
        any::<bool>(),
        0_i64..4,
        proptest::option::of(select(DATES.to_vec())),
        proptest::option::of(select(DATES.to_vec())),
        select(PERCENTS.to_vec()),
        subsequence(vec![1_i64, 2, 3], 0..=3),
        subsequence(vec![1_i64, 2], 0..=2),
    )
        .prop_map(
            |(title, done, priority, due, start, percent, labels, assignees)| TaskSpec {
                title,
                done,
                priority,
                due,
                start,
                percent,
                labels,
                assignees,
            },
        )
}

fn triple(field: &str, comparator: &str, value: String) -> FilterTriple {
    FilterTriple {
        field: field.to_string(),
        comparator: comparator.to_string(),
        value,
    }
}

fn arb_filter() -> impl Strategy<Value = FilterTriple> {
    let mut integer_comparators = ORDERING_COMPARATORS.to_vec();
    integer_comparators.push("in");
    prop_oneof![
        (select(integer_comparators), 0_i64..4)
            .prop_map(|(c, v)| triple("priority", c, v.to_string())),
        (select(ORDERING_COMPARATORS.to_vec()), select(vec![100_i64, 150, 200, 300]))
            .prop_map(|(c, v)| triple("due_date", c, v.to_string())),
        (select(ORDERING_COMPARATORS.to_vec()), select(vec![100_i64, 250, 300]))
            .prop_map(|(c, v)| triple("start_date", c, v.to_string())),
        (select(vec!["equals", "not_equals"]), any::<bool>())
            .prop_map(|(c, v)| triple("done", c, v.to_string())),
        (select(ORDERING_COMPARATORS.to_vec()), select(PERCENTS.to_vec()))
            .prop_map(|(c, v)| triple("percent_done", c, v.to_string())),
        "[a-zA-ZäÄö#%_]{0,3}".prop_map(|v| triple("title", "like", v)),
        (select(vec!["equals", "in"]), 1_i64..4)
            .prop_map(|(c, v)| triple("labels", c, v.to_string())),
        (select(vec!["equals", "in"]), 1_i64..3)
            .prop_map(|(c, v)| triple("assignees", c, v.to_string())),
    ]
}

fn arb_sort() -> impl Strategy<Value = SortPair> {
    (
        select(vec![
            "id",
            "title",
            "done",
            "priority",
            "due_date",
            "start_date",
            "percent_done",
        ]),
        proptest::option::of(select(vec!["asc", "desc"])),
    )
        .prop_map(|(field, order)| SortPair {
            field: field.to_string(),
            order: order.map(str::to_string),
        })
}

fn seed(tasks: &[TaskSpec]) -> Connection {
    let conn = open_in_memory().expect("open store");
    conn.execute_batch(
        "INSERT INTO users (id, username) VALUES (1, 'user1'), (2, 'user2');
         INSERT INTO namespaces (id, title, owner_id) VALUES (1, 'ns1', 1);
         INSERT INTO lists (id, title, owner_id, namespace_id) VALUES (1, 'list1', 1, 1);
         INSERT INTO labels (id, title, created_by) VALUES (1, 'a', 1), (2, 'b', 1), (3, 'c', 1);",
    )
    .expect("seed identity");

    for (idx, generated) in tasks.iter().enumerate() {
        let id = i64::try_from(idx).expect("index") + 1;
        conn.execute(
            "INSERT INTO tasks (id, title, done, priority, due_date, start_date, percent_done, \
             list_id, created_by, created, updated) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, 1, 0, 0)",
            params![
                id,
                generated.title,
                generated.done,
                generated.priority,
                generated.due,
                generated.start,
                generated.percent
            ],
        )
        .expect("insert task");
        for label in &generated.labels {
            conn.execute(
                "INSERT INTO task_labels (task_id, label_id) VALUES (?1, ?2)",
                params![id, label],
            )
            .expect("insert label");
        }
        for user in &generated.assignees {
            conn.execute(
                "INSERT INTO task_assignees (task_id, user_id) VALUES (?1, ?2)",
                params![id, user],
            )
            .expect("insert assignee");
        }
    }
    conn
}

fn run(conn: &Connection, params: CollectionParams) -> Vec<Task> {
    let request = CollectionRequest {
        actor: Actor::new(UserId(1), []),
        scope: Scope::ConcreteList(ListId(1)),
        params: CollectionParams {
            per_page: Some(250),
            ..params
        },
    };
    read_collection(conn, &EngineConfig::default(), &request)
        .expect("read collection")
        .tasks
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(256))]

    #[test]
    fn sql_and_memory_evaluation_agree(
        tasks in prop::collection::vec(arb_task(), 0..25),
        filters in prop::collection::vec(arb_filter(), 0..3),
        sort in prop::collection::vec(arb_sort(), 0..3),
        include_nulls in any::<bool>(),
        search in proptest::option::of("[a-zA-ZäÖ%_]{0,2}"),
    ) {
        let conn = seed(&tasks);
        let everything = run(&conn, CollectionParams::default());
        prop_assert_eq!(everything.len(), tasks.len());

        let params = CollectionParams {
            search,
            filters,
            filter_include_nulls: include_nulls,
            sort,
            ..CollectionParams::default()
        };
        let query = CompiledQuery::compile(&params).expect("generated requests are valid");

        let mut expected: Vec<Task> = everything
            .into_iter()
            .filter(|task| query.matches(task))
            .collect();
        expected.sort_by(|a, b| query.ordering.compare(a, b));
        let expected: Vec<i64> = expected.iter().map(|task| task.id.get()).collect();

        let actual: Vec<i64> = run(&conn, params).iter().map(|task| task.id.get()).collect();
        prop_assert_eq!(actual, expected);
    }
}
