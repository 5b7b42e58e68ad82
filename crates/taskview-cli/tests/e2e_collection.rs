//! E2E tests for `tv init` + collection reads against a seeded store.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SEED: &str = r#"
INSERT INTO users (id, username) VALUES (1, 'ada'), (2, 'brook'), (3, 'cy');
INSERT INTO teams (id, name) VALUES (1, 'core');
INSERT INTO team_members (team_id, user_id) VALUES (1, 2);
INSERT INTO namespaces (id, title, owner_id) VALUES (1, 'home', 1), (2, 'cy-space', 3);
INSERT INTO lists (id, title, owner_id, namespace_id) VALUES
    (1, 'inbox', 1, 1),
    (2, 'roadmap', 1, 1),
    (3, 'private', 3, 2);
INSERT INTO list_team_shares (list_id, team_id, privilege) VALUES (2, 1, 1);
INSERT INTO tasks (id, title, list_id, priority, due_date, created_by, created, updated) VALUES
    (1, 'write docs', 1, 1, NULL, 1, 1700000000, 1700000000),
    (2, 'review pr', 1, 5, 1700000000, 1, 1700000000, 1700000000),
    (3, 'deploy', 2, 3, 1600000000, 1, 1700000000, 1700000000),
    (4, 'secret plans', 3, 4, NULL, 3, 1700000000, 1700000000);
INSERT INTO favorites (user_id, task_id) VALUES (1, 2);
INSERT INTO saved_filters (id, owner_id, title, criteria_json, created, updated) VALUES
    (1, 1, 'urgent', '{"filters":[{"field":"priority","comparator":"greater_equals","value":"3"}],"sort":[{"field":"priority","order":"desc"}]}', 1700000000, 1700000000);
"#;

fn tv_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tv"));
    cmd.current_dir(dir);
    cmd.env_remove("TASKVIEW_DB");
    cmd.env_remove("FORMAT");
    cmd.env("TASKVIEW_LOG", "error");
    cmd
}

fn db_path(dir: &Path) -> PathBuf {
    dir.join(".taskview/tasks.sqlite3")
}

fn seeded_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    tv_cmd(dir.path()).args(["init"]).assert().success();
    let conn = rusqlite::Connection::open(db_path(dir.path())).unwrap();
    conn.execute_batch(SEED).unwrap();
    dir
}

fn tasks_json(dir: &Path, args: &[&str]) -> Value {
    let output = tv_cmd(dir)
        .args(["tasks", "--json"])
        .args(args)
        .output()
        .expect("tasks should not crash");
    assert!(
        output.status.success(),
        "tasks failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

fn task_ids(page: &Value) -> Vec<i64> {
    page["tasks"]
        .as_array()
        .expect("tasks array")
        .iter()
        .map(|task| task["id"].as_i64().expect("task id"))
        .collect()
}

/// First JSON document on stderr; the process error line follows it.
fn error_json(stderr: &[u8]) -> Value {
    serde_json::Deserializer::from_slice(stderr)
        .into_iter::<Value>()
        .next()
        .expect("stderr should start with a JSON error")
        .expect("valid JSON error")
}

#[test]
fn init_creates_store_and_config() {
    let dir = TempDir::new().unwrap();
    let output = tv_cmd(dir.path()).args(["init", "--json"]).output().unwrap();
    assert!(output.status.success());

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["schema_version"], 2);
    assert_eq!(report["config_written"], true);
    assert!(db_path(dir.path()).is_file());
    assert!(dir.path().join(".taskview/config.toml").is_file());
}

#[test]
fn init_is_rerunnable_and_keeps_config() {
    let dir = TempDir::new().unwrap();
    tv_cmd(dir.path()).args(["init"]).assert().success();
    let config = dir.path().join(".taskview/config.toml");
    fs::write(&config, "[pagination]\ndefault_per_page = 7\n").unwrap();

    let output = tv_cmd(dir.path()).args(["init", "--json"]).output().unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["config_written"], false);
    assert_eq!(
        fs::read_to_string(&config).unwrap(),
        "[pagination]\ndefault_per_page = 7\n"
    );
}

#[test]
fn init_honors_db_flag() {
    let dir = TempDir::new().unwrap();
    let custom = dir.path().join("elsewhere/store.sqlite3");
    tv_cmd(dir.path())
        .args(["--db", custom.to_str().unwrap(), "init"])
        .assert()
        .success();
    assert!(custom.is_file());
    assert!(!db_path(dir.path()).exists());
}

#[test]
fn tasks_default_to_all_readable_lists() {
    let dir = seeded_project();
    let page = tasks_json(dir.path(), &["--user", "1"]);
    assert_eq!(task_ids(&page), vec![1, 2, 3]);
    assert_eq!(page["total_count"], 3);
    assert_eq!(page["page"], 1);

    let page = tasks_json(dir.path(), &["--user", "2"]);
    assert_eq!(task_ids(&page), vec![3]);
}

#[test]
fn tasks_filter_and_sort_params() {
    let dir = seeded_project();
    let page = tasks_json(
        dir.path(),
        &[
            "--user",
            "1",
            "-p",
            "filter_by=priority",
            "-p",
            "filter_comparator=greater",
            "-p",
            "filter_value=1",
            "-p",
            "sort_by=priority",
            "-p",
            "order_by=desc",
        ],
    );
    assert_eq!(task_ids(&page), vec![2, 3]);
}

#[test]
fn tasks_due_date_filter_accepts_rfc3339_and_nulls() {
    let dir = seeded_project();
    let args = [
        "--user",
        "1",
        "-p",
        "filter_by[]=due_date",
        "-p",
        "filter_comparator[]=less",
        "-p",
        "filter_value[]=2021-01-01T00:00:00Z",
    ];
    let page = tasks_json(dir.path(), &args);
    assert_eq!(task_ids(&page), vec![3]);

    let mut with_nulls = args.to_vec();
    with_nulls.extend(["-p", "filter_include_nulls=true"]);
    let page = tasks_json(dir.path(), &with_nulls);
    assert_eq!(task_ids(&page), vec![1, 3]);
}

#[test]
fn tasks_search_matches_titles_case_insensitively() {
    let dir = seeded_project();
    let page = tasks_json(dir.path(), &["--user", "1", "-p", "s=REVIEW"]);
    assert_eq!(task_ids(&page), vec![2]);
}

#[test]
fn tasks_in_concrete_list() {
    let dir = seeded_project();
    let page = tasks_json(dir.path(), &["--user", "2", "--list", "2"]);
    assert_eq!(task_ids(&page), vec![3]);
}

#[test]
fn tasks_favorites_pseudo_list() {
    let dir = seeded_project();
    let page = tasks_json(dir.path(), &["--user", "1", "--list", "-1"]);
    assert_eq!(task_ids(&page), vec![2]);
    assert_eq!(page["tasks"][0]["is_favorite"], true);
}

#[test]
fn tasks_saved_filter_pseudo_list() {
    let dir = seeded_project();
    let page = tasks_json(dir.path(), &["--user", "1", "--list", "-2"]);
    assert_eq!(task_ids(&page), vec![2, 3]);
}

#[test]
fn tasks_paginate_with_config_defaults() {
    let dir = seeded_project();
    fs::write(
        dir.path().join(".taskview/config.toml"),
        "[pagination]\ndefault_per_page = 2\n",
    )
    .unwrap();

    let page = tasks_json(dir.path(), &["--user", "1"]);
    assert_eq!(task_ids(&page), vec![1, 2]);
    assert_eq!(page["per_page"], 2);
    assert_eq!(page["total_pages"], 2);

    let page = tasks_json(dir.path(), &["--user", "1", "-p", "page=2"]);
    assert_eq!(task_ids(&page), vec![3]);

    let page = tasks_json(dir.path(), &["--user", "1", "-p", "page=9"]);
    assert!(task_ids(&page).is_empty());
    assert_eq!(page["total_count"], 3);
}

#[test]
fn tasks_unknown_field_is_a_structured_error() {
    let dir = seeded_project();
    let output = tv_cmd(dir.path())
        .args(["tasks", "--json", "--user", "1", "-p", "sort_by=color"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let err = error_json(&output.stderr);
    assert_eq!(err["error"]["error_code"], "E4016");
    assert_eq!(err["error"]["message"], "invalid task field: 'color'");
}

#[test]
fn tasks_unreadable_list_is_not_found() {
    let dir = seeded_project();
    let output = tv_cmd(dir.path())
        .args(["tasks", "--json", "--user", "1", "--list", "3"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert_eq!(error_json(&output.stderr)["error"]["error_code"], "E2001");
}

#[test]
fn tasks_filter_errors_outrank_scope_errors() {
    let dir = seeded_project();
    let output = tv_cmd(dir.path())
        .args([
            "tasks",
            "--json",
            "--user",
            "1",
            "--list",
            "3",
            "-p",
            "sort_by=priority",
            "-p",
            "order_by=sideways",
        ])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert_eq!(error_json(&output.stderr)["error"]["error_code"], "E4017");
}

#[test]
fn tasks_human_error_has_suggestion() {
    let dir = seeded_project();
    tv_cmd(dir.path())
        .args(["tasks", "--format", "text", "--user", "1", "-p", "per_page=lots"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "error: invalid pagination parameter per_page='lots'",
        ))
        .stderr(predicate::str::contains("suggestion:"));
}

#[test]
fn tasks_without_store_reports_missing_store() {
    let dir = TempDir::new().unwrap();
    let output = tv_cmd(dir.path())
        .args(["tasks", "--json", "--user", "1"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert_eq!(
        error_json(&output.stderr)["error"]["error_code"],
        "store_missing"
    );
    assert!(!db_path(dir.path()).exists());
}

#[test]
fn malformed_param_is_rejected_by_argument_parsing() {
    let dir = seeded_project();
    tv_cmd(dir.path())
        .args(["tasks", "--user", "1", "-p", "sort_by"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected key=value"));
}

#[test]
fn tasks_text_output_is_tab_separated() {
    let dir = seeded_project();
    tv_cmd(dir.path())
        .args(["tasks", "--format", "text", "--user", "2"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "id\tlist\tdone\tpriority\tdue_date\ttitle\n3\t2\tfalse\t3\t",
        ))
        .stdout(predicate::str::contains("\tdeploy\n"));
}

#[test]
fn db_env_var_selects_store() {
    let dir = seeded_project();
    let other = TempDir::new().unwrap();
    let output = tv_cmd(other.path())
        .env("TASKVIEW_DB", db_path(dir.path()))
        .args(["tasks", "--json", "--user", "2"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let page: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(task_ids(&page), vec![3]);
}

#[test]
fn lists_show_visibility_paths() {
    let dir = seeded_project();
    let output = tv_cmd(dir.path())
        .args(["lists", "--json", "--user", "2"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    let lists = report["lists"].as_array().unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0]["id"], 2);
    assert_eq!(lists[0]["title"], "roadmap");
    assert_eq!(lists[0]["via"][0], "list_team_share");
}

#[test]
fn lists_min_privilege_filters_shares() {
    let dir = seeded_project();
    let output = tv_cmd(dir.path())
        .args(["lists", "--json", "--user", "2", "--min-privilege", "admin"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["lists"].as_array().unwrap().is_empty());
}

#[test]
fn grants_show_team_shares() {
    let dir = seeded_project();
    let output = tv_cmd(dir.path())
        .args(["grants", "--json", "--user", "2"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["team_ids"], serde_json::json!([1]));
    let grants = report["grants"].as_array().unwrap();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0]["subject"]["kind"], "team");
    assert_eq!(grants[0]["target"]["kind"], "list");
    assert_eq!(grants[0]["privilege"], "write");
}
