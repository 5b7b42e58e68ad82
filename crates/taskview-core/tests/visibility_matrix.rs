//! Visibility across the sharing matrix: ownership, list shares and
//! namespace shares at every privilege level.


use fixture::{READABLE_BY_USER1, collect, ids, matrix_store};
use std::collections::BTreeSet;
use taskview_core::collection::visibility::{
    VisibilityPath, lists_via, resolve_lists_with_privilege, resolve_readable_lists,
};
use taskview_core::db::query::{fetch_grants, load_actor};
use taskview_core::error::ErrorCode;
use taskview_core::model::access::Privilege;
use taskview_core::model::{ListId, UserId};

fn lists(ids: &[i64]) -> BTreeSet<ListId> {
    ids.iter().copied().map(ListId).collect()
}

#[test]
fn user1_reads_owned_shared_and_namespace_lists() {
    let conn = matrix_store();
    let actor = load_actor(&conn, UserId(1)).expect("actor");
    let readable = resolve_readable_lists(&conn, &actor).expect("resolve");
    assert_eq!(readable, lists(&READABLE_BY_USER1));
}

#[test]
fn every_relation_contributes() {
    let conn = matrix_store();
    let actor = load_actor(&conn, UserId(1)).expect("actor");
    let via = |path| lists_via(&conn, &actor, path, Privilege::Read).expect("relation");

    assert_eq!(via(VisibilityPath::ListOwner), lists(&[1, 2]));
    assert_eq!(via(VisibilityPath::ListUserShare), lists(&[6, 7, 8]));
    assert_eq!(via(VisibilityPath::ListTeamShare), lists(&[3, 4, 5]));
    assert_eq!(via(VisibilityPath::NamespaceOwner), lists(&[1, 2, 13]));
    assert_eq!(via(VisibilityPath::NamespaceUserShare), lists(&[10]));
    assert_eq!(via(VisibilityPath::NamespaceTeamShare), lists(&[9, 14]));
}

#[test]
fn every_privilege_level_grants_read() {
    let conn = matrix_store();
    for list in [3, 4, 5, 6, 7, 8] {
        let page = collect(&conn, Some(list), &[]).expect("shared list is readable");
        assert_eq!(page.total_count, 1, "list {list}");
    }
}

#[test]
fn privilege_floors_narrow_the_set() {
    let conn = matrix_store();
    let actor = load_actor(&conn, UserId(1)).expect("actor");
    let write = resolve_lists_with_privilege(&conn, &actor, Privilege::Write).expect("write");
    assert_eq!(write, lists(&[1, 2, 4, 5, 7, 8, 10, 13, 14]));
    let admin = resolve_lists_with_privilege(&conn, &actor, Privilege::Admin).expect("admin");
    assert_eq!(admin, lists(&[1, 2, 5, 8, 13, 14]));
}

#[test]
fn unshared_and_foreign_team_lists_are_not_found() {
    let conn = matrix_store();
    for list in [11, 12, 999] {
        let err = collect(&conn, Some(list), &[]).expect_err("not readable");
        assert_eq!(err.error_code(), ErrorCode::ListNotFound, "list {list}");
    }
}

#[test]
fn all_visible_collection_covers_exactly_the_readable_lists() {
    let conn = matrix_store();
    let page = collect(&conn, None, &[("per_page", "100")]).expect("collect");
    let readable = lists(&READABLE_BY_USER1);
    assert!(page.tasks.iter().all(|task| readable.contains(&task.list_id)));
    assert_eq!(page.total_count, 25);
    assert!(!ids(&page).contains(&22));
    assert!(!ids(&page).contains(&23));
}

#[test]
fn namespace_grants_cover_lists_created_later() {
    let conn = matrix_store();
    conn.execute_batch(
        "INSERT INTO lists (id, title, owner_id, namespace_id) VALUES (15, 'late', 2, 3);
         INSERT INTO tasks (id, title, list_id, created_by, created, updated)
             VALUES (28, 'task #28 late', 15, 2, 1543622400, 1543622400);",
    )
    .expect("insert late list");

    for user in [1, 2] {
        let actor = load_actor(&conn, UserId(user)).expect("actor");
        assert!(
            resolve_readable_lists(&conn, &actor)
                .expect("resolve")
                .contains(&ListId(15)),
            "user {user}"
        );
    }
    let page = collect(&conn, Some(15), &[]).expect("late list readable");
    assert_eq!(ids(&page), vec![28]);
}

#[test]
fn team_membership_changes_take_effect_on_next_request() {
    let conn = matrix_store();
    conn.execute("DELETE FROM team_members WHERE team_id = 1 AND user_id = 1", [])
        .expect("leave team");
    let actor = load_actor(&conn, UserId(1)).expect("actor");
    let readable = resolve_readable_lists(&conn, &actor).expect("resolve");
    for list in [3, 4, 5, 9, 14] {
        assert!(!readable.contains(&ListId(list)), "list {list}");
    }
}

#[test]
fn grants_name_the_user_and_their_teams() {
    let conn = matrix_store();
    let actor = load_actor(&conn, UserId(1)).expect("actor");
    let grants = fetch_grants(&conn, &actor).expect("grants");
    // Three team list shares, three user list shares, two team namespace
    // shares, one user namespace share.
    assert_eq!(grants.len(), 9);
    assert!(grants.iter().all(|grant| actor.is_named_by(grant.subject)));
}
