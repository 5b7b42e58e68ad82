//! `tv lists`: show the lists a user can see and how.

use crate::cmd::open_existing_store;
use crate::output::{OutputMode, Report, emit, pretty_rule, pretty_section};
use clap::Args;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::Path;
use taskview_core::collection::visibility::{
    VisibilityPath, lists_via, resolve_lists_with_privilege,
};
use taskview_core::db::query::{ListSummary, fetch_lists};
use taskview_core::model::access::{Actor, Privilege};
use taskview_core::model::{ListId, UserId};

#[derive(Args, Debug)]
pub struct ListsArgs {
    /// User whose visible lists to show.
    #[arg(short, long)]
    pub user: i64,

    /// Only lists reachable at this privilege or higher (read, write, admin).
    #[arg(long, default_value = "read")]
    pub min_privilege: Privilege,
}

#[derive(Debug, Serialize)]
struct VisibleList {
    #[serde(flatten)]
    list: ListSummary,
    via: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct ListsReport {
    user_id: UserId,
    min_privilege: Privilege,
    lists: Vec<VisibleList>,
}

fn visible_lists(conn: &Connection, actor: &Actor, min: Privilege) -> rusqlite::Result<Vec<VisibleList>> {
    let ids = resolve_lists_with_privilege(conn, actor, min)?;

    let mut via: BTreeMap<ListId, Vec<&'static str>> = BTreeMap::new();
    for path in VisibilityPath::ALL {
        for id in lists_via(conn, actor, path, min)? {
            via.entry(id).or_default().push(path.name());
        }
    }

    Ok(fetch_lists(conn, &ids)?
        .into_iter()
        .map(|list| VisibleList {
            via: via.remove(&list.id).unwrap_or_default(),
            list,
        })
        .collect())
}

/// Execute `tv lists`.
///
/// # Errors
///
/// Returns an error if the store is missing or a query fails.
pub fn run_lists(args: &ListsArgs, output: OutputMode, db_path: &Path) -> anyhow::Result<()> {
    let conn = open_existing_store(db_path, output)?;
    let actor = Actor::load(&conn, UserId(args.user))?;

    let report = ListsReport {
        user_id: actor.user_id,
        min_privilege: args.min_privilege,
        lists: visible_lists(&conn, &actor, args.min_privilege)?,
    };

    emit(output, &report)
}

impl Report for ListsReport {
    fn write_text(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "id\tnamespace\towner\tvia\ttitle")?;
        for entry in &self.lists {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}",
                entry.list.id,
                entry.list.namespace_id,
                entry.list.owner_id,
                entry.via.join(","),
                entry.list.title
            )?;
        }
        Ok(())
    }

    fn write_pretty(&self, w: &mut dyn Write) -> io::Result<()> {
        pretty_section(
            w,
            &format!(
                "Lists visible to user {} ({}+, {} total)",
                self.user_id,
                self.min_privilege,
                self.lists.len()
            ),
        )?;
        if self.lists.is_empty() {
            writeln!(w, "No lists found.")?;
        }
        for entry in &self.lists {
            writeln!(w, "#{:<6} {}", entry.list.id, entry.list.title)?;
            writeln!(
                w,
                "            namespace {} | owner {} | via {}",
                entry.list.namespace_id,
                entry.list.owner_id,
                entry.via.join(", ")
            )?;
        }
        pretty_rule(w)
    }
}
