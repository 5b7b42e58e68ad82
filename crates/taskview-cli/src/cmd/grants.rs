//! `tv grants`: show shares that name a user or one of their teams.

use crate::cmd::open_existing_store;
use crate::output::{OutputMode, Report, emit, pretty_kv, pretty_rule, pretty_section};
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use taskview_core::db::query::fetch_grants;
use taskview_core::model::access::{Actor, ShareGrant, ShareTarget, Subject};
use taskview_core::model::{TeamId, UserId};

#[derive(Args, Debug)]
pub struct GrantsArgs {
    /// User whose grants to show.
    #[arg(short, long)]
    pub user: i64,
}

#[derive(Debug, Serialize)]
struct GrantsReport {
    user_id: UserId,
    team_ids: Vec<TeamId>,
    grants: Vec<ShareGrant>,
}

/// Execute `tv grants`.
///
/// # Errors
///
/// Returns an error if the store is missing or a query fails.
pub fn run_grants(args: &GrantsArgs, output: OutputMode, db_path: &Path) -> anyhow::Result<()> {
    let conn = open_existing_store(db_path, output)?;
    let actor = Actor::load(&conn, UserId(args.user))?;
    let grants = fetch_grants(&conn, &actor)?;

    let report = GrantsReport {
        user_id: actor.user_id,
        team_ids: actor.team_ids,
        grants,
    };
    emit(output, &report)
}

fn subject_label(subject: Subject) -> String {
    match subject {
        Subject::User(id) => format!("user:{id}"),
        Subject::Team(id) => format!("team:{id}"),
    }
}

fn target_label(target: ShareTarget) -> String {
    match target {
        ShareTarget::List(id) => format!("list:{id}"),
        ShareTarget::Namespace(id) => format!("namespace:{id}"),
    }
}

impl Report for GrantsReport {
    fn write_text(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "subject\ttarget\tprivilege")?;
        for grant in &self.grants {
            writeln!(
                w,
                "{}\t{}\t{}",
                subject_label(grant.subject),
                target_label(grant.target),
                grant.privilege
            )?;
        }
        Ok(())
    }

    fn write_pretty(&self, w: &mut dyn Write) -> io::Result<()> {
        pretty_section(w, &format!("Grants for user {}", self.user_id))?;
        let teams: Vec<String> = self.team_ids.iter().map(ToString::to_string).collect();
        pretty_kv(
            w,
            "teams",
            if teams.is_empty() {
                "-".to_string()
            } else {
                teams.join(", ")
            },
        )?;
        pretty_rule(w)?;
        if self.grants.is_empty() {
            writeln!(w, "No grants found.")?;
        }
        for grant in &self.grants {
            writeln!(
                w,
                "{:<16} {:<16} {}",
                target_label(grant.target),
                subject_label(grant.subject),
                grant.privilege
            )?;
        }
        Ok(())
    }
}
