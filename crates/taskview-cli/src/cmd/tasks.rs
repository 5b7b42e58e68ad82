//! `tv tasks`: read one page of a task collection.

use crate::cmd::{fail_with, open_existing_store};
use crate::output::{OutputMode, Report, emit, pretty_rule, pretty_section};
use chrono::{DateTime, Utc};
use clap::Args;
use std::io::{self, Write};
use std::path::Path;
use taskview_core::collection::CompiledQuery;
use taskview_core::collection::params::CollectionParams;
use taskview_core::config::load_config;
use taskview_core::model::UserId;
use taskview_core::model::access::Actor;
use taskview_core::model::task::Task;
use taskview_core::{CollectionPage, CollectionRequest, Scope, read_collection};

#[derive(Args, Debug)]
pub struct TasksArgs {
    /// User the request runs as.
    #[arg(short, long)]
    pub user: i64,

    /// List to read: a list id, `-1` for favorites, `-2` and below for saved filters.
    #[arg(short, long, allow_negative_numbers = true)]
    pub list: Option<i64>,

    /// Collection parameter as `key=value` (repeatable), e.g. `sort_by=due_date`.
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

/// Execute `tv tasks`.
///
/// # Errors
///
/// Returns an error if the store is missing, the config or parameters are
/// invalid, the scope is not readable by the user, or the query fails.
pub fn run_tasks(
    args: &TasksArgs,
    output: OutputMode,
    project_root: &Path,
    db_path: &Path,
) -> anyhow::Result<()> {
    let config = match load_config(project_root) {
        Ok(config) => config,
        Err(err) => return fail_with(output, &err),
    };

    let params = match CollectionParams::from_pairs(args.params.iter().map(|(k, v)| (k, v))) {
        Ok(params) => params,
        Err(err) => return fail_with(output, &err),
    };

    // Filter and sort errors outrank scope errors.
    if let Err(err) = CompiledQuery::compile(&params) {
        return fail_with(output, &err);
    }

    let scope = match Scope::from_list_param(args.list) {
        Ok(scope) => scope,
        Err(err) => return fail_with(output, &err),
    };

    let conn = open_existing_store(db_path, output)?;
    let actor = Actor::load(&conn, UserId(args.user))?;
    let request = CollectionRequest {
        actor,
        scope,
        params,
    };

    let page = match read_collection(&conn, &config, &request) {
        Ok(page) => page,
        Err(err) => return fail_with(output, &err),
    };

    emit(output, &page)
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.to_rfc3339())
}

fn render_task_line(task: &Task, w: &mut dyn Write) -> io::Result<()> {
    let marker = if task.done { "x" } else { " " };
    let star = if task.is_favorite { "*" } else { "" };
    writeln!(w, "[{marker}] #{:<6} {}{star}", task.id, task.title)?;
    let mut details = vec![format!("list {}", task.list_id)];
    if task.priority != 0 {
        details.push(format!("priority {}", task.priority));
    }
    if let Some(due) = task.due_date {
        details.push(format!("due {}", due.format("%Y-%m-%d %H:%M")));
    }
    if !task.labels.is_empty() {
        let labels: Vec<&str> = task.labels.iter().map(|l| l.title.as_str()).collect();
        details.push(format!("labels {}", labels.join(", ")));
    }
    writeln!(w, "            {}", details.join(" | "))
}

impl Report for CollectionPage {
    fn write_text(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "id\tlist\tdone\tpriority\tdue_date\ttitle")?;
        for task in &self.tasks {
            writeln!(
                w,
                "{}\t{}\t{}\t{}\t{}\t{}",
                task.id,
                task.list_id,
                task.done,
                task.priority,
                format_date(task.due_date),
                task.title
            )?;
        }
        Ok(())
    }

    fn write_pretty(&self, w: &mut dyn Write) -> io::Result<()> {
        let heading = if self.total_count == 0 {
            "Tasks (0 total)".to_string()
        } else if u64::from(self.page) > self.total_pages {
            format!(
                "Tasks (page {} of {}, past end, {} total)",
                self.page, self.total_pages, self.total_count
            )
        } else {
            format!(
                "Tasks (page {} of {}, {} total)",
                self.page, self.total_pages, self.total_count
            )
        };
        pretty_section(w, &heading)?;
        if self.tasks.is_empty() {
            writeln!(w, "No tasks found.")?;
        }
        for task in &self.tasks {
            render_task_line(task, w)?;
        }
        pretty_rule(w)
    }
}
