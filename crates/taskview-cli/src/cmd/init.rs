//! `tv init`: create and migrate the task store.

use crate::cmd::fail_with;
use crate::output::{OutputMode, Report, emit, pretty_kv, pretty_section};
use anyhow::Context as _;
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use taskview_core::config::{load_config, project_config_path};
use taskview_core::db::{migrations, open_store};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing `.taskview/config.toml` with the defaults.
    #[arg(long)]
    pub force: bool,
}

const CONFIG_TOML: &str = "[pagination]\n\
    default_per_page = 50\n\
    max_per_page = 250\n\
    \n\
    [saved_filters]\n\
    # stored | supplied | merge\n\
    precedence = \"stored\"\n";

#[derive(Debug, Serialize)]
struct InitReport {
    db: String,
    config: String,
    config_written: bool,
    schema_version: u32,
}

/// Execute `tv init`.
///
/// Creates the store (and its parent directory), migrates it and writes the
/// default project config unless one exists. Re-running is safe.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or migrated, or if the
/// config file cannot be written.
pub fn run_init(
    args: &InitArgs,
    output: OutputMode,
    project_root: &Path,
    db_path: &Path,
) -> anyhow::Result<()> {
    let conn = open_store(db_path)?;
    let schema_version = migrations::current_schema_version(&conn)?;

    let config_path = project_config_path(project_root);
    let config_written = args.force || !config_path.exists();
    if config_written {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create config directory {}", parent.display()))?;
        }
        std::fs::write(&config_path, CONFIG_TOML)
            .with_context(|| format!("write {}", config_path.display()))?;
    }

    // A hand-edited config that no longer parses is reported, not overwritten.
    if let Err(err) = load_config(project_root) {
        return fail_with(output, &err);
    }

    let report = InitReport {
        db: db_path.display().to_string(),
        config: config_path.display().to_string(),
        config_written,
        schema_version,
    };

    emit(output, &report)
}

impl Report for InitReport {
    fn write_text(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "{}\t{}\t{}", self.db, self.config, self.schema_version)
    }

    fn write_pretty(&self, w: &mut dyn Write) -> io::Result<()> {
        pretty_section(w, "Initialized taskview store")?;
        pretty_kv(w, "store", &self.db)?;
        let state = if self.config_written { "written" } else { "kept" };
        pretty_kv(w, "config", format!("{} ({state})", self.config))?;
        pretty_kv(w, "schema", self.schema_version.to_string())
    }
}
