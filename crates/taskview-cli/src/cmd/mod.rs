pub mod grants;
pub mod init;
pub mod lists;
pub mod tasks;

use crate::output::{CliError, OutputMode, render_error};
use rusqlite::Connection;
use std::path::Path;
use taskview_core::CollectionError;

/// Open an existing store, rendering a structured error when it is missing.
///
/// Read commands never create the store; `tv init` does.
///
/// # Errors
///
/// Returns an error if the store does not exist or cannot be opened.
pub fn open_existing_store(db_path: &Path, output: OutputMode) -> anyhow::Result<Connection> {
    if !db_path.exists() {
        render_error(
            output,
            &CliError::with_details(
                format!("task store not found at {}", db_path.display()),
                "run `tv init` or pass --db / TASKVIEW_DB",
                "store_missing",
            ),
        )?;
        anyhow::bail!("task store not found at {}", db_path.display());
    }

    match taskview_core::db::open_store(db_path) {
        Ok(conn) => Ok(conn),
        Err(err) => {
            render_error(
                output,
                &CliError::with_details(
                    format!("{err:#}"),
                    "check the store path and file permissions",
                    "store_open_failed",
                ),
            )?;
            Err(err)
        }
    }
}

/// Render a collection error and turn it into the command's failure.
///
/// # Errors
///
/// Always returns an error carrying the collection error's message.
pub fn fail_with(output: OutputMode, err: &CollectionError) -> anyhow::Result<()> {
    render_error(output, &CliError::from(err))?;
    anyhow::bail!("{err}");
}
