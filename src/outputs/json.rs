//! JSON snapshot of the stored news listing.
//!
//! After every cycle the full store is written newest-first to a single
//! file that clients (or a static file server) can read directly:
//!
//! ```text
//! json_output_dir/
//! └── news.json
//! ```
//!
//! The file is written to a temporary sibling and renamed into place, so
//! readers never observe a half-written listing.

use crate::models::{Candidate, NewsSnapshot};
use crate::utils::BoxError;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// File name of the snapshot inside the output directory.
pub const SNAPSHOT_FILE: &str = "news.json";

fn snapshot_path(json_output_dir: &str) -> PathBuf {
    Path::new(json_output_dir).join(SNAPSHOT_FILE)
}

/// Whether a snapshot has already been written to `json_output_dir`.
pub fn snapshot_exists(json_output_dir: &str) -> bool {
    snapshot_path(json_output_dir).exists()
}

/// Write `items` (already newest-first) as the current snapshot.
///
/// # Errors
///
/// Returns an error if serialization, directory creation, or the write fails.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, count = items.len()))]
pub async fn write_snapshot(items: Vec<Candidate>, json_output_dir: &str) -> Result<(), BoxError> {
    let snapshot = NewsSnapshot {
        generated_at: Utc::now(),
        items,
    };
    let json = serde_json::to_string_pretty(&snapshot)?;

    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = snapshot_path(json_output_dir);
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).await?;
    fs::rename(&tmp, &path).await?;
    info!(path = %path.display(), "Wrote news snapshot");
    Ok(())
}

/// Read the items of the current snapshot.
///
/// # Returns
///
/// The stored items, or an empty vector if no snapshot has been written yet.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn read_snapshot(json_output_dir: &str) -> Result<Vec<Candidate>, BoxError> {
    let path = snapshot_path(json_output_dir);
    let json = match fs::read_to_string(&path).await {
        Ok(j) => j,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No previous snapshot");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };
    let snapshot: NewsSnapshot = serde_json::from_str(&json)?;
    info!(count = snapshot.items.len(), "Loaded previous snapshot");
    Ok(snapshot.items)
}
