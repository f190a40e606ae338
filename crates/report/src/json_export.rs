//! JSON dumps of the model and of the classified raw records.

use chrono::{DateTime, Local};
use hoh_core::{PlayerModel, Result};
use hoh_ingestion::ClassifiedBuckets;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// File name of the classified raw record dump.
pub const RAW_BUNDLE_FILE: &str = "parsed_raw_bundle.json";
/// File name of the model dump.
pub const MASTER_BUNDLE_FILE: &str = "parsed_master_bundle.json";

/// The model stamped with the time it was produced.
#[derive(Debug, Serialize)]
pub struct Analysis<'a> {
    pub timestamp: String,
    #[serde(flatten)]
    pub model: &'a PlayerModel,
}

impl<'a> Analysis<'a> {
    pub fn new(model: &'a PlayerModel, at: DateTime<Local>) -> Self {
        Self {
            timestamp: at.to_rfc3339(),
            model,
        }
    }
}

/// Write `value` as pretty-printed JSON, creating parent folders.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text)?;
    Ok(())
}

/// Write the timestamped analysis document.
pub fn write_analysis(model: &PlayerModel, path: &Path, at: DateTime<Local>) -> Result<()> {
    write_json(&Analysis::new(model, at), path)?;
    tracing::info!(path = %path.display(), "wrote analysis JSON");
    Ok(())
}

/// Write both parsed bundles into `dir`, returning their paths.
pub fn write_parsed_bundles(
    buckets: &ClassifiedBuckets,
    model: &PlayerModel,
    dir: &Path,
) -> Result<[PathBuf; 2]> {
    let raw = dir.join(RAW_BUNDLE_FILE);
    let master = dir.join(MASTER_BUNDLE_FILE);
    write_json(buckets, &raw)?;
    write_json(model, &master)?;
    tracing::debug!(dir = %dir.display(), "wrote parsed bundles");
    Ok([raw, master])
}
