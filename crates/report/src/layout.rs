//! Working directory layout.
//!
//! ```text
//! <data_dir>/
//!   raw/          startup payload (input, never cleaned)
//!   parsed/       raw and master bundles
//!   analysis/     player_analysis.json, dashboard.html
//!   csv_exports/  one CSV per collection
//! ```

use hoh_core::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Subfolders emptied at the start of a run.
pub const OUTPUT_SUBDIRS: [&str; 3] = ["parsed", "analysis", "csv_exports"];

/// Paths inside the data directory.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Layout rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn raw_dir(&self) -> PathBuf {
        self.root.join("raw")
    }

    pub fn parsed_dir(&self) -> PathBuf {
        self.root.join("parsed")
    }

    pub fn analysis_dir(&self) -> PathBuf {
        self.root.join("analysis")
    }

    pub fn csv_dir(&self) -> PathBuf {
        self.root.join("csv_exports")
    }

    pub fn dashboard_path(&self) -> PathBuf {
        self.analysis_dir().join("dashboard.html")
    }

    pub fn analysis_path(&self) -> PathBuf {
        self.analysis_dir().join("player_analysis.json")
    }

    /// Create every folder. With `clean`, empty the output folders first.
    ///
    /// Only folder contents are removed, never the folders themselves.
    /// Entries that cannot be removed (e.g. locked by another process) are
    /// skipped with a warning.
    pub fn prepare(&self, clean: bool) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::create_dir_all(self.raw_dir())?;

        for sub in OUTPUT_SUBDIRS {
            let dir = self.root.join(sub);
            if clean && dir.is_dir() {
                clear_dir(&dir)?;
            }
            fs::create_dir_all(&dir)?;
        }

        tracing::debug!(root = %self.root.display(), clean, "prepared data directory");
        Ok(())
    }
}

fn clear_dir(dir: &Path) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let removed = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        if let Err(e) = removed {
            tracing::warn!(path = %path.display(), error = %e, "could not remove old output");
        }
    }
    Ok(())
}
