//! Last-visit tracking for the welcome notice.

use crate::error::Result;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const LOG_TARGET: &str = "linkbio::visit";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct VisitRecord {
    last_visit: DateTime<Utc>,
}

/// Remembers when the profile was last opened.
///
/// This timestamp is the only state persisted between runs.
#[derive(Debug, Clone)]
pub struct VisitTracker {
    path: PathBuf,
    revisit_after: ChronoDuration,
}

impl VisitTracker {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, revisit_after_secs: u64) -> Self {
        let revisit_after = i64::try_from(revisit_after_secs)
            .ok()
            .and_then(ChronoDuration::try_seconds)
            .unwrap_or(ChronoDuration::MAX);

        Self {
            path: path.into(),
            revisit_after,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last recorded visit, `None` if missing or unreadable
    #[must_use]
    pub fn last_visit(&self) -> Option<DateTime<Utc>> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<VisitRecord>(&content) {
            Ok(record) => Some(record.last_visit),
            Err(e) => {
                warn!(target: LOG_TARGET, "Ignoring unreadable visit file: {e}");
                None
            }
        }
    }

    /// Decide whether to show the welcome notice at `now`.
    ///
    /// Returns true on a first visit or when the last visit is older than the
    /// revisit window. The timestamp is only recorded in that case, so short
    /// revisits do not push the window forward.
    ///
    /// # Errors
    ///
    /// Returns an error if the new timestamp cannot be written.
    pub fn check_and_record(&self, now: DateTime<Utc>) -> Result<bool> {
        let show = self
            .last_visit()
            .map_or(true, |last| now.signed_duration_since(last) > self.revisit_after);

        if show {
            self.record(now)?;
        }
        debug!(target: LOG_TARGET, "Welcome notice {}", if show { "shown" } else { "skipped" });
        Ok(show)
    }

    fn record(&self, now: DateTime<Utc>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(&VisitRecord { last_visit: now })?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
