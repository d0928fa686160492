//! Per-file sanitization reports and the statistics derived from them.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{actions, ImageFormat, SanitizeStatus};

/// Record of everything that happened to one image file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizationReport {
    /// Path of the file as visited (before any placeholder rename).
    #[serde(rename = "filePath")]
    pub path: PathBuf,
    /// Format detected from magic bytes; `None` when sniffing failed.
    pub original_format: Option<ImageFormat>,
    /// Applied transforms, in pipeline order.
    pub actions: Vec<String>,
    pub status: SanitizeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "fileSizeBefore")]
    pub size_before: u64,
    #[serde(rename = "fileSizeAfter")]
    pub size_after: u64,
}

impl SanitizationReport {
    /// Create an empty report for a file about to be visited.
    pub fn new(path: impl Into<PathBuf>, size_before: u64) -> Self {
        Self {
            path: path.into(),
            original_format: None,
            actions: Vec::new(),
            status: SanitizeStatus::Ok,
            error: None,
            size_before,
            size_after: 0,
        }
    }

    /// Append an action tag.
    pub fn push(&mut self, action: impl Into<String>) {
        self.actions.push(action.into());
    }

    /// Whether a given tag was recorded.
    pub fn has_action(&self, action: &str) -> bool {
        self.actions.iter().any(|a| a == action)
    }

    /// Mark the report as substituted by a placeholder.
    pub fn substituted(&mut self, status: SanitizeStatus, action: &str, error: impl Into<String>) {
        debug_assert!(status.is_substituted());
        self.status = status;
        self.push(action);
        self.error = Some(error.into());
    }

    /// Derive OK/REPAIRED from the recorded actions.
    ///
    /// Substituted statuses are left untouched.
    pub fn settle_status(&mut self) {
        if self.status.is_substituted() {
            return;
        }
        self.status = if self.actions.iter().all(|a| actions::is_baseline(a)) {
            SanitizeStatus::Ok
        } else {
            SanitizeStatus::Repaired
        };
    }

    /// Path relative to `root`, when it lives under it.
    pub fn relative_to(&self, root: &Path) -> String {
        crate::paths::to_slash_relative(&self.path, root)
    }
}

/// Counts per status, derived from a report list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total: usize,
    pub ok: usize,
    pub repaired: usize,
    pub replaced: usize,
    pub failed: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

impl AggregateStats {
    pub fn from_reports(reports: &[SanitizationReport]) -> Self {
        let mut stats = Self {
            total: reports.len(),
            ..Self::default()
        };
        for report in reports {
            match report.status {
                SanitizeStatus::Ok => stats.ok += 1,
                SanitizeStatus::Repaired => stats.repaired += 1,
                SanitizeStatus::Replaced => stats.replaced += 1,
                SanitizeStatus::Failed => stats.failed += 1,
            }
            stats.bytes_before += report.size_before;
            stats.bytes_after += report.size_after;
        }
        stats
    }

    /// Files whose content changed (repaired or placeholder).
    pub fn changed(&self) -> usize {
        self.repaired + self.replaced
    }

    /// Human-readable summary for the end-of-run banner.
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Images processed: {}", self.total),
            format!("  OK:                {}", self.ok),
            format!("  Repaired/replaced: {}", self.changed()),
            format!("  Failed:            {}", self.failed),
            format!(
                "  Size: {} -> {}",
                human_bytes(self.bytes_before),
                human_bytes(self.bytes_after)
            ),
        ]
    }
}

fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
