//! Tree-level sanitization: discovery and parallel fan-out.
//!
//! [`Sanitizer`] walks an unpacked book, keeps files with an image extension,
//! and runs [`pipeline::sanitize_file`] on each in a bounded rayon pool.
//! Reports come back in discovery order regardless of worker count.

pub mod fast_path;
pub mod pipeline;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use folioforge_common::{paths, SanitizationReport, SanitizeStatus};
use folioforge_image::DecodeLimits;
use rayon::prelude::*;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::{Config, SanitizeConfig};
use crate::events::EventLog;

pub use pipeline::sanitize_file;

/// Per-file parameters resolved from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub target_dpi: u32,
    pub max_long_side: u32,
    pub jpeg_quality: u8,
    pub fast_path: bool,
    pub limits: DecodeLimits,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&SanitizeConfig::default())
    }
}

impl From<&SanitizeConfig> for Settings {
    fn from(config: &SanitizeConfig) -> Self {
        Self {
            target_dpi: config.target_dpi,
            max_long_side: config.max_long_side,
            jpeg_quality: config.jpeg_quality,
            fast_path: config.fast_path,
            limits: DecodeLimits::default(),
        }
    }
}

/// Progress snapshot passed to callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            100.0
        } else {
            self.done as f32 * 100.0 / self.total as f32
        }
    }
}

pub struct Sanitizer {
    settings: Settings,
    max_workers: usize,
    progress_interval: usize,
    events: Option<Arc<EventLog>>,
}

impl Sanitizer {
    pub fn new(config: SanitizeConfig) -> Self {
        Self {
            settings: Settings::from(&config),
            max_workers: config.max_workers.max(1),
            progress_interval: config.progress_interval.max(1),
            events: None,
        }
    }

    /// Build from a full configuration, decode limits included.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.sanitize.clone()).with_limits(DecodeLimits::from(&config.limits))
    }

    pub fn with_limits(mut self, limits: DecodeLimits) -> Self {
        self.settings.limits = limits;
        self
    }

    /// Mirror per-file outcomes into `log`.
    pub fn with_event_log(mut self, log: Arc<EventLog>) -> Self {
        self.events = Some(log);
        self
    }

    /// Image files under `root`, sorted by file name at each level.
    ///
    /// Unreadable entries are logged and skipped.
    pub fn discover(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && paths::is_image_file(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                    if let Some(log) = &self.events {
                        log.warn(format!("skipped {e}"));
                    }
                }
            }
        }
        files
    }

    /// Threads used for `file_count` files.
    pub fn worker_count(&self, file_count: usize) -> usize {
        num_cpus::get().min(file_count).min(self.max_workers).max(1)
    }

    /// Sanitize every image under `root` in place.
    pub fn sanitize_tree(&self, root: &Path) -> Vec<SanitizationReport> {
        self.sanitize_tree_with_progress(root, &|_| {})
    }

    /// Like [`sanitize_tree`](Self::sanitize_tree), reporting progress every
    /// `progress_interval` completions and once at the end.
    pub fn sanitize_tree_with_progress(
        &self,
        root: &Path,
        on_progress: &(dyn Fn(Progress) + Sync),
    ) -> Vec<SanitizationReport> {
        let files = self.discover(root);
        let total = files.len();
        if total == 0 {
            info!(root = %root.display(), "no images found");
            on_progress(Progress { done: 0, total: 0 });
            return Vec::new();
        }

        let workers = self.worker_count(total);
        info!(root = %root.display(), files = total, workers, "sanitizing images");

        let done = AtomicUsize::new(0);
        let visit = |path: &PathBuf| {
            let report = sanitize_file(path, &self.settings);
            self.record(root, &report);
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            if finished % self.progress_interval == 0 || finished == total {
                on_progress(Progress {
                    done: finished,
                    total,
                });
            }
            report
        };

        let mut reports = Vec::with_capacity(total);
        match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool.install(|| files.par_iter().map(visit).collect_into_vec(&mut reports)),
            Err(e) => {
                warn!(error = %e, "failed to build worker pool, running sequentially");
                reports.extend(files.iter().map(visit));
            }
        }

        if let Some(log) = &self.events {
            log.info(format!("Scan complete: {total} images"));
        }
        reports
    }

    fn record(&self, root: &Path, report: &SanitizationReport) {
        let Some(log) = &self.events else {
            return;
        };
        let name = report.relative_to(root);
        match report.status {
            SanitizeStatus::Ok => log.info(format!("[OK] {name}")),
            status => log.warn(format!("[{status}] {name}: {}", report.actions.join(" | "))),
        };
    }
}
