//! Whole-book conversion: unpack, sanitize, repack.

pub mod guard;

pub use guard::{JobGuard, JobPermit};

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use folioforge_common::{AggregateStats, SanitizationReport};
use folioforge_container::{ContainerCodec, ExtractSummary, PackSummary};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::events::EventLog;
use crate::sanitizer::Sanitizer;

/// Errors raised before any work starts.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Another job holds the [`JobGuard`].
    #[error("a conversion is already running")]
    Busy,

    #[error("input not accessible: {}", .0.display())]
    NotFound(PathBuf),

    #[error("only .epub input is supported: {}", .0.display())]
    NotEpub(PathBuf),
}

/// Coarse phase of a running job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStage {
    Init,
    Workspace,
    Unpack,
    Sanitize,
    Repack,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobProgress {
    pub job_id: Uuid,
    pub stage: JobStage,
    /// 0-100
    pub percent: f32,
}

/// Everything a finished job produced.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub job_id: Uuid,
    pub reports: Vec<SanitizationReport>,
    pub stats: AggregateStats,
    pub output: PathBuf,
    pub extract: ExtractSummary,
    pub pack: PackSummary,
}

/// One EPUB to sanitize.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    input: PathBuf,
    output: Option<PathBuf>,
}

impl ConversionJob {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Requested output, or `<stem><suffix>.epub` next to the input.
    pub fn output_path(&self, suffix: &str) -> PathBuf {
        if let Some(output) = &self.output {
            return output.clone();
        }
        let stem = self
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "book".to_string());
        self.input.with_file_name(format!("{stem}{suffix}.epub"))
    }

    fn validate(&self) -> Result<(), JobError> {
        if !self.input.is_file() {
            return Err(JobError::NotFound(self.input.clone()));
        }
        let is_epub = self
            .input
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("epub"));
        if !is_epub {
            return Err(JobError::NotEpub(self.input.clone()));
        }
        Ok(())
    }

    /// Run the job while holding `guard`.
    pub fn run(
        &self,
        guard: &JobGuard,
        config: &Config,
        events: Option<Arc<EventLog>>,
        on_progress: &(dyn Fn(JobProgress) + Sync),
    ) -> Result<JobOutcome> {
        let _permit = guard.try_acquire()?;
        let job_id = Uuid::new_v4();
        let progress = |stage, percent| {
            on_progress(JobProgress {
                job_id,
                stage,
                percent,
            })
        };
        let note = |msg: String| {
            if let Some(log) = &events {
                log.info(msg);
            }
        };

        progress(JobStage::Init, 0.0);
        self.validate()?;
        let size = std::fs::metadata(&self.input)?.len();
        note(format!(
            "Input: {} ({:.2} MB)",
            self.input.display(),
            size as f64 / 1024.0 / 1024.0
        ));

        progress(JobStage::Workspace, 5.0);
        let workspace = tempfile::Builder::new()
            .prefix("folioforge_")
            .tempdir()
            .context("Failed to create workspace")?;
        let unpacked = workspace.path().join("unpacked");

        progress(JobStage::Unpack, 10.0);
        let codec = ContainerCodec::new(config.container.stream_buffer_size);
        let extract = codec
            .unzip(&self.input, &unpacked)
            .with_context(|| format!("Failed to unpack {}", self.input.display()))?;
        for name in &extract.skipped {
            note(format!("Skipped unsafe path: {name}"));
        }

        progress(JobStage::Sanitize, 20.0);
        let mut sanitizer = Sanitizer::from_config(config);
        if let Some(log) = &events {
            sanitizer = sanitizer.with_event_log(Arc::clone(log));
        }
        let reports = sanitizer.sanitize_tree_with_progress(&unpacked, &|p| {
            progress(JobStage::Sanitize, 20.0 + 25.0 * p.percent() / 100.0)
        });
        let stats = AggregateStats::from_reports(&reports);
        for line in stats.summary_lines() {
            note(line);
        }

        progress(JobStage::Repack, 45.0);
        let output = self.output_path(&config.container.output_suffix);
        let pack = codec
            .zip_strict(&unpacked, &output)
            .with_context(|| format!("Failed to write {}", output.display()))?;

        progress(JobStage::Complete, 100.0);
        info!(
            %job_id,
            output = %output.display(),
            images = stats.total,
            failed = stats.failed,
            "conversion complete"
        );

        Ok(JobOutcome {
            job_id,
            reports,
            stats,
            output,
            extract,
            pack,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        let job = ConversionJob::new("/books/novel.epub");
        assert_eq!(
            job.output_path("_sanitized"),
            PathBuf::from("/books/novel_sanitized.epub")
        );
        let job = job.with_output("/tmp/out.epub");
        assert_eq!(job.output_path("_sanitized"), PathBuf::from("/tmp/out.epub"));
    }

    #[test]
    fn test_validation() {
        let dir = tempfile::tempdir().unwrap();
        let missing = ConversionJob::new(dir.path().join("missing.epub"));
        assert!(matches!(missing.validate(), Err(JobError::NotFound(_))));

        let txt = dir.path().join("book.txt");
        std::fs::write(&txt, b"x").unwrap();
        assert!(matches!(
            ConversionJob::new(&txt).validate(),
            Err(JobError::NotEpub(_))
        ));

        let epub = dir.path().join("book.EPUB");
        std::fs::write(&epub, b"x").unwrap();
        assert!(ConversionJob::new(&epub).validate().is_ok());
    }

    #[test]
    fn test_busy_guard_rejects() {
        let dir = tempfile::tempdir().unwrap();
        let guard = JobGuard::new();
        let _held = guard.try_acquire().unwrap();

        let err = ConversionJob::new(dir.path().join("a.epub"))
            .run(&guard, &Config::default(), None, &|_| {})
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<JobError>(), Some(JobError::Busy)));
    }
}
