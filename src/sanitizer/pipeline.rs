//! Per-file sanitization.
//!
//! Stages run in a fixed order and every corrective step appends a tag to the
//! report. Errors never escape: an unusable file is swapped for the
//! placeholder and the report says why.

use std::path::Path;

use folioforge_common::{actions, SanitizationReport, SanitizeStatus};
use folioforge_image::{
    atomic_replace, decode, detect_spoof, encode, normalize, read_orientation, sniff, substitute,
    OutputKind, PLACEHOLDER_SVG,
};
use tracing::{debug, warn};

use super::{fast_path, Settings};

/// Sanitize one file in place and describe what happened.
pub fn sanitize_file(path: &Path, settings: &Settings) -> SanitizationReport {
    let size_before = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let mut report = SanitizationReport::new(path, size_before);

    let format = match sniff(path) {
        Ok(format) => format,
        Err(e) => {
            replace(&mut report, SanitizeStatus::Failed, actions::INVALID_REPLACED, e.to_string());
            return report;
        }
    };
    report.original_format = Some(format);

    let orientation = read_orientation(path, format);

    if settings.fast_path && fast_path::is_eligible(path, format, orientation) {
        match fast_path::apply(path, settings.target_dpi) {
            Ok(size_after) => {
                report.push(actions::fast_dpi(settings.target_dpi));
                report.size_after = size_after;
                report.settle_status();
                return report;
            }
            Err(e) => warn!(path = %path.display(), error = %e, "fast path failed, decoding"),
        }
    }

    if let Some(tag) = detect_spoof(path, format) {
        warn!(path = %path.display(), %tag, "extension does not match content");
        report.push(tag);
    }

    let decoded = match decode(path, format, &settings.limits) {
        Ok(decoded) => decoded,
        Err(e) => {
            replace(
                &mut report,
                SanitizeStatus::Replaced,
                actions::DECODE_FAIL_REPLACED,
                e.to_string(),
            );
            return report;
        }
    };

    let normalized = normalize(decoded, orientation, settings.max_long_side);
    report.actions.extend(normalized.actions);

    let kind = OutputKind::for_path(path);
    let written = encode(&normalized.image, kind, settings.target_dpi, settings.jpeg_quality)
        .and_then(|bytes| atomic_replace(path, &bytes));
    match written {
        Ok(size_after) => {
            report.push(actions::force_dpi(settings.target_dpi));
            report.push(actions::CLEAN_BINARY);
            report.size_after = size_after;
            report.settle_status();
        }
        Err(e) => {
            replace(&mut report, SanitizeStatus::Failed, actions::REENCODE_FAILED, e.to_string());
        }
    }

    debug!(path = %path.display(), status = %report.status, "sanitized");
    report
}

fn replace(report: &mut SanitizationReport, status: SanitizeStatus, action: &str, error: String) {
    warn!(path = %report.path.display(), %status, %error, "substituting placeholder");
    match substitute(&report.path) {
        Ok(_) => {
            report.size_after = PLACEHOLDER_SVG.len() as u64;
            report.substituted(status, action, error);
        }
        Err(e) => {
            // An unusable original never stays in the book, placeholder or not.
            let removal = match std::fs::remove_file(&report.path) {
                Err(err) if err.kind() != std::io::ErrorKind::NotFound => {
                    format!("; original kept: {err}")
                }
                _ => String::new(),
            };
            warn!(path = %report.path.display(), error = %e, "placeholder write failed");
            report.size_after = 0;
            report.substituted(
                SanitizeStatus::Failed,
                action,
                format!("{error}; placeholder write failed: {e}{removal}"),
            );
            report.push(actions::PLACEHOLDER_FAILED);
        }
    }
}
