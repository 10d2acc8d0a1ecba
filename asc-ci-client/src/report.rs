//! Console formatting shared by the command-line tools.

use crate::{
    ci::CiBuildRun,
    resources::{CompletionStatus, ExecutionProgress},
};

// Xcode Cloud compute hours included per month, in minutes
pub const MONTHLY_QUOTA_MINUTES: f64 = 1500.0;

pub fn progress_label(progress: Option<ExecutionProgress>) -> &'static str {
    match progress {
        Some(ExecutionProgress::Pending) => "pending",
        Some(ExecutionProgress::Running) => "running",
        Some(ExecutionProgress::Complete) => "complete",
        Some(ExecutionProgress::Other) => "unknown",
        None => "N/A",
    }
}

pub fn completion_label(status: Option<CompletionStatus>) -> &'static str {
    match status {
        Some(CompletionStatus::Succeeded) => "succeeded",
        Some(CompletionStatus::Failed) => "failed",
        Some(CompletionStatus::Errored) => "errored",
        Some(CompletionStatus::Canceled) => "canceled",
        Some(CompletionStatus::Skipped) => "skipped",
        Some(CompletionStatus::Other) => "unknown",
        None => "in progress",
    }
}

/// `2024-03-01T10:00:00.000Z` -> `2024-03-01 10:00:00`
pub fn short_timestamp(value: Option<&str>) -> String {
    match value {
        Some(value) => value.chars().take(19).collect::<String>().replace('T', " "),
        None => "N/A".to_string(),
    }
}

pub fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or("N/A")
}

//
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub other: usize,
    pub total_minutes: f64,
}

impl UsageSummary {
    pub fn from_runs(runs: &[CiBuildRun]) -> Self {
        let mut summary = Self::default();
        for run in runs {
            let attrs = run.attrs();
            summary.total_minutes += attrs.duration_minutes().unwrap_or(0.0);
            match attrs.completion_status {
                Some(CompletionStatus::Succeeded) => summary.succeeded += 1,
                Some(CompletionStatus::Failed) | Some(CompletionStatus::Errored) => {
                    summary.failed += 1
                }
                _ => summary.other += 1,
            }
        }
        summary
    }

    pub fn remaining_minutes(&self) -> f64 {
        MONTHLY_QUOTA_MINUTES - self.total_minutes
    }
}

/// True once the newest run has stopped executing.
pub fn latest_run_complete(runs: &[CiBuildRun]) -> bool {
    runs.first()
        .and_then(|run| run.attributes.as_ref())
        .and_then(|attrs| attrs.execution_progress)
        == Some(ExecutionProgress::Complete)
}
