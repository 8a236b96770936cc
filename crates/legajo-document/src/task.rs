// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Background operations — run one synchronous pipeline on Tokio's blocking
// pool, stream its progress, and always finish with a report.
//
// Event order per operation: zero or more `Progress` events with strictly
// increasing percentages, then exactly one `Finished`. Panics inside the work
// closure are caught and reported as failures. No cancellation, no timeout.

use std::any::Any;
use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use chrono::Utc;
use legajo_core::{OperationId, OperationKind, OperationOutcome, OperationReport};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Something observable about a running operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationEvent {
    Progress { id: OperationId, percent: u8 },
    Finished { report: OperationReport },
}

/// Handed to the work closure; forwards progress as events.
///
/// Values are clamped to 100 and only strictly increasing values are sent.
pub struct ProgressReporter {
    id: OperationId,
    sender: UnboundedSender<OperationEvent>,
    last: Cell<u8>,
}

impl ProgressReporter {
    fn new(id: OperationId, sender: UnboundedSender<OperationEvent>) -> Self {
        Self {
            id,
            sender,
            last: Cell::new(0),
        }
    }

    pub fn report(&self, percent: u8) {
        let percent = percent.min(100);
        if percent <= self.last.get() {
            return;
        }
        self.last.set(percent);
        // A dropped receiver only means nobody is watching.
        let _ = self.sender.send(OperationEvent::Progress {
            id: self.id,
            percent,
        });
    }

    /// Highest percentage sent so far.
    pub fn last(&self) -> u8 {
        self.last.get()
    }

    /// Adapter for the pipelines' `&dyn Fn(u8)` callbacks.
    pub fn callback(&self) -> impl Fn(u8) + '_ {
        move |percent| self.report(percent)
    }
}

/// A running operation.
pub struct OperationHandle {
    id: OperationId,
    kind: OperationKind,
    input: PathBuf,
    started_at: chrono::DateTime<Utc>,
    events: UnboundedReceiver<OperationEvent>,
    task: JoinHandle<OperationReport>,
}

impl OperationHandle {
    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Next event, or `None` once `Finished` has been consumed.
    pub async fn next_event(&mut self) -> Option<OperationEvent> {
        self.events.recv().await
    }

    /// Wait for the terminal report. Pending events are discarded.
    pub async fn join(self) -> OperationReport {
        match self.task.await {
            Ok(report) => report,
            Err(err) => {
                // Only reachable if the runtime shuts down underneath us.
                error!(operation = %self.kind, id = %self.id, %err, "operation task lost");
                OperationReport {
                    id: self.id,
                    kind: self.kind,
                    input: self.input,
                    output: None,
                    success: false,
                    message: format!("operation task lost: {err}"),
                    error: None,
                    input_sha256: None,
                    started_at: self.started_at,
                    finished_at: Utc::now(),
                }
            }
        }
    }
}

/// Run `work` on the blocking pool.
///
/// Must be called from within a Tokio runtime. `output` is only used for the
/// start log line; the report takes its output from the outcome.
pub fn spawn_operation<F>(
    kind: OperationKind,
    input: PathBuf,
    output: Option<PathBuf>,
    work: F,
) -> OperationHandle
where
    F: FnOnce(&ProgressReporter) -> OperationOutcome + Send + 'static,
{
    let id = OperationId::new();
    let started_at = Utc::now();
    let (sender, events) = mpsc::unbounded_channel();

    info!(
        operation = %kind,
        %id,
        input = %input.display(),
        output = %display_opt(output.as_deref()),
        "operation started"
    );

    let task_input = input.clone();
    let task = tokio::task::spawn_blocking(move || {
        let input_sha256 = match legajo_security::hash_file(&task_input) {
            Ok(digest) => Some(digest),
            Err(err) => {
                debug!(%err, "input not hashed");
                None
            }
        };

        let reporter = ProgressReporter::new(id, sender.clone());
        let outcome = match catch_unwind(AssertUnwindSafe(|| work(&reporter))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(operation = %kind, %id, panic = %message, "operation panicked");
                OperationOutcome {
                    success: false,
                    message: format!("operation aborted unexpectedly: {message}"),
                    output_path: None,
                    error: None,
                }
            }
        };

        if outcome.success {
            reporter.report(100);
        }
        drop(reporter);

        let report = OperationReport {
            id,
            kind,
            input: task_input,
            output: outcome.output_path,
            success: outcome.success,
            message: outcome.message,
            error: outcome.error,
            input_sha256,
            started_at,
            finished_at: Utc::now(),
        };
        log_report(&report);

        let _ = sender.send(OperationEvent::Finished {
            report: report.clone(),
        });
        report
    });

    OperationHandle {
        id,
        kind,
        input,
        started_at,
        events,
        task,
    }
}

fn log_report(report: &OperationReport) {
    if report.success {
        info!(
            operation = %report.kind,
            id = %report.id,
            input = %report.input.display(),
            output = %display_opt(report.output.as_deref()),
            success = true,
            duration_ms = report.duration_ms(),
            "operation succeeded"
        );
    } else {
        warn!(
            operation = %report.kind,
            id = %report.id,
            input = %report.input.display(),
            success = false,
            error_kind = report.error.map(|kind| kind.as_str()).unwrap_or("panic"),
            duration_ms = report.duration_ms(),
            message = %report.message,
            "operation failed"
        );
    }
}

fn display_opt(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string()).unwrap_or_default()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use legajo_core::error::LegajoError;
    use legajo_core::ErrorKind;

    async fn drain(handle: &mut OperationHandle) -> Vec<OperationEvent> {
        let mut events = Vec::new();
        while let Some(event) = handle.next_event().await {
            events.push(event);
        }
        events
    }

    fn percents(events: &[OperationEvent]) -> Vec<u8> {
        events
            .iter()
            .filter_map(|event| match event {
                OperationEvent::Progress { percent, .. } => Some(*percent),
                OperationEvent::Finished { .. } => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn progress_is_monotonic_and_finished_is_last() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        std::fs::write(&input, b"hello").unwrap();
        let output = dir.path().join("out.pdf");
        let done = output.clone();

        let mut handle = spawn_operation(
            OperationKind::Compress,
            input.clone(),
            Some(output.clone()),
            move |progress| {
                for percent in [5, 5, 3, 50, 120] {
                    progress.report(percent);
                }
                OperationOutcome::succeeded("ok", done)
            },
        );

        let events = drain(&mut handle).await;
        assert_eq!(percents(&events), vec![5, 50, 100]);
        assert!(matches!(events.last(), Some(OperationEvent::Finished { .. })));
        assert_eq!(
            events
                .iter()
                .filter(|event| matches!(event, OperationEvent::Finished { .. }))
                .count(),
            1
        );

        let report = handle.join().await;
        assert!(report.success);
        assert_eq!(report.kind, OperationKind::Compress);
        assert_eq!(report.output.as_deref(), Some(output.as_path()));
        assert_eq!(
            report.input_sha256.as_deref(),
            Some(legajo_security::hash_bytes(b"hello").as_str())
        );
        assert!(report.finished_at >= report.started_at);
    }

    #[tokio::test]
    async fn success_without_progress_still_reaches_100() {
        let mut handle = spawn_operation(
            OperationKind::SecureDelete,
            PathBuf::from("/nonexistent/input"),
            None,
            |_| OperationOutcome::succeeded("done", "/nonexistent/input"),
        );

        let events = drain(&mut handle).await;
        assert_eq!(percents(&events), vec![100]);
        let report = handle.join().await;
        assert!(report.input_sha256.is_none());
    }

    #[tokio::test]
    async fn failure_keeps_error_kind() {
        let mut handle = spawn_operation(
            OperationKind::RemovePages,
            PathBuf::from("in.pdf"),
            Some(PathBuf::from("out.pdf")),
            |progress| {
                progress.report(30);
                OperationOutcome::failed(&LegajoError::EmptyResult { page_count: 2 })
            },
        );

        let events = drain(&mut handle).await;
        assert_eq!(percents(&events), vec![30]);
        match events.last() {
            Some(OperationEvent::Finished { report }) => {
                assert!(!report.success);
                assert_eq!(report.error, Some(ErrorKind::EmptyResult));
                assert!(report.output.is_none());
            }
            other => panic!("expected Finished, got {other:?}"),
        }
        let report = handle.join().await;
        assert!(!report.success);
    }

    #[tokio::test]
    async fn panic_becomes_failure_report() {
        let mut handle = spawn_operation(
            OperationKind::ImageToPdf,
            PathBuf::from("in.png"),
            None,
            |progress| {
                progress.report(40);
                panic!("decoder exploded");
            },
        );

        let events = drain(&mut handle).await;
        assert!(matches!(events.last(), Some(OperationEvent::Finished { .. })));

        let report = handle.join().await;
        assert!(!report.success);
        assert!(report.message.contains("decoder exploded"));
        assert!(report.error.is_none());
    }

    #[tokio::test]
    async fn join_without_reading_events() {
        let handle = spawn_operation(
            OperationKind::ConvertWord,
            PathBuf::from("a.docx"),
            None,
            |progress| {
                let callback = progress.callback();
                callback(10);
                callback(100);
                assert_eq!(progress.last(), 100);
                OperationOutcome::succeeded("converted", "a.pdf")
            },
        );
        let id = handle.id();

        let report = handle.join().await;
        assert_eq!(report.id, id);
        assert!(report.success);
    }
}
