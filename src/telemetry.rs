//! Failure reporting for resource client calls.

use std::sync::{Mutex, PoisonError};

use tracing::error;

/// Message used when a caller reports a failure without one.
pub const DEFAULT_ERROR_MESSAGE: &str = "Request failed.";

/// Metadata attached to a failure report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportContext {
    /// `METHOD path` of the request that failed.
    pub request: String,
    /// HTTP status, when the server answered.
    pub status: Option<u16>,
    /// Rendered error.
    pub error: String,
}

/// Sink for failure reports.
///
/// Reporting is fire-and-forget: implementations must not panic and never
/// influence the error returned to the caller.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, message: &str, context: &ReportContext);
}

/// Reports failures as `tracing` error events.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, message: &str, context: &ReportContext) {
        error!(
            request = %context.request,
            status = context.status,
            error = %context.error,
            "{message}"
        );
    }
}

/// One recorded failure report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub message: String,
    pub context: ReportContext,
}

/// Keeps every report in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<Report>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the reports recorded so far.
    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, message: &str, context: &ReportContext) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Report {
                message: message.to_owned(),
                context: context.clone(),
            });
    }
}

/// Sends `message` (or [`DEFAULT_ERROR_MESSAGE`] when empty) to `reporter`.
pub fn capture(reporter: &dyn ErrorReporter, message: &str, context: &ReportContext) {
    let message = if message.is_empty() {
        DEFAULT_ERROR_MESSAGE
    } else {
        message
    };
    reporter.report(message, context);
}
