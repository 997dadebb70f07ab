//! Turn observability.
//! By default nothing is reported unless a sink is installed via `set_report_sink`.

pub mod keys;
pub mod types;
#[cfg(test)]
pub mod test_capture;

pub use keys::*;
pub use types::*;

use std::sync::Arc;

use once_cell::sync::OnceCell;

/// Implement this to receive one record per finalized turn.
///
/// Requirements:
/// - Implementations must be thread-safe (`Send + Sync`) and `'static`.
/// - `record` **may** be called from any thread; implementations should avoid panicking.
/// - Keep overhead minimal; the driver calls this right after finalization.
pub trait ReportSink: Send + Sync + 'static {
    fn record(&self, report: TurnReport);
}

static REPORT_SINK: OnceCell<Arc<dyn ReportSink>> = OnceCell::new();

// In tests, gate emission to only the calling test thread to avoid cross-test interference.
#[cfg(test)]
thread_local! {
    static TEST_CAPTURE: std::cell::Cell<bool> = std::cell::Cell::new(false);
}

/// Install a global report sink. Returns `false` if a sink is already installed.
///
/// Notes:
/// - This is a write-once global for the process lifetime (backed by `OnceCell`).
/// - If you need to clear captured data in tests, clear it in your sink implementation.
pub fn set_report_sink(sink: Arc<dyn ReportSink>) -> bool {
    REPORT_SINK.set(sink).is_ok()
}

/// Emit a turn report if a sink is installed. Crate-visible by design.
///
/// In tests, emission is suppressed unless explicitly enabled via `test_set_capture_enabled`.
#[inline]
pub(crate) fn emit(report: TurnReport) {
    #[cfg(test)]
    {
        if !TEST_CAPTURE.with(|c| c.get()) {
            return;
        }
    }
    if let Some(sink) = REPORT_SINK.get() {
        sink.record(report);
    }
}

#[cfg(test)]
/// Test-only helper: enable or disable capture for the current test thread.
///
/// Spawned threads in a test must call this as well if they should emit.
pub fn test_set_capture_enabled(enabled: bool) {
    TEST_CAPTURE.with(|c| c.set(enabled));
}
