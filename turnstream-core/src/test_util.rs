//! Shared helpers for crate tests: recording collaborators and a
//! process-wide report capture.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use once_cell::sync::Lazy;

use crate::error::{CoreResult, TurnStreamError};
use crate::model::{MessageUpdate, TurnTarget};
use crate::sink::MessageSink;
use crate::speech::SpeechSynthesizer;
use crate::telemetry::{self, ReportSink, TurnReport};

/// Sink that records every update applied, in arrival order.
#[derive(Default)]
pub struct RecordingSink {
    updates: Mutex<Vec<(MessageUpdate, bool)>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn updates(&self) -> Vec<(MessageUpdate, bool)> {
        self.updates.lock().unwrap().clone()
    }

    /// Cumulative text values in publish order.
    pub fn texts(&self) -> Vec<String> {
        self.updates()
            .into_iter()
            .filter_map(|(u, _)| u.text)
            .collect()
    }

    pub fn origin_labels(&self) -> Vec<String> {
        self.updates()
            .into_iter()
            .filter_map(|(u, _)| u.origin_label)
            .collect()
    }

    pub fn finalize_count(&self) -> usize {
        self.updates()
            .iter()
            .filter(|(u, _)| u.in_progress == Some(false))
            .count()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn apply(&self, _target: &TurnTarget, update: MessageUpdate, touch: bool) {
        self.updates.lock().unwrap().push((update, touch));
    }
}

/// Synthesizer that records what it was asked to say.
pub struct RecordingSpeech {
    spoken: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingSpeech {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            spoken: Mutex::new(Vec::new()),
            fail: false,
        })
    }

    /// A synthesizer whose every call fails after recording.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            spoken: Mutex::new(Vec::new()),
            fail: true,
        })
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSpeech {
    async fn speak(&self, text: &str) -> CoreResult<()> {
        self.spoken.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(TurnStreamError::Other(anyhow::anyhow!(
                "speech backend down"
            )));
        }
        Ok(())
    }
}

static CAPTURED_REPORTS: Lazy<Mutex<Vec<TurnReport>>> = Lazy::new(|| Mutex::new(Vec::new()));

struct VecReportSink;

impl ReportSink for VecReportSink {
    fn record(&self, report: TurnReport) {
        CAPTURED_REPORTS.lock().unwrap().push(report);
    }
}

/// Install the process-wide report capture and enable emission for the
/// current test thread. The store is shared across tests; filter with
/// `reports_for` rather than asserting on the whole vector.
pub fn install_report_capture() {
    let _ = telemetry::set_report_sink(Arc::new(VecReportSink));
    telemetry::test_set_capture_enabled(true);
}

pub fn reports_for(conversation_id: &str) -> Vec<TurnReport> {
    CAPTURED_REPORTS
        .lock()
        .unwrap()
        .iter()
        .filter(|r| r.conversation_id.as_deref() == Some(conversation_id))
        .cloned()
        .collect()
}

/// Poll `cond` until it returns true or `max` elapses.
pub async fn wait_until<F: Fn() -> bool>(cond: F, max: Duration) -> bool {
    let start = Instant::now();
    while start.elapsed() < max {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cond()
}
