//! Progress sinks.

use std::sync::Mutex;

use tracing::{info, warn};

use crate::models::{ComputationStage, ProgressEvent};

use super::ProgressSink;

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn emit(&self, _event: &ProgressEvent) {}
}

/// Logs each event through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingProgress {
    correlation_id: Option<String>,
}

impl TracingProgress {
    /// Creates a sink tagging every log line with the given correlation id.
    pub fn with_correlation_id(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(correlation_id.into()),
        }
    }
}

impl ProgressSink for TracingProgress {
    fn emit(&self, event: &ProgressEvent) {
        let correlation_id = self.correlation_id.as_deref().unwrap_or("-");
        if event.stage == ComputationStage::Failed {
            warn!(
                correlation_id = %correlation_id,
                stage = %event.stage,
                percent = event.percent,
                "{}",
                event.message
            );
        } else {
            info!(
                correlation_id = %correlation_id,
                stage = %event.stage,
                percent = event.percent,
                "{}",
                event.message
            );
        }
    }
}

/// Collects events in memory, in emission order.
#[derive(Debug, Default)]
pub struct ProgressLog {
    events: Mutex<Vec<ProgressEvent>>,
}

impl ProgressLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the collected events.
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Returns the stage sequence, with consecutive repeats collapsed.
    pub fn stages(&self) -> Vec<ComputationStage> {
        let mut stages: Vec<ComputationStage> =
            self.events().into_iter().map(|event| event.stage).collect();
        stages.dedup();
        stages
    }
}

impl ProgressSink for ProgressLog {
    fn emit(&self, event: &ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}
