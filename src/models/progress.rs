//! Computation stages and progress events.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle stage of an eligibility computation.
///
/// Stages advance strictly in declaration order; `Failed` is reachable from
/// any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComputationStage {
    /// Accepted, nothing done yet.
    Pending,
    /// Verifying the distinct establishments referenced by the rows.
    ValidatingEstablishments,
    /// Converting raw rows into canonical rows.
    NormalizingRows,
    /// Building the month-by-month coverage timeline.
    BuildingCoverage,
    /// Classifying months and counting semesters.
    Classifying,
    /// Report produced.
    Done,
    /// Aborted by an unrecoverable error.
    Failed,
}

impl ComputationStage {
    /// Returns true for `Done` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ComputationStage::Done | ComputationStage::Failed)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: ComputationStage) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            ComputationStage::Failed => true,
            _ => self.successor() == Some(next),
        }
    }

    fn successor(&self) -> Option<ComputationStage> {
        match self {
            ComputationStage::Pending => Some(ComputationStage::ValidatingEstablishments),
            ComputationStage::ValidatingEstablishments => Some(ComputationStage::NormalizingRows),
            ComputationStage::NormalizingRows => Some(ComputationStage::BuildingCoverage),
            ComputationStage::BuildingCoverage => Some(ComputationStage::Classifying),
            ComputationStage::Classifying => Some(ComputationStage::Done),
            ComputationStage::Done | ComputationStage::Failed => None,
        }
    }
}

impl fmt::Display for ComputationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ComputationStage::Pending => "pending",
            ComputationStage::ValidatingEstablishments => "validating establishments",
            ComputationStage::NormalizingRows => "normalizing rows",
            ComputationStage::BuildingCoverage => "building coverage",
            ComputationStage::Classifying => "classifying",
            ComputationStage::Done => "done",
            ComputationStage::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// A discrete progress checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// The stage the computation is in.
    pub stage: ComputationStage,
    /// Completion of the stage, 0 to 100.
    pub percent: u8,
    /// Human-readable description.
    pub message: String,
}

impl ProgressEvent {
    /// Creates an event, clamping `percent` to 100.
    pub fn new(stage: ComputationStage, percent: u8, message: impl Into<String>) -> Self {
        Self {
            stage,
            percent: percent.min(100),
            message: message.into(),
        }
    }
}
