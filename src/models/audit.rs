//! Audit trace models.
//!
//! Every decision the engine makes (row rejected, establishment verified,
//! month classified, semesters counted) is recorded as an [`AuditStep`] so a
//! verdict can be explained after the fact.

use serde::{Deserialize, Serialize};

/// A single step in the audit trace recording a computation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// A warning generated during the computation.
///
/// Warnings flag input that was dropped or downgraded without aborting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level (e.g., "low", "medium", "high").
    pub severity: String,
}

/// The complete audit trace for a computation.
///
/// # Example
///
/// ```
/// use eligibility_engine::models::AuditTrace;
///
/// let mut trace = AuditTrace::default();
/// assert_eq!(trace.next_step_number(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of computation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during the computation.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// The number the next recorded step should carry.
    pub fn next_step_number(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    /// Appends a step.
    pub fn record(&mut self, step: AuditStep) {
        self.steps.push(step);
    }

    /// Appends a warning.
    pub fn warn(
        &mut self,
        code: impl Into<String>,
        message: impl Into<String>,
        severity: impl Into<String>,
    ) {
        self.warnings.push(AuditWarning {
            code: code.into(),
            message: message.into(),
            severity: severity.into(),
        });
    }
}
