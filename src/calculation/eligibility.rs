//! Eligibility orchestration.
//!
//! [`EligibilityEngine`] runs a computation end to end:
//!
//! 1. fetch the professional's raw rows from the [`RowSource`]
//! 2. validate every distinct establishment of a row that could contribute
//!    (lookup, then scraper, fail closed)
//! 3. normalize rows, dropping malformed ones with a warning and clipping
//!    end dates past the reference month
//! 4. build the deduplicated coverage timeline
//! 5. count semesters per tier and decide the status
//!
//! Progress is reported through a [`ProgressSink`] at every stage
//! transition, and a `FAILED` event precedes any fatal error.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::collaborators::{EstablishmentLookup, EstablishmentScraper, ProgressSink, RowSource};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, CanonicalMonth, CanonicalRow, ComputationStage, EligibilityReport,
    EmploymentLinkRow, EstablishmentRef, ProfessionalId, ProgressEvent,
};

use super::coverage::build_coverage;
use super::establishment_validation::EstablishmentValidator;
use super::month_interval::parse_month;
use super::role_check::classify_role;
use super::row_normalizer::{NormalizationContext, normalize_row, parse_weekly_hours};
use super::semesters::count_semesters;
use super::tier::classify_hours;

const VALIDATION_START_PERCENT: u8 = 5;
const NORMALIZATION_PERCENT: u8 = 50;
const COVERAGE_PERCENT: u8 = 70;
const CLASSIFICATION_PERCENT: u8 = 85;

/// The collaborators a computation talks to.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    /// Supplies raw employment-link rows.
    pub rows: &'a dyn RowSource,
    /// Persistent establishment verdicts.
    pub lookup: &'a dyn EstablishmentLookup,
    /// Online fallback for unknown establishments.
    pub scraper: &'a dyn EstablishmentScraper,
}

/// Computes certification eligibility for healthcare professionals.
///
/// # Example
///
/// ```
/// use eligibility_engine::calculation::{Collaborators, EligibilityEngine};
/// use eligibility_engine::collaborators::{
///     InMemoryEstablishmentDirectory, InMemoryRowSource, NoopProgress, UnavailableScraper,
/// };
/// use eligibility_engine::config::EngineConfig;
/// use eligibility_engine::models::{CanonicalMonth, EmploymentLinkRow, EstablishmentRef, ProfessionalId};
///
/// let professional = ProfessionalId::parse("52998224725").unwrap();
/// let row = EmploymentLinkRow {
///     establishment_id: "1234567".to_string(),
///     municipality_code: None,
///     establishment_name: None,
///     role: "MEDICO CLINICO".to_string(),
///     weekly_hours: "40".to_string(),
///     start_date: "01/2020".to_string(),
///     end_date: Some("12/2023".to_string()),
/// };
/// let directory = InMemoryEstablishmentDirectory::new()
///     .with_verdict(&EstablishmentRef::from_row(&row), true);
/// let source = InMemoryRowSource::new().with_rows(&professional, vec![row]);
///
/// let config = EngineConfig::default();
/// let engine = EligibilityEngine::new(
///     &config,
///     Collaborators { rows: &source, lookup: &directory, scraper: &UnavailableScraper },
/// )
/// .with_reference_month(CanonicalMonth::new(2024, 6).unwrap());
///
/// let report = engine.compute_eligibility("529.982.247-25", &NoopProgress).unwrap();
/// assert!(report.is_eligible());
/// assert_eq!(report.details.semesters_40, 8);
/// ```
pub struct EligibilityEngine<'a> {
    config: &'a EngineConfig,
    collaborators: Collaborators<'a>,
    reference_month: Option<CanonicalMonth>,
}

impl<'a> EligibilityEngine<'a> {
    /// Creates an engine over a configuration and a set of collaborators.
    pub fn new(config: &'a EngineConfig, collaborators: Collaborators<'a>) -> Self {
        Self {
            config,
            collaborators,
            reference_month: None,
        }
    }

    /// Pins the month open-ended links resolve to. Defaults to the current month.
    pub fn with_reference_month(mut self, reference_month: CanonicalMonth) -> Self {
        self.reference_month = Some(reference_month);
        self
    }

    /// Computes the eligibility report of a professional.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Validation`] for a malformed professional id, no rows,
    ///   or every row rejected
    /// - [`EngineError::DataRetrieval`] when the row source fails
    pub fn compute_eligibility(
        &self,
        professional_id: &str,
        progress: &dyn ProgressSink,
    ) -> EngineResult<EligibilityReport> {
        let mut tracker = StageTracker::start(progress);

        let professional = match ProfessionalId::parse(professional_id) {
            Ok(id) => id,
            Err(error) => return Err(tracker.fail(error)),
        };

        let rows = match self.collaborators.rows.fetch_rows(&professional) {
            Ok(rows) => rows,
            Err(error) => {
                return Err(tracker.fail(EngineError::DataRetrieval {
                    professional_id: professional.to_string(),
                    message: error.to_string(),
                }));
            }
        };

        self.run(&professional, &rows, &mut tracker)
    }

    /// Computes a report from rows the caller already holds.
    ///
    /// Skips the row source; everything else matches
    /// [`compute_eligibility`](Self::compute_eligibility).
    pub fn evaluate_rows(
        &self,
        professional: &ProfessionalId,
        rows: &[EmploymentLinkRow],
        progress: &dyn ProgressSink,
    ) -> EngineResult<EligibilityReport> {
        let mut tracker = StageTracker::start(progress);
        self.run(professional, rows, &mut tracker)
    }

    fn run(
        &self,
        professional: &ProfessionalId,
        rows: &[EmploymentLinkRow],
        tracker: &mut StageTracker<'_>,
    ) -> EngineResult<EligibilityReport> {
        match self.evaluate(professional, rows, tracker) {
            Ok(report) => Ok(report),
            Err(error) => Err(tracker.fail(error)),
        }
    }

    fn evaluate(
        &self,
        professional: &ProfessionalId,
        rows: &[EmploymentLinkRow],
        tracker: &mut StageTracker<'_>,
    ) -> EngineResult<EligibilityReport> {
        let policy = self.config.policy();
        let reference_month = self.reference_month.unwrap_or_else(CanonicalMonth::current);

        info!(
            professional_id = %professional,
            rows = rows.len(),
            reference_month = %reference_month,
            "Starting eligibility computation"
        );

        if rows.is_empty() {
            return Err(EngineError::Validation {
                field: "rows".to_string(),
                message: "no employment links found".to_string(),
            });
        }

        let mut trace = AuditTrace::default();
        let context = NormalizationContext {
            reference_month,
            policy,
            roles: self.config.roles(),
        };

        // Establishments
        let establishments = establishments_to_validate(rows, &context);
        tracker.advance(
            ComputationStage::ValidatingEstablishments,
            VALIDATION_START_PERCENT,
            format!("Validating {} establishments", establishments.len()),
        );

        let mut validator =
            EstablishmentValidator::new(self.collaborators.lookup, self.collaborators.scraper);
        let total = establishments.len();
        for (done, establishment) in establishments.values().enumerate() {
            let valid = validator.validate(establishment, &mut trace);
            let span = usize::from(NORMALIZATION_PERCENT - VALIDATION_START_PERCENT);
            let percent = VALIDATION_START_PERCENT as usize + span * (done + 1) / total;
            tracker.report(
                percent as u8,
                format!(
                    "Establishment {} validated ({} of {}): {}",
                    establishment.id,
                    done + 1,
                    total,
                    if valid { "valid" } else { "invalid" }
                ),
            );
        }

        // Rows
        tracker.advance(
            ComputationStage::NormalizingRows,
            NORMALIZATION_PERCENT,
            format!("Normalizing {} rows", rows.len()),
        );
        let canonical = normalize_all(rows, &validator, &context, &mut trace);
        if canonical.is_empty() {
            return Err(EngineError::Validation {
                field: "rows".to_string(),
                message: format!("all {} rows were rejected", rows.len()),
            });
        }

        // Coverage
        tracker.advance(
            ComputationStage::BuildingCoverage,
            COVERAGE_PERCENT,
            "Building coverage timeline",
        );
        let coverage = build_coverage(&canonical, policy, trace.next_step_number());
        trace.record(coverage.audit_step);

        // Semesters
        tracker.advance(
            ComputationStage::Classifying,
            CLASSIFICATION_PERCENT,
            "Counting semesters",
        );
        let count = count_semesters(&coverage.coverage, policy, trace.next_step_number());
        trace.record(count.audit_step);

        let report = EligibilityReport::new(
            professional.to_string(),
            reference_month,
            count.valid_months,
            policy.required_months,
            count.details,
            coverage.coverage,
            trace,
        );

        info!(
            professional_id = %professional,
            valid_months = report.valid_months,
            pending_months = report.pending_months,
            status = ?report.status,
            "Eligibility computed"
        );
        tracker.advance(
            ComputationStage::Done,
            100,
            format!(
                "{} valid months, {} pending",
                report.valid_months, report.pending_months
            ),
        );

        Ok(report)
    }
}

/// Distinct establishments worth validating, keyed by lookup key.
///
/// Rows whose role is ineligible or whose hours fall below every tier can
/// never contribute coverage, so their establishments are not checked.
fn establishments_to_validate(
    rows: &[EmploymentLinkRow],
    context: &NormalizationContext<'_>,
) -> BTreeMap<String, EstablishmentRef> {
    let mut establishments = BTreeMap::new();

    for (index, raw) in rows.iter().enumerate() {
        let establishment = EstablishmentRef::from_row(raw);
        if establishment.id.is_empty() {
            continue;
        }

        let role_eligible = classify_role(&raw.role, context.roles).is_some();
        let tiered = parse_weekly_hours(&raw.weekly_hours, index, context.policy.max_weekly_hours)
            .map(|hours| classify_hours(hours).is_some())
            .unwrap_or(false);
        if !role_eligible || !tiered {
            debug!(
                row_index = index,
                establishment_id = %establishment.id,
                role_eligible,
                tiered,
                "Row cannot contribute, establishment not validated"
            );
            continue;
        }

        establishments
            .entry(establishment.lookup_key())
            .or_insert(establishment);
    }

    establishments
}

/// Normalizes every row, recording rejections as warnings.
fn normalize_all(
    rows: &[EmploymentLinkRow],
    validator: &EstablishmentValidator<'_>,
    context: &NormalizationContext<'_>,
    trace: &mut AuditTrace,
) -> Vec<CanonicalRow> {
    let mut accepted = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();
    let mut clipped = Vec::new();

    for (index, raw) in rows.iter().enumerate() {
        let establishment_valid = validator
            .verdict(&EstablishmentRef::from_row(raw))
            .map(|verdict| verdict.valid)
            .unwrap_or(false);

        match normalize_row(index, raw, establishment_valid, context) {
            Ok(row) => {
                debug!(
                    row_index = index,
                    role_eligible = row.role_eligible,
                    establishment_valid = row.establishment_valid,
                    "Row normalized"
                );
                let declared_end = raw
                    .end_date
                    .as_deref()
                    .and_then(|end| parse_month(end).ok())
                    .filter(|end| *end > row.interval.end());
                if let Some(end) = declared_end {
                    trace.warn(
                        "INTERVAL_CLIPPED",
                        format!(
                            "Row {} ends {}, after the reference month; counted through {}",
                            index,
                            end,
                            row.interval.end()
                        ),
                        "low",
                    );
                    clipped.push(index);
                }
                accepted.push(row);
            }
            Err(error) => {
                warn!(row_index = index, error = %error, "Row rejected");
                trace.warn(
                    "ROW_REJECTED",
                    format!("Row {} rejected: {}", index, error),
                    "medium",
                );
                rejected.push(index);
            }
        }
    }

    let ineligible_roles: Vec<usize> = accepted
        .iter()
        .filter(|row| !row.role_eligible)
        .map(|row| row.row_index)
        .collect();
    let invalid_establishments: Vec<usize> = accepted
        .iter()
        .filter(|row| !row.establishment_valid)
        .map(|row| row.row_index)
        .collect();

    trace.record(AuditStep {
        step_number: trace.next_step_number(),
        rule_id: "row_normalization".to_string(),
        rule_name: "Row Normalization".to_string(),
        input: serde_json::json!({
            "rows": rows.len(),
            "reference_month": context.reference_month,
        }),
        output: serde_json::json!({
            "accepted": accepted.len(),
            "rejected_rows": rejected,
            "clipped_rows": clipped,
            "ineligible_role_rows": ineligible_roles,
            "invalid_establishment_rows": invalid_establishments,
        }),
        reasoning: format!(
            "{} of {} rows normalized, {} rejected",
            accepted.len(),
            rows.len(),
            rejected.len()
        ),
    });

    accepted
}

/// Tracks the computation stage and forwards progress events.
struct StageTracker<'s> {
    stage: ComputationStage,
    sink: &'s dyn ProgressSink,
}

impl<'s> StageTracker<'s> {
    fn start(sink: &'s dyn ProgressSink) -> Self {
        let tracker = Self {
            stage: ComputationStage::Pending,
            sink,
        };
        tracker.report(0, "Computation queued");
        tracker
    }

    fn advance(&mut self, next: ComputationStage, percent: u8, message: impl Into<String>) {
        debug_assert!(
            self.stage.can_transition_to(next),
            "illegal stage transition {} -> {}",
            self.stage,
            next
        );
        self.stage = next;
        self.report(percent, message);
    }

    fn report(&self, percent: u8, message: impl Into<String>) {
        self.sink
            .emit(&ProgressEvent::new(self.stage, percent, message));
    }

    /// Emits the `FAILED` event and hands the error back.
    fn fail(&mut self, error: EngineError) -> EngineError {
        warn!(stage = %self.stage, code = error.code(), error = %error, "Eligibility computation failed");
        self.stage = ComputationStage::Failed;
        self.report(100, error.to_string());
        error
    }
}
