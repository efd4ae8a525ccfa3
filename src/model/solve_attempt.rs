//! One solve attempt: CP-SAT parameters, status mapping and decoding the
//! assignment back into a grid.
use std::collections::BTreeMap;
use std::time::Duration;

use cp_sat::proto::{CpSolverStatus, SatParameters};
use thiserror::Error;
use tracing::{debug, info};

use super::model_context::{
    ConstraintGroups, ModelBuilderContext, TimetableModel, build_model_pipeline,
};
use crate::config::{DEFAULT_TIME_LIMIT_SECS, SolverSettings};
use crate::schedule::{Day, ScheduleGrid, ScheduleSpec};

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("solver rejected the model as invalid")]
    ModelInvalid,
}

/// Parameters for a single solve call.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOptions {
    /// Wall-clock budget per attempt.
    pub time_limit: Duration,
    /// CP-SAT search workers per attempt.
    pub search_workers: i32,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs_f64(DEFAULT_TIME_LIMIT_SECS),
            search_workers: 1,
        }
    }
}

impl From<&SolverSettings> for SolveOptions {
    fn from(settings: &SolverSettings) -> Self {
        Self {
            time_limit: settings.time_limit(),
            search_workers: settings.search_workers,
        }
    }
}

impl SolveOptions {
    fn sat_parameters(&self, seed: i32) -> SatParameters {
        let mut params = SatParameters::default();
        params.max_time_in_seconds = Some(self.time_limit.as_secs_f64());
        params.num_search_workers = Some(self.search_workers);
        params.randomize_search = Some(true);
        params.random_seed = Some(seed);
        params.log_search_progress = Some(false);
        params
    }
}

/// Result of one attempt. `NoSolution` is an ordinary outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Solved(ScheduleGrid),
    /// Infeasible, or the time budget ran out first.
    NoSolution(CpSolverStatus),
}

impl AttemptOutcome {
    pub fn into_grid(self) -> Option<ScheduleGrid> {
        match self {
            AttemptOutcome::Solved(grid) => Some(grid),
            AttemptOutcome::NoSolution(_) => None,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, AttemptOutcome::Solved(_))
    }
}

/// Solves a built model once with `seed` and decodes the result.
pub fn solve_model(
    built: TimetableModel,
    spec: &ScheduleSpec,
    options: &SolveOptions,
    seed: i32,
) -> Result<AttemptOutcome, SolveError> {
    let TimetableModel { model, vars, .. } = built;
    let response = model.solve_with_parameters(&options.sat_parameters(seed));
    let status = response.status();
    debug!(event = "solve_returned", seed, status = ?status);

    match status {
        CpSolverStatus::Optimal | CpSolverStatus::Feasible => {
            let grid = decode_grid(spec, |day, slot, subject| {
                vars.get(day, slot, subject).solution_value(&response)
            });
            Ok(AttemptOutcome::Solved(grid))
        }
        CpSolverStatus::Infeasible | CpSolverStatus::Unknown => {
            Ok(AttemptOutcome::NoSolution(status))
        }
        CpSolverStatus::ModelInvalid => Err(SolveError::ModelInvalid),
    }
}

/// Turns an assignment into a grid. Break slots get their marker regardless
/// of the assignment; other cells get the name of the subject that is on, or
/// stay empty.
pub fn decode_grid<F>(spec: &ScheduleSpec, is_assigned: F) -> ScheduleGrid
where
    F: Fn(Day, usize, usize) -> bool,
{
    let mut rows = BTreeMap::new();
    for day in Day::ALL {
        let cells = spec
            .timeslots()
            .iter()
            .enumerate()
            .map(|(slot_idx, slot)| match spec.break_marker(slot) {
                Some(marker) => marker.to_string(),
                None => spec
                    .subjects()
                    .iter()
                    .enumerate()
                    .find(|(subject_idx, _)| is_assigned(day, slot_idx, *subject_idx))
                    .map(|(_, subject)| subject.name.clone())
                    .unwrap_or_default(),
            })
            .collect();
        rows.insert(day, cells);
    }
    ScheduleGrid::from_rows(rows)
}

/// One row of the infeasibility diagnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticResult {
    pub groups: ConstraintGroups,
    pub status: CpSolverStatus,
}

/// Re-solves `spec` with each rule group switched off in turn, then with
/// everything on. A group whose removal turns the status feasible is the
/// likely cause of infeasibility.
pub fn diagnose_infeasibility(
    spec: &ScheduleSpec,
    options: &SolveOptions,
    seed: i32,
) -> Vec<DiagnosticResult> {
    let all = ConstraintGroups::ALL;
    let variants = [
        ConstraintGroups { exclusivity: false, ..all },
        ConstraintGroups { quotas: false, ..all },
        ConstraintGroups { labs: false, ..all },
        ConstraintGroups { breaks: false, ..all },
        all,
    ];
    let params = options.sat_parameters(seed);
    variants
        .into_iter()
        .map(|groups| {
            let built = build_model_pipeline(ModelBuilderContext::new_with_groups(spec, groups));
            let status = built.model.solve_with_parameters(&params).status();
            info!(
                event = "diagnostic",
                exclusivity = groups.exclusivity,
                quotas = groups.quotas,
                labs = groups.labs,
                breaks = groups.breaks,
                status = ?status,
            );
            DiagnosticResult { groups, status }
        })
        .collect()
}
