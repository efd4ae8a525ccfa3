//! Multi-attempt timetable generation.
//!
//! The default policy is "N+5 independent re-solves, accept duplicates":
//! every attempt builds a fresh model and solves it with a fresh seed, every
//! grid that comes back is kept, and the loop stops at N grids or when the
//! attempt budget runs out. Rejecting repeated grids is a separate, opt-in
//! [`DuplicatePolicy`].
use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use crate::config::{DEFAULT_EXTRA_ATTEMPTS, SolverSettings};
use crate::model::{AttemptOutcome, SolveError, SolveOptions, build_model, solve_model};
use crate::schedule::{ScheduleGrid, ScheduleSpec};

/// What to do with a grid equal to one already collected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    #[default]
    Accept,
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationPolicy {
    /// Attempts allowed beyond the target count.
    pub extra_attempts: usize,
    pub duplicates: DuplicatePolicy,
    pub solve: SolveOptions,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            extra_attempts: DEFAULT_EXTRA_ATTEMPTS,
            duplicates: DuplicatePolicy::Accept,
            solve: SolveOptions::default(),
        }
    }
}

impl From<&SolverSettings> for GenerationPolicy {
    fn from(settings: &SolverSettings) -> Self {
        Self {
            extra_attempts: settings.extra_attempts,
            duplicates: if settings.reject_duplicates {
                DuplicatePolicy::Reject
            } else {
                DuplicatePolicy::Accept
            },
            solve: SolveOptions::from(settings),
        }
    }
}

impl GenerationPolicy {
    pub fn attempt_budget(&self, target: usize) -> usize {
        target + self.extra_attempts
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The target count was reached.
    Target,
    /// Every allowed attempt was used first.
    BudgetExhausted,
}

/// Outcome of a generation run. A shortfall is reported here, not as an error.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub timetables: Vec<ScheduleGrid>,
    pub attempts: usize,
    pub unsolved: usize,
    pub duplicates_rejected: usize,
    pub stop_reason: StopReason,
}

impl GenerationReport {
    pub fn shortfall(&self, target: usize) -> usize {
        target.saturating_sub(self.timetables.len())
    }
}

/// Drives repeated build-and-solve attempts for one spec.
pub struct MultiSolutionGenerator<'a> {
    spec: &'a ScheduleSpec,
    policy: GenerationPolicy,
}

impl<'a> MultiSolutionGenerator<'a> {
    pub fn new(spec: &'a ScheduleSpec, policy: GenerationPolicy) -> Self {
        Self { spec, policy }
    }

    /// Runs with seeds from the thread RNG.
    pub fn generate(&self) -> Result<GenerationReport, SolveError> {
        self.run(&mut rand::rng())
    }

    /// Runs with seeds derived from `master_seed`, so the seed sequence is
    /// reproducible.
    pub fn generate_with_seed(&self, master_seed: u64) -> Result<GenerationReport, SolveError> {
        self.run(&mut ChaCha8Rng::seed_from_u64(master_seed))
    }

    fn run<R: Rng>(&self, rng: &mut R) -> Result<GenerationReport, SolveError> {
        let target = self.spec.num_timetables();
        let budget = self.policy.attempt_budget(target);
        let mut timetables = Vec::with_capacity(target);
        let mut seen = HashSet::new();
        let mut attempts = 0;
        let mut unsolved = 0;
        let mut duplicates_rejected = 0;

        info!(
            event = "generate_start",
            target,
            budget,
            subjects = self.spec.subjects().len(),
            timeslots = self.spec.timeslots().len(),
        );

        while attempts < budget && timetables.len() < target {
            attempts += 1;
            let seed = rng.random_range(1..=10_000);
            let built = build_model(self.spec);
            match solve_model(built, self.spec, &self.policy.solve, seed)? {
                AttemptOutcome::Solved(grid) => {
                    let reject = self.policy.duplicates == DuplicatePolicy::Reject;
                    if reject && !seen.insert(grid.clone()) {
                        duplicates_rejected += 1;
                        debug!(event = "duplicate_rejected", attempt = attempts, seed);
                        continue;
                    }
                    debug!(event = "attempt_solved", attempt = attempts, seed);
                    timetables.push(grid);
                }
                AttemptOutcome::NoSolution(status) => {
                    unsolved += 1;
                    debug!(event = "attempt_unsolved", attempt = attempts, seed, status = ?status);
                }
            }
        }

        let stop_reason = if timetables.len() >= target {
            StopReason::Target
        } else {
            StopReason::BudgetExhausted
        };
        if stop_reason == StopReason::BudgetExhausted {
            warn!(
                event = "generate_shortfall",
                collected = timetables.len(),
                target,
                attempts,
            );
        }
        info!(
            event = "generate_end",
            collected = timetables.len(),
            attempts,
            unsolved,
            duplicates_rejected,
        );

        Ok(GenerationReport {
            timetables,
            attempts,
            unsolved,
            duplicates_rejected,
            stop_reason,
        })
    }
}

/// Generates up to `spec.num_timetables()` grids with the default policy.
pub fn generate_timetables(spec: &ScheduleSpec) -> Result<Vec<ScheduleGrid>, SolveError> {
    MultiSolutionGenerator::new(spec, GenerationPolicy::default())
        .generate()
        .map(|report| report.timetables)
}
