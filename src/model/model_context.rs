//! Shared state for building one timetable model.
use cp_sat::builder::{BoolVar, CpModelBuilder, LinearExpr};
use tracing::debug;

use super::model_labs::add_lab_constraints;
use super::model_quotas::add_quota_constraints;
use super::model_slots::{add_break_constraints, add_exclusivity_constraints};
use crate::schedule::{Day, ScheduleSpec};

/// Which rule groups get encoded. Everything is on for real attempts; the
/// infeasibility diagnostic switches groups off one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintGroups {
    pub exclusivity: bool,
    pub quotas: bool,
    pub labs: bool,
    pub breaks: bool,
}

impl ConstraintGroups {
    pub const ALL: ConstraintGroups = ConstraintGroups {
        exclusivity: true,
        quotas: true,
        labs: true,
        breaks: true,
    };
}

impl Default for ConstraintGroups {
    fn default() -> Self {
        Self::ALL
    }
}

/// Number of constraints added per rule group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelStats {
    pub variables: usize,
    pub exclusivity: usize,
    pub quotas: usize,
    pub lab_caps: usize,
    pub contiguity: usize,
    pub breaks: usize,
}

impl ModelStats {
    pub fn total_constraints(&self) -> usize {
        self.exclusivity + self.quotas + self.lab_caps + self.contiguity + self.breaks
    }
}

/// The per-attempt assignment booleans, indexed `[day][slot][subject]`.
pub struct AssignmentVars {
    vars: Vec<Vec<Vec<BoolVar>>>,
}

impl AssignmentVars {
    fn new(model: &mut CpModelBuilder, num_slots: usize, num_subjects: usize) -> Self {
        let vars = Day::ALL
            .iter()
            .map(|_| {
                (0..num_slots)
                    .map(|_| (0..num_subjects).map(|_| model.new_bool_var()).collect())
                    .collect()
            })
            .collect();
        Self { vars }
    }

    pub fn get(&self, day: Day, slot: usize, subject: usize) -> &BoolVar {
        &self.vars[day.index()][slot][subject]
    }

    /// All subjects in one (day, slot) cell.
    pub fn cell(&self, day: Day, slot: usize) -> &[BoolVar] {
        &self.vars[day.index()][slot]
    }

    pub fn cell_sum(&self, day: Day, slot: usize) -> LinearExpr {
        self.cell(day, slot).iter().map(|v| (1_i64, v.clone())).collect()
    }

    /// Occurrences of `subject` on `day`.
    pub fn day_sum(&self, day: Day, subject: usize) -> LinearExpr {
        self.vars[day.index()]
            .iter()
            .map(|slot| (1_i64, slot[subject].clone()))
            .collect()
    }

    /// Occurrences of `subject` over the whole week.
    pub fn week_sum(&self, subject: usize) -> LinearExpr {
        self.vars
            .iter()
            .flat_map(|day| day.iter().map(move |slot| (1_i64, slot[subject].clone())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.vars
            .iter()
            .map(|day| day.iter().map(Vec::len).sum::<usize>())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Context passed through every constraint module.
pub struct ModelBuilderContext<'a> {
    pub spec: &'a ScheduleSpec,
    pub model: CpModelBuilder,
    pub vars: AssignmentVars,
    pub groups: ConstraintGroups,
    pub stats: ModelStats,
}

impl<'a> ModelBuilderContext<'a> {
    pub fn new(spec: &'a ScheduleSpec) -> Self {
        Self::new_with_groups(spec, ConstraintGroups::ALL)
    }

    pub fn new_with_groups(spec: &'a ScheduleSpec, groups: ConstraintGroups) -> Self {
        let mut model = CpModelBuilder::default();
        let vars = AssignmentVars::new(&mut model, spec.timeslots().len(), spec.subjects().len());
        let stats = ModelStats {
            variables: vars.len(),
            ..ModelStats::default()
        };
        Self {
            spec,
            model,
            vars,
            groups,
            stats,
        }
    }
}

/// A fully constrained model for one attempt, ready to hand to the solver.
pub struct TimetableModel {
    pub model: CpModelBuilder,
    pub vars: AssignmentVars,
    pub stats: ModelStats,
}

/// Runs every enabled constraint module over the context and returns the
/// finished model. Deterministic: no randomness is involved here.
pub fn build_model_pipeline(mut ctx: ModelBuilderContext<'_>) -> TimetableModel {
    if ctx.groups.exclusivity {
        add_exclusivity_constraints(&mut ctx);
    }
    if ctx.groups.quotas {
        add_quota_constraints(&mut ctx);
    }
    if ctx.groups.labs {
        add_lab_constraints(&mut ctx);
    }
    if ctx.groups.breaks {
        add_break_constraints(&mut ctx);
    }
    debug!(
        event = "model_built",
        variables = ctx.stats.variables,
        constraints = ctx.stats.total_constraints(),
        contiguity = ctx.stats.contiguity,
        breaks = ctx.stats.breaks,
    );
    TimetableModel {
        model: ctx.model,
        vars: ctx.vars,
        stats: ctx.stats,
    }
}

/// Builds the full model for `spec`.
pub fn build_model(spec: &ScheduleSpec) -> TimetableModel {
    build_model_pipeline(ModelBuilderContext::new(spec))
}
