//! Model building and constraint logic for the timetable solver.

mod model_context;
mod model_labs;
mod model_quotas;
mod model_slots;
mod solve_attempt;

pub use model_context::{
    AssignmentVars, ConstraintGroups, ModelBuilderContext, ModelStats, TimetableModel, build_model,
    build_model_pipeline,
};
pub use solve_attempt::*;
