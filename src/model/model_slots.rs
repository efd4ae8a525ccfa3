//! Per-cell constraints: one subject per cell, nothing in break slots.
use cp_sat::builder::LinearExpr;

use super::model_context::ModelBuilderContext;
use crate::schedule::Day;

/// At most one subject per (day, slot).
pub fn add_exclusivity_constraints(ctx: &mut ModelBuilderContext<'_>) {
    let num_slots = ctx.spec.timeslots().len();
    for day in Day::ALL {
        for slot in 0..num_slots {
            ctx.model.add_le(ctx.vars.cell_sum(day, slot), LinearExpr::from(1));
            ctx.stats.exclusivity += 1;
        }
    }
}

/// Forces every subject off each slot carrying the lunch or tea label,
/// including repeated positions. A break label that is not one of the
/// configured timeslots adds nothing.
pub fn add_break_constraints(ctx: &mut ModelBuilderContext<'_>) {
    let break_slots = ctx.spec.break_slot_indices();
    let model = &mut ctx.model;
    let vars = &ctx.vars;
    for day in Day::ALL {
        for &slot in &break_slots {
            for var in vars.cell(day, slot) {
                model.add_eq(var.clone(), LinearExpr::from(0));
                ctx.stats.breaks += 1;
            }
        }
    }
}
