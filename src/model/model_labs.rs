//! Lab block constraints: daily cap and the contiguity chain.
//!
//! The chain only links `t` to `t + 1` when `t + 1` is a teaching slot, so a
//! lab run must end right before a break or at the last slot of the day. A
//! lone lab slot in that position satisfies every constraint here; the daily
//! cap keeps it to at most two slots. This is kept as-is.
use cp_sat::builder::LinearExpr;

use super::model_context::ModelBuilderContext;
use crate::schedule::{Day, LAB_DAILY_CAP};

/// Adds the daily cap and contiguity implications for every lab subject.
pub fn add_lab_constraints(ctx: &mut ModelBuilderContext<'_>) {
    let spec = ctx.spec;
    let model = &mut ctx.model;
    let vars = &ctx.vars;
    let timeslots = spec.timeslots();

    for day in Day::ALL {
        for (lab, _) in spec.lab_subjects() {
            model.add_le(vars.day_sum(day, lab), LinearExpr::from(LAB_DAILY_CAP));
            ctx.stats.lab_caps += 1;

            for (i, next) in timeslots.iter().enumerate().skip(1) {
                if spec.is_break(next) {
                    continue;
                }
                // x[t] => x[t+1], and equally !x[t+1] => !x[t]
                model.add_le(
                    vars.get(day, i - 1, lab).clone(),
                    vars.get(day, i, lab).clone(),
                );
                ctx.stats.contiguity += 1;
            }
        }
    }
}
