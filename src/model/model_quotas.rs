//! Weekly session quotas.
use cp_sat::builder::LinearExpr;

use super::model_context::ModelBuilderContext;

/// Each subject's weekly total must fall in the window for its kind.
pub fn add_quota_constraints(ctx: &mut ModelBuilderContext<'_>) {
    let model = &mut ctx.model;
    let vars = &ctx.vars;
    for (idx, subject) in ctx.spec.subjects().iter().enumerate() {
        let (min, max) = subject.kind.weekly_quota();
        let total = vars.week_sum(idx);
        model.add_ge(total.clone(), LinearExpr::from(min));
        model.add_le(total, LinearExpr::from(max));
        ctx.stats.quotas += 2;
    }
}
