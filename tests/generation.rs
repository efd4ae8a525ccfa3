use std::collections::HashSet;

use cp_sat::proto::CpSolverStatus;
use timetable_core::model::{build_model, diagnose_infeasibility, solve_model};
use timetable_core::schedule::{LUNCH_MARKER, TEA_MARKER};
use timetable_core::{
    AttemptOutcome, Day, DuplicatePolicy, GenerationPolicy, MultiSolutionGenerator, ScheduleGrid,
    ScheduleSpec, SolveOptions, StopReason, TimetableConfig,
};

fn spec_from_json(json: &str) -> ScheduleSpec {
    TimetableConfig::from_json_str(json)
        .unwrap()
        .into_spec()
        .unwrap()
}

fn quick_policy() -> GenerationPolicy {
    GenerationPolicy {
        solve: SolveOptions {
            time_limit: std::time::Duration::from_secs(5),
            search_workers: 1,
        },
        ..GenerationPolicy::default()
    }
}

/// Checks every grid-level invariant. Returns the number of lab runs that
/// are a single slot, so callers can observe the lone-lab edge case.
fn check_grid(grid: &ScheduleGrid, spec: &ScheduleSpec) -> usize {
    let slots = spec.timeslots();
    let names: HashSet<&str> = spec.subjects().iter().map(|s| s.name.as_str()).collect();
    let has_tea = slots.iter().any(|t| t == spec.tea_break());
    let has_lunch = slots.iter().any(|t| t == spec.lunch_break());
    let mut lone_runs = 0;

    for day in Day::ALL {
        let row = grid.row(day);
        assert_eq!(row.len(), slots.len(), "{day} row length");
        for (cell, label) in row.iter().zip(slots) {
            if *label == spec.lunch_break() {
                assert_eq!(cell, LUNCH_MARKER);
            } else if *label == spec.tea_break() {
                assert_eq!(cell, TEA_MARKER);
            } else {
                assert!(
                    cell.is_empty() || names.contains(cell.as_str()),
                    "unexpected cell {cell:?}"
                );
            }
        }
        if !has_tea {
            assert!(row.iter().all(|c| c != TEA_MARKER));
        }
        if !has_lunch {
            assert!(row.iter().all(|c| c != LUNCH_MARKER));
        }
    }

    for subject in spec.subjects() {
        let (min, max) = subject.kind.weekly_quota();
        let total = grid.weekly_count(&subject.name) as i64;
        assert!(
            (min..=max).contains(&total),
            "{} appears {total} times",
            subject.name
        );
        if !subject.is_lab() {
            continue;
        }
        for day in Day::ALL {
            assert!(grid.daily_count(day, &subject.name) <= 2);
            for (first, last) in grid.runs(day, &subject.name) {
                // a run always ends right before a break or at the end of the day
                let ends_open = last + 1 == slots.len() || spec.is_break(&slots[last + 1]);
                assert!(ends_open, "{} run {first}..={last} on {day}", subject.name);
                if first == last {
                    lone_runs += 1;
                }
            }
        }
    }
    lone_runs
}

#[test]
fn default_config_produces_valid_grids() {
    let spec = TimetableConfig::default().into_spec().unwrap();
    let report = MultiSolutionGenerator::new(&spec, quick_policy())
        .generate()
        .unwrap();

    assert!(report.timetables.len() <= 5);
    assert!(report.attempts <= 10);
    let mut lone_runs = 0;
    for grid in &report.timetables {
        lone_runs += check_grid(grid, &spec);
    }
    // Lone lab slots before a break are allowed; just surface how many showed up.
    eprintln!("lone lab runs across {} grids: {lone_runs}", report.timetables.len());
}

#[test]
fn stops_as_soon_as_target_is_reached() {
    let spec = spec_from_json(r#"{ "num_timetables": 2 }"#);
    let report = MultiSolutionGenerator::new(&spec, quick_policy())
        .generate_with_seed(42)
        .unwrap();
    assert_eq!(report.timetables.len(), 2);
    assert_eq!(report.stop_reason, StopReason::Target);
    assert_eq!(report.attempts, 2 + report.unsolved);
}

#[test]
fn no_lab_subjects_only_exclusivity_and_quota_bind() {
    let spec = spec_from_json(
        r#"{
            "subjects": {
                "COA": "Ms. Suman M",
                "DBMS": "Ms. Sangeetha S",
                "AI": "Mr. Suresh Babu P"
            },
            "num_timetables": 2
        }"#,
    );
    assert_eq!(spec.lab_subjects().count(), 0);
    let report = MultiSolutionGenerator::new(&spec, quick_policy())
        .generate()
        .unwrap();
    assert!(!report.timetables.is_empty());
    for grid in &report.timetables {
        check_grid(grid, &spec);
    }
}

#[test]
fn tea_break_missing_from_timeslots_is_ignored() {
    let spec = spec_from_json(r#"{ "tea_break": "99:99-99:99", "num_timetables": 2 }"#);
    assert_eq!(spec.tea_break_index(), None);
    let report = MultiSolutionGenerator::new(&spec, quick_policy())
        .generate()
        .unwrap();
    for grid in &report.timetables {
        check_grid(grid, &spec);
        for (_, row) in grid.rows() {
            assert!(row.iter().all(|c| c != TEA_MARKER));
        }
    }
}

// One teaching slot per day cannot hold three lectures of at least three
// sessions each.
const INFEASIBLE: &str = r#"{
    "timeslots": ["9:00-10:00"],
    "subjects": { "A": "x", "B": "y", "C": "z" },
    "num_timetables": 5
}"#;

#[test]
fn infeasible_config_yields_empty_list_not_error() {
    let spec = spec_from_json(INFEASIBLE);
    let report = MultiSolutionGenerator::new(&spec, quick_policy())
        .generate()
        .unwrap();
    assert!(report.timetables.is_empty());
    assert_eq!(report.attempts, 10);
    assert_eq!(report.unsolved, 10);
    assert_eq!(report.stop_reason, StopReason::BudgetExhausted);
    assert_eq!(report.shortfall(5), 5);
}

#[test]
fn single_attempt_reports_no_solution() {
    let spec = spec_from_json(INFEASIBLE);
    let outcome = solve_model(build_model(&spec), &spec, &SolveOptions::default(), 17).unwrap();
    assert_eq!(outcome, AttemptOutcome::NoSolution(CpSolverStatus::Infeasible));
    assert!(!outcome.is_solved());
    assert!(outcome.into_grid().is_none());
}

#[test]
fn diagnostic_points_at_quotas() {
    let spec = spec_from_json(INFEASIBLE);
    let rows = diagnose_infeasibility(&spec, &SolveOptions::default(), 3);
    assert_eq!(rows.len(), 5);
    let quotas_off = rows.iter().find(|r| !r.groups.quotas).unwrap();
    assert!(matches!(
        quotas_off.status,
        CpSolverStatus::Optimal | CpSolverStatus::Feasible
    ));
    assert_eq!(rows.last().unwrap().status, CpSolverStatus::Infeasible);
}

#[test]
fn lone_lab_slot_before_break_is_feasible() {
    // The only teaching slot of the day sits right before the tea break, so
    // every lab occurrence is a single isolated slot.
    let spec = spec_from_json(
        r#"{
            "timeslots": ["9:00-10:00", "10:00-10:15"],
            "tea_break": "10:00-10:15",
            "subjects": { "PHYSICS LAB": "Dr. P" },
            "num_timetables": 1
        }"#,
    );
    let report = MultiSolutionGenerator::new(&spec, quick_policy())
        .generate()
        .unwrap();
    assert_eq!(report.timetables.len(), 1);
    let grid = &report.timetables[0];
    let lone = check_grid(grid, &spec);
    assert!((2..=4).contains(&lone));
    for day in Day::ALL {
        for (first, last) in grid.runs(day, "PHYSICS LAB") {
            assert_eq!((first, last), (0, 0));
        }
    }
}

#[test]
fn explicit_kind_overrides_name() {
    // "Collaboration Lab" is declared a lecture, so it needs at least three
    // sessions and has no daily cap.
    let spec = spec_from_json(
        r#"{
            "timeslots": ["a", "b"],
            "subjects": { "Collaboration Lab": { "faculty": "Ms. C", "kind": "lecture" } },
            "num_timetables": 1
        }"#,
    );
    assert_eq!(spec.lab_subjects().count(), 0);
    let report = MultiSolutionGenerator::new(&spec, quick_policy())
        .generate()
        .unwrap();
    assert_eq!(report.timetables.len(), 1);
    check_grid(&report.timetables[0], &spec);
}

#[test]
fn reject_policy_keeps_grids_distinct() {
    let spec = spec_from_json(
        r#"{
            "timeslots": ["a"],
            "subjects": { "M": "x", "N": "y" },
            "num_timetables": 3
        }"#,
    );
    let policy = GenerationPolicy {
        duplicates: DuplicatePolicy::Reject,
        extra_attempts: 20,
        ..quick_policy()
    };
    let report = MultiSolutionGenerator::new(&spec, policy)
        .generate()
        .unwrap();
    let distinct: HashSet<_> = report.timetables.iter().collect();
    assert_eq!(distinct.len(), report.timetables.len());
    assert_eq!(
        report.timetables.len() + report.unsolved + report.duplicates_rejected,
        report.attempts
    );
    for grid in &report.timetables {
        check_grid(grid, &spec);
    }
}

#[test]
fn repeated_break_label_blocks_every_position() {
    // Both "tea" columns are breaks, leaving one teaching slot per day: six
    // cells cannot hold three lectures of at least three sessions each.
    let spec = spec_from_json(
        r#"{
            "timeslots": ["a", "tea", "tea"],
            "tea_break": "tea",
            "subjects": { "A": "x", "B": "y", "C": "z" },
            "num_timetables": 1
        }"#,
    );
    let report = MultiSolutionGenerator::new(&spec, quick_policy())
        .generate()
        .unwrap();
    assert!(report.timetables.is_empty());
    assert_eq!(report.unsolved, report.attempts);
}

#[test]
fn repeated_break_label_keeps_visible_quotas() {
    let spec = spec_from_json(
        r#"{
            "timeslots": ["a", "tea", "b", "tea"],
            "tea_break": "tea",
            "subjects": { "A": "x", "B": "y" },
            "num_timetables": 2
        }"#,
    );
    let report = MultiSolutionGenerator::new(&spec, quick_policy())
        .generate()
        .unwrap();
    assert!(!report.timetables.is_empty());
    for grid in &report.timetables {
        check_grid(grid, &spec);
        for (_, row) in grid.rows() {
            assert_eq!(row[1], TEA_MARKER);
            assert_eq!(row[3], TEA_MARKER);
        }
    }
}
