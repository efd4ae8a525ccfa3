//! Weekly class timetable generation on top of CP-SAT.
//!
//! A [`TimetableConfig`] is validated once into an immutable
//! [`ScheduleSpec`]. Each attempt encodes it as a fresh boolean model
//! (one variable per day, slot and subject), solves it with a fresh random
//! seed, and decodes the assignment into a [`ScheduleGrid`]. The
//! [`MultiSolutionGenerator`] repeats this until enough grids are collected or
//! the attempt budget runs out.
//!
//! ```no_run
//! use timetable_core::{TimetableConfig, generate_timetables};
//!
//! let spec = TimetableConfig::default().into_spec()?;
//! for grid in generate_timetables(&spec)? {
//!     println!("{}", grid.render_text(spec.timeslots()));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod export;
pub mod generate;
pub mod model;
pub mod schedule;

pub use config::{ConfigError, SolverSettings, SubjectEntry, TimetableConfig};
pub use generate::{
    DuplicatePolicy, GenerationPolicy, GenerationReport, MultiSolutionGenerator, StopReason,
    generate_timetables,
};
pub use model::{AttemptOutcome, SolveError, SolveOptions};
pub use schedule::{Day, ScheduleGrid, ScheduleSpec, Subject, SubjectKind};
