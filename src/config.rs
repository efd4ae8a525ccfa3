//! Request configuration: loading, defaults and validation into a
//! [`ScheduleSpec`].
//!
//! ```
//! use timetable_core::config::TimetableConfig;
//!
//! let config = TimetableConfig::from_json_str(r#"{ "num_timetables": 2 }"#).unwrap();
//! let spec = config.into_spec().unwrap();
//! assert_eq!(spec.num_timetables(), 2);
//! assert_eq!(spec.timeslots().len(), 11);
//! ```
use std::path::Path;
use std::time::Duration;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schedule::{ScheduleSpec, Subject, SubjectKind};

/// Smallest accepted target count. This is the only place a minimum is
/// enforced.
pub const MIN_TIMETABLES: usize = 1;

pub const DEFAULT_TEA_BREAK: &str = "10:45-11:15";
pub const DEFAULT_LUNCH_BREAK: &str = "1:05-2:00";
pub const DEFAULT_NUM_TIMETABLES: usize = 5;
pub const DEFAULT_TIME_LIMIT_SECS: f64 = 15.0;
pub const DEFAULT_EXTRA_ATTEMPTS: usize = 5;

lazy_static! {
    pub static ref DEFAULT_TIMESLOTS: Vec<String> = [
        "8:00-8:55",
        "8:55-9:50",
        "9:50-10:45",
        DEFAULT_TEA_BREAK,
        "11:15-12:10",
        "12:10-1:05",
        DEFAULT_LUNCH_BREAK,
        "2:00-2:55",
        "2:55-3:50",
        "3:50-4:45",
        "4:45-5:40",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    pub static ref DEFAULT_SUBJECTS: IndexMap<String, SubjectEntry> = [
        ("COA", "Ms. Suman M"),
        ("DBMS", "Ms. Sangeetha S"),
        ("SDM", "Dr. Chandra Shekar"),
        ("FDS", "Mr. Pramoda R"),
        ("AI", "Mr. Suresh Babu P"),
        ("AI LAB", "Mr. Suresh Babu P"),
        ("DBMS LAB", "Ms. Sangeetha S"),
        ("DS LAB", "Ms. Suman M"),
        ("DAE LAB", "Mr. Pramoda R"),
    ]
    .iter()
    .map(|(name, faculty)| (name.to_string(), SubjectEntry::Faculty(faculty.to_string())))
    .collect();
}

/// Reasons a config cannot be loaded or turned into a [`ScheduleSpec`].
///
/// A target of zero timetables is an error here ([`ConfigError::TooFewTimetables`])
/// rather than a request that succeeds with an empty list.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("no subjects configured")]
    NoSubjects,

    #[error("no timeslots configured")]
    NoTimeslots,

    #[error("subject at position {0} has a blank name")]
    BlankSubjectName(usize),

    /// `num_timetables` below [`MIN_TIMETABLES`], including zero.
    #[error("num_timetables must be at least {}, got {}", MIN_TIMETABLES, .0)]
    TooFewTimetables(usize),

    #[error("time_limit_secs must be positive, got {0}")]
    InvalidTimeLimit(f64),
}

/// A subject entry: either just the faculty name (kind inferred from the
/// subject name) or a table with an explicit kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubjectEntry {
    Faculty(String),
    Detailed {
        faculty: String,
        #[serde(default)]
        kind: Option<SubjectKind>,
    },
}

impl SubjectEntry {
    fn into_subject(self, name: String) -> Subject {
        let (faculty, kind) = match self {
            SubjectEntry::Faculty(faculty) => (faculty, None),
            SubjectEntry::Detailed { faculty, kind } => (faculty, kind),
        };
        let kind = kind.unwrap_or_else(|| SubjectKind::infer_from_name(&name));
        Subject::new(name, faculty, kind)
    }
}

/// Solver and generation knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub time_limit_secs: f64,
    pub search_workers: i32,
    pub extra_attempts: usize,
    pub reject_duplicates: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            search_workers: 1,
            extra_attempts: DEFAULT_EXTRA_ATTEMPTS,
            reject_duplicates: false,
        }
    }
}

impl SolverSettings {
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs_f64(self.time_limit_secs)
    }
}

/// Raw request configuration, as received from a file or a request body.
/// Every field is optional and falls back to the defaults above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimetableConfig {
    pub timeslots: Vec<String>,
    pub subjects: IndexMap<String, SubjectEntry>,
    pub tea_break: String,
    pub lunch_break: String,
    pub num_timetables: usize,
    pub solver: SolverSettings,
}

impl Default for TimetableConfig {
    fn default() -> Self {
        Self {
            timeslots: DEFAULT_TIMESLOTS.clone(),
            subjects: DEFAULT_SUBJECTS.clone(),
            tea_break: DEFAULT_TEA_BREAK.to_string(),
            lunch_break: DEFAULT_LUNCH_BREAK.to_string(),
            num_timetables: DEFAULT_NUM_TIMETABLES,
            solver: SolverSettings::default(),
        }
    }
}

impl TimetableConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads a config file, choosing the parser by extension (`.toml`,
    /// anything else is read as JSON).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            _ => Self::from_json_str(&contents),
        }
    }

    pub fn with_num_timetables(mut self, n: usize) -> Self {
        self.num_timetables = n;
        self
    }

    /// Checks the configuration without consuming it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subjects.is_empty() {
            return Err(ConfigError::NoSubjects);
        }
        if self.timeslots.is_empty() {
            return Err(ConfigError::NoTimeslots);
        }
        if let Some(pos) = self.subjects.keys().position(|n| n.trim().is_empty()) {
            return Err(ConfigError::BlankSubjectName(pos));
        }
        if self.num_timetables < MIN_TIMETABLES {
            return Err(ConfigError::TooFewTimetables(self.num_timetables));
        }
        if !(self.solver.time_limit_secs.is_finite() && self.solver.time_limit_secs > 0.0) {
            return Err(ConfigError::InvalidTimeLimit(self.solver.time_limit_secs));
        }
        Ok(())
    }

    /// Validates and freezes the scheduling part of the config. Break labels
    /// missing from `timeslots` are accepted as-is.
    pub fn into_spec(self) -> Result<ScheduleSpec, ConfigError> {
        self.validate()?;
        let subjects = self
            .subjects
            .into_iter()
            .map(|(name, entry)| entry.into_subject(name))
            .collect();
        Ok(ScheduleSpec {
            timeslots: self.timeslots,
            subjects,
            tea_break: self.tea_break,
            lunch_break: self.lunch_break,
            num_timetables: self.num_timetables,
        })
    }
}

impl ScheduleSpec {
    /// Validates `config` and builds the immutable spec from it.
    pub fn from_config(config: &TimetableConfig) -> Result<Self, ConfigError> {
        config.clone().into_spec()
    }
}
