//! Core scheduling types: days, subjects, the immutable [`ScheduleSpec`] and
//! the decoded [`ScheduleGrid`].
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker written into every cell of the lunch-break slot.
pub const LUNCH_MARKER: &str = "LUNCH BREAK";
/// Marker written into every cell of the tea-break slot.
pub const TEA_MARKER: &str = "TEA BREAK";

/// Weekly quota window (inclusive) for lab subjects.
pub const LAB_WEEKLY_QUOTA: (i64, i64) = (2, 4);
/// Weekly quota window (inclusive) for lecture subjects.
pub const LECTURE_WEEKLY_QUOTA: (i64, i64) = (3, 5);
/// Maximum number of slots a lab may take on a single day.
pub const LAB_DAILY_CAP: i64 = 2;

/// Teaching days, in timetable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    #[serde(rename = "MON")]
    Mon,
    #[serde(rename = "TUE")]
    Tue,
    #[serde(rename = "WED")]
    Wed,
    #[serde(rename = "THU")]
    Thu,
    #[serde(rename = "FRI")]
    Fri,
    #[serde(rename = "SAT")]
    Sat,
}

impl Day {
    pub const ALL: [Day; 6] = [Day::Mon, Day::Tue, Day::Wed, Day::Thu, Day::Fri, Day::Sat];

    pub fn label(self) -> &'static str {
        match self {
            Day::Mon => "MON",
            Day::Tue => "TUE",
            Day::Wed => "WED",
            Day::Thu => "THU",
            Day::Fri => "FRI",
            Day::Sat => "SAT",
        }
    }

    /// Position of the day in [`Day::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a subject is taught as a lecture or as a lab block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    Lecture,
    Lab,
}

impl SubjectKind {
    /// Infers the kind from a subject name: anything containing "LAB"
    /// (case-insensitive) is a lab. Only used where a config omits the kind.
    pub fn infer_from_name(name: &str) -> Self {
        if name.to_uppercase().contains("LAB") {
            SubjectKind::Lab
        } else {
            SubjectKind::Lecture
        }
    }

    /// Inclusive weekly occurrence window for this kind.
    pub fn weekly_quota(self) -> (i64, i64) {
        match self {
            SubjectKind::Lab => LAB_WEEKLY_QUOTA,
            SubjectKind::Lecture => LECTURE_WEEKLY_QUOTA,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub faculty: String,
    pub kind: SubjectKind,
}

impl Subject {
    pub fn new(name: impl Into<String>, faculty: impl Into<String>, kind: SubjectKind) -> Self {
        Self {
            name: name.into(),
            faculty: faculty.into(),
            kind,
        }
    }

    pub fn is_lab(&self) -> bool {
        self.kind == SubjectKind::Lab
    }
}

/// Validated, immutable input for one generation request.
///
/// Built once by [`ScheduleSpec::from_config`](crate::config) and shared by
/// reference with every attempt. There are no setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSpec {
    pub(crate) timeslots: Vec<String>,
    pub(crate) subjects: Vec<Subject>,
    pub(crate) tea_break: String,
    pub(crate) lunch_break: String,
    pub(crate) num_timetables: usize,
}

impl ScheduleSpec {
    pub fn timeslots(&self) -> &[String] {
        &self.timeslots
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn tea_break(&self) -> &str {
        &self.tea_break
    }

    pub fn lunch_break(&self) -> &str {
        &self.lunch_break
    }

    pub fn num_timetables(&self) -> usize {
        self.num_timetables
    }

    pub fn lab_subjects(&self) -> impl Iterator<Item = (usize, &Subject)> {
        self.subjects.iter().enumerate().filter(|(_, s)| s.is_lab())
    }

    /// True if the slot label is one of the configured break labels.
    pub fn is_break(&self, slot: &str) -> bool {
        slot == self.tea_break || slot == self.lunch_break
    }

    /// Index of the tea-break slot, if its label is in the slot list.
    pub fn tea_break_index(&self) -> Option<usize> {
        self.timeslots.iter().position(|t| *t == self.tea_break)
    }

    /// Index of the lunch-break slot, if its label is in the slot list.
    pub fn lunch_break_index(&self) -> Option<usize> {
        self.timeslots.iter().position(|t| *t == self.lunch_break)
    }

    /// Every slot index whose label is a break label. A label listed twice
    /// yields both positions.
    pub fn break_slot_indices(&self) -> Vec<usize> {
        self.timeslots
            .iter()
            .enumerate()
            .filter(|(_, t)| self.is_break(t))
            .map(|(i, _)| i)
            .collect()
    }

    /// The fixed cell content for a slot, if it is a break slot. Lunch wins
    /// when both labels are the same.
    pub fn break_marker(&self, slot: &str) -> Option<&'static str> {
        if slot == self.lunch_break {
            Some(LUNCH_MARKER)
        } else if slot == self.tea_break {
            Some(TEA_MARKER)
        } else {
            None
        }
    }
}

/// A decoded weekly timetable: for each day, one cell per slot in slot order.
///
/// Serializes as `{"MON": [...], "TUE": [...], ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleGrid {
    days: BTreeMap<Day, Vec<String>>,
}

impl ScheduleGrid {
    pub(crate) fn from_rows(days: BTreeMap<Day, Vec<String>>) -> Self {
        Self { days }
    }

    /// Cells for one day, in slot order.
    pub fn row(&self, day: Day) -> &[String] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rows(&self) -> impl Iterator<Item = (Day, &[String])> {
        self.days.iter().map(|(d, cells)| (*d, cells.as_slice()))
    }

    pub fn cell(&self, day: Day, slot_idx: usize) -> Option<&str> {
        self.days.get(&day)?.get(slot_idx).map(String::as_str)
    }

    /// Number of cells in the whole week holding `subject`.
    pub fn weekly_count(&self, subject: &str) -> usize {
        self.days
            .values()
            .flat_map(|cells| cells.iter())
            .filter(|c| *c == subject)
            .count()
    }

    /// Number of cells on `day` holding `subject`.
    pub fn daily_count(&self, day: Day, subject: &str) -> usize {
        self.row(day).iter().filter(|c| *c == subject).count()
    }

    /// Slot indices of each maximal run of `subject` on `day`, as
    /// `(first, last)` pairs.
    pub fn runs(&self, day: Day, subject: &str) -> Vec<(usize, usize)> {
        let mut runs = Vec::new();
        let mut start = None;
        let row = self.row(day);
        for (i, cell) in row.iter().enumerate() {
            match (cell == subject, start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    runs.push((s, i - 1));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            runs.push((s, row.len() - 1));
        }
        runs
    }

    /// Renders the grid as a plain-text table: one header line with slot
    /// labels, then one line per day.
    pub fn render_text(&self, timeslots: &[String]) -> String {
        let mut widths: Vec<usize> = timeslots.iter().map(|t| t.len()).collect();
        for (_, cells) in self.rows() {
            for (i, cell) in cells.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.len());
                }
            }
        }
        let mut out = String::new();
        out.push_str(&format!("{:<4}", "DAY"));
        for (t, w) in timeslots.iter().zip(widths.iter().copied()) {
            out.push_str(&format!(" | {t:^w$}"));
        }
        out.push('\n');
        for (day, cells) in self.rows() {
            out.push_str(&format!("{:<4}", day.label()));
            for (cell, w) in cells.iter().zip(widths.iter().copied()) {
                out.push_str(&format!(" | {cell:^w$}"));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with_mon(cells: &[&str]) -> ScheduleGrid {
        let mut days = BTreeMap::new();
        for day in Day::ALL {
            days.insert(day, vec![String::new(); cells.len()]);
        }
        days.insert(Day::Mon, cells.iter().map(|c| c.to_string()).collect());
        ScheduleGrid::from_rows(days)
    }

    #[test]
    fn infer_kind_is_case_insensitive() {
        assert_eq!(SubjectKind::infer_from_name("DBMS LAB"), SubjectKind::Lab);
        assert_eq!(SubjectKind::infer_from_name("Physics lab"), SubjectKind::Lab);
        assert_eq!(SubjectKind::infer_from_name("Labour Law"), SubjectKind::Lab);
        assert_eq!(SubjectKind::infer_from_name("DBMS"), SubjectKind::Lecture);
    }

    #[test]
    fn runs_split_on_gaps() {
        let grid = grid_with_mon(&["X", "X", "", "Y", "X"]);
        assert_eq!(grid.runs(Day::Mon, "X"), vec![(0, 1), (4, 4)]);
        assert_eq!(grid.runs(Day::Mon, "Y"), vec![(3, 3)]);
        assert!(grid.runs(Day::Tue, "X").is_empty());
        assert_eq!(grid.daily_count(Day::Mon, "X"), 3);
        assert_eq!(grid.weekly_count("X"), 3);
    }

    #[test]
    fn grid_serializes_by_day_label() {
        let grid = grid_with_mon(&["AI"]);
        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(json["MON"][0], "AI");
        assert_eq!(json["SAT"][0], "");
        let back: ScheduleGrid = serde_json::from_value(json).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn render_text_has_header_and_one_line_per_day() {
        let grid = grid_with_mon(&["AI", "TEA BREAK"]);
        let text = grid.render_text(&["8:00".into(), "9:00".into()]);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("DAY"));
        assert!(lines[1].starts_with("MON") && lines[1].contains("TEA BREAK"));
    }
}
