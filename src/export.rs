//! Writes generated timetables to `.xlsx` workbooks, one file per grid.
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};
use thiserror::Error;
use tracing::info;

use crate::schedule::{Day, ScheduleGrid, ScheduleSpec};

const HEADER_COLOR: u32 = 0x2C3E50;
const DAY_COLOR: u32 = 0xECF0F1;
const TEA_COLOR: u32 = 0xE6F3FF;
const LUNCH_COLOR: u32 = 0xD6EAF8;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),
}

/// File name of the `index`-th timetable (1-based).
pub fn timetable_file_name(index: usize) -> String {
    format!("timetable_{index}.xlsx")
}

/// Writes every grid to `<out_dir>/<session_id>/timetable_<n>.xlsx` and
/// returns the written paths in order.
pub fn export_timetables(
    grids: &[ScheduleGrid],
    spec: &ScheduleSpec,
    out_dir: impl AsRef<Path>,
    session_id: &str,
) -> Result<Vec<PathBuf>, ExportError> {
    let session_dir = out_dir.as_ref().join(session_id);
    std::fs::create_dir_all(&session_dir)?;
    let mut written = Vec::with_capacity(grids.len());
    for (i, grid) in grids.iter().enumerate() {
        let path = session_dir.join(timetable_file_name(i + 1));
        write_workbook(grid, spec, &path)?;
        written.push(path);
    }
    info!(event = "export_done", session = session_id, files = written.len());
    Ok(written)
}

/// Writes a single grid: a header row of slot labels, one row per day, and
/// the subject/faculty list below the table.
pub fn write_workbook(
    grid: &ScheduleGrid,
    spec: &ScheduleSpec,
    path: &Path,
) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Timetable")?;

    let base = Format::new()
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);
    let header = base
        .clone()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_COLOR));
    let day_label = base.clone().set_bold().set_background_color(Color::RGB(DAY_COLOR));
    let tea = base.clone().set_bold().set_background_color(Color::RGB(TEA_COLOR));
    let lunch = base.clone().set_bold().set_background_color(Color::RGB(LUNCH_COLOR));

    sheet.write_string_with_format(0, 0, "DAY", &header)?;
    sheet.set_column_width(0, 8)?;
    for (slot, label) in spec.timeslots().iter().enumerate() {
        let col = slot as u16 + 1;
        sheet.write_string_with_format(0, col, label, &header)?;
        sheet.set_column_width(col, 14)?;
    }

    for (r, day) in Day::ALL.iter().enumerate() {
        let row = r as u32 + 1;
        sheet.write_string_with_format(row, 0, day.label(), &day_label)?;
        for (slot, (cell, label)) in grid.row(*day).iter().zip(spec.timeslots()).enumerate() {
            let format = if *label == spec.lunch_break() {
                &lunch
            } else if *label == spec.tea_break() {
                &tea
            } else {
                &base
            };
            sheet.write_string_with_format(row, slot as u16 + 1, cell, format)?;
        }
    }

    let bold = Format::new().set_bold();
    let mut row = Day::ALL.len() as u32 + 2;
    sheet.write_string_with_format(row, 0, "FACULTY & SUBJECTS", &bold)?;
    for subject in spec.subjects() {
        row += 1;
        sheet.write_string(row, 0, format!("{} - {}", subject.name, subject.faculty))?;
    }

    workbook.save(path)?;
    Ok(())
}
