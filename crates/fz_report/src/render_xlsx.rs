//! XLSX renderer: one worksheet, styled from the layout roles.
//!
//! - Title rows bold; annotations in the three cells right of the title
//!   (needed green, found yellow, added orange).
//! - Header rows filled light steel blue.
//! - Overflow data rows filled orange across the sheet width.
//! - Blank rows stay empty.

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::layout::{RowRole, SheetLayout};
use crate::ReportError;

pub const SHEET_NAME: &str = "Sheet1";

pub const HEADER_FILL: &str = "#B0C4DE";
pub const NEEDED_FILL: &str = "#90EE90";
pub const FOUND_FILL: &str = "#FFFF00";
pub const ADDED_FILL: &str = "#FFB732";
pub const OVERFLOW_FILL: &str = "#FFB732";

/// Cell styles the renderer applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Style {
    Title,
    Header,
    Overflow,
    Needed,
    Found,
    Added,
}

/// Annotation cells right of the title, left to right.
const ANNOTATION_STYLES: [Style; 3] = [Style::Needed, Style::Found, Style::Added];

impl Style {
    const ALL: [Style; 6] = [Style::Title, Style::Header, Style::Overflow, Style::Needed, Style::Found, Style::Added];

    fn fill(self) -> Option<&'static str> {
        match self {
            Style::Title => None,
            Style::Header => Some(HEADER_FILL),
            Style::Overflow => Some(OVERFLOW_FILL),
            Style::Needed => Some(NEEDED_FILL),
            Style::Found => Some(FOUND_FILL),
            Style::Added => Some(ADDED_FILL),
        }
    }

    fn bold(self) -> bool {
        matches!(self, Style::Title | Style::Needed | Style::Found | Style::Added)
    }

    fn format(self) -> Format {
        let mut f = Format::new();
        if self.bold() {
            f = f.set_bold();
        }
        if let Some(color) = self.fill() {
            f = f.set_background_color(color);
        }
        f
    }
}

/// Row-wide style for a layout role. Plain data and blank rows carry none.
fn row_style(role: &RowRole) -> Option<Style> {
    match role {
        RowRole::Title { .. } => Some(Style::Title),
        RowRole::Header => Some(Style::Header),
        RowRole::Data { overflow: true } => Some(Style::Overflow),
        RowRole::Data { overflow: false } | RowRole::Blank => None,
    }
}

struct Styles {
    formats: [Format; 6],
}

impl Styles {
    fn new() -> Self {
        Self { formats: Style::ALL.map(Style::format) }
    }

    fn get(&self, s: Style) -> &Format {
        &self.formats[s as usize]
    }
}

/// Render the layout to workbook bytes.
pub fn render_xlsx(layout: &SheetLayout) -> Result<Vec<u8>, ReportError> {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name(SHEET_NAME)?;
    let st = Styles::new();

    for (i, row) in layout.rows.iter().enumerate() {
        let r = u32::try_from(i).map_err(|_| ReportError::Limit("rows"))?;
        let fmt = row_style(&row.role).map(|s| st.get(s));
        match &row.role {
            RowRole::Blank => {}
            RowRole::Title { annotation, .. } => {
                write_row(ws, r, &row.cells, fmt)?;
                if let Some(a) = annotation {
                    let texts = [a.needed_text(), a.found_text(), a.added_text()];
                    for (c, (text, style)) in (1u16..).zip(texts.iter().zip(ANNOTATION_STYLES)) {
                        ws.write_string_with_format(r, c, text, st.get(style))?;
                    }
                }
            }
            RowRole::Header | RowRole::Data { .. } => write_row(ws, r, &row.cells, fmt)?,
        }
    }

    for (c, w) in layout.column_widths.iter().enumerate() {
        if let Some(w) = w {
            let c = u16::try_from(c).map_err(|_| ReportError::Limit("columns"))?;
            ws.set_column_width(c, *w)?;
        }
    }

    Ok(wb.save_to_buffer()?)
}

/// Text cells are written as-is; empty cells only carry the row format.
fn write_row(ws: &mut Worksheet, r: u32, cells: &[String], fmt: Option<&Format>) -> Result<(), ReportError> {
    for (c, cell) in cells.iter().enumerate() {
        let c = u16::try_from(c).map_err(|_| ReportError::Limit("columns"))?;
        match (cell.is_empty(), fmt) {
            (false, Some(f)) => {
                ws.write_string_with_format(r, c, cell, f)?;
            }
            (false, None) => {
                ws.write_string(r, c, cell)?;
            }
            (true, Some(f)) => {
                ws.write_blank(r, c, f)?;
            }
            (true, None) => {}
        }
    }
    Ok(())
}
