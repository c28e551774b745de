//! Flat sheet layout: every row of the output sheet with its role.
//!
//! Per section: Title (annotation attached), Header, Data rows, Blank.
//! Column widths are min(longest text + 5, 50), measured in characters over
//! title, header and data cells; columns with no text get no explicit width.

use fz_core::Category;

use crate::model::{Annotation, ReportModel};

/// Width cap for any column.
pub const MAX_COLUMN_WIDTH: u16 = 50;
/// Padding added to the longest text in a column.
pub const COLUMN_PADDING: u16 = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowRole {
    Title { category: Category, annotation: Option<Annotation> },
    Header,
    Data { overflow: bool },
    Blank,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutRow {
    pub role: RowRole,
    pub cells: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetLayout {
    pub width: usize,
    pub rows: Vec<LayoutRow>,
    pub column_widths: Vec<Option<u16>>,
}

impl SheetLayout {
    /// 0-based sheet row of each section title, in order.
    pub fn title_rows(&self) -> impl Iterator<Item = (usize, &LayoutRow)> {
        self.rows.iter().enumerate().filter(|(_, r)| matches!(r.role, RowRole::Title { .. }))
    }
}

pub fn layout(model: &ReportModel) -> SheetLayout {
    let width = model.columns.len();
    let mut rows = Vec::with_capacity(model.record_count() + 3 * model.sections.len());

    for s in &model.sections {
        let mut title = vec![String::new(); width];
        if let Some(first) = title.first_mut() {
            *first = s.title().to_string();
        }
        rows.push(LayoutRow {
            role: RowRole::Title { category: s.category, annotation: s.annotation },
            cells: title,
        });
        rows.push(LayoutRow { role: RowRole::Header, cells: model.columns.clone() });
        for r in &s.rows {
            rows.push(LayoutRow { role: RowRole::Data { overflow: r.overflow }, cells: r.cells.clone() });
        }
        rows.push(LayoutRow { role: RowRole::Blank, cells: vec![String::new(); width] });
    }

    let column_widths = column_widths(width, &rows);
    SheetLayout { width, rows, column_widths }
}

fn column_widths(width: usize, rows: &[LayoutRow]) -> Vec<Option<u16>> {
    let mut longest: Vec<Option<usize>> = vec![None; width];
    for row in rows {
        for (c, cell) in row.cells.iter().enumerate().take(width) {
            if cell.is_empty() {
                continue;
            }
            let n = cell.chars().count();
            longest[c] = Some(longest[c].map_or(n, |m| m.max(n)));
        }
    }
    longest
        .into_iter()
        .map(|l| {
            l.map(|n| {
                let n = u16::try_from(n).unwrap_or(u16::MAX);
                n.saturating_add(COLUMN_PADDING).min(MAX_COLUMN_WIDTH)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReportRow, ReportSection};
    use fz_core::RowId;

    fn model() -> ReportModel {
        ReportModel {
            columns: vec!["Id".into(), "Specimen".into(), "Note".into()],
            target_total: 3,
            sections: vec![
                ReportSection {
                    category: Category::Mssa,
                    annotation: Some(Annotation { needed: 1, found: 1, added: 1, target_total: 3 }),
                    rows: vec![
                        ReportRow { row: RowId(4), cells: vec!["4".into(), "Wound".into(), "".into()], overflow: false },
                        ReportRow { row: RowId(7), cells: vec!["7".into(), "Skin".into(), "".into()], overflow: true },
                    ],
                },
                ReportSection {
                    category: Category::MrsaPvlPosBlood,
                    annotation: None,
                    rows: vec![ReportRow {
                        row: RowId(1),
                        cells: vec!["1".into(), "Blood".into(), "".into()],
                        overflow: false,
                    }],
                },
            ],
        }
    }

    #[test]
    fn rows_and_roles() {
        let l = layout(&model());
        let roles: Vec<&RowRole> = l.rows.iter().map(|r| &r.role).collect();
        assert_eq!(l.rows.len(), 4 + 3);
        assert!(matches!(roles[0], RowRole::Title { category: Category::Mssa, annotation: Some(_) }));
        assert_eq!(roles[1], &RowRole::Header);
        assert_eq!(roles[2], &RowRole::Data { overflow: false });
        assert_eq!(roles[3], &RowRole::Data { overflow: true });
        assert_eq!(roles[4], &RowRole::Blank);
        assert!(matches!(roles[5], RowRole::Title { category: Category::MrsaPvlPosBlood, annotation: None }));
        assert_eq!(l.rows[0].cells, vec!["MSSA", "", ""]);
        assert_eq!(l.title_rows().map(|(i, _)| i).collect::<Vec<_>>(), vec![0, 4]);
    }

    #[test]
    fn widths_are_padded_and_capped() {
        let mut m = model();
        m.sections[0].rows[0].cells[1] = "x".repeat(80);
        let l = layout(&m);
        // "MRSA PVL POSITIVE BLOOD" is 23 chars → 28
        assert_eq!(l.column_widths[0], Some(28));
        assert_eq!(l.column_widths[1], Some(50));
        // only the header text "Note" → 4 + 5
        assert_eq!(l.column_widths[2], Some(9));
    }
}
