//! Report model: titled sections of selected records with quota annotations.
//!
//! Contract:
//! - Sections follow `Category::REPORT_ORDER`; empty sections are omitted.
//! - Row cells = input cells + "Specimen Final" + "Results".
//! - Adjustable sections carry an `Annotation` (needed/found/added, target N).
//! - Rows past a section's pre-completion quota are flagged `overflow`.
//! - Built once through `ReportBuilder::finish`; the model is not mutated after.

use std::collections::BTreeSet;

use fz_algo::Allocation;
use fz_core::{Category, ClassifiedRecord, RowId};

use crate::{ReportError, RESULTS_COLUMN, SPECIMEN_FINAL_COLUMN};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub needed: u32,
    pub found: u32,
    pub added: u32,
    /// Overall target `N` (the "to reach" figure).
    pub target_total: u32,
}

impl Annotation {
    pub fn needed_text(&self) -> String {
        format!("Needed {}", self.needed)
    }
    pub fn found_text(&self) -> String {
        format!("Found {}", self.found)
    }
    pub fn added_text(&self) -> String {
        format!("Added {} to reach {}", self.added, self.target_total)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportRow {
    pub row: RowId,
    pub cells: Vec<String>,
    /// Added by completion (beyond the pre-completion quota).
    pub overflow: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportSection {
    pub category: Category,
    pub annotation: Option<Annotation>,
    pub rows: Vec<ReportRow>,
}

impl ReportSection {
    #[inline]
    pub fn title(&self) -> &'static str {
        self.category.title()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportModel {
    pub columns: Vec<String>,
    pub target_total: u32,
    pub sections: Vec<ReportSection>,
}

impl ReportModel {
    pub fn section(&self, c: Category) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.category == c)
    }

    pub fn record_count(&self) -> usize {
        self.sections.iter().map(|s| s.rows.len()).sum()
    }
}

/// Collects sections in order; rejects a record seen twice.
#[derive(Debug)]
pub struct ReportBuilder {
    columns: Vec<String>,
    target_total: u32,
    sections: Vec<ReportSection>,
    seen: BTreeSet<RowId>,
}

impl ReportBuilder {
    /// `input_columns` are the input headers; derived columns are appended here.
    pub fn new(input_columns: &[String], target_total: u32) -> Self {
        let mut columns = input_columns.to_vec();
        columns.push(SPECIMEN_FINAL_COLUMN.to_string());
        columns.push(RESULTS_COLUMN.to_string());
        Self { columns, target_total, sections: Vec::new(), seen: BTreeSet::new() }
    }

    /// Append one section. `boundary` is the pre-completion quota, if any.
    pub fn push_section(
        &mut self,
        category: Category,
        annotation: Option<Annotation>,
        records: &[ClassifiedRecord<'_>],
        boundary: Option<u32>,
    ) -> Result<&mut Self, ReportError> {
        if records.is_empty() {
            return Ok(self);
        }
        if self.sections.iter().any(|s| s.category == category) {
            return Err(ReportError::Inconsistent("category emitted twice"));
        }
        let limit = boundary.map(|b| b as usize);
        let mut rows = Vec::with_capacity(records.len());
        for (i, r) in records.iter().enumerate() {
            if !self.seen.insert(r.row()) {
                return Err(ReportError::Inconsistent("record selected twice"));
            }
            let mut cells = r.record.cells.clone();
            cells.push(r.specimen_class.as_str().to_string());
            cells.push(r.result_call.as_str().to_string());
            rows.push(ReportRow { row: r.row(), cells, overflow: limit.map_or(false, |q| i >= q) });
        }
        self.sections.push(ReportSection { category, annotation, rows });
        Ok(self)
    }

    pub fn finish(self) -> ReportModel {
        let mut sections = self.sections;
        sections.sort_by_key(|s| Category::REPORT_ORDER.iter().position(|c| *c == s.category));
        ReportModel { columns: self.columns, target_total: self.target_total, sections }
    }
}

/// Build the report model from an allocation.
pub fn assemble(alloc: &Allocation<'_>, input_columns: &[String]) -> Result<ReportModel, ReportError> {
    let mut b = ReportBuilder::new(input_columns, alloc.target_total);
    for c in Category::REPORT_ORDER {
        let annotation = alloc.plan.get(c).map(|q| Annotation {
            needed: q.needed,
            found: q.found,
            added: q.added,
            target_total: alloc.target_total,
        });
        b.push_section(c, annotation, &alloc.section(c), alloc.completion_boundary(c))?;
    }
    Ok(b.finish())
}
