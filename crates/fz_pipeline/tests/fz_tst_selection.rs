//! End-to-end selection runs through `fz_pipeline` on in-memory tables.
//!
//! The main scenario: 100 records, N = 30, five must-include records →
//! remaining 25 → quotas {SSTI 13, Blood 7, MSSA 7}. The Blood pool holds 4,
//! so SSTI absorbs the 3 missing and MSSA fills the rest to 30.
//! Originator mixes are 3:1 and 4:1 so every per-group share rounds exactly.

use std::collections::BTreeSet;

use fz_core::{Category, RowId, SelectionParams};
use fz_io::canonical_json::to_canonical_bytes;
use fz_io::table::RawTable;
use fz_pipeline::{engine_identifiers, run_from_path, run_with_ctx, LoadedInput, PipelineCtx, PipelineOutputs};
use fz_report::RowRole;

// -----------------------------------------------------------------------------
// Fixtures
// -----------------------------------------------------------------------------

const HEADERS: [&str; 6] = ["Id", "Specimen", "Originator", "RT-pvl Result", "RT-mecA Result", "RT-mecC Result"];

struct TableBuilder {
    rows: Vec<Vec<String>>,
}

impl TableBuilder {
    fn new() -> Self {
        Self { rows: Vec::new() }
    }

    fn push(&mut self, n: usize, specimen: &str, mrsa: bool, pvl: &str, originators: &[&str]) -> &mut Self {
        for k in 0..n {
            let id = self.rows.len() + 1;
            let mec_a = if mrsa { "Positive" } else { "Negative" };
            self.rows.push(vec![
                id.to_string(),
                specimen.to_string(),
                originators[k % originators.len()].to_string(),
                pvl.to_string(),
                mec_a.to_string(),
                String::new(),
            ]);
        }
        self
    }

    fn build(&self) -> RawTable {
        RawTable::new(HEADERS.iter().map(|h| h.to_string()).collect(), self.rows.clone())
    }
}

fn scenario_table() -> RawTable {
    let mut t = TableBuilder::new();
    t.push(3, "Wound", true, "Positive", &["LAB-A"])
        .push(2, "Blood", true, "Positive", &["LAB-B"])
        .push(40, "Abscess", true, "Negative", &["LAB-A", "LAB-A", "LAB-A", "LAB-B"])
        .push(4, "Blood", true, "Negative", &["LAB-C"])
        .push(10, "Skin", false, "Positive", &["LAB-A", "LAB-A", "LAB-A", "LAB-A", "LAB-B"])
        .push(20, "Blood", false, "Negative", &["LAB-B"])
        .push(21, "Urine", true, "Positive", &["LAB-D"]);
    t.build()
}

fn run(table: RawTable, target_total: u32) -> PipelineOutputs {
    let params = SelectionParams { target_total, ..SelectionParams::default() };
    run_with_ctx(PipelineCtx { input: LoadedInput::from_table(table), params, engine_meta: engine_identifiers() })
        .expect("pipeline run")
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[test]
fn scenario_ssti_absorbs_blood_and_mssa_fills() {
    let out = run(scenario_table(), 30);
    let s = &out.summary;

    assert_eq!(s.input.rows, 100);
    assert_eq!(s.counts.must_include, 5);
    assert_eq!(s.counts.excluded_other, 21);
    assert_eq!(s.remaining_needed, 25);
    assert_eq!((s.initial_quotas.neg_ssti, s.initial_quotas.neg_blood, s.initial_quotas.mssa), (13, 7, 7));
    assert_eq!(s.completion.event, "ssti_absorbed_blood");
    assert_eq!(s.completion.deficit, 3);
    assert!(s.mssa_fallback);
    assert_eq!(s.mssa_need_actual, 5);
    assert_eq!(s.selected, 30);
    assert_eq!(s.shortfall, 0);

    let ann = |c: Category| {
        let a = s.section(c).and_then(|x| x.annotation).expect("annotation");
        (a.needed, a.found, a.added)
    };
    assert_eq!(ann(Category::MrsaPvlNegSsti), (13, 13, 3));
    assert_eq!(ann(Category::MrsaPvlNegBlood), (7, 4, 0));
    assert_eq!(ann(Category::Mssa), (7, 5, 0));

    // MSSA PVL-positive records are drawn first (rows 49..59 in the table).
    let mssa = &s.section(Category::Mssa).expect("mssa").rows;
    assert!(mssa.iter().all(|r| (49..59).contains(&r.index())), "{mssa:?}");

    // Every must-include row is present; no row twice.
    let all: Vec<RowId> = s.sections.iter().flat_map(|x| x.rows.iter().copied()).collect();
    let unique: BTreeSet<RowId> = all.iter().copied().collect();
    assert_eq!(unique.len(), all.len());
    assert!((0..5).all(|i| unique.contains(&RowId(i))));
}

#[test]
fn scenario_report_layout() {
    let out = run(scenario_table(), 30);

    let order: Vec<Category> = out.report.sections.iter().map(|s| s.category).collect();
    assert_eq!(order, Category::REPORT_ORDER.to_vec());
    assert_eq!(out.report.record_count(), 30);

    let ssti = out.report.section(Category::MrsaPvlNegSsti).expect("ssti");
    let overflow: Vec<bool> = ssti.rows.iter().map(|r| r.overflow).collect();
    assert_eq!(overflow.iter().filter(|o| **o).count(), 3);
    assert!(overflow[13..].iter().all(|o| *o));

    // MSSA drew 5 against a pre-completion quota of 7: nothing beyond it.
    let mssa = out.report.section(Category::Mssa).expect("mssa");
    assert!(mssa.rows.iter().all(|r| !r.overflow));

    // Title, header, data rows and a blank separator per section.
    assert_eq!(out.layout.rows.len(), 30 + 3 * 5);
    assert!(matches!(out.layout.rows[0].role, RowRole::Title { category: Category::Mssa, .. }));
    assert_eq!(out.layout.rows[1].cells.last().map(String::as_str), Some("Results"));
    let first_data = &out.layout.rows[2].cells;
    assert_eq!(&first_data[6..], &["SSTI".to_string(), "MSSA".to_string()]);
}

#[test]
fn rounding_short_pools_drive_completion() {
    // N = 30, five must-include → quotas {13, 7, 7}. Two equal SSTI originators
    // round to 6 + 6 = 12 and Blood holds 4: both short, no completion.
    let mut t = TableBuilder::new();
    t.push(5, "Wound", true, "Positive", &["LAB-A"])
        .push(40, "Abscess", true, "Negative", &["LAB-A", "LAB-B"])
        .push(4, "Blood", true, "Negative", &["LAB-C"])
        .push(20, "Skin", false, "Positive", &["LAB-D"]);
    let s = run(t.build(), 30).summary;

    assert_eq!(s.completion.event, "none");
    let a = s.section(Category::MrsaPvlNegSsti).and_then(|x| x.annotation).expect("ssti");
    assert_eq!((a.needed, a.found, a.added), (13, 12, 0));
    assert_eq!(s.mssa_need_actual, 30 - 5 - 12 - 4);
    assert_eq!(s.selected, 30);
}

#[test]
fn empty_pools_annotate_zero_found() {
    let mut t = TableBuilder::new();
    t.push(5, "Wound", true, "Positive", &["LAB-A"])
        .push(40, "Nose", true, "Negative", &["LAB-A", "LAB-A", "LAB-A", "LAB-B"]);
    let out = run(t.build(), 30);
    let s = &out.summary;

    let a = s.section(Category::MrsaPvlNegBlood).and_then(|x| x.annotation).expect("blood");
    assert_eq!((a.needed, a.found, a.added), (7, 0, 0));
    let a = s.section(Category::MrsaPvlNegSsti).and_then(|x| x.annotation).expect("ssti");
    assert_eq!((a.needed, a.found, a.added), (13, 13, 7));
    let a = s.section(Category::Mssa).and_then(|x| x.annotation).expect("mssa");
    assert_eq!((a.needed, a.found, a.added), (7, 0, 0));

    assert_eq!(s.selected, 25);
    assert_eq!(s.shortfall, 5);
    assert!(out.report.section(Category::Mssa).is_none());
    assert!(out.report.section(Category::MrsaPvlNegBlood).is_none());
}

#[test]
fn must_include_over_target_is_kept_whole() {
    let out = run(scenario_table(), 3);
    let s = &out.summary;
    assert!(s.must_include_exceeds_target);
    assert_eq!(s.remaining_needed, -2);
    assert_eq!(s.selected, 5);
    assert_eq!(s.shortfall, 0);
    assert!(!s.mssa_fallback);
    assert_eq!(out.report.record_count(), 5);
}

#[test]
fn identical_runs_give_identical_summaries() {
    let a = run(scenario_table(), 30);
    let b = run(scenario_table(), 30);
    assert_eq!(a.report, b.report);
    assert_eq!(to_canonical_bytes(&a.summary).unwrap(), to_canonical_bytes(&b.summary).unwrap());
}

#[test]
fn run_from_csv_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("specimens.csv");
    let mut text = HEADERS.join(",");
    text.push('\n');
    for row in &scenario_table().rows {
        text.push_str(&row.join(","));
        text.push('\n');
    }
    std::fs::write(&path, &text).unwrap();

    let out = run_from_path(&path, None, SelectionParams::default()).unwrap();
    assert_eq!(out.summary.input.file_name.as_deref(), Some("specimens.csv"));
    assert_eq!(
        out.summary.input.sha256.as_deref(),
        Some(fz_io::hasher::sha256_hex(text.as_bytes()).as_str())
    );
    assert_eq!(out.summary.selected, 30);
    assert_eq!(out.summary.selection_sha256, run(scenario_table(), 30).summary.selection_sha256);
}
