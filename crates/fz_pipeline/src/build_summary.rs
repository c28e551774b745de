//! BUILD_SUMMARY stage: typed, canonical-JSON-ready record of one selection run.
//!
//! Contract:
//! - No timestamps and no absolute paths, so identical runs give identical bytes.
//! - `sections` lists every category in report order, empty ones included.
//! - `selection_sha256` = SHA-256 of the canonical `[{category, rows}]` list,
//!   rows being the 0-based data-row indices in section order.

use fz_algo::{Allocation, Strata};
use fz_core::{Category, RowId};
use fz_io::hasher::sha256_canonical;
use serde::{Deserialize, Serialize};

use crate::allocate::StrataCounts;
use crate::{EngineMeta, PipelineCtx, PipelineError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSummary {
    pub engine: EngineMeta,
    pub input: InputEcho,
    pub params: ParamsEcho,
    pub counts: StrataCounts,
    /// `N − M`, unclamped.
    pub remaining_needed: i64,
    pub must_include_exceeds_target: bool,
    pub initial_quotas: QuotaEcho,
    pub completion: CompletionEcho,
    pub mssa_fallback: bool,
    pub mssa_need_actual: u32,
    pub trimmed: u32,
    pub sections: Vec<SectionSummary>,
    pub selected: u32,
    pub shortfall: u32,
    pub selection_sha256: String,
}

impl SelectionSummary {
    pub fn section(&self, c: Category) -> Option<&SectionSummary> {
        self.sections.iter().find(|s| s.category == c)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEcho {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    pub rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamsEcho {
    pub target_total: u32,
    pub seed: u64,
    pub ssti_pct: u8,
    pub blood_pct: u8,
    pub mssa_pct: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaEcho {
    pub neg_ssti: u32,
    pub neg_blood: u32,
    pub mssa: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEcho {
    /// "none" | "blood_absorbed_ssti" | "ssti_absorbed_blood"
    pub event: String,
    pub deficit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationEcho {
    pub needed: u32,
    pub found: u32,
    pub added: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSummary {
    pub category: Category,
    pub title: String,
    pub count: u32,
    /// Adjustable categories only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<AnnotationEcho>,
    pub rows: Vec<RowId>,
}

#[derive(Serialize)]
struct DigestEntry<'a> {
    category: Category,
    rows: &'a [RowId],
}

pub fn build_summary(
    ctx: &PipelineCtx,
    strata: &Strata<'_>,
    alloc: &Allocation<'_>,
    input_rows: usize,
) -> Result<SelectionSummary, PipelineError> {
    let p = &ctx.params;

    let sections: Vec<SectionSummary> = Category::REPORT_ORDER
        .iter()
        .map(|&c| {
            let rows: Vec<RowId> = alloc.section(c).iter().map(|r| r.row()).collect();
            SectionSummary {
                category: c,
                title: c.title().to_string(),
                count: u32::try_from(rows.len()).unwrap_or(u32::MAX),
                annotation: alloc
                    .plan
                    .get(c)
                    .map(|q| AnnotationEcho { needed: q.needed, found: q.found, added: q.added }),
                rows,
            }
        })
        .collect();

    let digest: Vec<DigestEntry<'_>> =
        sections.iter().map(|s| DigestEntry { category: s.category, rows: &s.rows }).collect();
    let selection_sha256 = sha256_canonical(&digest).map_err(|e| PipelineError::Build(e.to_string()))?;

    Ok(SelectionSummary {
        engine: ctx.engine_meta.clone(),
        input: InputEcho {
            file_name: ctx.input.file_name.clone(),
            sheet: ctx.input.sheet.clone(),
            sha256: ctx.input.sha256.clone(),
            rows: input_rows,
        },
        params: ParamsEcho {
            target_total: p.target_total,
            seed: p.seed,
            ssti_pct: p.ssti_pct.as_u8(),
            blood_pct: p.blood_pct.as_u8(),
            mssa_pct: p.mssa_pct.as_u8(),
        },
        counts: StrataCounts::of(strata),
        remaining_needed: alloc.remaining_needed,
        must_include_exceeds_target: alloc.must_include_exceeds_target(),
        initial_quotas: QuotaEcho {
            neg_ssti: alloc.quotas.neg_ssti,
            neg_blood: alloc.quotas.neg_blood,
            mssa: alloc.quotas.mssa,
        },
        completion: CompletionEcho {
            event: alloc.completion.as_str().to_string(),
            deficit: alloc.completion.deficit(),
        },
        mssa_fallback: alloc.mssa_fallback(),
        mssa_need_actual: alloc.mssa_need_actual,
        trimmed: alloc.trimmed,
        selected: u32::try_from(alloc.selected_len()).unwrap_or(u32::MAX),
        shortfall: alloc.shortfall(),
        sections,
        selection_sha256,
    })
}
