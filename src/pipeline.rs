//! Fetch-and-parse pipeline with a partial-success join.
//!
//! The transport that turns a sheet name into a grid lives behind
//! [`GridSource`]. One composite sales fetch (fanning out per region tab)
//! and the four evaluation fetches run concurrently; a failed sheet
//! contributes an empty structure and its name is reported so the caller
//! can render a warning instead of losing the whole refresh.

use crate::config::{AppConfig, SalesSheetsConfig};
use crate::evaluation::{self, EmployeeEvaluation, RubricQuestion};
use crate::grid::Grid;
use crate::sales::{self, RankingEntry, RegionView};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use tracing::warn;

/// Which spreadsheet a sheet name belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    Sales,
    Evaluation,
}

/// Transport collaborator: fetches one tab of one spreadsheet as a grid.
/// Timeouts and retries are its business, not ours.
pub trait GridSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch_grid(
        &self,
        document: Document,
        sheet: &str,
    ) -> impl Future<Output = Result<Grid, Self::Error>> + Send;
}

/// All sales structures, keyed by region where applicable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesData {
    pub overall: Vec<RankingEntry>,
    pub regions: BTreeMap<String, RegionView>,
}

/// A sheet whose fetch failed during a refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetFailure {
    pub sheet: String,
    pub detail: String,
}

/// Result of one full refresh. Always usable: failed sheets degrade to
/// empty structures and are listed in `failed_sheets`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub sales: SalesData,
    pub rubric: Vec<RubricQuestion>,
    pub evaluations: BTreeMap<String, EmployeeEvaluation>,
    pub failed_sheets: Vec<SheetFailure>,
}

/// Fetches and parses everything the dashboard shows. Never fails as a
/// whole; a refresh fully replaces prior results.
pub async fn fetch_dashboard<S: GridSource>(source: &S, config: &AppConfig) -> DashboardData {
    let eval_sheets = &config.evaluation;

    let (sales, master, self_eval, manager_eval, scores) = tokio::join!(
        fetch_sales(source, &config.sales),
        source.fetch_grid(Document::Evaluation, &eval_sheets.master_sheet),
        source.fetch_grid(Document::Evaluation, &eval_sheets.self_sheet),
        source.fetch_grid(Document::Evaluation, &eval_sheets.manager_sheet),
        source.fetch_grid(Document::Evaluation, &eval_sheets.score_sheet),
    );

    let (sales, mut failed_sheets) = sales;

    let rubric = match master {
        Ok(grid) => evaluation::extract_rubric(&grid),
        Err(error) => {
            failed_sheets.push(failure(&eval_sheets.master_sheet, &error));
            Vec::new()
        }
    };
    let self_sheets = match self_eval {
        Ok(grid) => evaluation::extract_answers(&grid),
        Err(error) => {
            failed_sheets.push(failure(&eval_sheets.self_sheet, &error));
            BTreeMap::new()
        }
    };
    let manager_sheets = match manager_eval {
        Ok(grid) => evaluation::extract_answers(&grid),
        Err(error) => {
            failed_sheets.push(failure(&eval_sheets.manager_sheet, &error));
            BTreeMap::new()
        }
    };
    let total_scores = match scores {
        Ok(grid) => evaluation::extract_total_scores(&grid),
        Err(error) => {
            failed_sheets.push(failure(&eval_sheets.score_sheet, &error));
            BTreeMap::new()
        }
    };

    DashboardData {
        sales,
        rubric,
        evaluations: evaluation::merge(self_sheets, manager_sheets, total_scores),
        failed_sheets,
    }
}

/// The composite sales fetch: the overall tab plus every region tab.
/// Per-tab failures are recorded and skipped so one drifted sheet cannot
/// take down the rest of the region views.
async fn fetch_sales<S: GridSource>(
    source: &S,
    config: &SalesSheetsConfig,
) -> (SalesData, Vec<SheetFailure>) {
    let mut data = SalesData::default();
    let mut failures = Vec::new();

    match source.fetch_grid(Document::Sales, &config.overall_sheet).await {
        Ok(grid) => data.overall = sales::extract_overall_ranking(&grid),
        Err(error) => failures.push(failure(&config.overall_sheet, &error)),
    }

    for region in &config.regions {
        match source.fetch_grid(Document::Sales, &region.sheet).await {
            Ok(grid) => {
                data.regions.insert(
                    region.key.clone(),
                    sales::extract_region_sections(&grid, &region.sheet),
                );
            }
            Err(error) => failures.push(failure(&region.sheet, &error)),
        }
    }

    (data, failures)
}

fn failure(sheet: &str, error: &dyn std::error::Error) -> SheetFailure {
    warn!(sheet = %sheet, error = %error, "sheet fetch failed");
    SheetFailure {
        sheet: sheet.to_string(),
        detail: error.to_string(),
    }
}
