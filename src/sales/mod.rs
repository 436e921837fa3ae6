//! Sales ranking extraction.
//!
//! Two layouts exist: the overall sheet is one flat personal ranking read
//! through fixed offsets from its header row, while each region sheet is a
//! series of located sections (one team rollup, then one personal ranking
//! per department).

use crate::grid::locate::{self, Section, SectionKind};
use crate::grid::{is_plausible_name, parse_amount, parse_percent, parse_rank_token, Grid};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

const FALLBACK_DEPARTMENT: &str = "その他";

/// One row of a personal ranking list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub rank: u32,
    pub name: String,
    pub team: String,
    pub sales: f64,
    pub sales_share: f64,
    pub profit: f64,
    pub profit_share: f64,
    pub profit_rate: f64,
}

/// One row of a region's team rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub team: String,
    pub sales: f64,
    pub expense: f64,
    pub profit: f64,
    pub profit_rate: f64,
    pub sales_share: f64,
    pub profit_share: f64,
}

/// Personal ranking scoped to one department, re-ranked by sales.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRanking {
    pub name: String,
    pub entries: Vec<RankingEntry>,
}

/// Everything extracted from one region sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionView {
    pub team_summary: Vec<TeamSummary>,
    pub departments: Vec<DepartmentRanking>,
}

// Fixed column offsets of the overall sheet relative to its header row.
const OVERALL_RANK: usize = 0;
const OVERALL_NAME: usize = 1;
const OVERALL_TEAM: usize = 2;
const OVERALL_SALES: usize = 3;
const OVERALL_SALES_SHARE: usize = 4;
const OVERALL_PROFIT: usize = 5;
const OVERALL_PROFIT_SHARE: usize = 6;
const OVERALL_PROFIT_RATE: usize = 7;

/// Extracts the flat company-wide personal ranking from the overall sheet.
/// Each located header starts a segment that runs until the next header or
/// the end of the grid; segments are concatenated in sheet order.
pub fn extract_overall_ranking(grid: &Grid) -> Vec<RankingEntry> {
    let headers = locate::find_ranking_headers(grid);
    let mut entries: Vec<RankingEntry> = Vec::new();

    for (position, &header_row) in headers.iter().enumerate() {
        let segment_end = headers
            .get(position + 1)
            .copied()
            .unwrap_or_else(|| grid.row_count());

        for row in header_row + 1..segment_end {
            let name = grid.cell(row, OVERALL_NAME).trimmed();
            if !is_plausible_name(&name) {
                continue;
            }

            let mut rank = parse_rank_token(grid.cell(row, OVERALL_RANK));
            if rank == 0 {
                rank = entries.len() as u32 + 1;
            }

            entries.push(RankingEntry {
                rank,
                name,
                team: grid.cell(row, OVERALL_TEAM).trimmed(),
                sales: parse_amount(grid.cell(row, OVERALL_SALES)),
                sales_share: parse_percent(grid.cell(row, OVERALL_SALES_SHARE)),
                profit: parse_amount(grid.cell(row, OVERALL_PROFIT)),
                profit_share: parse_percent(grid.cell(row, OVERALL_PROFIT_SHARE)),
                profit_rate: parse_percent(grid.cell(row, OVERALL_PROFIT_RATE)),
            });
        }
    }

    debug!(count = entries.len(), "overall ranking extracted");
    entries
}

/// Extracts a region sheet into its team rollup and per-department
/// personal rankings. Source rank numbers are not trusted across sheet
/// edits: every department list is re-ranked 1..N by sales descending.
pub fn extract_region_sections(grid: &Grid, region: &str) -> RegionView {
    let sections = locate::locate_sections(grid, region);
    let mut team_summary = Vec::new();
    let mut department_map: BTreeMap<String, Vec<RankingEntry>> = BTreeMap::new();

    for section in &sections {
        match section.kind {
            SectionKind::TeamRollup => collect_team_rows(grid, section, &mut team_summary),
            SectionKind::PersonalRanking => {
                collect_ranking_rows(grid, section, &mut department_map)
            }
        }
    }

    let departments = order_departments(&team_summary, department_map);
    debug!(
        region = region,
        teams = team_summary.len(),
        departments = departments.len(),
        "region sheet extracted"
    );

    RegionView {
        team_summary,
        departments,
    }
}

// Team rollups keep a fixed layout: rank, team, sales, expense, profit,
// profit rate, then the two share columns.
fn collect_team_rows(grid: &Grid, section: &Section, output: &mut Vec<TeamSummary>) {
    for row in section.data_start..section.data_end {
        if parse_rank_token(grid.cell(row, 0)) == 0 {
            continue;
        }
        let team = grid.cell(row, 1).trimmed();
        if team.is_empty() || team == "-" || team == "合計" {
            continue;
        }
        output.push(TeamSummary {
            team,
            sales: parse_amount(grid.cell(row, 2)),
            expense: parse_amount(grid.cell(row, 3)),
            profit: parse_amount(grid.cell(row, 4)),
            profit_rate: parse_percent(grid.cell(row, 5)),
            sales_share: parse_percent(grid.cell(row, 6)),
            profit_share: parse_percent(grid.cell(row, 7)),
        });
    }
}

fn collect_ranking_rows(
    grid: &Grid,
    section: &Section,
    department_map: &mut BTreeMap<String, Vec<RankingEntry>>,
) {
    let schema = &section.schema;

    for row in section.data_start..section.data_end {
        let rank = parse_rank_token(grid.cell(row, 0));
        if rank == 0 {
            continue;
        }

        let name = schema
            .name
            .map(|column| grid.cell(row, column).trimmed())
            .unwrap_or_else(|| grid.cell(row, 1).trimmed());
        if !is_plausible_name(&name) {
            continue;
        }

        let team = schema
            .team
            .map(|column| grid.cell(row, column).trimmed())
            .unwrap_or_default();

        let entry = RankingEntry {
            rank,
            name,
            team: team.clone(),
            sales: read_amount(grid, row, schema.sales),
            sales_share: read_percent(grid, row, schema.sales_share),
            profit: read_amount(grid, row, schema.profit),
            profit_share: read_percent(grid, row, schema.profit_share),
            profit_rate: read_percent(grid, row, schema.profit_rate),
        };

        // Some sheets omit section titles entirely, so the grouping key
        // falls back to the row's own team label before the shared bucket.
        let key = section
            .department
            .clone()
            .filter(|department| !department.is_empty())
            .or_else(|| (!team.is_empty()).then_some(team))
            .unwrap_or_else(|| FALLBACK_DEPARTMENT.to_string());

        department_map.entry(key).or_default().push(entry);
    }
}

fn read_amount(grid: &Grid, row: usize, column: Option<usize>) -> f64 {
    column.map_or(0.0, |column| parse_amount(grid.cell(row, column)))
}

fn read_percent(grid: &Grid, row: usize, column: Option<usize>) -> f64 {
    column.map_or(0.0, |column| parse_percent(grid.cell(row, column)))
}

/// Re-ranks each department by sales descending and orders the departments
/// to match the team rollup; departments without a rollup counterpart are
/// appended alphabetically. Departments with no surviving rows never
/// existed in the map and are therefore omitted outright.
fn order_departments(
    team_summary: &[TeamSummary],
    mut department_map: BTreeMap<String, Vec<RankingEntry>>,
) -> Vec<DepartmentRanking> {
    let mut departments = Vec::new();

    for summary in team_summary {
        if let Some(entries) = department_map.remove(&summary.team) {
            departments.push(rerank(summary.team.clone(), entries));
        }
    }

    // BTreeMap iteration keeps the remaining names alphabetical.
    for (name, entries) in department_map {
        departments.push(rerank(name, entries));
    }

    departments
}

fn rerank(name: String, mut entries: Vec<RankingEntry>) -> DepartmentRanking {
    entries.sort_by(|a, b| b.sales.partial_cmp(&a.sales).unwrap_or(Ordering::Equal));
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index as u32 + 1;
    }
    DepartmentRanking { name, entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region_fixture() -> Grid {
        Grid::from_text_rows(&[
            &["【チーム別サマリー】"],
            &["順位", "チーム", "売上高", "支払高", "粗利益", "粗利益率", "売上比率", "粗利比率"],
            &["1", "制作2チーム", "¥200", "¥50", "¥150", "75.0%", "60.0%", "70.0%"],
            &["2", "制作1チーム", "¥120", "¥40", "¥80", "66.7%", "40.0%", "30.0%"],
            &[""],
            &["【東京 制作1部個人ランキング】"],
            &["順位", "氏名", "所属チーム", "売上額", "部内売上比率", "粗利額", "部内粗利比率", "粗利益率"],
            &["1", "山田 太郎", "制作1チーム", "¥40", "33.3%", "¥20", "25.0%", "50.0%"],
            &["2", "佐藤 花子", "制作1チーム", "¥80", "66.7%", "¥60", "75.0%", "75.0%"],
        ])
    }

    #[test]
    fn region_rollup_and_departments_extracted() {
        let view = extract_region_sections(&region_fixture(), "東京");
        assert_eq!(view.team_summary.len(), 2);
        assert_eq!(view.team_summary[0].team, "制作2チーム");
        assert_eq!(view.team_summary[0].sales, 200.0);
        assert_eq!(view.team_summary[0].expense, 50.0);
        assert_eq!(view.team_summary[1].profit_rate, 66.7);

        assert_eq!(view.departments.len(), 1);
        let department = &view.departments[0];
        assert_eq!(department.name, "制作1部");
        assert_eq!(department.entries[0].name, "佐藤 花子");
        assert_eq!(department.entries[0].rank, 1);
        assert_eq!(department.entries[1].rank, 2);
    }

    #[test]
    fn ranks_are_rederived_by_sales_descending() {
        let view = extract_region_sections(&region_fixture(), "東京");
        let entries = &view.departments[0].entries;
        for window in entries.windows(2) {
            assert!(window[0].sales >= window[1].sales);
        }
        for (index, entry) in entries.iter().enumerate() {
            assert_eq!(entry.rank, index as u32 + 1);
        }
    }

    #[test]
    fn parsing_is_idempotent() {
        let grid = region_fixture();
        assert_eq!(
            extract_region_sections(&grid, "東京"),
            extract_region_sections(&grid, "東京")
        );
    }

    #[test]
    fn departments_follow_rollup_order_with_row_team_fallback() {
        let grid = Grid::from_text_rows(&[
            &["【チーム別サマリー】"],
            &["順位", "チーム", "売上高"],
            &["1", "制作2チーム", "¥200"],
            &["2", "制作1チーム", "¥120"],
            &[""],
            // Untitled ranking: rows group by their own team column.
            &["順位", "氏名", "所属チーム", "売上額"],
            &["1", "山田 太郎", "制作1チーム", "¥40"],
            &["2", "佐藤 花子", "制作2チーム", "¥80"],
            &["3", "高橋 次郎", "アシスタント", "¥10"],
        ]);
        let view = extract_region_sections(&grid, "東京");
        let names: Vec<&str> = view
            .departments
            .iter()
            .map(|department| department.name.as_str())
            .collect();
        assert_eq!(names, ["制作2チーム", "制作1チーム", "アシスタント"]);
    }

    #[test]
    fn ranking_rows_after_an_unseparated_rollup_stay_out_of_the_summary() {
        let grid = Grid::from_text_rows(&[
            &["【チーム別サマリー】"],
            &["順位", "チーム", "売上高", "支払高", "粗利益", "粗利益率", "売上比率", "粗利比率"],
            &["1", "制作1チーム", "¥100", "¥40", "¥60", "60.0%", "100.0%", "100.0%"],
            // No blank row before the unlabeled ranking header.
            &["順位", "氏名", "所属チーム", "売上額"],
            &["1", "山田 太郎", "制作1チーム", "¥60"],
        ]);
        let view = extract_region_sections(&grid, "東京");

        assert_eq!(view.team_summary.len(), 1);
        assert_eq!(view.team_summary[0].team, "制作1チーム");
        assert_eq!(view.departments.len(), 1);
        assert_eq!(view.departments[0].entries[0].name, "山田 太郎");
        assert_eq!(view.departments[0].entries[0].sales, 60.0);
    }

    #[test]
    fn empty_department_sections_are_omitted() {
        let grid = Grid::from_text_rows(&[
            &["【東京 制作3部個人ランキング】"],
            &["順位", "氏名", "所属チーム", "売上額"],
            &["1", "合計", "", "¥100"],
            &["2", "-", "", "¥50"],
        ]);
        let view = extract_region_sections(&grid, "東京");
        assert!(view.departments.is_empty());
    }

    #[test]
    fn overall_ranking_reads_fixed_offsets_and_skips_label_rows() {
        let grid = Grid::from_text_rows(&[
            &["売上ランキング(全社)"],
            &["順位", "氏名", "所属チーム", "売上額", "売上比率", "粗利額", "粗利比率", "粗利益率"],
            &["1", "山田 太郎", "制作1チーム", "¥100", "40.0%", "¥60", "42.0%", "60.0%"],
            &["", "氏名", "", "", "", "", "", ""],
            &["2", "佐藤 花子", "制作2チーム", "¥90", "36.0%", "¥50", "35.0%", "55.6%"],
        ]);
        let entries = extract_overall_ranking(&grid);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "山田 太郎");
        assert_eq!(entries[0].sales, 100.0);
        assert_eq!(entries[0].profit_share, 42.0);
        assert_eq!(entries[1].rank, 2);
    }
}
