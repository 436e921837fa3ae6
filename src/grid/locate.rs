//! Locates labeled sections and header rows inside a raw grid.
//!
//! Sheets drift release to release: sections are usually announced by a
//! bracketed title row (`【東京 制作1部個人ランキング】`), but some tabs
//! carry bare header rows with no title at all. Recognition therefore runs
//! as an ordered chain: bracket-title match first, header-keyword fallback
//! second. A missing section is an empty result, never an error.

use super::{Cell, Grid};
use tracing::debug;

const REGION_PREFIXES: &[&str] = &["東京", "大阪", "名古屋", "企画開発"];
const TEAM_ROLLUP_MARKERS: &[&str] = &["チーム別サマリー", "部門別サマリー"];
const RANKING_MARKER: &str = "ランキング";
const PERSONAL_RANKING_MARKER: &str = "個人ランキング";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    TeamRollup,
    PersonalRanking,
}

/// Column roles recovered from one header row. Resolved exactly once per
/// header so every reader of the section agrees on the layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSchema {
    pub rank: Option<usize>,
    pub name: Option<usize>,
    pub team: Option<usize>,
    pub sales: Option<usize>,
    pub sales_share: Option<usize>,
    pub profit: Option<usize>,
    pub profit_share: Option<usize>,
    pub profit_rate: Option<usize>,
}

impl ColumnSchema {
    pub fn resolve(header: &[Cell]) -> Self {
        let mut schema = Self {
            rank: find_column(header, &["順位"]),
            name: find_column(header, &["氏名", "名前"]),
            team: find_column(header, &["所属チーム", "所属", "チーム", "部署"]),
            sales: find_column(header, &["売上額", "売上高", "売上"]),
            sales_share: find_column(header, &["部内売上比率", "売上全体比率", "売上比率"]),
            profit: find_column(header, &["粗利額", "粗利益額", "粗利益", "粗利"]),
            profit_share: find_column(header, &["部内粗利比率", "粗利全体比率", "粗利比率"]),
            profit_rate: find_column(header, &["粗利益率", "粗利率"]),
        };
        schema.infer_adjacent();
        schema
    }

    /// Some header rows only label the name column. When the name column is
    /// known but the sales column is not, the remaining roles follow the
    /// conventional consecutive layout.
    fn infer_adjacent(&mut self) {
        let Some(name) = self.name else {
            return;
        };
        if self.sales.is_some() {
            return;
        }
        let team = self.team.unwrap_or(name + 1);
        self.team = Some(team);
        let sales = team + 1;
        self.sales = Some(sales);
        self.sales_share = Some(sales + 1);
        self.profit = Some(sales + 2);
        self.profit_share = Some(sales + 3);
        self.profit_rate = Some(sales + 4);
    }
}

/// First matching candidate wins; a candidate matches on equality or
/// substring containment, tolerating decorated header text.
fn find_column(header: &[Cell], candidates: &[&str]) -> Option<usize> {
    for candidate in candidates {
        let found = header.iter().position(|cell| {
            let text = cell.trimmed();
            text == *candidate || text.contains(candidate)
        });
        if found.is_some() {
            return found;
        }
    }
    None
}

/// A contiguous labeled span of rows representing one logical table.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub department: Option<String>,
    pub header_row: usize,
    pub data_start: usize,
    pub data_end: usize,
    pub schema: ColumnSchema,
}

pub fn is_blank_row(row: &[Cell]) -> bool {
    row.iter().all(Cell::is_blank)
}

/// Bracketed title text from a row, if any cell carries one.
pub fn bracket_title(row: &[Cell]) -> Option<String> {
    row.iter().find_map(|cell| {
        let text = cell.trimmed();
        (text.starts_with('【') && text.contains('】')).then_some(text)
    })
}

fn classify_title(title: &str, region: &str) -> Option<(SectionKind, Option<String>)> {
    if TEAM_ROLLUP_MARKERS.iter().any(|marker| title.contains(marker)) {
        return Some((SectionKind::TeamRollup, None));
    }
    if title.contains(RANKING_MARKER) {
        return Some((
            SectionKind::PersonalRanking,
            department_from_title(title, region),
        ));
    }
    None
}

/// Recovers the department name from a personal-ranking section title by
/// removing the known region prefix and the ranking suffix. A title naming
/// only the region yields the region itself.
pub fn department_from_title(title: &str, region: &str) -> Option<String> {
    let open = title.find('【')?;
    let close = title.find('】')?;
    let inner = title.get(open + '【'.len_utf8()..close)?;
    let (content, _) = inner.split_once(PERSONAL_RANKING_MARKER)?;
    let content = content.trim();
    if content.is_empty() {
        return None;
    }

    // The planning/development sheet names departments directly.
    if region == "企画開発" {
        return Some(content.to_string());
    }

    let mut used_region = None;
    let mut rest = content;
    for prefix in REGION_PREFIXES {
        if let Some(stripped) = rest.strip_prefix(prefix) {
            used_region = Some(*prefix);
            rest = stripped;
            break;
        }
    }

    let rest = rest.trim();
    if rest.is_empty() {
        return used_region.map(str::to_string);
    }
    Some(rest.to_string())
}

/// A row that repeats header labels in the middle of a data block marks the
/// start of a new unlabeled table.
fn is_header_echo(row: &[Cell]) -> bool {
    let has_name = row.iter().any(|cell| cell.trimmed() == "氏名");
    let has_team = row.iter().any(|cell| cell.trimmed() == "チーム");
    let has_rank = row.iter().any(|cell| cell.trimmed().contains("順位"));
    has_name || (has_team && has_rank)
}

/// Header-keyword fallback for tabs without bracketed titles.
fn classify_header(row: &[Cell]) -> Option<SectionKind> {
    let has_name = row
        .iter()
        .any(|cell| matches!(cell.trimmed().as_str(), "氏名" | "名前"));
    let has_team = row.iter().any(|cell| cell.trimmed() == "チーム");
    let has_belong = row.iter().any(|cell| cell.trimmed().contains("所属"));
    let has_sales = row.iter().any(|cell| cell.trimmed().contains("売上"));

    if has_name && (has_belong || has_team || has_sales) {
        return Some(SectionKind::PersonalRanking);
    }
    if has_team && has_sales && !has_name && !has_belong {
        return Some(SectionKind::TeamRollup);
    }
    None
}

/// Scans a region sheet for team-rollup and personal-ranking sections.
pub fn locate_sections(grid: &Grid, region: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let row_count = grid.row_count();
    // Kind and department carried from the most recent title or echo row.
    let mut pending: Option<(SectionKind, Option<String>)> = None;
    let mut i = 0;

    while i < row_count {
        let Some(row) = grid.row(i) else {
            break;
        };

        if is_blank_row(row) {
            pending = None;
            i += 1;
            continue;
        }

        if let Some(title) = bracket_title(row) {
            pending = classify_title(&title, region);
            if let Some((kind, department)) = &pending {
                debug!(title = %title, ?kind, department = ?department, "section title");
            }
            i += 1;
            continue;
        }

        let first_is_numeric = super::parse_rank_token(grid.cell(i, 0)) > 0;
        let header_here = match &pending {
            Some(_) => !first_is_numeric,
            None => classify_header(row).is_some(),
        };
        if !header_here {
            i += 1;
            continue;
        }

        let (kind, department) = pending
            .take()
            .or_else(|| classify_header(row).map(|kind| (kind, None)))
            .unwrap_or((SectionKind::PersonalRanking, None));

        let schema = match kind {
            SectionKind::PersonalRanking => ColumnSchema::resolve(row),
            SectionKind::TeamRollup => ColumnSchema::default(),
        };

        let data_start = i + 1;
        let mut data_end = data_start;
        let mut echo_row = None;
        while data_end < row_count {
            let Some(data_row) = grid.row(data_end) else {
                break;
            };
            if is_blank_row(data_row) || bracket_title(data_row).is_some() {
                break;
            }
            if is_header_echo(data_row) {
                echo_row = Some(data_end);
                break;
            }
            data_end += 1;
        }

        sections.push(Section {
            kind,
            department: department.clone(),
            header_row: i,
            data_start,
            data_end,
            schema,
        });

        match echo_row {
            // Rewind: the echo row becomes the header of a new unlabeled
            // section. Its own labels decide the kind; the department scope
            // carries over only while the kind stays a personal ranking.
            Some(echo) => {
                let echo_kind = grid.row(echo).and_then(classify_header).unwrap_or(kind);
                let carried = (echo_kind == SectionKind::PersonalRanking
                    && kind == SectionKind::PersonalRanking)
                    .then_some(department)
                    .flatten();
                pending = Some((echo_kind, carried));
                i = echo;
            }
            None => {
                pending = None;
                i = data_end;
            }
        }
    }

    sections
}

/// Header rows for the flat overall-ranking layout: a name label plus any
/// of the team/sales labels on the same row.
pub fn find_ranking_headers(grid: &Grid) -> Vec<usize> {
    grid.rows()
        .enumerate()
        .filter(|(_, row)| {
            let has_name = row.iter().any(|cell| cell.trimmed().contains("氏名"));
            let has_team_or_sales = row.iter().any(|cell| {
                let text = cell.trimmed();
                text.contains("所属") || text.contains("チーム") || text.contains("売上")
            });
            has_name && has_team_or_sales
        })
        .map(|(index, _)| index)
        .collect()
}
