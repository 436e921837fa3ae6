//! Master rubric extraction.
//!
//! The rubric sheet uses merged cells: a category label appears once and
//! then stays blank for the rows it spans. Extraction is a fold that
//! threads the current category state through each row instead of relying
//! on shared mutable variables.

use crate::grid::{Cell, Grid};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One question of the evaluation rubric. `question_no` is the positional
/// key into the answer vectors (`answers[question_no - 1]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricQuestion {
    pub question_no: u32,
    pub category_no: u32,
    pub major_category: String,
    pub major_description: String,
    pub minor_category: String,
    pub criteria: String,
}

// Column layout of the rubric sheet; resolved from the header row when one
// exists, otherwise the conventional order.
#[derive(Debug, Clone, Copy)]
struct RubricColumns {
    category_no: usize,
    major: usize,
    minor: usize,
    criteria: usize,
    question_no: Option<usize>,
}

impl RubricColumns {
    const DEFAULT: Self = Self {
        category_no: 0,
        major: 1,
        minor: 2,
        criteria: 3,
        question_no: Some(4),
    };

    fn resolve(header: &[Cell]) -> Self {
        let find = |keyword: &str| {
            header
                .iter()
                .position(|cell| cell.trimmed().contains(keyword))
        };
        Self {
            category_no: find("カテゴリNo").or_else(|| find("カテゴリ")).unwrap_or(0),
            major: find("大カテゴリ").unwrap_or(1),
            minor: find("小カテゴリ").or_else(|| find("中カテゴリ")).unwrap_or(2),
            criteria: find("審査内容").unwrap_or(3),
            question_no: find("設問"),
        }
    }
}

// Carry-over state reproducing the sheet's merged-cell semantics.
#[derive(Debug, Default, Clone)]
struct Carry {
    category_no: u32,
    major: String,
    major_description: String,
    minor: String,
}

fn is_rubric_header(row: &[Cell]) -> bool {
    row.iter().any(|cell| {
        let text = cell.trimmed();
        text.contains("カテゴリ") || text.contains("審査内容") || text.contains("設問")
    })
}

/// Walks the rubric grid top to bottom, propagating category labels down
/// through blank cells and emitting a question for every row with
/// non-empty criteria text.
pub fn extract_rubric(grid: &Grid) -> Vec<RubricQuestion> {
    let mut columns = RubricColumns::DEFAULT;
    let mut start_row = 0;
    if let Some(first) = grid.row(0) {
        if is_rubric_header(first) {
            columns = RubricColumns::resolve(first);
            start_row = 1;
        }
    }

    let mut carry = Carry::default();
    let mut questions: Vec<RubricQuestion> = Vec::new();

    for row in start_row..grid.row_count() {
        let Some(cells) = grid.row(row) else {
            break;
        };
        if is_rubric_header(cells) {
            continue;
        }

        if let Some(category_no) = grid.cell(row, columns.category_no).as_number() {
            if category_no > 0.0 {
                carry.category_no = category_no.trunc() as u32;
            }
        }
        let major = grid.cell(row, columns.major).trimmed();
        if !major.is_empty() {
            let (title, description) = split_major_cell(&major);
            carry.major = title;
            carry.major_description = description;
        }
        let minor = grid.cell(row, columns.minor).trimmed();
        if !minor.is_empty() {
            carry.minor = minor;
        }

        // A row with empty criteria is a pure category header.
        let criteria = grid.cell(row, columns.criteria).trimmed();
        if criteria.is_empty() {
            continue;
        }

        let explicit_no = columns
            .question_no
            .map(|column| grid.cell(row, column))
            .and_then(Cell::as_number)
            .filter(|value| *value > 0.0 && value.fract() == 0.0)
            .map(|value| value as u32);

        questions.push(RubricQuestion {
            question_no: explicit_no.unwrap_or(questions.len() as u32 + 1),
            category_no: carry.category_no,
            major_category: carry.major.clone(),
            major_description: carry.major_description.clone(),
            minor_category: carry.minor.clone(),
            criteria,
        });
    }

    debug!(count = questions.len(), "rubric extracted");
    questions
}

// Opening brackets that start a bundled description, in preference order.
const DESCRIPTION_OPENERS: &[char] = &['（', '(', '【', '「'];

/// Splits a major-category cell that bundles a short title with a longer
/// description. The split point is the first line break, or else the first
/// opening bracket from a fixed preference order. Deterministic and lossy:
/// a description containing its own line breaks keeps them.
fn split_major_cell(text: &str) -> (String, String) {
    if let Some((title, description)) = text.split_once('\n') {
        return (title.trim().to_string(), description.trim().to_string());
    }
    for opener in DESCRIPTION_OPENERS {
        if let Some(position) = text.find(*opener) {
            if position == 0 {
                continue;
            }
            let (title, description) = text.split_at(position);
            return (title.trim().to_string(), description.trim().to_string());
        }
    }
    (text.trim().to_string(), String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carry_over_propagates_category_labels() {
        let grid = Grid::from_text_rows(&[
            &["カテゴリNo", "大カテゴリ", "小カテゴリ", "審査内容", "設問No"],
            &["1", "業務遂行", "正確性", "期日を守れたか", "1"],
            &["", "", "", "報告は適切だったか", "2"],
            &["", "", "主体性", "自ら提案したか", "3"],
        ]);
        let questions = extract_rubric(&grid);
        assert_eq!(questions.len(), 3);
        assert!(questions
            .iter()
            .all(|question| question.category_no == 1 && question.major_category == "業務遂行"));
        assert_eq!(questions[1].minor_category, "正確性");
        assert_eq!(questions[2].minor_category, "主体性");
    }

    #[test]
    fn category_header_rows_do_not_become_questions() {
        let grid = Grid::from_text_rows(&[
            &["カテゴリNo", "大カテゴリ", "小カテゴリ", "審査内容", "設問No"],
            &["2", "顧客対応（社外のやり取り全般）", "", "", ""],
            &["", "", "応対品質", "丁寧な応対ができたか", "4"],
        ]);
        let questions = extract_rubric(&grid);
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].question_no, 4);
        assert_eq!(questions[0].category_no, 2);
        assert_eq!(questions[0].major_category, "顧客対応");
        assert_eq!(questions[0].major_description, "（社外のやり取り全般）");
    }

    #[test]
    fn question_numbers_fall_back_to_emission_order() {
        let grid = Grid::from_text_rows(&[
            &["1", "業務遂行", "正確性", "期日を守れたか", ""],
            &["", "", "", "報告は適切だったか", ""],
        ]);
        let questions = extract_rubric(&grid);
        assert_eq!(questions[0].question_no, 1);
        assert_eq!(questions[1].question_no, 2);
    }

    #[test]
    fn major_cell_splits_on_line_break_first() {
        let (title, description) = split_major_cell("業務遂行\n日々の業務の進め方");
        assert_eq!(title, "業務遂行");
        assert_eq!(description, "日々の業務の進め方");

        let (title, description) = split_major_cell("チームワーク");
        assert_eq!(title, "チームワーク");
        assert_eq!(description, "");
    }
}
