//! Form-answer and score-total extraction.

use crate::grid::{is_plausible_name, Cell, Grid};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

// Form-export layout: timestamp, name, department, then one answer per
// rubric question.
const TIMESTAMP_COLUMN: usize = 0;
const NAME_COLUMN: usize = 1;
const DEPARTMENT_COLUMN: usize = 2;
const FIRST_ANSWER_COLUMN: usize = 3;

// Plausible bound for a total score; guards the backward scan against
// picking up an id or a stray amount.
const SCORE_LOWER_BOUND: f64 = 0.0;
const SCORE_UPPER_BOUND: f64 = 1000.0;

/// One employee's submitted answers from a form-response sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerSheet {
    pub department: String,
    pub submitted_at: Option<NaiveDateTime>,
    /// Index-aligned to question number minus one.
    pub answers: Vec<String>,
}

/// Extracts the answer vector per employee from a self- or
/// manager-evaluation sheet. Later submissions by the same name replace
/// earlier ones, matching the keyed overwrite the reporting view expects.
pub fn extract_answers(grid: &Grid) -> BTreeMap<String, AnswerSheet> {
    let mut sheets = BTreeMap::new();

    for row in 1..grid.row_count() {
        let name = grid.cell(row, NAME_COLUMN).trimmed();
        if !is_plausible_name(&name) {
            continue;
        }

        let answers = grid
            .row(row)
            .map(|cells| {
                cells
                    .iter()
                    .skip(FIRST_ANSWER_COLUMN)
                    .map(Cell::trimmed)
                    .collect()
            })
            .unwrap_or_default();

        sheets.insert(
            name,
            AnswerSheet {
                department: grid.cell(row, DEPARTMENT_COLUMN).trimmed(),
                submitted_at: parse_timestamp(&grid.cell(row, TIMESTAMP_COLUMN).trimmed()),
                answers,
            },
        );
    }

    debug!(count = sheets.len(), "answer sheets extracted");
    sheets
}

/// Extracts the computed total score per employee. The score column index
/// has drifted across sheet revisions, so the score is the last
/// numeric-looking cell within the plausible bound, scanning from the end
/// of the row backward.
pub fn extract_total_scores(grid: &Grid) -> BTreeMap<String, f64> {
    let mut scores = BTreeMap::new();

    for row in 1..grid.row_count() {
        let name = grid.cell(row, NAME_COLUMN).trimmed();
        if !is_plausible_name(&name) {
            continue;
        }

        let Some(cells) = grid.row(row) else {
            continue;
        };
        let score = cells.iter().rev().find_map(|cell| {
            cell.as_number()
                .filter(|value| *value > SCORE_LOWER_BOUND && *value < SCORE_UPPER_BOUND)
        });

        match score {
            Some(score) => {
                scores.insert(name, score);
            }
            None => warn!(name = %name, "no plausible total score on row"),
        }
    }

    debug!(count = scores.len(), "total scores extracted");
    scores
}

// Form exports write timestamps in a handful of shapes depending on the
// locale of the last edit.
fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }
    const FORMATS: &[&str] = &[
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
    ];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}
