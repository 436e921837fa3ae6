//! Merges the three evaluation sources into one record per employee.
//!
//! The rubric is a shared schema, not a roster: identities come only from
//! the answer and score sheets. Any source may be missing for a given
//! employee; the merged record still exists so the viewer can see whatever
//! half of the comparison was submitted.

use super::answers::AnswerSheet;
use super::rubric::RubricQuestion;
use super::scale::text_to_score;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Denormalized per-employee view of all evaluation sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeEvaluation {
    pub name: String,
    pub department: String,
    /// Index-aligned to question number minus one.
    pub self_answers: Vec<String>,
    pub manager_answers: Vec<String>,
    pub total_score: f64,
}

/// Unions employee identities across the self, manager, and score sources.
/// Department resolves to the first non-empty value among self then
/// manager; missing answer vectors stay empty and a missing score is zero.
pub fn merge(
    self_sheets: BTreeMap<String, AnswerSheet>,
    manager_sheets: BTreeMap<String, AnswerSheet>,
    total_scores: BTreeMap<String, f64>,
) -> BTreeMap<String, EmployeeEvaluation> {
    let names: BTreeSet<String> = self_sheets
        .keys()
        .chain(manager_sheets.keys())
        .chain(total_scores.keys())
        .cloned()
        .collect();

    let mut merged = BTreeMap::new();
    for name in names {
        let self_sheet = self_sheets.get(&name);
        let manager_sheet = manager_sheets.get(&name);

        let department = self_sheet
            .map(|sheet| sheet.department.clone())
            .filter(|department| !department.is_empty())
            .or_else(|| manager_sheet.map(|sheet| sheet.department.clone()))
            .unwrap_or_default();

        let evaluation = EmployeeEvaluation {
            department,
            self_answers: self_sheet.map(|sheet| sheet.answers.clone()).unwrap_or_default(),
            manager_answers: manager_sheet
                .map(|sheet| sheet.answers.clone())
                .unwrap_or_default(),
            total_score: total_scores.get(&name).copied().unwrap_or(0.0),
            name: name.clone(),
        };
        merged.insert(name, evaluation);
    }

    merged
}

/// Self/manager comparison for one rubric question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionComparison {
    pub question_no: u32,
    pub category_no: u32,
    pub major_category: String,
    pub major_description: String,
    pub minor_category: String,
    pub criteria: String,
    pub self_text: String,
    pub manager_text: String,
    pub self_score: f64,
    pub manager_score: f64,
    /// Positive when the self assessment exceeds the manager's.
    pub difference: f64,
}

/// Builds the per-question comparison for one employee. Computed on demand
/// for the selected employee only; it is O(questions) and the UI shows one
/// employee at a time.
pub fn compare_questions(
    rubric: &[RubricQuestion],
    employee: &EmployeeEvaluation,
) -> Vec<QuestionComparison> {
    rubric
        .iter()
        .map(|question| {
            let index = question.question_no.saturating_sub(1) as usize;
            let self_text = answer_at(&employee.self_answers, index);
            let manager_text = answer_at(&employee.manager_answers, index);
            let self_score = text_to_score(&self_text);
            let manager_score = text_to_score(&manager_text);

            QuestionComparison {
                question_no: question.question_no,
                category_no: question.category_no,
                major_category: question.major_category.clone(),
                major_description: question.major_description.clone(),
                minor_category: question.minor_category.clone(),
                criteria: question.criteria.clone(),
                self_text,
                manager_text,
                self_score,
                manager_score,
                difference: self_score - manager_score,
            }
        })
        .collect()
}

fn answer_at(answers: &[String], index: usize) -> String {
    answers.get(index).cloned().unwrap_or_default()
}

/// Deviation statistics over one employee's comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonSummary {
    pub question_count: usize,
    pub average_deviation: f64,
    pub max_deviation: f64,
}

pub fn summarize(comparisons: &[QuestionComparison]) -> ComparisonSummary {
    if comparisons.is_empty() {
        return ComparisonSummary {
            question_count: 0,
            average_deviation: 0.0,
            max_deviation: 0.0,
        };
    }

    let total: f64 = comparisons
        .iter()
        .map(|comparison| comparison.difference.abs())
        .sum();
    let max = comparisons
        .iter()
        .map(|comparison| comparison.difference.abs())
        .fold(0.0, f64::max);

    ComparisonSummary {
        question_count: comparisons.len(),
        average_deviation: total / comparisons.len() as f64,
        max_deviation: max,
    }
}
