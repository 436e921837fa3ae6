//! Evaluation sheet extraction and the per-employee merge.

mod answers;
mod merge;
mod rubric;
mod scale;

pub use answers::{extract_answers, extract_total_scores, AnswerSheet};
pub use merge::{
    compare_questions, merge, summarize, ComparisonSummary, EmployeeEvaluation,
    QuestionComparison,
};
pub use rubric::{extract_rubric, RubricQuestion};
pub use scale::text_to_score;
