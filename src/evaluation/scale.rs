use tracing::warn;

/// The fixed achievement vocabulary used on both evaluation forms, mapped
/// to the numeric levels the comparison runs on. Matched by equality after
/// trimming.
const SCALE: &[(&str, f64)] = &[
    ("十分に達成できた", 1.0),
    ("概ね達成できた", 0.7),
    ("あまり達成できなかった", 0.3),
    ("達成できなかった", 0.0),
    ("該当なし", 0.0),
];

/// Maps an evaluation answer to its numeric level. Unrecognized text falls
/// back to a plain numeric parse and finally to zero; that last case is a
/// data-quality signal worth logging, not an error.
pub fn text_to_score(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    for (phrase, score) in SCALE {
        if trimmed == *phrase {
            return *score;
        }
    }

    if let Ok(value) = trimmed.parse::<f64>() {
        return value;
    }

    warn!(answer = %trimmed, "evaluation text outside the fixed vocabulary");
    0.0
}
