use super::Cell;

/// Header and label tokens that show up in name columns but never name a
/// person. Region names appear here because summary rows sometimes echo
/// the sheet title into the name column.
const EXCLUDED_NAME_TOKENS: &[&str] = &[
    "氏名",
    "名前",
    "合計",
    "順位",
    "チーム",
    "所属",
    "所属チーム",
    "部署",
    "東京",
    "大阪",
    "名古屋",
    "企画開発",
    "全体",
    "-",
];

/// Parses a currency amount. Strips half/full-width yen signs, thousands
/// separators, and whitespace; anything non-numeric reads as zero.
pub fn parse_amount(cell: &Cell) -> f64 {
    match cell {
        Cell::Empty => 0.0,
        Cell::Number(value) => *value,
        Cell::Text(text) => {
            let cleaned: String = text
                .chars()
                .filter(|c| !matches!(c, '¥' | '￥' | ',') && !c.is_whitespace())
                .collect();
            cleaned.parse::<f64>().unwrap_or(0.0)
        }
    }
}

/// Parses a percentage. Formatted strings carry their own `%` sign and are
/// already scaled (`"38.0%"` → 38.0); raw numeric cells are fractions and
/// get scaled by 100 (`0.21` → 21.0). Both conventions occur in the source
/// sheets, keyed by whether the export was formatted.
pub fn parse_percent(cell: &Cell) -> f64 {
    match cell {
        Cell::Empty => 0.0,
        Cell::Number(value) => value * 100.0,
        Cell::Text(text) => {
            let cleaned: String = text
                .chars()
                .filter(|c| *c != '%' && !c.is_whitespace())
                .collect();
            cleaned.parse::<f64>().unwrap_or(0.0)
        }
    }
}

/// Extracts the leading digit run from rank tokens such as `"3"` or
/// `"3位"`. Zero when the cell holds no usable rank.
pub fn parse_rank_token(cell: &Cell) -> u32 {
    match cell {
        Cell::Empty => 0,
        Cell::Number(value) => {
            if *value > 0.0 {
                value.trunc() as u32
            } else {
                0
            }
        }
        Cell::Text(text) => {
            let digits: String = text
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse::<u32>().unwrap_or(0)
        }
    }
}

/// Whether a cell's text plausibly names a person. Rejects blank strings,
/// strings made of digits/punctuation/currency/percent symbols only, known
/// header and label tokens, and anything shorter than two characters.
pub fn is_plausible_name(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.chars().count() < 2 {
        return false;
    }
    if EXCLUDED_NAME_TOKENS.contains(&trimmed) {
        return false;
    }
    let all_symbolic = trimmed.chars().all(|c| {
        c.is_ascii_digit()
            || c.is_ascii_punctuation()
            || matches!(c, '¥' | '￥' | '%')
            || c.is_whitespace()
    });
    !all_symbolic
}
