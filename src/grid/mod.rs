mod value;

pub use value::{is_plausible_name, parse_amount, parse_percent, parse_rank_token};

pub mod locate;

use std::io::Read;

/// A single spreadsheet cell as delivered by the transport layer.
///
/// Formatted exports carry most values as display strings (`"¥1,234"`,
/// `"38.0%"`); raw exports carry numbers. Both shapes appear in the wild,
/// so every parser downstream accepts either.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(_) => false,
            Cell::Text(text) => text.trim().is_empty(),
        }
    }

    /// Display text of the cell with surrounding whitespace removed.
    /// Numbers render the way the source UI would show an unformatted
    /// value, so `Number(5.0)` becomes `"5"`.
    pub fn trimmed(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    format!("{}", *value as i64)
                } else {
                    format!("{value}")
                }
            }
            Cell::Text(text) => text.trim().to_string(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            Cell::Text(text) => text.trim().parse::<f64>().ok(),
            Cell::Empty => None,
        }
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// An ordered grid of cells from one spreadsheet tab. Row indices are
/// stable references: section boundaries are expressed in terms of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Builds a grid from string literals, coercing numeric-looking text
    /// into numbers the way a raw export would. Used by fixtures and the
    /// CSV loader.
    pub fn from_text_rows(rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|field| coerce_field(field)).collect())
            .collect();
        Self { rows }
    }

    /// Reads a grid from a CSV export of a sheet. Rows are ragged in real
    /// exports, so no header or width validation is applied.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(coerce_field).collect());
        }

        Ok(Self { rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, index: usize) -> Option<&[Cell]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Cell at the given position; out-of-range positions read as empty,
    /// matching how ragged rows behave in the source sheets.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }
}

fn coerce_field(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    match trimmed.parse::<f64>() {
        Ok(value) => Cell::Number(value),
        Err(_) => Cell::Text(field.to_string()),
    }
}
