//! Decodes a Google Visualization (`gviz/tq`) response body into a [`Grid`].
//!
//! The endpoint wraps its JSON in a `setResponse(...)` call. Cells carry a
//! raw value `v` and sometimes a formatted string `f`; the formatted string
//! wins because the heuristics downstream key off display text such as
//! `"¥1,234"` and `"38.0%"`.

use crate::grid::{Cell, Grid};
use serde::Deserialize;

const ENVELOPE_PREFIX: &str = "google.visualization.Query.setResponse(";

#[derive(Debug, thiserror::Error)]
pub enum GvizError {
    #[error("response body is not a gviz setResponse payload")]
    MissingEnvelope,
    #[error("gviz payload is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("gviz query failed: {0}")]
    Query(String),
}

#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(default)]
    status: String,
    #[serde(default)]
    errors: Vec<QueryError>,
    table: Option<Table>,
}

#[derive(Debug, Deserialize)]
struct QueryError {
    #[serde(default)]
    detailed_message: String,
}

#[derive(Debug, Deserialize)]
struct Table {
    #[serde(default)]
    rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
struct Row {
    #[serde(default)]
    c: Vec<Option<RawCell>>,
}

#[derive(Debug, Deserialize)]
struct RawCell {
    #[serde(default)]
    v: serde_json::Value,
    #[serde(default)]
    f: Option<String>,
}

/// Unwraps the `setResponse` envelope and converts the table into a grid.
pub fn decode_response(body: &str) -> Result<Grid, GvizError> {
    let start = body
        .find(ENVELOPE_PREFIX)
        .ok_or(GvizError::MissingEnvelope)?;
    let inner = body[start + ENVELOPE_PREFIX.len()..]
        .trim_end()
        .trim_end_matches(';')
        .trim_end_matches(')');

    let payload: Payload = serde_json::from_str(inner)?;

    if payload.status == "error" {
        let detail = payload
            .errors
            .first()
            .map(|error| error.detailed_message.clone())
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(GvizError::Query(detail));
    }

    let rows = payload
        .table
        .map(|table| {
            table
                .rows
                .into_iter()
                .map(|row| row.c.into_iter().map(convert_cell).collect())
                .collect()
        })
        .unwrap_or_default();

    Ok(Grid::from_rows(rows))
}

fn convert_cell(cell: Option<RawCell>) -> Cell {
    let Some(cell) = cell else {
        return Cell::Empty;
    };
    if let Some(formatted) = cell.f {
        return Cell::Text(formatted);
    }
    match cell.v {
        serde_json::Value::Number(number) => number
            .as_f64()
            .map(Cell::Number)
            .unwrap_or(Cell::Empty),
        serde_json::Value::String(text) => Cell::Text(text),
        serde_json::Value::Bool(flag) => Cell::Text(flag.to_string()),
        _ => Cell::Empty,
    }
}

/// Pulls the spreadsheet id out of a share URL (`.../spreadsheets/d/<id>/...`).
pub fn extract_spreadsheet_id(url: &str) -> Option<&str> {
    let start = url.find("/d/")? + "/d/".len();
    let rest = &url[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_envelope_preferring_formatted_values() {
        let body = concat!(
            "/*O_o*/\ngoogle.visualization.Query.setResponse(",
            r#"{"status":"ok","table":{"rows":[{"c":[{"v":1},{"v":"山田 太郎"},{"v":1234567,"f":"¥1,234,567"},null]}]}}"#,
            ");"
        );
        let grid = decode_response(body).expect("decodes");
        assert_eq!(grid.cell(0, 0), &Cell::Number(1.0));
        assert_eq!(grid.cell(0, 2), &Cell::Text("¥1,234,567".to_string()));
        assert_eq!(grid.cell(0, 3), &Cell::Empty);
    }

    #[test]
    fn query_errors_surface_with_detail() {
        let body = concat!(
            "google.visualization.Query.setResponse(",
            r#"{"status":"error","errors":[{"detailed_message":"no such sheet"}]}"#,
            ")"
        );
        match decode_response(body) {
            Err(GvizError::Query(detail)) => assert_eq!(detail, "no such sheet"),
            other => panic!("expected query error, got {other:?}"),
        }
    }

    #[test]
    fn plain_html_is_rejected() {
        assert!(matches!(
            decode_response("<html>login required</html>"),
            Err(GvizError::MissingEnvelope)
        ));
    }

    #[test]
    fn spreadsheet_id_extraction() {
        assert_eq!(
            extract_spreadsheet_id(
                "https://docs.google.com/spreadsheets/d/1EKA17UB_JEx-ArD8/edit?usp=sharing"
            ),
            Some("1EKA17UB_JEx-ArD8")
        );
        assert_eq!(extract_spreadsheet_id("https://example.com/"), None);
    }
}
