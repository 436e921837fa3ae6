//! Extraction and merge core for the company reporting dashboard.
//!
//! Consumes raw two-dimensional grids exported from spreadsheet tabs
//! (sales ranking sheets, the evaluation rubric, and the per-employee
//! evaluation form answers), recovers their layout heuristically, and
//! produces the normalized structures the reporting UI renders. The
//! transport that obtains a grid is a collaborator behind
//! [`pipeline::GridSource`]; nothing in here performs I/O of its own
//! beyond reading CSV exports for the command line tooling.

pub mod access;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod grid;
pub mod gviz;
pub mod pipeline;
pub mod sales;
pub mod telemetry;

pub use grid::{Cell, Grid};
