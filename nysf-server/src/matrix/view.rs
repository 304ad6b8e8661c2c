//! Presentation projection shared by the JSON report, the print view and the
//! workbook export

use serde::Serialize;
use std::collections::BTreeMap;

use super::aggregate::{Matrix, MatrixCell};
use super::category::{ColumnSport, SportKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Division,
    Total,
    DistrictLevel,
}

/// One rendered row; `cells` align with [`MatrixView::columns`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRow {
    pub label: String,
    pub kind: RowKind,
    pub cells: Vec<MatrixCell>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixView {
    pub columns: Vec<ColumnSport>,
    pub rows: Vec<MatrixRow>,
}

pub const TOTAL_LABEL: &str = "Total";

impl MatrixView {
    /// Ordinary divisions in collated order, the totals row, then any
    /// district-level rows
    ///
    /// The totals row sums every division, district-level included, and is
    /// present even when the matrix is empty.
    pub fn project(matrix: &Matrix, columns: Vec<ColumnSport>) -> Self {
        let cells_for = |cells: &BTreeMap<SportKey, MatrixCell>| -> Vec<MatrixCell> {
            columns
                .iter()
                .map(|c| cells.get(&c.id).copied().unwrap_or(MatrixCell::ZERO))
                .collect()
        };

        let mut rows = Vec::with_capacity(matrix.division_count() + 1);
        let mut pinned = Vec::new();

        for (division, cells) in matrix.divisions() {
            let kind = if division.is_district_level() {
                RowKind::DistrictLevel
            } else {
                RowKind::Division
            };
            let row = MatrixRow {
                label: division.as_str().to_string(),
                kind,
                cells: cells_for(cells),
            };
            match kind {
                RowKind::DistrictLevel => pinned.push(row),
                _ => rows.push(row),
            }
        }

        rows.push(MatrixRow {
            label: TOTAL_LABEL.to_string(),
            kind: RowKind::Total,
            cells: cells_for(&matrix.totals()),
        });
        rows.extend(pinned);

        Self { columns, rows }
    }

    pub fn division_rows(&self) -> impl Iterator<Item = &MatrixRow> {
        self.rows.iter().filter(|r| r.kind != RowKind::Total)
    }
}

/// Count as rendered in tables: `-` stands for zero
pub fn display_count(n: u64) -> String {
    if n == 0 {
        "-".to_string()
    } else {
        n.to_string()
    }
}
