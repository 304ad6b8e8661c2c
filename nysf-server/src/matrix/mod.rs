//! Sports participation matrix
//!
//! Pipeline per district: resolve the latest non-draft submission of each
//! division, normalize its detail rows into tuples, fold the tuples into
//! the matrix. Presentation layers project the matrix through [`view`].

pub mod aggregate;
pub mod category;
pub mod normalize;
pub mod ordering;
pub mod resolver;
pub mod view;

pub use aggregate::{Matrix, MatrixCell};
pub use category::{column_sports, ColumnSport, PseudoSport, SportKey};
pub use view::{MatrixRow, MatrixView, RowKind};

use nysf_common::Result;
use sqlx::SqlitePool;
use std::collections::HashSet;
use tracing::debug;

use crate::db::reports::{detail_rows, submission_heads};

/// Aggregate one district
///
/// A district with no non-draft submissions yields an empty matrix. Team rows
/// referencing a sport missing from `sport_ids` contribute nothing.
pub async fn build_district_matrix(
    pool: &SqlitePool,
    district_id: i64,
    sport_ids: &HashSet<i64>,
) -> Result<Matrix> {
    let resolved = resolver::resolve_latest(submission_heads(pool, district_id).await?);

    let mut matrix = Matrix::new();
    for head in &resolved {
        let rows = detail_rows(pool, head.id).await?;
        for tuple in normalize::normalize_submission(&head.division, &rows, |id| {
            sport_ids.contains(&id)
        }) {
            matrix.add(tuple);
        }
    }

    debug!(
        "District {}: {} resolved submissions, {} divisions with data",
        district_id,
        resolved.len(),
        matrix.division_count()
    );
    Ok(matrix)
}
