//! Report exports: the all-districts workbook, the matrix print view and
//! the bulk submission document

pub mod bulk;
pub mod print;
pub mod xlsx;

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;

use crate::db::catalog::{list_districts, list_sports, sport_ids};
use crate::matrix::{build_district_matrix, column_sports, MatrixView};
use xlsx::{matrix_sheet_xml, WorkbookWriter};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] nysf_common::Error),
}

/// Escape text for HTML and XML content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// One worksheet per district, in local-language name order
///
/// Each district is aggregated and its sheet written before the next one
/// is read, so a single district's matrix is held at a time.
pub async fn export_all_districts(pool: &SqlitePool) -> Result<Vec<u8>, ExportError> {
    let districts = list_districts(pool).await?;
    let columns = column_sports(&list_sports(pool).await?);
    let known_sports = sport_ids(pool).await?;

    let mut workbook = WorkbookWriter::new();
    for district in &districts {
        let matrix = build_district_matrix(pool, district.id, &known_sports).await?;
        let view = MatrixView::project(&matrix, columns.clone());
        workbook.add_sheet(&district.name_en, &matrix_sheet_xml(&district.name_en, &view))?;
    }

    info!("Exported workbook with {} district sheets", workbook.sheet_count());
    workbook.finish()
}
