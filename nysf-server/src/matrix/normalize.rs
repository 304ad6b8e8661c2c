//! Maps the three detail-row variants onto one tuple stream

use tracing::debug;

use super::aggregate::MatrixCell;
use super::category::{Counts, DetailRow, PseudoSport, SportKey};

/// (division, sport key, four counts) ready to fold into the matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedTuple {
    pub division: String,
    pub sport: SportKey,
    pub cell: MatrixCell,
}

/// Normalize one submission's detail rows
///
/// Team rows become one tuple each, keyed by their sport id. Swimming rows
/// and track & field rows are each summed into a single tuple under their
/// reserved key. Zero-sum rows and sums never leave this function, and team
/// rows whose sport fails `sport_exists` are skipped.
pub fn normalize_submission<F>(division: &str, rows: &[DetailRow], sport_exists: F) -> Vec<NormalizedTuple>
where
    F: Fn(i64) -> bool,
{
    let mut tuples = Vec::new();
    let mut swimming = Counts::default();
    let mut track_field = Counts::default();

    for row in rows {
        match row {
            DetailRow::TeamSport { sport_id, counts } => {
                if !counts.has_data() {
                    continue;
                }
                if !sport_exists(*sport_id) {
                    debug!(
                        "Skipping team row for missing sport {} in division {}",
                        sport_id, division
                    );
                    continue;
                }
                tuples.push(NormalizedTuple {
                    division: division.to_string(),
                    sport: SportKey(*sport_id),
                    cell: MatrixCell::from(*counts),
                });
            }
            DetailRow::Swimming(counts) => swimming.add(counts),
            DetailRow::TrackField(counts) => track_field.add(counts),
        }
    }

    for (pseudo, counts) in [
        (PseudoSport::Swimming, swimming),
        (PseudoSport::TrackField, track_field),
    ] {
        if counts.has_data() {
            tuples.push(NormalizedTuple {
                division: division.to_string(),
                sport: pseudo.key(),
                cell: MatrixCell::from(counts),
            });
        }
    }

    tuples
}
