//! Two-level participation matrix: division → sport key → cell
//!
//! The matrix is an explicit fold over normalized tuples starting from an
//! empty map with an all-zero identity cell. Cells that would hold only zeros
//! never enter the map, so an absent cell means "no participation".

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

use super::category::{Counts, SportKey};
use super::normalize::NormalizedTuple;
use super::ordering::DivisionName;

/// Summed participation for one (division, sport) pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatrixCell {
    pub men_teams: u64,
    pub men_participants: u64,
    pub women_teams: u64,
    pub women_participants: u64,
}

impl MatrixCell {
    pub const ZERO: MatrixCell = MatrixCell {
        men_teams: 0,
        men_participants: 0,
        women_teams: 0,
        women_participants: 0,
    };

    pub fn sum(&self) -> u64 {
        self.men_teams
            .saturating_add(self.men_participants)
            .saturating_add(self.women_teams)
            .saturating_add(self.women_participants)
    }

    pub fn has_data(&self) -> bool {
        self.sum() > 0
    }

    /// Elementwise, saturating at `u64::MAX`
    pub fn add(&mut self, other: &MatrixCell) {
        self.men_teams = self.men_teams.saturating_add(other.men_teams);
        self.men_participants = self.men_participants.saturating_add(other.men_participants);
        self.women_teams = self.women_teams.saturating_add(other.women_teams);
        self.women_participants = self.women_participants.saturating_add(other.women_participants);
    }
}

impl From<Counts> for MatrixCell {
    fn from(c: Counts) -> Self {
        Self {
            men_teams: c.teams_male,
            men_participants: c.players_male,
            women_teams: c.teams_female,
            women_participants: c.players_female,
        }
    }
}

pub type SportCells = BTreeMap<SportKey, MatrixCell>;

/// Aggregated matrix for one district; divisions iterate in collated order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matrix {
    divisions: BTreeMap<DivisionName, SportCells>,
}

impl Matrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a tuple stream into a fresh matrix
    pub fn fold<I>(tuples: I) -> Self
    where
        I: IntoIterator<Item = NormalizedTuple>,
    {
        tuples.into_iter().fold(Matrix::new(), |mut matrix, tuple| {
            matrix.add(tuple);
            matrix
        })
    }

    /// Add one tuple elementwise into its cell
    ///
    /// An all-zero tuple creates neither the division nor the cell.
    pub fn add(&mut self, tuple: NormalizedTuple) {
        if !tuple.cell.has_data() {
            return;
        }
        self.divisions
            .entry(DivisionName::new(tuple.division))
            .or_default()
            .entry(tuple.sport)
            .or_insert(MatrixCell::ZERO)
            .add(&tuple.cell);
    }

    pub fn cell(&self, division: &str, sport: SportKey) -> Option<&MatrixCell> {
        self.divisions
            .get(&DivisionName::new(division))
            .and_then(|cells| cells.get(&sport))
    }

    /// Divisions in collated order with their cells
    pub fn divisions(&self) -> impl Iterator<Item = (&DivisionName, &SportCells)> {
        self.divisions.iter()
    }

    pub fn division_count(&self) -> usize {
        self.divisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.divisions.is_empty()
    }

    /// Column totals across every division
    pub fn totals(&self) -> SportCells {
        let mut totals = SportCells::new();
        for cells in self.divisions.values() {
            for (sport, cell) in cells {
                totals.entry(*sport).or_insert(MatrixCell::ZERO).add(cell);
            }
        }
        totals
    }
}

impl Serialize for Matrix {
    /// `{ division: { sport_id: cell } }` in collated division order
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.divisions.len()))?;
        for (division, cells) in &self.divisions {
            map.serialize_entry(division, cells)?;
        }
        map.end()
    }
}
