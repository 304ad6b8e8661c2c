//! Detail-row variants and the unified sport key space
//!
//! Team-sport rows are keyed by their catalog sport id. Swimming and
//! track & field carry no sport reference; each is one implicit category
//! mapped to a reserved id outside the catalog range.

use nysf_common::db::{EventRecord, Sport, TeamSportRecord};
use serde::Serialize;
use std::fmt;

/// Key of a matrix column: a catalog sport id or a reserved pseudo-sport id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SportKey(pub i64);

impl fmt::Display for SportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Categories without a catalog entry, aggregated under reserved ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoSport {
    Swimming,
    TrackField,
}

impl PseudoSport {
    /// Column order after the real catalog
    pub const ALL: [PseudoSport; 2] = [PseudoSport::Swimming, PseudoSport::TrackField];

    pub fn key(&self) -> SportKey {
        match self {
            PseudoSport::Swimming => SportKey(9001),
            PseudoSport::TrackField => SportKey(9002),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PseudoSport::Swimming => "SW",
            PseudoSport::TrackField => "TF",
        }
    }

    pub fn name_en(&self) -> &'static str {
        match self {
            PseudoSport::Swimming => "Swimming",
            PseudoSport::TrackField => "Track & Field",
        }
    }

    pub fn name_si(&self) -> &'static str {
        match self {
            PseudoSport::Swimming => "පිහිනුම්",
            PseudoSport::TrackField => "මලල ක්‍රීඩා",
        }
    }

    pub fn from_key(key: SportKey) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }
}

/// The four participation counts every detail row carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub teams_male: u64,
    pub teams_female: u64,
    pub players_male: u64,
    pub players_female: u64,
}

impl Counts {
    /// Build from nullable stored columns; NULL and negative read as zero
    pub fn from_columns(
        teams_male: Option<i64>,
        teams_female: Option<i64>,
        players_male: Option<i64>,
        players_female: Option<i64>,
    ) -> Self {
        let read = |v: Option<i64>| v.map(|n| n.max(0) as u64).unwrap_or(0);
        Self {
            teams_male: read(teams_male),
            teams_female: read(teams_female),
            players_male: read(players_male),
            players_female: read(players_female),
        }
    }

    /// Saturates at `u64::MAX`
    pub fn sum(&self) -> u64 {
        self.teams_male
            .saturating_add(self.teams_female)
            .saturating_add(self.players_male)
            .saturating_add(self.players_female)
    }

    /// A row "has data" iff its four counts sum above zero
    pub fn has_data(&self) -> bool {
        self.sum() > 0
    }

    pub fn add(&mut self, other: &Counts) {
        self.teams_male = self.teams_male.saturating_add(other.teams_male);
        self.teams_female = self.teams_female.saturating_add(other.teams_female);
        self.players_male = self.players_male.saturating_add(other.players_male);
        self.players_female = self.players_female.saturating_add(other.players_female);
    }
}

/// One stored detail row, by category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailRow {
    TeamSport { sport_id: i64, counts: Counts },
    Swimming(Counts),
    TrackField(Counts),
}

impl DetailRow {
    pub fn counts(&self) -> &Counts {
        match self {
            DetailRow::TeamSport { counts, .. } => counts,
            DetailRow::Swimming(counts) | DetailRow::TrackField(counts) => counts,
        }
    }
}

impl From<&TeamSportRecord> for DetailRow {
    fn from(r: &TeamSportRecord) -> Self {
        DetailRow::TeamSport {
            sport_id: r.sport_id,
            counts: Counts::from_columns(r.teams_male, r.teams_female, r.players_male, r.players_female),
        }
    }
}

impl DetailRow {
    pub fn swimming(r: &EventRecord) -> Self {
        DetailRow::Swimming(Counts::from_columns(
            r.teams_male,
            r.teams_female,
            r.players_male,
            r.players_female,
        ))
    }

    pub fn track_field(r: &EventRecord) -> Self {
        DetailRow::TrackField(Counts::from_columns(
            r.teams_male,
            r.teams_female,
            r.players_male,
            r.players_female,
        ))
    }
}

/// A matrix column as presented: catalog sports first (by id), then pseudo-sports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSport {
    pub id: SportKey,
    pub code: String,
    pub name_en: String,
    pub name_si: String,
    pub pseudo: bool,
}

/// Merge the real catalog with the pseudo-sports at the presentation boundary
pub fn column_sports(catalog: &[Sport]) -> Vec<ColumnSport> {
    let mut sports: Vec<&Sport> = catalog.iter().collect();
    sports.sort_by_key(|s| s.id);

    let real = sports.into_iter().map(|s| ColumnSport {
        id: SportKey(s.id),
        code: s.code.to_string(),
        name_en: s.name_en.clone(),
        name_si: s.name_si.clone(),
        pseudo: false,
    });

    let pseudo = PseudoSport::ALL.into_iter().map(|p| ColumnSport {
        id: p.key(),
        code: p.code().to_string(),
        name_en: p.name_en().to_string(),
        name_si: p.name_si().to_string(),
        pseudo: true,
    });

    real.chain(pseudo).collect()
}
