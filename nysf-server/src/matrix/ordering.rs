//! Division-name collation and the district-level marker
//!
//! Names compare case-insensitively first, then by exact code points, so
//! "kaduwela" and "Kaduwela" sit together but stay distinct. Zero-width
//! joiners used in Sinhala conjuncts are ignored on the first pass.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;

use nysf_common::db::DISTRICT_LEVEL_DIVISION;

/// Markers identifying a district-level pseudo-division (matched as
/// case-insensitive substrings)
const DISTRICT_LEVEL_MARKERS: [&str; 3] = [
    "district level",
    DISTRICT_LEVEL_DIVISION,
    "දිස්ත්‍රික්ක මට්ටම",
];

fn is_ignorable(c: char) -> bool {
    matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}')
}

fn primary_chars(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars()
        .filter(|c| !is_ignorable(*c))
        .flat_map(char::to_lowercase)
}

/// Locale-aware comparison used for every division and district listing
pub fn compare_names(a: &str, b: &str) -> Ordering {
    primary_chars(a.trim())
        .cmp(primary_chars(b.trim()))
        .then_with(|| a.cmp(b))
}

/// True if the name denotes the district-level entry rather than a division
pub fn is_district_level(name: &str) -> bool {
    let haystack: String = primary_chars(name).collect();
    DISTRICT_LEVEL_MARKERS.iter().any(|marker| {
        let needle: String = primary_chars(marker).collect();
        haystack.contains(&needle)
    })
}

/// Division name ordered by [`compare_names`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DivisionName(String);

impl DivisionName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_district_level(&self) -> bool {
        is_district_level(&self.0)
    }
}

impl Ord for DivisionName {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_names(&self.0, &other.0)
    }
}

impl PartialOrd for DivisionName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for DivisionName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
