//! Submission payload parsing and validation

use nysf_common::db::{Designation, SubmissionStatus, DISTRICT_LEVEL_DIVISION};
use nysf_common::Result;
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::HashSet;

use crate::db::catalog::sport_ids;
use crate::db::submissions::{EventInput, SubmissionInput, TeamSportInput};
use crate::financial::FinancialInput;
use crate::matrix::category::Counts;
use crate::validate::{self, path, FieldErrors};

const MAX_TEXT: usize = 255;
const MAX_EPF: usize = 50;

/// Ids that referential checks run against
#[derive(Debug, Clone, Default)]
pub struct Referential {
    pub district_ids: HashSet<i64>,
    pub sport_ids: HashSet<i64>,
}

impl Referential {
    pub async fn load(pool: &SqlitePool) -> Result<Self> {
        let districts: Vec<i64> = sqlx::query_scalar("SELECT id FROM districts")
            .fetch_all(pool)
            .await?;
        Ok(Self {
            district_ids: districts.into_iter().collect(),
            sport_ids: sport_ids(pool).await?,
        })
    }
}

/// Whether the submission names a division or is filed for the whole district
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryLevel {
    Division,
    District,
}

impl EntryLevel {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "division" => Some(EntryLevel::Division),
            "district" => Some(EntryLevel::District),
            _ => None,
        }
    }
}

fn parse_status(value: &str) -> Option<SubmissionStatus> {
    match value {
        "draft" => Some(SubmissionStatus::Draft),
        "submitted" => Some(SubmissionStatus::Submitted),
        _ => None,
    }
}

/// Validate a raw body into a [`SubmissionInput`], collecting every field error
pub fn parse_submission(
    body: &Value,
    refs: &Referential,
) -> std::result::Result<SubmissionInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    if !body.is_object() {
        errors.add("body", "The request body must be a JSON object.");
        return Err(errors);
    }

    let district_id = validate::required_integer(body, "", "district_id", &mut errors);
    if let Some(id) = district_id {
        if !refs.district_ids.contains(&id) {
            errors.add("district_id", "The selected district_id is invalid.");
        }
    }

    let entry_level = validate::one_of(body, "", "entry_level", false, EntryLevel::parse, &mut errors)
        .unwrap_or(EntryLevel::Division);
    let division = match entry_level {
        EntryLevel::District => Some(DISTRICT_LEVEL_DIVISION.to_string()),
        EntryLevel::Division => {
            validate::required_string(body, "", "division", MAX_TEXT, &mut errors)
        }
    };

    let officer_name = validate::required_string(body, "", "officer_name", MAX_TEXT, &mut errors);
    let designation =
        validate::one_of(body, "", "designation", true, Designation::parse, &mut errors);
    let epf_number = validate::required_string(body, "", "epf_number", MAX_EPF, &mut errors);
    let status = validate::one_of(body, "", "status", false, parse_status, &mut errors)
        .unwrap_or_default();

    let team_sports: Vec<TeamSportInput> = validate::array(body, "team_sports", &mut errors)
        .iter()
        .enumerate()
        .filter_map(|(i, row)| team_sport_row(row, &format!("team_sports.{}", i), refs, &mut errors))
        .collect();

    let swimming = event_rows(body, "swimming", &mut errors);
    let track_field = event_rows(body, "track_field", &mut errors);

    let financial = match body.get("financial") {
        None | Some(Value::Null) => None,
        Some(f) if f.is_object() => {
            let input = FinancialInput::new(
                validate::amount(f, "financial", "income_head_office", &mut errors),
                validate::amount(f, "financial", "income_external_sources", &mut errors),
                validate::amount(f, "financial", "expense_team_sports", &mut errors),
                validate::amount(f, "financial", "expense_track_field", &mut errors),
            );
            if input.is_none() {
                errors.add("financial", "The financial totals are out of range.");
            }
            input
        }
        Some(_) => {
            errors.add("financial", "The financial field must be an object.");
            None
        }
    };

    match (district_id, division, officer_name, designation, epf_number) {
        (Some(district_id), Some(division), Some(officer_name), Some(designation), Some(epf_number))
            if errors.is_empty() =>
        {
            Ok(SubmissionInput {
                district_id,
                division,
                officer_name,
                designation,
                epf_number,
                status,
                team_sports,
                swimming,
                track_field,
                financial,
            })
        }
        _ => Err(errors),
    }
}

fn row_object(row: &Value, prefix: &str, errors: &mut FieldErrors) -> bool {
    if row.is_object() {
        true
    } else {
        errors.add(prefix, format!("The {} field must be an object.", prefix));
        false
    }
}

fn row_counts(row: &Value, prefix: &str, errors: &mut FieldErrors) -> Counts {
    Counts {
        teams_male: validate::count(row, prefix, "teams_male", errors),
        teams_female: validate::count(row, prefix, "teams_female", errors),
        players_male: validate::count(row, prefix, "players_male", errors),
        players_female: validate::count(row, prefix, "players_female", errors),
    }
}

fn team_sport_row(
    row: &Value,
    prefix: &str,
    refs: &Referential,
    errors: &mut FieldErrors,
) -> Option<TeamSportInput> {
    if !row_object(row, prefix, errors) {
        return None;
    }

    let sport_id = validate::required_integer(row, prefix, "sport_id", errors);
    if let Some(id) = sport_id {
        if !refs.sport_ids.contains(&id) {
            errors.add(path(prefix, "sport_id"), "The selected sport_id is invalid.");
        }
    }

    let event_date = validate::date(row, prefix, "event_date", errors);
    let venue = validate::optional_string(row, prefix, "venue", MAX_TEXT, errors);
    let counts = row_counts(row, prefix, errors);

    sport_id.map(|sport_id| TeamSportInput {
        sport_id,
        event_date,
        venue,
        counts,
    })
}

fn event_rows(body: &Value, key: &str, errors: &mut FieldErrors) -> Vec<EventInput> {
    let rows = validate::array(body, key, errors);
    let mut parsed = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let prefix = format!("{}.{}", key, i);
        if !row_object(row, &prefix, errors) {
            continue;
        }
        parsed.push(EventInput {
            event_date: validate::date(row, &prefix, "event_date", errors),
            venue: validate::optional_string(row, &prefix, "venue", MAX_TEXT, errors),
            event_name: validate::optional_string(row, &prefix, "event_name", MAX_TEXT, errors),
            counts: row_counts(row, &prefix, errors),
        });
    }

    parsed
}
