//! Submission write path and detail reads
//!
//! A submission and all of its child rows are written in one transaction.
//! Updates replace every child row: delete and reinsert share that
//! transaction, so a failure leaves the previous rows in place.

use chrono::{NaiveDate, NaiveDateTime, Utc};
use nysf_common::db::{
    Designation, District, EventRecord, FinancialRecord, Submission, SubmissionStatus,
    TeamSportRecord,
};
use nysf_common::Result;
use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::info;

use crate::financial::FinancialInput;
use crate::pagination::PageWindow;
use crate::matrix::category::Counts;

const SUBMISSION_COLUMNS: &str = "id, district_id, division, officer_name, designation, \
     epf_number, status, submitted_at, created_at, updated_at";

/// Validated team-sport row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSportInput {
    pub sport_id: i64,
    pub event_date: Option<NaiveDate>,
    pub venue: Option<String>,
    pub counts: Counts,
}

/// Validated swimming or track & field row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInput {
    pub event_date: Option<NaiveDate>,
    pub venue: Option<String>,
    pub event_name: Option<String>,
    pub counts: Counts,
}

/// Validated submission with its complete set of child rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionInput {
    pub district_id: i64,
    pub division: String,
    pub officer_name: String,
    pub designation: Designation,
    pub epf_number: String,
    pub status: SubmissionStatus,
    pub team_sports: Vec<TeamSportInput>,
    pub swimming: Vec<EventInput>,
    pub track_field: Vec<EventInput>,
    pub financial: Option<FinancialInput>,
}

/// The two tables sharing the event-row shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTable {
    Swimming,
    TrackField,
}

impl EventTable {
    pub fn table(&self) -> &'static str {
        match self {
            EventTable::Swimming => "swimming_data",
            EventTable::TrackField => "track_field_data",
        }
    }
}

/// Team-sport row joined with its catalog sport
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct TeamSportDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub record: TeamSportRecord,
    pub sport_code: Option<i64>,
    pub sport_name_en: Option<String>,
    pub sport_name_si: Option<String>,
}

/// Everything shown on the submission detail page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionDetail {
    #[serde(flatten)]
    pub submission: Submission,
    pub district: Option<District>,
    pub team_sports: Vec<TeamSportDetail>,
    pub swimming: Vec<EventRecord>,
    pub track_field: Vec<EventRecord>,
    pub financial: Option<FinancialRecord>,
}

/// Row of the paginated submission list
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct SubmissionSummary {
    pub id: i64,
    pub district_id: i64,
    pub district_name_si: Option<String>,
    pub district_name_en: Option<String>,
    pub division: String,
    pub officer_name: String,
    pub designation: Designation,
    pub status: SubmissionStatus,
    pub submitted_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Insert a submission with its child rows; returns the new id
pub async fn create_submission(pool: &SqlitePool, input: &SubmissionInput) -> Result<i64> {
    let mut tx = pool.begin().await?;

    let stamp = now();
    let submitted_at = (input.status == SubmissionStatus::Submitted).then_some(stamp);

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO submissions
            (district_id, division, officer_name, designation, epf_number, status,
             submitted_at, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(input.district_id)
    .bind(&input.division)
    .bind(&input.officer_name)
    .bind(input.designation)
    .bind(&input.epf_number)
    .bind(input.status)
    .bind(submitted_at)
    .bind(stamp)
    .bind(stamp)
    .fetch_one(&mut *tx)
    .await?;

    insert_children(&mut *tx, id, input).await?;

    tx.commit().await?;

    info!(
        "Created submission {} (district {}, division {}, {})",
        id,
        input.district_id,
        input.division,
        input.status.as_str()
    );
    Ok(id)
}

/// Replace a submission and its child rows; `false` if the id is unknown
///
/// `submitted_at` is stamped only on the draft → submitted transition.
pub async fn update_submission(
    pool: &SqlitePool,
    id: i64,
    input: &SubmissionInput,
) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let stored: Option<(SubmissionStatus, Option<NaiveDateTime>)> =
        sqlx::query_as("SELECT status, submitted_at FROM submissions WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some((stored_status, stored_submitted_at)) = stored else {
        return Ok(false);
    };

    let stamp = now();
    let submitted_at = if stored_status == SubmissionStatus::Draft
        && input.status == SubmissionStatus::Submitted
    {
        Some(stamp)
    } else {
        stored_submitted_at
    };

    sqlx::query(
        r#"
        UPDATE submissions
        SET district_id = ?, division = ?, officer_name = ?, designation = ?,
            epf_number = ?, status = ?, submitted_at = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(input.district_id)
    .bind(&input.division)
    .bind(&input.officer_name)
    .bind(input.designation)
    .bind(&input.epf_number)
    .bind(input.status)
    .bind(submitted_at)
    .bind(stamp)
    .bind(id)
    .execute(&mut *tx)
    .await?;

    for table in [
        "team_sports_data",
        EventTable::Swimming.table(),
        EventTable::TrackField.table(),
        "financial_data",
    ] {
        sqlx::query(&format!("DELETE FROM {table} WHERE submission_id = ?"))
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    insert_children(&mut *tx, id, input).await?;

    tx.commit().await?;

    info!("Updated submission {} ({})", id, input.status.as_str());
    Ok(true)
}

/// Delete a submission; child rows go by cascade. `false` if the id is unknown
pub async fn delete_submission(pool: &SqlitePool, id: i64) -> Result<bool> {
    let deleted = sqlx::query("DELETE FROM submissions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    if deleted > 0 {
        info!("Deleted submission {}", id);
    }
    Ok(deleted > 0)
}

async fn insert_children(
    conn: &mut SqliteConnection,
    submission_id: i64,
    input: &SubmissionInput,
) -> Result<()> {
    for row in &input.team_sports {
        sqlx::query(
            r#"
            INSERT INTO team_sports_data
                (submission_id, sport_id, event_date, venue,
                 teams_male, teams_female, players_male, players_female)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(submission_id)
        .bind(row.sport_id)
        .bind(row.event_date)
        .bind(&row.venue)
        .bind(row.counts.teams_male as i64)
        .bind(row.counts.teams_female as i64)
        .bind(row.counts.players_male as i64)
        .bind(row.counts.players_female as i64)
        .execute(&mut *conn)
        .await?;
    }

    for (table, rows) in [
        (EventTable::Swimming, &input.swimming),
        (EventTable::TrackField, &input.track_field),
    ] {
        let sql = format!(
            "INSERT INTO {} (submission_id, event_date, venue, event_name, \
             teams_male, teams_female, players_male, players_female) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            table.table()
        );
        for row in rows {
            sqlx::query(&sql)
                .bind(submission_id)
                .bind(row.event_date)
                .bind(&row.venue)
                .bind(&row.event_name)
                .bind(row.counts.teams_male as i64)
                .bind(row.counts.teams_female as i64)
                .bind(row.counts.players_male as i64)
                .bind(row.counts.players_female as i64)
                .execute(&mut *conn)
                .await?;
        }
    }

    if let Some(financial) = input.financial {
        let record = financial.into_record(submission_id);
        sqlx::query(
            r#"
            INSERT INTO financial_data
                (submission_id, income_head_office, income_external_sources, total_income,
                 expense_team_sports, expense_track_field, total_expense)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.submission_id)
        .bind(record.income_head_office)
        .bind(record.income_external_sources)
        .bind(record.total_income)
        .bind(record.expense_team_sports)
        .bind(record.expense_track_field)
        .bind(record.total_expense)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn get_submission(pool: &SqlitePool, id: i64) -> Result<Option<Submission>> {
    let submission = sqlx::query_as(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(submission)
}

pub async fn team_rows(pool: &SqlitePool, submission_id: i64) -> Result<Vec<TeamSportRecord>> {
    let rows = sqlx::query_as(
        "SELECT id, submission_id, sport_id, event_date, venue, \
         teams_male, teams_female, players_male, players_female \
         FROM team_sports_data WHERE submission_id = ? ORDER BY id",
    )
    .bind(submission_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn event_rows(
    pool: &SqlitePool,
    table: EventTable,
    submission_id: i64,
) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as(&format!(
        "SELECT id, submission_id, event_date, venue, event_name, \
         teams_male, teams_female, players_male, players_female \
         FROM {} WHERE submission_id = ? ORDER BY id",
        table.table()
    ))
    .bind(submission_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn financial_row(pool: &SqlitePool, submission_id: i64) -> Result<Option<FinancialRecord>> {
    let row = sqlx::query_as(
        "SELECT submission_id, income_head_office, income_external_sources, total_income, \
         expense_team_sports, expense_track_field, total_expense \
         FROM financial_data WHERE submission_id = ?",
    )
    .bind(submission_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Submission with district, detail rows (team rows carrying the sport name)
/// and financial summary
pub async fn get_submission_detail(pool: &SqlitePool, id: i64) -> Result<Option<SubmissionDetail>> {
    let Some(submission) = get_submission(pool, id).await? else {
        return Ok(None);
    };

    let district = super::catalog::get_district(pool, submission.district_id).await?;

    let team_sports = sqlx::query_as(
        r#"
        SELECT t.id, t.submission_id, t.sport_id, t.event_date, t.venue,
               t.teams_male, t.teams_female, t.players_male, t.players_female,
               s.code AS sport_code, s.name_en AS sport_name_en, s.name_si AS sport_name_si
        FROM team_sports_data t
        LEFT JOIN sports s ON s.id = t.sport_id
        WHERE t.submission_id = ?
        ORDER BY t.id
        "#,
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    let swimming = event_rows(pool, EventTable::Swimming, id).await?;
    let track_field = event_rows(pool, EventTable::TrackField, id).await?;
    let financial = financial_row(pool, id).await?;

    Ok(Some(SubmissionDetail {
        submission,
        district,
        team_sports,
        swimming,
        track_field,
        financial,
    }))
}

pub async fn count_submissions(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM submissions")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// One page of submissions, newest first
pub async fn list_submissions(
    pool: &SqlitePool,
    window: PageWindow,
) -> Result<Vec<SubmissionSummary>> {
    let rows = sqlx::query_as(
        r#"
        SELECT s.id, s.district_id, d.name_si AS district_name_si, d.name_en AS district_name_en,
               s.division, s.officer_name, s.designation, s.status, s.submitted_at, s.created_at
        FROM submissions s
        LEFT JOIN districts d ON d.id = s.district_id
        ORDER BY s.id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(window.limit)
    .bind(window.offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Every submission id, oldest first
pub async fn all_submission_ids(pool: &SqlitePool) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar("SELECT id FROM submissions ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(ids)
}
