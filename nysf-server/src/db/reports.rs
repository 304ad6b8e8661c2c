//! Read models feeding the matrix pipeline and the division analysis

use nysf_common::Result;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use super::submissions::{event_rows, team_rows, EventTable};
use crate::matrix::category::DetailRow;
use crate::matrix::resolver::SubmissionHead;

/// Id, division and status of every submission in a district
pub async fn submission_heads(pool: &SqlitePool, district_id: i64) -> Result<Vec<SubmissionHead>> {
    let heads = sqlx::query_as("SELECT id, division, status FROM submissions WHERE district_id = ?")
        .bind(district_id)
        .fetch_all(pool)
        .await?;
    Ok(heads)
}

/// All detail rows of one submission as variants
pub async fn detail_rows(pool: &SqlitePool, submission_id: i64) -> Result<Vec<DetailRow>> {
    let mut rows: Vec<DetailRow> = team_rows(pool, submission_id)
        .await?
        .iter()
        .map(DetailRow::from)
        .collect();

    rows.extend(
        event_rows(pool, EventTable::Swimming, submission_id)
            .await?
            .iter()
            .map(DetailRow::swimming),
    );
    rows.extend(
        event_rows(pool, EventTable::TrackField, submission_id)
            .await?
            .iter()
            .map(DetailRow::track_field),
    );

    Ok(rows)
}

/// Participation summary for one (district, division) pair
///
/// Counts every submission for the pair, drafts included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct DivisionStats {
    pub district_name: String,
    pub division_name: String,
    pub total_submissions: i64,
    pub team_sports_count: i64,
    pub swimming_count: i64,
    pub track_field_count: i64,
    pub total_participants: i64,
    pub male_participants: i64,
    pub female_participants: i64,
}

pub async fn division_stats(
    pool: &SqlitePool,
    district_id: i64,
    division: &str,
) -> Result<DivisionStats> {
    let stats = sqlx::query_as(
        r#"
        WITH subs AS (
            SELECT id FROM submissions WHERE district_id = ?1 AND division = ?2
        ),
        detail AS (
            SELECT 'team' AS kind, players_male, players_female
                FROM team_sports_data WHERE submission_id IN (SELECT id FROM subs)
            UNION ALL
            SELECT 'swim', players_male, players_female
                FROM swimming_data WHERE submission_id IN (SELECT id FROM subs)
            UNION ALL
            SELECT 'track', players_male, players_female
                FROM track_field_data WHERE submission_id IN (SELECT id FROM subs)
        ),
        sums AS (
            SELECT
                COALESCE(SUM(kind = 'team'), 0) AS team_sports_count,
                COALESCE(SUM(kind = 'swim'), 0) AS swimming_count,
                COALESCE(SUM(kind = 'track'), 0) AS track_field_count,
                COALESCE(SUM(players_male), 0) AS male_participants,
                COALESCE(SUM(players_female), 0) AS female_participants
            FROM detail
        )
        SELECT
            COALESCE((SELECT name_en FROM districts WHERE id = ?1), 'Unknown') AS district_name,
            ?2 AS division_name,
            (SELECT COUNT(*) FROM subs) AS total_submissions,
            team_sports_count,
            swimming_count,
            track_field_count,
            male_participants + female_participants AS total_participants,
            male_participants,
            female_participants
        FROM sums
        "#,
    )
    .bind(district_id)
    .bind(division)
    .fetch_one(pool)
    .await?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::submissions::{create_submission, EventInput, SubmissionInput, TeamSportInput};
    use crate::matrix::category::Counts;
    use nysf_common::db::{init_memory_database, Designation, SubmissionStatus};

    fn input(status: SubmissionStatus, players_male: u64) -> SubmissionInput {
        let counts = Counts {
            players_male,
            players_female: 1,
            ..Counts::default()
        };
        SubmissionInput {
            district_id: 3,
            division: "Kelaniya".to_string(),
            officer_name: "N. Silva".to_string(),
            designation: Designation::Dyo,
            epf_number: "E-7".to_string(),
            status,
            team_sports: vec![TeamSportInput {
                sport_id: 53,
                event_date: None,
                venue: None,
                counts,
            }],
            swimming: vec![],
            track_field: vec![EventInput {
                event_date: None,
                venue: None,
                event_name: None,
                counts,
            }],
            financial: None,
        }
    }

    #[tokio::test]
    async fn test_detail_rows_cover_all_variants() {
        let pool = init_memory_database().await.unwrap();
        let id = create_submission(&pool, &input(SubmissionStatus::Submitted, 4)).await.unwrap();

        let rows = detail_rows(&pool, id).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert!(matches!(rows[0], DetailRow::TeamSport { sport_id: 53, .. }));
        assert!(matches!(rows[1], DetailRow::TrackField(_)));
    }

    #[tokio::test]
    async fn test_division_stats_include_drafts() {
        let pool = init_memory_database().await.unwrap();
        create_submission(&pool, &input(SubmissionStatus::Submitted, 4)).await.unwrap();
        create_submission(&pool, &input(SubmissionStatus::Draft, 6)).await.unwrap();

        let stats = division_stats(&pool, 3, "Kelaniya").await.unwrap();

        assert_eq!(stats.district_name, "Gampaha");
        assert_eq!(stats.total_submissions, 2);
        assert_eq!(stats.team_sports_count, 2);
        assert_eq!(stats.track_field_count, 2);
        assert_eq!(stats.swimming_count, 0);
        assert_eq!(stats.male_participants, 20);
        assert_eq!(stats.female_participants, 4);
        assert_eq!(stats.total_participants, 24);
    }

    #[tokio::test]
    async fn test_division_stats_empty_pair() {
        let pool = init_memory_database().await.unwrap();

        let stats = division_stats(&pool, 3, "Nowhere").await.unwrap();

        assert_eq!(stats.total_submissions, 0);
        assert_eq!(stats.total_participants, 0);
    }
}
