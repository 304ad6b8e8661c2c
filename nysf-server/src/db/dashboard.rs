//! Dashboard summary queries

use nysf_common::Result;
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryStats {
    pub total_submissions: i64,
    pub districts_active: i64,
    pub divisions_active: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct DivisionCount {
    pub division: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistrictStats {
    pub id: i64,
    pub name_en: String,
    pub name_si: String,
    pub submissions_count: i64,
    pub division_breakdown: Vec<DivisionCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub stats: SummaryStats,
    pub district_stats: Vec<DistrictStats>,
}

#[derive(FromRow)]
struct DistrictCountRow {
    id: i64,
    name_en: String,
    name_si: String,
    submissions_count: i64,
}

#[derive(FromRow)]
struct BreakdownRow {
    district_id: i64,
    division: String,
    count: i64,
}

pub async fn load_dashboard(pool: &SqlitePool) -> Result<Dashboard> {
    let (total_submissions, districts_active): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COUNT(DISTINCT district_id) FROM submissions")
            .fetch_one(pool)
            .await?;

    let divisions_active: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM (SELECT DISTINCT district_id, division FROM submissions)",
    )
    .fetch_one(pool)
    .await?;

    let districts: Vec<DistrictCountRow> = sqlx::query_as(
        r#"
        SELECT d.id, d.name_en, d.name_si, COUNT(s.id) AS submissions_count
        FROM districts d
        LEFT JOIN submissions s ON s.district_id = d.id
        GROUP BY d.id
        ORDER BY submissions_count DESC, d.id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let breakdown: Vec<BreakdownRow> = sqlx::query_as(
        r#"
        SELECT district_id, division, COUNT(*) AS count
        FROM submissions
        GROUP BY district_id, division
        ORDER BY count DESC, division
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut by_district: HashMap<i64, Vec<DivisionCount>> = HashMap::new();
    for row in breakdown {
        by_district.entry(row.district_id).or_default().push(DivisionCount {
            division: row.division,
            count: row.count,
        });
    }

    let district_stats = districts
        .into_iter()
        .map(|d| DistrictStats {
            division_breakdown: by_district.remove(&d.id).unwrap_or_default(),
            id: d.id,
            name_en: d.name_en,
            name_si: d.name_si,
            submissions_count: d.submissions_count,
        })
        .collect();

    Ok(Dashboard {
        stats: SummaryStats {
            total_submissions,
            districts_active,
            divisions_active,
        },
        district_stats,
    })
}
