//! District and sport catalog reads

use nysf_common::db::{District, Sport};
use nysf_common::Result;
use sqlx::SqlitePool;
use std::collections::HashSet;

use crate::matrix::ordering::compare_names;

/// All districts, ordered by local-language name
///
/// SQLite's default collation is bytewise, so ordering happens here.
pub async fn list_districts(pool: &SqlitePool) -> Result<Vec<District>> {
    let mut districts: Vec<District> =
        sqlx::query_as("SELECT id, name_si, name_en FROM districts")
            .fetch_all(pool)
            .await?;

    districts.sort_by(|a, b| compare_names(&a.name_si, &b.name_si).then(a.id.cmp(&b.id)));
    Ok(districts)
}

/// Real catalog sports ordered by code
pub async fn list_sports(pool: &SqlitePool) -> Result<Vec<Sport>> {
    let sports = sqlx::query_as("SELECT id, code, name_si, name_en FROM sports ORDER BY code")
        .fetch_all(pool)
        .await?;
    Ok(sports)
}

pub async fn get_district(pool: &SqlitePool, id: i64) -> Result<Option<District>> {
    let district = sqlx::query_as("SELECT id, name_si, name_en FROM districts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(district)
}

/// Ids of every sport currently in the catalog
pub async fn sport_ids(pool: &SqlitePool) -> Result<HashSet<i64>> {
    let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM sports")
        .fetch_all(pool)
        .await?;
    Ok(ids.into_iter().collect())
}
