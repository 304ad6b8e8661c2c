//! Database initialization
//!
//! Creates the database file on first run, applies connection pragmas,
//! creates every table idempotently and seeds the district list and the
//! sport catalog.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Districts as (local-language name, English name); ids follow list order
const DISTRICTS: [(&str, &str); 26] = [
    ("නාගරික තරුණයා", "Urban youth"),
    ("කොළඹ", "Colombo"),
    ("ගම්පහ", "Gampaha"),
    ("කළුතර", "Kalutara"),
    ("මහනුවර", "Kandy"),
    ("මාතලේ", "Matale"),
    ("නුවරඑළිය", "Nuwara Eliya"),
    ("ගාල්ල", "Galle"),
    ("මාතර", "Matara"),
    ("හම්බන්තොට", "Hambantota"),
    ("යාපනය", "Jaffna"),
    ("කිලිනොච්චි", "Kilinochchi"),
    ("මන්නාරම", "Mannar"),
    ("වව්නියාව", "Vavuniya"),
    ("මුලතිව්", "Mullaitivu"),
    ("බත්තිකලෝව", "Batticaloa"),
    ("අම්පාර", "Ampara"),
    ("ත්‍රිකුණාමලය", "Trincomalee"),
    ("කුරුණෑගල", "Kurunegala"),
    ("පුත්තලම", "Puttalam"),
    ("අනුරාධපුර", "Anuradhapura"),
    ("පොළොන්නරුව", "Polonnaruwa"),
    ("බදුල්ල", "Badulla"),
    ("මොණරාගල", "Monaragala"),
    ("රත්නපුර", "Ratnapura"),
    ("කෑගල්ල", "Kegalle"),
];

/// Team sports as (code, local-language name, English name); id = code
const SPORTS: [(i64, &str, &str); 12] = [
    (51, "කබඩි", "Kabaddi"),
    (52, "දැල්පන්දු", "Netball"),
    (53, "පැසිපන්දු", "Basketball"),
    (54, "වොලිබොල්", "Volleyball"),
    (55, "පාපන්දු", "Football"),
    (56, "ක්‍රිකට්", "Cricket"),
    (57, "එල්ලේ", "Elle"),
    (58, "කැරම්", "Carrom"),
    (59, "වෙරළ වොලිබොල්", "Beach Volleyball"),
    (60, "කඹ ඇදීම", "Tug of War"),
    (70, "චෙස්", "Chess"),
    (71, "බැට්මින්ටන්", "Badminton"),
];

/// Open (creating if needed) the database file and bring the schema up to date
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL allows report reads while a submission write is in flight
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;
    seed_catalog(&pool).await?;

    Ok(pool)
}

/// Single-connection in-memory database with schema and seed catalog
///
/// Every pooled connection to `sqlite::memory:` is a separate database, so
/// the pool is capped at one connection.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;
    seed_catalog(&pool).await?;

    Ok(pool)
}

/// Create all tables (idempotent - safe to call multiple times)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_districts_table(pool).await?;
    create_sports_table(pool).await?;
    create_submissions_table(pool).await?;
    create_team_sports_data_table(pool).await?;
    create_event_table(pool, "swimming_data").await?;
    create_event_table(pool, "track_field_data").await?;
    create_financial_data_table(pool).await?;
    Ok(())
}

async fn create_districts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS districts (
            id INTEGER PRIMARY KEY,
            name_si TEXT NOT NULL,
            name_en TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_sports_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sports (
            id INTEGER PRIMARY KEY,
            code INTEGER NOT NULL UNIQUE,
            name_si TEXT NOT NULL,
            name_en TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_submissions_table(pool: &SqlitePool) -> Result<()> {
    // AUTOINCREMENT keeps ids monotonic even after deletes; the latest-submission
    // resolver relies on that ordering
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS submissions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            district_id INTEGER NOT NULL REFERENCES districts(id) ON DELETE CASCADE,
            division TEXT NOT NULL,
            officer_name TEXT NOT NULL,
            designation TEXT NOT NULL CHECK (designation IN ('AD', 'DYO', 'YSO', 'AYSO')),
            epf_number TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'draft' CHECK (status IN ('draft', 'submitted')),
            submitted_at TIMESTAMP,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_submissions_district_division
         ON submissions(district_id, division)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_team_sports_data_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS team_sports_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            submission_id INTEGER NOT NULL REFERENCES submissions(id) ON DELETE CASCADE,
            sport_id INTEGER NOT NULL REFERENCES sports(id) ON DELETE CASCADE,
            event_date DATE,
            venue TEXT,
            teams_male INTEGER DEFAULT 0 CHECK (teams_male >= 0),
            teams_female INTEGER DEFAULT 0 CHECK (teams_female >= 0),
            players_male INTEGER DEFAULT 0 CHECK (players_male >= 0),
            players_female INTEGER DEFAULT 0 CHECK (players_female >= 0),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_team_sports_data_submission
         ON team_sports_data(submission_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Swimming and track & field rows share one shape
async fn create_event_table(pool: &SqlitePool, table: &str) -> Result<()> {
    let ddl = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            submission_id INTEGER NOT NULL REFERENCES submissions(id) ON DELETE CASCADE,
            event_date DATE,
            venue TEXT,
            event_name TEXT,
            teams_male INTEGER DEFAULT 0 CHECK (teams_male >= 0),
            teams_female INTEGER DEFAULT 0 CHECK (teams_female >= 0),
            players_male INTEGER DEFAULT 0 CHECK (players_male >= 0),
            players_female INTEGER DEFAULT 0 CHECK (players_female >= 0),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#
    );
    sqlx::query(&ddl).execute(pool).await?;

    let index = format!(
        "CREATE INDEX IF NOT EXISTS idx_{table}_submission ON {table}(submission_id)"
    );
    sqlx::query(&index).execute(pool).await?;

    Ok(())
}

async fn create_financial_data_table(pool: &SqlitePool) -> Result<()> {
    // Amounts are stored in hundredths
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS financial_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            submission_id INTEGER NOT NULL UNIQUE REFERENCES submissions(id) ON DELETE CASCADE,
            income_head_office INTEGER NOT NULL DEFAULT 0,
            income_external_sources INTEGER NOT NULL DEFAULT 0,
            total_income INTEGER NOT NULL DEFAULT 0,
            expense_team_sports INTEGER NOT NULL DEFAULT 0,
            expense_track_field INTEGER NOT NULL DEFAULT 0,
            total_expense INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Seed districts and sports (idempotent)
pub async fn seed_catalog(pool: &SqlitePool) -> Result<()> {
    let mut inserted = 0u64;

    for (index, (name_si, name_en)) in DISTRICTS.iter().enumerate() {
        inserted += sqlx::query(
            "INSERT OR IGNORE INTO districts (id, name_si, name_en) VALUES (?, ?, ?)",
        )
        .bind(index as i64 + 1)
        .bind(*name_si)
        .bind(*name_en)
        .execute(pool)
        .await?
        .rows_affected();
    }

    for (code, name_si, name_en) in SPORTS.iter() {
        inserted += sqlx::query(
            "INSERT OR IGNORE INTO sports (id, code, name_si, name_en) VALUES (?, ?, ?, ?)",
        )
        .bind(*code)
        .bind(*code)
        .bind(*name_si)
        .bind(*name_en)
        .execute(pool)
        .await?
        .rows_affected();
    }

    if inserted > 0 {
        info!("Seeded {} catalog rows", inserted);
    }

    Ok(())
}
