//! Bulk submission document, one printed page per submission

use chrono::{Local, NaiveDateTime};
use nysf_common::db::{EventRecord, FinancialRecord};
use sqlx::SqlitePool;
use std::fmt::Write as _;
use tracing::info;

use super::{escape, ExportError};
use crate::db::submissions::{all_submission_ids, get_submission_detail, SubmissionDetail, TeamSportDetail};

const BULK_STYLE: &str = "
@page { size: A4; margin: 12mm; }
body { font-family: 'Noto Sans Sinhala', sans-serif; font-size: 11px; }
.page { page-break-after: always; }
.page:last-child { page-break-after: auto; }
h1 { font-size: 16px; text-align: center; margin: 0 0 4px; }
h2 { font-size: 13px; border-bottom: 1px solid #333; margin: 12px 0 4px; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #666; padding: 3px 4px; }
th { background: #eee; }
td.num { text-align: right; }
table.info td.key { width: 35%; font-weight: bold; }
.footer { margin-top: 16px; font-size: 9px; color: #555; text-align: center; }
";

fn text(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => escape(v),
        _ => "-".to_string(),
    }
}

fn number(value: Option<i64>) -> i64 {
    value.unwrap_or(0)
}

fn info_table(detail: &SubmissionDetail, out: &mut String) {
    let s = &detail.submission;
    let district = detail
        .district
        .as_ref()
        .map(|d| format!("{} / {}", escape(&d.name_si), escape(&d.name_en)))
        .unwrap_or_else(|| "-".to_string());
    let submitted = s
        .submitted_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());

    out.push_str("<h2>සාමාන්‍ය තොරතුරු / General Information</h2>\n<table class=\"info\">\n");
    for (key, value) in [
        ("දිස්ත්‍රික්කය / District", district),
        ("කොට්ඨාසය / Division", escape(&s.division)),
        ("නිලධාරියාගේ නම / Officer Name", escape(&s.officer_name)),
        ("තනතුර / Designation", s.designation.as_str().to_string()),
        ("EPF අංකය / EPF Number", escape(&s.epf_number)),
        ("තත්ත්වය / Status", s.status.as_str().to_string()),
        ("ඉදිරිපත් කළ දිනය / Submitted At", submitted),
    ] {
        let _ = writeln!(out, "<tr><td class=\"key\">{}</td><td>{}</td></tr>", key, value);
    }
    out.push_str("</table>\n");
}

fn count_cells(
    out: &mut String,
    teams_male: Option<i64>,
    teams_female: Option<i64>,
    players_male: Option<i64>,
    players_female: Option<i64>,
) {
    for n in [teams_male, teams_female, players_male, players_female] {
        let _ = write!(out, "<td class=\"num\">{}</td>", number(n));
    }
}

const COUNT_HEADERS: &str = "<th>Teams (M)</th><th>Teams (F)</th><th>Players (M)</th><th>Players (F)</th>";

fn team_table(rows: &[TeamSportDetail], out: &mut String) {
    out.push_str("<h2>කණ්ඩායම් ක්‍රීඩා / Team Sports</h2>\n");
    if rows.is_empty() {
        out.push_str("<p>-</p>\n");
        return;
    }
    let _ = writeln!(
        out,
        "<table>\n<tr><th>Sport</th><th>Date</th><th>Venue</th>{}</tr>",
        COUNT_HEADERS
    );
    for row in rows {
        let sport = match (&row.sport_name_en, &row.sport_name_si) {
            (Some(en), Some(si)) => format!("{} / {}", escape(en), escape(si)),
            (Some(name), None) | (None, Some(name)) => escape(name),
            (None, None) => format!("#{}", row.record.sport_id),
        };
        let r = &row.record;
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td>",
            sport,
            r.event_date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
            text(r.venue.as_deref())
        );
        count_cells(out, r.teams_male, r.teams_female, r.players_male, r.players_female);
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
}

fn event_table(heading: &str, rows: &[EventRecord], out: &mut String) {
    let _ = writeln!(out, "<h2>{}</h2>", heading);
    if rows.is_empty() {
        out.push_str("<p>-</p>\n");
        return;
    }
    let _ = writeln!(
        out,
        "<table>\n<tr><th>Event</th><th>Date</th><th>Venue</th>{}</tr>",
        COUNT_HEADERS
    );
    for r in rows {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td>",
            text(r.event_name.as_deref()),
            r.event_date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
            text(r.venue.as_deref())
        );
        count_cells(out, r.teams_male, r.teams_female, r.players_male, r.players_female);
        out.push_str("</tr>\n");
    }
    out.push_str("</table>\n");
}

fn financial_table(financial: Option<&FinancialRecord>, out: &mut String) {
    out.push_str("<h2>මූල්‍ය සාරාංශය / Financial Summary</h2>\n");
    let Some(f) = financial else {
        out.push_str("<p>-</p>\n");
        return;
    };
    out.push_str("<table class=\"info\">\n");
    for (key, amount) in [
        ("Income - Head Office", f.income_head_office),
        ("Income - External Sources", f.income_external_sources),
        ("Total Income", f.total_income),
        ("Expense - Team Sports", f.expense_team_sports),
        ("Expense - Track & Field", f.expense_track_field),
        ("Total Expense", f.total_expense),
    ] {
        let _ = writeln!(
            out,
            "<tr><td class=\"key\">{}</td><td class=\"num\">{}</td></tr>",
            escape(key),
            amount
        );
    }
    out.push_str("</table>\n");
}

/// One `.page` section for a submission
pub fn submission_page(detail: &SubmissionDetail, generated_at: NaiveDateTime) -> String {
    let mut out = String::new();
    out.push_str("<section class=\"page\">\n");
    out.push_str("<h1>35 වන ජාතික යෞවන ක්‍රීඩා උළෙල 2025 / 35th National Youth Sports Festival 2025</h1>\n");

    info_table(detail, &mut out);
    team_table(&detail.team_sports, &mut out);
    event_table("පිහිනුම් / Swimming", &detail.swimming, &mut out);
    event_table("මලල ක්‍රීඩා / Track & Field", &detail.track_field, &mut out);
    financial_table(detail.financial.as_ref(), &mut out);

    let _ = writeln!(
        out,
        "<div class=\"footer\">Generated on {} | ID: {}</div>",
        generated_at.format("%Y-%m-%d %H:%M:%S"),
        detail.submission.id
    );
    out.push_str("</section>\n");
    out
}

/// Wrap rendered pages into a complete document
pub fn bulk_document(pages: &[String]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Submissions</title>\n");
    let _ = writeln!(html, "<style>{}</style>", BULK_STYLE);
    html.push_str("</head>\n<body>\n");
    for page in pages {
        html.push_str(page);
    }
    html.push_str("</body>\n</html>\n");
    html
}

/// Every submission, oldest first, as one paginated document
pub async fn export_submissions(pool: &SqlitePool) -> Result<String, ExportError> {
    let generated_at = Local::now().naive_local();
    let ids = all_submission_ids(pool).await?;

    let mut pages = Vec::with_capacity(ids.len());
    for id in ids {
        // Deleted between the id scan and this read
        if let Some(detail) = get_submission_detail(pool, id).await? {
            pages.push(submission_page(&detail, generated_at));
        }
    }

    info!("Rendered bulk submission document with {} pages", pages.len());
    Ok(bulk_document(&pages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use nysf_common::db::{
        Designation, District, Money, Submission, SubmissionStatus, TeamSportRecord,
    };

    fn timestamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn detail() -> SubmissionDetail {
        SubmissionDetail {
            submission: Submission {
                id: 42,
                district_id: 2,
                division: "Homagama".to_string(),
                officer_name: "N. <Silva>".to_string(),
                designation: Designation::Dyo,
                epf_number: "E-9".to_string(),
                status: SubmissionStatus::Submitted,
                submitted_at: Some(timestamp()),
                created_at: timestamp(),
                updated_at: timestamp(),
            },
            district: Some(District {
                id: 2,
                name_si: "කොළඹ".to_string(),
                name_en: "Colombo".to_string(),
            }),
            team_sports: vec![TeamSportDetail {
                record: TeamSportRecord {
                    id: 1,
                    submission_id: 42,
                    sport_id: 53,
                    event_date: None,
                    venue: Some("Hall".to_string()),
                    teams_male: Some(2),
                    teams_female: None,
                    players_male: Some(24),
                    players_female: None,
                },
                sport_code: Some(53),
                sport_name_en: Some("Basketball".to_string()),
                sport_name_si: None,
            }],
            swimming: vec![],
            track_field: vec![],
            financial: Some(FinancialRecord {
                submission_id: 42,
                income_head_office: Money::from_cents(10_000),
                income_external_sources: Money::from_cents(5_000),
                total_income: Money::from_cents(15_000),
                expense_team_sports: Money::ZERO,
                expense_track_field: Money::ZERO,
                total_expense: Money::ZERO,
            }),
        }
    }

    #[test]
    fn test_page_sections_and_footer() {
        let page = submission_page(&detail(), timestamp());

        assert!(page.contains("N. &lt;Silva&gt;"));
        assert!(page.contains("<td>Basketball</td>"));
        assert!(page.contains("<td class=\"num\">24</td>"));
        assert!(page.contains("<td class=\"key\">Total Income</td><td class=\"num\">150.00</td>"));
        assert!(page.contains("Generated on 2025-03-14 09:30:00 | ID: 42"));
    }

    #[test]
    fn test_document_one_page_per_submission() {
        let pages = vec![
            submission_page(&detail(), timestamp()),
            submission_page(&detail(), timestamp()),
        ];
        let html = bulk_document(&pages);

        assert_eq!(html.matches("<section class=\"page\">").count(), 2);
        assert!(html.contains("page-break-after: always"));
    }
}
