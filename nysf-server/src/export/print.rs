//! Print view of one district's matrix

use nysf_common::db::District;

use super::escape;
use crate::matrix::view::{display_count, MatrixView, RowKind};

const PRINT_STYLE: &str = "
@page { size: A4 landscape; margin: 10mm; }
body { font-family: 'Noto Sans Sinhala', sans-serif; font-size: 10px; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #000; padding: 2px 3px; text-align: center; }
td.label { text-align: left; white-space: nowrap; }
th.men { color: #1d4ed8; }
th.women { color: #be185d; }
tr.total td { font-weight: bold; }
h1 { font-size: 16px; text-align: center; }
";

/// Standalone HTML document; zero counts render as `-`
pub fn matrix_print_html(district: Option<&District>, view: &MatrixView) -> String {
    let title = match district {
        Some(d) => format!("Sports Participation Matrix - District: {}", d.name_en),
        None => "Sports Participation Matrix".to_string(),
    };

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(&title)));
    html.push_str(&format!("<style>{}</style>\n", PRINT_STYLE));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape(&title)));

    html.push_str("<table>\n<thead>\n<tr><th rowspan=\"3\">Division Name</th>");
    for column in &view.columns {
        html.push_str(&format!(
            "<th colspan=\"4\">{}<br>{}</th>",
            escape(&column.name_en),
            escape(&column.name_si)
        ));
    }
    html.push_str("</tr>\n<tr>");
    for _ in &view.columns {
        html.push_str("<th class=\"men\" colspan=\"2\">Men</th><th class=\"women\" colspan=\"2\">Women</th>");
    }
    html.push_str("</tr>\n<tr>");
    for _ in &view.columns {
        html.push_str("<th>Team</th><th>Part.</th><th>Team</th><th>Part.</th>");
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in &view.rows {
        let class = match row.kind {
            RowKind::Division => "division",
            RowKind::Total => "total",
            RowKind::DistrictLevel => "district-level",
        };
        html.push_str(&format!(
            "<tr class=\"{}\"><td class=\"label\">{}</td>",
            class,
            escape(&row.label)
        ));
        for cell in &row.cells {
            for n in [
                cell.men_teams,
                cell.men_participants,
                cell.women_teams,
                cell.women_participants,
            ] {
                html.push_str(&format!("<td>{}</td>", display_count(n)));
            }
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::normalize::NormalizedTuple;
    use crate::matrix::{ColumnSport, Matrix, MatrixCell, SportKey};

    #[test]
    fn test_print_rows_and_dashes() {
        let matrix = Matrix::fold(vec![
            NormalizedTuple {
                division: "District Level".to_string(),
                sport: SportKey(51),
                cell: MatrixCell {
                    women_participants: 4,
                    ..MatrixCell::ZERO
                },
            },
            NormalizedTuple {
                division: "Zeta & Co".to_string(),
                sport: SportKey(51),
                cell: MatrixCell {
                    men_teams: 1,
                    ..MatrixCell::ZERO
                },
            },
        ]);
        let columns = vec![ColumnSport {
            id: SportKey(51),
            code: "51".to_string(),
            name_en: "Kabaddi".to_string(),
            name_si: "කබඩි".to_string(),
            pseudo: false,
        }];
        let district = District {
            id: 2,
            name_si: "කොළඹ".to_string(),
            name_en: "Colombo".to_string(),
        };

        let html = matrix_print_html(Some(&district), &MatrixView::project(&matrix, columns));

        assert!(html.contains("District: Colombo"));
        assert!(html.contains(
            "<tr class=\"division\"><td class=\"label\">Zeta &amp; Co</td><td>1</td><td>-</td><td>-</td><td>-</td></tr>"
        ));
        let total = html.find("class=\"total\"").unwrap();
        let pinned = html.find("class=\"district-level\"").unwrap();
        assert!(total < pinned);
    }
}
