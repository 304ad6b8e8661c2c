//! Minimal SpreadsheetML workbook writer
//!
//! Worksheets are streamed into the zip archive as they are added; only the
//! sheet titles are kept until [`WorkbookWriter::finish`] writes the
//! workbook manifest.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{escape, ExportError};
use crate::matrix::view::{display_count, MatrixView, RowKind};

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Excel's sheet title limit
const MAX_TITLE_CHARS: usize = 31;

/// Division-name column and count-column widths (characters)
const LABEL_COLUMN_WIDTH: f64 = 28.0;
const DATA_COLUMN_WIDTH: f64 = 6.0;

/// Cell style indices into `cellXfs` of [`STYLES_XML`]
const STYLE_HEADER: u32 = 1;
const STYLE_DATA: u32 = 2;
const STYLE_TOTAL: u32 = 3;
const STYLE_LABEL: u32 = 4;
const STYLE_TITLE: u32 = 5;

/// Sport whose column group ends the first printed page
const PAGE_BREAK_SPORT: &str = "Elle";

const STYLES_XML: &str = r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<fonts count="3">
<font><sz val="11"/><name val="Calibri"/></font>
<font><b/><sz val="11"/><name val="Calibri"/></font>
<font><b/><sz val="16"/><name val="Calibri"/></font>
</fonts>
<fills count="2">
<fill><patternFill patternType="none"/></fill>
<fill><patternFill patternType="gray125"/></fill>
</fills>
<borders count="2">
<border><left/><right/><top/><bottom/><diagonal/></border>
<border><left style="thin"><color rgb="FF000000"/></left><right style="thin"><color rgb="FF000000"/></right><top style="thin"><color rgb="FF000000"/></top><bottom style="thin"><color rgb="FF000000"/></bottom><diagonal/></border>
</borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="6">
<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
<xf numFmtId="0" fontId="1" fillId="0" borderId="1" xfId="0" applyFont="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center" vertical="center" wrapText="1"/></xf>
<xf numFmtId="0" fontId="0" fillId="0" borderId="1" xfId="0" applyBorder="1" applyAlignment="1"><alignment horizontal="center"/></xf>
<xf numFmtId="0" fontId="1" fillId="0" borderId="1" xfId="0" applyFont="1" applyBorder="1" applyAlignment="1"><alignment horizontal="center"/></xf>
<xf numFmtId="0" fontId="0" fillId="0" borderId="1" xfId="0" applyBorder="1"/>
<xf numFmtId="0" fontId="2" fillId="0" borderId="0" xfId="0" applyFont="1" applyAlignment="1"><alignment horizontal="center"/></xf>
</cellXfs>
<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>"#;

/// Column letters for a zero-based index: 0 → A, 25 → Z, 26 → AA
pub fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

fn cell_ref(col: usize, row: usize) -> String {
    format!("{}{}", column_name(col), row)
}

/// Sheet title under Excel's rules: no `[]:*?/\`, no leading or trailing
/// `'`, at most 31 characters, unique (case-insensitively) among `used`
pub fn sheet_title(name: &str, used: &HashSet<String>) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'').trim();
    let base: String = if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        let capped: String = cleaned.chars().take(MAX_TITLE_CHARS).collect();
        capped.trim_end().trim_end_matches('\'').to_string()
    };

    let taken = |title: &str| used.contains(&title.to_lowercase());
    if !taken(base.as_str()) {
        return base;
    }

    (2..)
        .map(|n| {
            let suffix = format!(" ({})", n);
            let keep = MAX_TITLE_CHARS - suffix.chars().count();
            let stem: String = base.chars().take(keep).collect();
            format!("{}{}", stem.trim_end(), suffix)
        })
        .find(|candidate| !taken(candidate.as_str()))
        .unwrap_or_else(|| base.clone())
}

/// Accumulates one worksheet's XML
struct SheetBuilder {
    rows: String,
    merges: Vec<String>,
}

impl SheetBuilder {
    fn new() -> Self {
        Self {
            rows: String::new(),
            merges: Vec::new(),
        }
    }

    fn row(&mut self, r: usize, cells: &[(usize, Cell, u32)]) {
        self.rows.push_str(&format!("<row r=\"{}\">", r));
        for (col, cell, style) in cells {
            let reference = cell_ref(*col, r);
            match cell {
                Cell::Text(text) => self.rows.push_str(&format!(
                    "<c r=\"{}\" s=\"{}\" t=\"inlineStr\"><is><t>{}</t></is></c>",
                    reference,
                    style,
                    escape(text)
                )),
                Cell::Number(n) => self.rows.push_str(&format!(
                    "<c r=\"{}\" s=\"{}\"><v>{}</v></c>",
                    reference, style, n
                )),
                Cell::Blank => self
                    .rows
                    .push_str(&format!("<c r=\"{}\" s=\"{}\"/>", reference, style)),
            }
        }
        self.rows.push_str("</row>");
    }

    fn merge(&mut self, from: (usize, usize), to: (usize, usize)) {
        self.merges
            .push(format!("{}:{}", cell_ref(from.0, from.1), cell_ref(to.0, to.1)));
    }
}

enum Cell {
    Text(String),
    Number(u64),
    Blank,
}

/// A count cell: the number itself, or `-` for zero
fn count_cell(n: u64) -> Cell {
    if n == 0 {
        Cell::Text(display_count(n))
    } else {
        Cell::Number(n)
    }
}

/// One district's matrix as a landscape worksheet
///
/// Header rows: title, sport names (4 columns each), Men/Women, Team/Part.
/// Body: the view's rows in order, with the totals row in bold.
pub fn matrix_sheet_xml(district_name: &str, view: &MatrixView) -> String {
    let last_col = view.columns.len() * 4;
    let mut sheet = SheetBuilder::new();

    sheet.row(
        1,
        &[(
            0,
            Cell::Text(format!(
                "Sports Participation Matrix - District: {}",
                district_name
            )),
            STYLE_TITLE,
        )],
    );
    sheet.merge((0, 1), (last_col, 1));

    let mut names = vec![(0, Cell::Text("Division Name".to_string()), STYLE_HEADER)];
    let mut genders = vec![(0, Cell::Blank, STYLE_HEADER)];
    let mut kinds = vec![(0, Cell::Blank, STYLE_HEADER)];
    for (i, column) in view.columns.iter().enumerate() {
        let first = 1 + i * 4;
        names.push((first, Cell::Text(column.name_en.clone()), STYLE_HEADER));
        for offset in 1..4 {
            names.push((first + offset, Cell::Blank, STYLE_HEADER));
        }
        genders.push((first, Cell::Text("Men".to_string()), STYLE_HEADER));
        genders.push((first + 1, Cell::Blank, STYLE_HEADER));
        genders.push((first + 2, Cell::Text("Women".to_string()), STYLE_HEADER));
        genders.push((first + 3, Cell::Blank, STYLE_HEADER));
        for offset in 0..4 {
            let label = if offset % 2 == 0 { "Team" } else { "Part." };
            kinds.push((first + offset, Cell::Text(label.to_string()), STYLE_HEADER));
        }
    }
    sheet.row(2, &names);
    sheet.row(3, &genders);
    sheet.row(4, &kinds);

    sheet.merge((0, 2), (0, 4));
    for i in 0..view.columns.len() {
        let first = 1 + i * 4;
        sheet.merge((first, 2), (first + 3, 2));
        sheet.merge((first, 3), (first + 1, 3));
        sheet.merge((first + 2, 3), (first + 3, 3));
    }

    for (offset, row) in view.rows.iter().enumerate() {
        let (label_style, value_style) = match row.kind {
            RowKind::Total => (STYLE_TOTAL, STYLE_TOTAL),
            _ => (STYLE_LABEL, STYLE_DATA),
        };
        let mut cells = vec![(0, Cell::Text(row.label.clone()), label_style)];
        for (i, cell) in row.cells.iter().enumerate() {
            let first = 1 + i * 4;
            cells.push((first, count_cell(cell.men_teams), value_style));
            cells.push((first + 1, count_cell(cell.men_participants), value_style));
            cells.push((first + 2, count_cell(cell.women_teams), value_style));
            cells.push((first + 3, count_cell(cell.women_participants), value_style));
        }
        sheet.row(5 + offset, &cells);
    }

    let mut xml = String::with_capacity(sheet.rows.len() + 1024);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(
        "<worksheet xmlns=\"{}\" xmlns:r=\"{}\">",
        MAIN_NS, REL_NS
    ));
    xml.push_str("<cols>");
    xml.push_str(&format!(
        "<col min=\"1\" max=\"1\" width=\"{}\" customWidth=\"1\"/>",
        LABEL_COLUMN_WIDTH
    ));
    if last_col > 0 {
        xml.push_str(&format!(
            "<col min=\"2\" max=\"{}\" width=\"{}\" customWidth=\"1\"/>",
            last_col + 1,
            DATA_COLUMN_WIDTH
        ));
    }
    xml.push_str("</cols>");
    xml.push_str("<sheetData>");
    xml.push_str(&sheet.rows);
    xml.push_str("</sheetData>");

    xml.push_str(&format!("<mergeCells count=\"{}\">", sheet.merges.len()));
    for merge in &sheet.merges {
        xml.push_str(&format!("<mergeCell ref=\"{}\"/>", merge));
    }
    xml.push_str("</mergeCells>");

    xml.push_str(
        r#"<pageMargins left="0.25" right="0.25" top="0.5" bottom="0.5" header="0.3" footer="0.3"/>"#,
    );
    xml.push_str(r#"<pageSetup paperSize="9" orientation="landscape"/>"#);

    if let Some(i) = view
        .columns
        .iter()
        .position(|c| c.name_en.contains(PAGE_BREAK_SPORT))
    {
        // brk id counts the columns left of the break
        let after = 1 + (i + 1) * 4;
        xml.push_str(&format!(
            "<colBreaks count=\"1\" manualBreakCount=\"1\"><brk id=\"{}\" max=\"1048575\" man=\"1\"/></colBreaks>",
            after
        ));
    }

    xml.push_str("</worksheet>");
    xml
}

/// Streams worksheets into an in-memory xlsx archive
pub struct WorkbookWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    titles: Vec<String>,
    used: HashSet<String>,
}

impl WorkbookWriter {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            titles: Vec::new(),
            used: HashSet::new(),
        }
    }

    fn options() -> SimpleFileOptions {
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
    }

    fn write_part(&mut self, name: &str, content: &str) -> Result<(), ExportError> {
        self.zip.start_file(name, Self::options())?;
        self.zip.write_all(content.as_bytes())?;
        Ok(())
    }

    /// Write one worksheet; returns the title actually used
    pub fn add_sheet(&mut self, name: &str, sheet_xml: &str) -> Result<String, ExportError> {
        let title = sheet_title(name, &self.used);
        let index = self.titles.len() + 1;
        self.write_part(&format!("xl/worksheets/sheet{}.xml", index), sheet_xml)?;
        self.used.insert(title.to_lowercase());
        self.titles.push(title.clone());
        Ok(title)
    }

    pub fn sheet_count(&self) -> usize {
        self.titles.len()
    }

    /// Write the manifest parts and return the archive bytes
    pub fn finish(mut self) -> Result<Vec<u8>, ExportError> {
        if self.titles.is_empty() {
            let empty = format!(
                "{}<worksheet xmlns=\"{}\"><sheetData/></worksheet>",
                XML_DECL, MAIN_NS
            );
            self.add_sheet("Sheet1", &empty)?;
        }

        let count = self.titles.len();

        let mut content_types = String::from(XML_DECL);
        content_types.push_str(
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        );
        content_types.push_str(r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
        content_types.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
        content_types.push_str(r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#);
        content_types.push_str(r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#);
        for i in 1..=count {
            content_types.push_str(&format!(
                r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i
            ));
        }
        content_types.push_str("</Types>");
        self.write_part("[Content_Types].xml", &content_types)?;

        let root_rels = format!(
            "{}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">\
             <Relationship Id=\"rId1\" Type=\"{}/officeDocument\" Target=\"xl/workbook.xml\"/>\
             </Relationships>",
            XML_DECL, REL_NS
        );
        self.write_part("_rels/.rels", &root_rels)?;

        let mut workbook = format!(
            "{}<workbook xmlns=\"{}\" xmlns:r=\"{}\"><sheets>",
            XML_DECL, MAIN_NS, REL_NS
        );
        for (i, title) in self.titles.iter().enumerate() {
            workbook.push_str(&format!(
                "<sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>",
                escape(title),
                i + 1,
                i + 1
            ));
        }
        workbook.push_str("</sheets></workbook>");
        self.write_part("xl/workbook.xml", &workbook)?;

        let mut rels = format!(
            "{}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
            XML_DECL
        );
        for i in 1..=count {
            rels.push_str(&format!(
                "<Relationship Id=\"rId{}\" Type=\"{}/worksheet\" Target=\"worksheets/sheet{}.xml\"/>",
                i, REL_NS, i
            ));
        }
        rels.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"{}/styles\" Target=\"styles.xml\"/>",
            count + 1,
            REL_NS
        ));
        rels.push_str("</Relationships>");
        self.write_part("xl/_rels/workbook.xml.rels", &rels)?;

        self.write_part("xl/styles.xml", &format!("{}{}", XML_DECL, STYLES_XML))?;

        Ok(self.zip.finish()?.into_inner())
    }
}

impl Default for WorkbookWriter {
    fn default() -> Self {
        Self::new()
    }
}
