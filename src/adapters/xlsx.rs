//! Minimal SpreadsheetML writer for the two report sheets.
//!
//! The workbook is a ZIP container of XML parts. Strings are written inline,
//! so no shared-strings part is needed.

use crate::adapters::markup::is_xml_char;
use crate::domain::model::{Artifact, Cell, Table, TransformResult};
use crate::domain::ports::Renderer;
use crate::utils::error::Result;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

// Indexes into cellXfs of styles.xml.
const STYLE_DEFAULT: u8 = 0;
const STYLE_HEADER: u8 = 1;
const STYLE_BODY: u8 = 2;
const STYLE_PERCENT: u8 = 3;
const STYLE_HEADER_NO_BORDER: u8 = 4;

/// Per-sheet formatting: which columns show percentages and which are
/// spacer columns without borders.
#[derive(Debug, Clone, Default)]
pub struct SheetLayout {
    pub percent_columns: Vec<usize>,
    pub borderless_columns: Vec<usize>,
}

impl SheetLayout {
    fn header_style(&self, column: usize) -> u8 {
        if self.borderless_columns.contains(&column) {
            STYLE_HEADER_NO_BORDER
        } else {
            STYLE_HEADER
        }
    }

    fn body_style(&self, column: usize) -> u8 {
        if self.borderless_columns.contains(&column) {
            STYLE_DEFAULT
        } else if self.percent_columns.contains(&column) {
            STYLE_PERCENT
        } else {
            STYLE_BODY
        }
    }
}

#[derive(Debug, Clone)]
pub struct XlsxRenderer {
    file_name: String,
}

impl Default for XlsxRenderer {
    fn default() -> Self {
        Self::new("report.xlsx")
    }
}

impl XlsxRenderer {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    pub fn workbook(&self, sheets: &[(&Table, SheetLayout)]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        let mut parts = vec![
            ("[Content_Types].xml".to_string(), content_types(sheets.len())),
            ("_rels/.rels".to_string(), root_rels()),
            ("xl/workbook.xml".to_string(), workbook_xml(sheets)),
            ("xl/_rels/workbook.xml.rels".to_string(), workbook_rels(sheets.len())),
            ("xl/styles.xml".to_string(), styles_xml()),
        ];
        for (i, (table, layout)) in sheets.iter().enumerate() {
            parts.push((
                format!("xl/worksheets/sheet{}.xml", i + 1),
                sheet_xml(table, layout),
            ));
        }

        for (name, xml) in parts {
            zip.start_file::<_, ()>(name, FileOptions::default())?;
            zip.write_all(xml.as_bytes())?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Renderer for XlsxRenderer {
    fn format(&self) -> &'static str {
        "xlsx"
    }

    fn render(&self, result: &TransformResult) -> Result<Vec<Artifact>> {
        let years_layout = SheetLayout::default();
        let cities_layout = SheetLayout {
            percent_columns: vec![4],
            borderless_columns: vec![2],
        };
        let content = self.workbook(&[
            (&result.tables.years, years_layout),
            (&result.tables.cities, cities_layout),
        ])?;

        Ok(vec![Artifact {
            file_name: self.file_name.clone(),
            content,
        }])
    }
}

/// Spreadsheet column name for a zero-based index: 0 → A, 26 → AA.
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}

/// XML entity escaping plus the OOXML `_xHHHH_` form for characters XML
/// cannot carry. A literal `_xHHHH_` in the text gets its underscore escaped
/// so Excel does not decode it.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for (i, ch) in text.char_indices() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '_' if looks_like_ooxml_escape(&text[i..]) => escaped.push_str("_x005F_"),
            c if !is_xml_char(c) => escaped.push_str(&format!("_x{:04X}_", c as u32)),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn looks_like_ooxml_escape(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= 7
        && bytes[1] == b'x'
        && bytes[2..6].iter().all(u8::is_ascii_hexdigit)
        && bytes[6] == b'_'
}

fn content_types(sheet_count: usize) -> String {
    let mut xml = format!(
        "{}<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">\
         <Default Extension=\"rels\" ContentType=\"application/vnd.openxmlformats-package.relationships+xml\"/>\
         <Default Extension=\"xml\" ContentType=\"application/xml\"/>\
         <Override PartName=\"/xl/workbook.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml\"/>\
         <Override PartName=\"/xl/styles.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml\"/>",
        XML_HEADER
    );
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            "<Override PartName=\"/xl/worksheets/sheet{}.xml\" ContentType=\"application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml\"/>",
            i
        ));
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels() -> String {
    format!(
        "{}<Relationships xmlns=\"{}\">\
         <Relationship Id=\"rId1\" Type=\"{}/officeDocument\" Target=\"xl/workbook.xml\"/>\
         </Relationships>",
        XML_HEADER, PACKAGE_REL_NS, REL_NS
    )
}

fn workbook_xml(sheets: &[(&Table, SheetLayout)]) -> String {
    let mut xml = format!(
        "{}<workbook xmlns=\"{}\" xmlns:r=\"{}\"><sheets>",
        XML_HEADER, MAIN_NS, REL_NS
    );
    for (i, (table, _)) in sheets.iter().enumerate() {
        xml.push_str(&format!(
            "<sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>",
            escape(&table.title),
            i + 1,
            i + 1
        ));
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels(sheet_count: usize) -> String {
    let mut xml = format!("{}<Relationships xmlns=\"{}\">", XML_HEADER, PACKAGE_REL_NS);
    for i in 1..=sheet_count {
        xml.push_str(&format!(
            "<Relationship Id=\"rId{}\" Type=\"{}/worksheet\" Target=\"worksheets/sheet{}.xml\"/>",
            i, REL_NS, i
        ));
    }
    xml.push_str(&format!(
        "<Relationship Id=\"rId{}\" Type=\"{}/styles\" Target=\"styles.xml\"/>",
        sheet_count + 1,
        REL_NS
    ));
    xml.push_str("</Relationships>");
    xml
}

fn styles_xml() -> String {
    let thin = |side: &str| format!("<{0} style=\"thin\"><color rgb=\"FF000000\"/></{0}>", side);
    format!(
        "{header}<styleSheet xmlns=\"{ns}\">\
         <fonts count=\"2\">\
         <font><sz val=\"11\"/><name val=\"Calibri\"/></font>\
         <font><b/><sz val=\"11\"/><name val=\"Calibri\"/></font>\
         </fonts>\
         <fills count=\"2\"><fill><patternFill patternType=\"none\"/></fill><fill><patternFill patternType=\"gray125\"/></fill></fills>\
         <borders count=\"2\">\
         <border><left/><right/><top/><bottom/><diagonal/></border>\
         <border>{left}{right}{top}{bottom}<diagonal/></border>\
         </borders>\
         <cellStyleXfs count=\"1\"><xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\"/></cellStyleXfs>\
         <cellXfs count=\"5\">\
         <xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\" xfId=\"0\"/>\
         <xf numFmtId=\"0\" fontId=\"1\" fillId=\"0\" borderId=\"1\" xfId=\"0\" applyFont=\"1\" applyBorder=\"1\"/>\
         <xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"1\" xfId=\"0\" applyBorder=\"1\"/>\
         <xf numFmtId=\"10\" fontId=\"0\" fillId=\"0\" borderId=\"1\" xfId=\"0\" applyNumberFormat=\"1\" applyBorder=\"1\"/>\
         <xf numFmtId=\"0\" fontId=\"1\" fillId=\"0\" borderId=\"0\" xfId=\"0\" applyFont=\"1\"/>\
         </cellXfs>\
         <cellStyles count=\"1\"><cellStyle name=\"Normal\" xfId=\"0\" builtinId=\"0\"/></cellStyles>\
         </styleSheet>",
        header = XML_HEADER,
        ns = MAIN_NS,
        left = thin("left"),
        right = thin("right"),
        top = thin("top"),
        bottom = thin("bottom"),
    )
}

fn cell_xml(reference: &str, cell: &Cell, style: u8) -> String {
    match cell {
        Cell::Text(text) if !text.is_empty() => format!(
            "<c r=\"{}\" s=\"{}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
            reference,
            style,
            escape(text)
        ),
        Cell::Integer(value) => format!("<c r=\"{}\" s=\"{}\"><v>{}</v></c>", reference, style, value),
        Cell::Share(value) => format!("<c r=\"{}\" s=\"{}\"><v>{}</v></c>", reference, style, value),
        Cell::Text(_) | Cell::Blank => format!("<c r=\"{}\" s=\"{}\"/>", reference, style),
    }
}

fn sheet_xml(table: &Table, layout: &SheetLayout) -> String {
    let mut xml = format!("{}<worksheet xmlns=\"{}\"><cols>", XML_HEADER, MAIN_NS);
    for (i, width) in table.column_widths.iter().enumerate() {
        xml.push_str(&format!(
            "<col min=\"{0}\" max=\"{0}\" width=\"{1}\" customWidth=\"1\"/>",
            i + 1,
            width
        ));
    }
    xml.push_str("</cols><sheetData>");

    xml.push_str("<row r=\"1\">");
    for (column, header) in table.headers.iter().enumerate() {
        let reference = format!("{}1", column_letter(column));
        xml.push_str(&cell_xml(
            &reference,
            &Cell::Text(header.clone()),
            layout.header_style(column),
        ));
    }
    xml.push_str("</row>");

    for (i, row) in table.rows.iter().enumerate() {
        let row_number = i + 2;
        xml.push_str(&format!("<row r=\"{}\">", row_number));
        for (column, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_letter(column), row_number);
            xml.push_str(&cell_xml(&reference, cell, layout.body_style(column)));
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregator::Aggregator;
    use crate::core::report::ReportAssembler;
    use crate::domain::model::Vacancy;
    use std::io::Read;

    fn result() -> TransformResult {
        let vacancies = vec![
            Vacancy {
                name: "Программист".to_string(),
                salary: 55_000.0,
                area_name: "Сургут".to_string(),
                published_at: 2020,
            },
            Vacancy {
                name: "Повар & кондитер".to_string(),
                salary: 30_000.0,
                area_name: "Москва".to_string(),
                published_at: 2021,
            },
        ];
        let statistics = Aggregator::new(&vacancies, "Программист").compute();
        let tables = ReportAssembler::new("Программист").assemble(&statistics);
        TransformResult { statistics, tables }
    }

    fn read_part(data: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(data.to_vec())).unwrap();
        let mut content = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        content
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(4), "E");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
    }

    #[test]
    fn test_workbook_contains_all_parts() {
        let artifacts = XlsxRenderer::default().render(&result()).unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].file_name, "report.xlsx");

        let archive =
            zip::ZipArchive::new(std::io::Cursor::new(artifacts[0].content.clone())).unwrap();
        let mut names: Vec<&str> = archive.file_names().collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "[Content_Types].xml",
                "_rels/.rels",
                "xl/_rels/workbook.xml.rels",
                "xl/styles.xml",
                "xl/workbook.xml",
                "xl/worksheets/sheet1.xml",
                "xl/worksheets/sheet2.xml",
            ]
        );
    }

    #[test]
    fn test_sheet_names_and_years_sheet() {
        let content = XlsxRenderer::default().render(&result()).unwrap().remove(0).content;

        let workbook = read_part(&content, "xl/workbook.xml");
        assert!(workbook.contains("name=\"Статистика по годам\""));
        assert!(workbook.contains("name=\"Статистика по городам\""));

        let years = read_part(&content, "xl/worksheets/sheet1.xml");
        assert!(years.contains(
            "<c r=\"A1\" s=\"1\" t=\"inlineStr\"><is><t xml:space=\"preserve\">Год</t></is></c>"
        ));
        assert!(years.contains("<c r=\"B2\" s=\"2\"><v>55000</v></c>"));
        assert!(years.contains("<col min=\"3\" max=\"3\" width=\"32\" customWidth=\"1\"/>"));
    }

    #[test]
    fn test_cities_sheet_formats_shares_and_spacer() {
        let content = XlsxRenderer::default().render(&result()).unwrap().remove(0).content;
        let cities = read_part(&content, "xl/worksheets/sheet2.xml");

        assert!(cities.contains("<c r=\"E2\" s=\"3\"><v>0.5</v></c>"));
        assert!(cities.contains("<c r=\"C1\" s=\"4\"/>"));
        assert!(cities.contains("<c r=\"C2\" s=\"0\"/>"));
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(escape("Повар & <кондитер>"), "Повар &amp; &lt;кондитер&gt;");
    }

    #[test]
    fn test_control_characters_use_ooxml_escapes() {
        assert_eq!(escape("Мос\u{1}ква"), "Мос_x0001_ква");
        assert_eq!(escape("tab\tkept"), "tab\tkept");
        assert_eq!(escape("a_x0041_b"), "a_x005F_x0041_b");
        assert_eq!(escape("snake_case_x"), "snake_case_x");
    }

    #[test]
    fn test_city_with_control_character_keeps_sheet_well_formed() {
        let input = "name,salary_from,salary_to,salary_currency,area_name,published_at\n\
                     Повар,100,200,RUR,Мос\u{1}ква,2020-01-01T00:00:00+0300\n";
        let vacancies = crate::core::parser::RecordParser::default()
            .parse_bytes("vacancies.csv", input.as_bytes())
            .unwrap()
            .into_vacancies()
            .unwrap();
        let statistics = Aggregator::new(&vacancies, "Повар").compute();
        let tables = ReportAssembler::new("Повар").assemble(&statistics);
        let result = TransformResult { statistics, tables };

        let content = XlsxRenderer::default().render(&result).unwrap().remove(0).content;
        let cities = read_part(&content, "xl/worksheets/sheet2.xml");

        assert!(!cities.chars().any(|c| !is_xml_char(c)));
        assert!(cities.contains("Мос_x0001_ква"));
    }
}
