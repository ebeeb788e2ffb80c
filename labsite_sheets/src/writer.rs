use crate::{CellValue, Row, SheetError, Workbook};
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

static CONTENT_TYPES_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#;

static ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

static XML_HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
"#;

/// Write `workbook` as a minimal xlsx file at `path`.
///
/// Each sheet's header is the union of its rows' field names, in order of first
/// appearance. Text is written inline, numbers and booleans natively, and dates as
/// `YYYY-MM-DD` text; `Empty` cells are left out entirely, so they load back as `""`.
pub fn save_workbook<P: AsRef<Path>>(path: P, workbook: &Workbook) -> Result<(), SheetError> {
    let file = File::create(path.as_ref())?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);

    let mut content_types = String::from(CONTENT_TYPES_HEAD);
    let mut sheets = String::new();
    let mut rels = String::new();
    for (i, sheet) in workbook.sheets.iter().enumerate() {
        let n = i + 1;
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            n
        ));
        sheets.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape_xml(&sheet.name),
            n,
            n
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            n, n
        ));
    }
    content_types.push_str("</Types>");

    let workbook_xml = format!(
        r#"{}<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{}</sheets></workbook>"#,
        XML_HEAD, sheets
    );
    let rels_xml = format!(
        r#"{}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        XML_HEAD, rels
    );

    add_file(&mut zip, "[Content_Types].xml", &content_types, options)?;
    add_file(&mut zip, "_rels/.rels", ROOT_RELS, options)?;
    add_file(&mut zip, "xl/workbook.xml", &workbook_xml, options)?;
    add_file(&mut zip, "xl/_rels/workbook.xml.rels", &rels_xml, options)?;
    for (i, sheet) in workbook.sheets.iter().enumerate() {
        let name = format!("xl/worksheets/sheet{}.xml", i + 1);
        add_file(&mut zip, &name, &sheet_xml(&sheet.rows), options)?;
    }
    let _ = zip.finish()?;
    Ok(())
}

fn add_file<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    name: &str,
    contents: &str,
    options: FileOptions,
) -> Result<(), SheetError> {
    zip.start_file(name, options)?;
    zip.write_all(contents.as_bytes())?;
    Ok(())
}

fn header_of(rows: &[Row]) -> Vec<String> {
    let mut header: Vec<String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !header.iter().any(|h| h == key) {
                header.push(key.to_string());
            }
        }
    }
    header
}

fn sheet_xml(rows: &[Row]) -> String {
    let header = header_of(rows);
    let mut data = String::new();
    if !header.is_empty() {
        data.push_str(r#"<row r="1">"#);
        for (col, name) in header.iter().enumerate() {
            data.push_str(&inline_cell(col, 1, name));
        }
        data.push_str("</row>");
    }
    for (i, row) in rows.iter().enumerate() {
        let r = i + 2;
        data.push_str(&format!(r#"<row r="{}">"#, r));
        for (col, name) in header.iter().enumerate() {
            if let Some(cell) = row.get(name) {
                data.push_str(&cell_xml(col, r, cell));
            }
        }
        data.push_str("</row>");
    }
    format!(
        r#"{}<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
        XML_HEAD, data
    )
}

fn cell_xml(col: usize, row: usize, cell: &CellValue) -> String {
    let r = cell_ref(col, row);
    match cell {
        CellValue::Empty => String::new(),
        CellValue::Int(i) => format!(r#"<c r="{}"><v>{}</v></c>"#, r, i),
        CellValue::Float(x) => format!(r#"<c r="{}"><v>{}</v></c>"#, r, x),
        CellValue::Bool(b) => format!(r#"<c r="{}" t="b"><v>{}</v></c>"#, r, u8::from(*b)),
        other => inline_cell(col, row, &other.as_text()),
    }
}

fn inline_cell(col: usize, row: usize, text: &str) -> String {
    format!(
        r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
        cell_ref(col, row),
        escape_xml(text)
    )
}

/// `A1`-style reference for a zero-based column and one-based row
fn cell_ref(col: usize, row: usize) -> String {
    let mut letters = Vec::new();
    let mut n = col + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    format!("{}{}", String::from_utf8_lossy(&letters), row)
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_references() {
        assert_eq!(cell_ref(0, 1), "A1");
        assert_eq!(cell_ref(25, 3), "Z3");
        assert_eq!(cell_ref(26, 2), "AA2");
        assert_eq!(cell_ref(27, 10), "AB10");
    }

    #[test]
    fn header_keeps_first_appearance_order() {
        let rows = vec![
            Row::from_iter(vec![("b", "1"), ("a", "2")]),
            Row::from_iter(vec![("c", "3"), ("a", "4")]),
        ];
        assert_eq!(header_of(&rows), vec!["a", "b", "c"]);
    }

    #[test]
    fn text_is_escaped() {
        let xml = inline_cell(0, 1, "Tom & <Jerry>");
        assert!(xml.contains("Tom &amp; &lt;Jerry&gt;"));
    }
}
