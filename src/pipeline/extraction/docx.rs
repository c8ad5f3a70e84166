//! DOCX text extraction via docx-rs.
//!
//! Walks the document body in order. Paragraphs become lines; each table
//! row becomes one line of its non-empty cell texts joined with `" | "`.
//! Table semantics are not interpreted.

use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild,
    TableRowChild,
};

use super::ExtractionError;

/// Delimiter between cells of one table row.
pub const CELL_DELIMITER: &str = " | ";

/// Extract text from DOCX bytes, preserving reading order.
pub fn extract_docx_text(docx_bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc = docx_rs::read_docx(docx_bytes).map_err(|e| ExtractionError::FormatReader {
        format: "docx",
        reason: e.to_string(),
    })?;

    let mut lines: Vec<String> = Vec::new();
    let mut table_rows = 0usize;

    for child in &doc.document.children {
        match child {
            DocumentChild::Paragraph(para) => {
                let text = paragraph_text(para);
                if !text.trim().is_empty() {
                    lines.push(text);
                }
            }
            DocumentChild::Table(table) => {
                let rows = table_lines(table);
                table_rows += rows.len();
                lines.extend(rows);
            }
            _ => {}
        }
    }

    tracing::debug!(lines = lines.len(), table_rows, "DOCX text extracted");
    Ok(lines.join("\n"))
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut out = String::new();
    collect_paragraph_children(&para.children, &mut out);
    out
}

fn collect_paragraph_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for run_child in &run.children {
                    match run_child {
                        RunChild::Text(text) => out.push_str(&text.text),
                        RunChild::Tab(_) => out.push('\t'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => collect_paragraph_children(&link.children, out),
            _ => {}
        }
    }
}

fn table_lines(table: &Table) -> Vec<String> {
    let mut lines = Vec::new();
    for row in &table.rows {
        let TableChild::TableRow(tr) = row;
        let cells: Vec<String> = tr
            .cells
            .iter()
            .map(|cell| {
                let TableRowChild::TableCell(tc) = cell;
                tc.children
                    .iter()
                    .filter_map(|content| match content {
                        TableCellContent::Paragraph(para) => Some(paragraph_text(para)),
                        _ => None,
                    })
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|t| !t.is_empty())
            .collect();
        if !cells.is_empty() {
            lines.push(cells.join(CELL_DELIMITER));
        }
    }
    lines
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use docx_rs::{Docx, Run, TableCell, TableRow};

    fn para(text: &str) -> Paragraph {
        Paragraph::new().add_run(Run::new().add_text(text))
    }

    fn cell(text: &str) -> TableCell {
        TableCell::new().add_paragraph(para(text))
    }

    /// Build a DOCX: paragraphs, then one table of `rows`.
    pub(crate) fn make_test_docx(paragraphs: &[&str], rows: &[&[&str]]) -> Vec<u8> {
        let mut docx = Docx::new();
        for p in paragraphs {
            docx = docx.add_paragraph(para(p));
        }
        if !rows.is_empty() {
            let table_rows = rows
                .iter()
                .map(|cells| TableRow::new(cells.iter().map(|c| cell(c)).collect()))
                .collect();
            docx = docx.add_table(Table::new(table_rows));
        }
        let mut buf = std::io::Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();
        buf.into_inner()
    }

    #[test]
    fn paragraphs_in_document_order() {
        let bytes = make_test_docx(&["Patient: Jane Doe", "", "Lab Results"], &[]);
        let text = extract_docx_text(&bytes).unwrap();
        assert_eq!(text, "Patient: Jane Doe\nLab Results");
    }

    #[test]
    fn table_rows_joined_with_delimiter() {
        let bytes = make_test_docx(
            &["Patient: Jane Doe"],
            &[&["Glucose", "95 mg/dL"], &["HDL", "55 mg/dL"]],
        );
        let text = extract_docx_text(&bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Patient: Jane Doe");
        assert_eq!(lines[1], "Glucose | 95 mg/dL");
        assert_eq!(lines[2], "HDL | 55 mg/dL");
    }

    #[test]
    fn empty_cells_are_skipped() {
        let bytes = make_test_docx(&[], &[&["Sodium", "", "140"], &["", ""]]);
        let text = extract_docx_text(&bytes).unwrap();
        assert_eq!(text, "Sodium | 140");
    }

    #[test]
    fn corrupt_docx_is_format_reader_error() {
        let result = extract_docx_text(b"PK\x03\x04 definitely not a docx");
        assert!(matches!(
            result,
            Err(ExtractionError::FormatReader { format: "docx", .. })
        ));
    }
}
