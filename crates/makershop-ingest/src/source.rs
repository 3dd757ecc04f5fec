//! Lazy, finite row sources for import files.
//!
//! Both source kinds present the same shape: an iterator of header-keyed raw
//! rows. CSV files stream record by record so large imports never buffer
//! wholesale; XLSX worksheets are walked through a cursor over the already
//! decompressed cell range.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::IngestError;

/// One raw source row: header-keyed cell text plus its source line number.
#[derive(Debug, Clone)]
pub struct RawRow {
    /// 1-based line in the source file (header excluded from data rows).
    pub line: u64,
    fields: HashMap<String, String>,
}

impl RawRow {
    #[must_use]
    pub fn new(line: u64, fields: HashMap<String, String>) -> Self {
        Self { line, fields }
    }

    /// Cell under a (lowercased) header, trimmed; `None` when absent/empty.
    #[must_use]
    pub fn get(&self, header: &str) -> Option<&str> {
        let value = self.fields.get(header)?.trim();
        (!value.is_empty()).then_some(value)
    }

    /// All populated cells, for attribute pass-through and error reporting.
    #[must_use]
    pub fn fields(&self) -> &HashMap<String, String> {
        &self.fields
    }

    /// Human-readable `header=value` rendering for the error report.
    #[must_use]
    pub fn raw_text(&self) -> String {
        let mut pairs: Vec<_> = self
            .fields
            .iter()
            .filter(|(_, v)| !v.trim().is_empty())
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        pairs
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// A finite sequence of raw rows read lazily from a CSV or XLSX file.
pub struct RowSource {
    headers: Vec<String>,
    kind: SourceKind,
}

enum SourceKind {
    Csv(csv::StringRecordsIntoIter<File>),
    Xlsx { range: Range<Data>, next_row: usize },
}

impl std::fmt::Debug for RowSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            SourceKind::Csv(_) => "Csv",
            SourceKind::Xlsx { .. } => "Xlsx",
        };
        f.debug_struct("RowSource")
            .field("headers", &self.headers)
            .field("kind", &kind)
            .finish()
    }
}

impl RowSource {
    /// Open an import file, dispatching on its extension.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::UnsupportedSource`] for unknown extensions,
    /// [`IngestError::SourceIo`]/[`IngestError::Csv`]/[`IngestError::Xlsx`]
    /// when the file cannot be opened or its header row read.
    pub fn open(path: &Path) -> Result<Self, IngestError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Self::open_csv(path),
            "xlsx" | "xls" | "xlsm" | "ods" => Self::open_xlsx(path),
            _ => Err(IngestError::UnsupportedSource {
                path: path.display().to_string(),
            }),
        }
    }

    fn open_csv(path: &Path) -> Result<Self, IngestError> {
        let file = File::open(path).map_err(|e| IngestError::SourceIo {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);
        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        Ok(Self {
            headers,
            kind: SourceKind::Csv(reader.into_records()),
        })
    }

    fn open_xlsx(path: &Path) -> Result<Self, IngestError> {
        let mut workbook = open_workbook_auto(path).map_err(|e| IngestError::Xlsx {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| IngestError::EmptyWorkbook {
                path: path.display().to_string(),
            })?;
        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| IngestError::Xlsx {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let headers = (0..range.width())
            .map(|col| {
                range
                    .get((0, col))
                    .map(cell_text)
                    .unwrap_or_default()
                    .trim()
                    .to_lowercase()
            })
            .collect();
        Ok(Self {
            headers,
            kind: SourceKind::Xlsx { range, next_row: 1 },
        })
    }

    /// Lowercased header row of the source.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

impl Iterator for RowSource {
    type Item = Result<RawRow, IngestError>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.kind {
            SourceKind::Csv(records) => {
                let record = match records.next()? {
                    Ok(record) => record,
                    Err(e) => return Some(Err(IngestError::Csv(e))),
                };
                let line = record.position().map_or(0, csv::Position::line);
                let fields = self
                    .headers
                    .iter()
                    .cloned()
                    .zip(record.iter().map(str::to_string))
                    .collect();
                Some(Ok(RawRow::new(line, fields)))
            }
            SourceKind::Xlsx { range, next_row } => {
                if *next_row >= range.height() {
                    return None;
                }
                let row = *next_row;
                *next_row += 1;
                let fields = self
                    .headers
                    .iter()
                    .enumerate()
                    .map(|(col, header)| {
                        let text = range.get((row, col)).map(cell_text).unwrap_or_default();
                        (header.clone(), text)
                    })
                    .collect();
                Some(Ok(RawRow::new(row as u64 + 1, fields)))
            }
        }
    }
}

/// Spreadsheet cell to text; integral floats drop their `.0` so SKU-like
/// columns survive Excel's numeric coercion.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Bool(b) => b.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            #[allow(clippy::cast_possible_truncation)]
            if f.fract() == 0.0 && f.abs() < 9e15 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::DateTime(_) => cell.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn csv_rows_are_header_keyed_and_line_numbered() {
        let file = write_csv("SKU,Name,Price\nA-1,Widget,49.99\nB-2,Gadget,\n");
        let rows: Vec<_> = RowSource::open(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("sku"), Some("A-1"));
        assert_eq!(rows[0].get("price"), Some("49.99"));
        assert_eq!(rows[1].get("price"), None);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[1].line, 3);
    }

    #[test]
    fn ragged_csv_rows_keep_present_columns() {
        let file = write_csv("sku,name,price\nA-1,Widget\n");
        let rows: Vec<_> = RowSource::open(file.path())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows[0].get("name"), Some("Widget"));
        assert_eq!(rows[0].get("price"), None);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = RowSource::open(Path::new("/tmp/import.pdf")).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedSource { .. }));
    }

    #[test]
    fn missing_file_is_a_source_io_error() {
        let err = RowSource::open(Path::new("/nonexistent/import.csv")).unwrap_err();
        assert!(matches!(err, IngestError::SourceIo { .. }));
    }

    #[test]
    fn cell_text_drops_trailing_zero_fraction() {
        assert_eq!(cell_text(&Data::Float(12345.0)), "12345");
        assert_eq!(cell_text(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn raw_text_renders_sorted_populated_fields() {
        let mut fields = HashMap::new();
        fields.insert("sku".to_string(), "A-1".to_string());
        fields.insert("price".to_string(), "abc".to_string());
        fields.insert("empty".to_string(), " ".to_string());
        let row = RawRow::new(3, fields);
        assert_eq!(row.raw_text(), "price=abc;sku=A-1");
    }
}
