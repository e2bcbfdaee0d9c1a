//! CSV loading: header validation and raw row extraction.
//!
//! The header must name the five segments (any case, any order) and at least
//! one other column, the first of which identifies the athlete.

use csv::{ByteRecord, ReaderBuilder, Trim};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{RankError, Result};
use crate::segment::Segment;

/// Name used for the identifier column when reporting a schema failure.
pub const IDENTIFIER: &str = "identifier";

/// One data row, keyed by canonical column name.
///
/// Segment cells use [`Segment::name`] as key; the identifier cell uses the
/// header text of the identifier column. Cells beyond the end of a short row
/// are absent from the map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    /// 1-based position among data rows (the header is not counted).
    pub index: usize,
    pub cells: BTreeMap<String, String>,
    /// Set when the row could not be decoded at all.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub id_column: String,
    pub rows: Vec<RawRow>,
}

/// Opens `path`, reads the whole table and closes the file before returning.
///
/// Header columns past the identifier that are not segments (club, bib, ...)
/// are dropped from every row and reported once at info level.
#[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_table(path: impl AsRef<Path>) -> Result<RawTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| RankError::io(path, e))?;
    read_from(file, path)
}

/// Reads a table from any reader, e.g. an in-memory buffer or stdin.
pub fn read_table<R: Read>(reader: R) -> Result<RawTable> {
    read_from(reader, Path::new("<input>"))
}

/// Where each header column ends up.
enum Column {
    Segment(Segment),
    Identifier,
    Ignored,
}

fn read_from<R: Read>(reader: R, origin: &Path) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr
        .byte_headers()
        .map_err(|e| csv_to_rank_error(e, origin))?
        .clone();

    let (columns, id_column) = resolve_header(&headers)?;
    debug!(id_column = %id_column, columns = headers.len(), "Header accepted");

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    let mut index = 0;

    loop {
        match rdr.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                index += 1;
                rows.push(decode_row(index, &record, &columns, &id_column));
            }
            Err(e) => {
                if matches!(e.kind(), csv::ErrorKind::Io(_)) {
                    return Err(csv_to_rank_error(e, origin));
                }
                index += 1;
                rows.push(RawRow {
                    index,
                    error: Some(e.to_string()),
                    ..Default::default()
                });
            }
        }
    }

    info!(rows = rows.len(), "CSV loaded");
    Ok(RawTable { id_column, rows })
}

fn resolve_header(headers: &ByteRecord) -> Result<(Vec<Column>, String)> {
    let mut seen = [false; 5];
    let mut id_column: Option<String> = None;
    let mut columns = Vec::with_capacity(headers.len());

    for raw in headers.iter() {
        let name = String::from_utf8_lossy(raw).trim().to_string();
        if let Some(segment) = Segment::from_header(&name) {
            if seen[segment.index()] {
                return Err(RankError::DuplicateColumn(segment.name().to_string()));
            }
            seen[segment.index()] = true;
            columns.push(Column::Segment(segment));
        } else if id_column.is_none() && !name.is_empty() {
            id_column = Some(name);
            columns.push(Column::Identifier);
        } else {
            info!(column = %name, "Ignoring extra column");
            columns.push(Column::Ignored);
        }
    }

    let mut missing: Vec<String> = Segment::ALL
        .into_iter()
        .filter(|s| !seen[s.index()])
        .map(|s| s.name().to_string())
        .collect();

    match id_column {
        Some(id) if missing.is_empty() => Ok((columns, id)),
        id => {
            if id.is_none() {
                missing.push(IDENTIFIER.to_string());
            }
            Err(RankError::Schema { missing })
        }
    }
}

fn decode_row(index: usize, record: &ByteRecord, columns: &[Column], id_column: &str) -> RawRow {
    let mut cells = BTreeMap::new();

    for (column, raw) in columns.iter().zip(record.iter()) {
        let key = match column {
            Column::Segment(s) => s.name(),
            Column::Identifier => id_column,
            Column::Ignored => continue,
        };
        match std::str::from_utf8(raw) {
            Ok(text) => {
                cells.insert(key.to_string(), text.to_string());
            }
            Err(_) => {
                return RawRow {
                    index,
                    error: Some(format!("invalid UTF-8 in column {key}")),
                    ..Default::default()
                };
            }
        }
    }

    RawRow {
        index,
        cells,
        error: None,
    }
}

fn csv_to_rank_error(e: csv::Error, origin: &Path) -> RankError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => RankError::io(origin, io),
        other => RankError::io(
            origin,
            std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{other:?}")),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(text: &str) -> Result<RawTable> {
        read_table(text.as_bytes())
    }

    #[test]
    fn test_header_any_order_and_case() {
        let t = table("running,Bib,SWIMMING,transition2,Cycling,Transition1\n1,42,2,3,4,5\n").unwrap();
        assert_eq!(t.id_column, "Bib");
        assert_eq!(t.rows.len(), 1);
        let row = &t.rows[0];
        assert_eq!(row.index, 1);
        assert_eq!(row.cells["Bib"], "42");
        assert_eq!(row.cells["Swimming"], "2");
        assert_eq!(row.cells["Running"], "1");
        assert_eq!(row.cells["Transition2"], "3");
    }

    #[test]
    fn test_missing_columns_are_named() {
        let err = table("Name,Swimming,Running,Transition1\nA,1,2,3\n").unwrap_err();
        match err {
            RankError::Schema { missing } => {
                assert_eq!(missing, vec!["Cycling", "Transition2"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_identifier_column() {
        let err = table("Swimming,Cycling,Running,Transition1,Transition2\n1,2,3,4,5\n").unwrap_err();
        match err {
            RankError::Schema { missing } => assert_eq!(missing, vec![IDENTIFIER]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_segment_column() {
        let err = table("Name,Swimming,swimming,Cycling,Running,Transition1,Transition2\n").unwrap_err();
        assert!(matches!(err, RankError::DuplicateColumn(c) if c == "Swimming"));
    }

    #[test]
    fn test_header_only_is_empty() {
        let t = table("Name,Swimming,Cycling,Running,Transition1,Transition2\n").unwrap();
        assert!(t.rows.is_empty());
    }

    #[test]
    fn test_empty_input_is_schema_error() {
        let err = table("").unwrap_err();
        match err {
            RankError::Schema { missing } => assert_eq!(missing.len(), 6),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_short_row_leaves_cells_absent() {
        let t = table("Name,Swimming,Cycling,Running,Transition1,Transition2\nA,1,2\n").unwrap();
        let row = &t.rows[0];
        assert!(row.cells.contains_key("Cycling"));
        assert!(!row.cells.contains_key("Running"));
    }

    #[test]
    fn test_extra_columns_ignored() {
        let t = table("Name,Club,Swimming,Cycling,Running,Transition1,Transition2\nA,Tri NL,1,2,3,4,5\n")
            .unwrap();
        assert_eq!(t.id_column, "Name");
        assert!(!t.rows[0].cells.contains_key("Club"));
    }

    #[test]
    fn test_invalid_utf8_row_is_kept_with_error() {
        let mut data = b"Name,Swimming,Cycling,Running,Transition1,Transition2\n".to_vec();
        data.extend_from_slice(b"\xff\xfe,1,2,3,4,5\nB,1,2,3,4,5\n");
        let t = read_table(data.as_slice()).unwrap();
        assert_eq!(t.rows.len(), 2);
        assert!(t.rows[0].error.is_some());
        assert!(t.rows[1].error.is_none());
        assert_eq!(t.rows[1].index, 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_table("/no/such/dir/results.csv").unwrap_err();
        assert!(matches!(err, RankError::Io { .. }));
    }
}
