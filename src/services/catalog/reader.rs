use std::io::Cursor;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

use super::types::{Field, MetadataRecord, MetadataTable};
use crate::error::AppError;
use crate::models::format_number;

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        other => other.to_string(),
    }
}

/// Reads every row of the first sheet as text, padded to the catalogue width.
pub fn read_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>, AppError> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
        .map_err(|e| AppError::FileProcessingError(format!("Failed to open workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::FileProcessingError("No sheets found in workbook".to_string()))?
        .map_err(|e| AppError::FileProcessingError(format!("Failed to read worksheet: {}", e)))?;

    Ok(range
        .rows()
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(cell_text).collect();
            cells.resize(cells.len().max(Field::COUNT), String::new());
            cells
        })
        .collect())
}

/// Parses a catalogue workbook back into records. The hidden technical row must
/// match the published key order exactly.
pub fn read_catalog(bytes: &[u8]) -> Result<MetadataTable, AppError> {
    let rows = read_rows(bytes)?;

    let technical = rows
        .first()
        .ok_or_else(|| AppError::ParseError("Workbook has no header row".to_string()))?;

    for (col, field) in Field::ALL.iter().enumerate() {
        let found = technical.get(col).map(String::as_str).unwrap_or("");
        if found != field.key() {
            return Err(AppError::HeaderMismatch {
                column: col + 1,
                expected: field.key().to_string(),
                found: found.to_string(),
            });
        }
    }
    if let Some(extra) = technical.iter().skip(Field::COUNT).find(|v| !v.is_empty()) {
        return Err(AppError::HeaderMismatch {
            column: Field::COUNT + 1,
            expected: String::new(),
            found: extra.clone(),
        });
    }

    let records = rows
        .iter()
        .skip(2)
        .map(|row| MetadataRecord::from_cells(&row[..Field::COUNT]))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!("Read {} attribute records from workbook", records.len());
    Ok(MetadataTable { records })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::exporter::export;
    use crate::services::catalog::types::{DataType, ReportType};

    #[test]
    fn rejects_foreign_workbooks() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "ReportCode_info").unwrap();
        sheet.write_string(0, 1, "something_else").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        match read_catalog(&bytes) {
            Err(AppError::HeaderMismatch { column, expected, found }) => {
                assert_eq!(column, 2);
                assert_eq!(expected, "Noreportfield_info");
                assert_eq!(found, "something_else");
            }
            other => panic!("expected header mismatch, got {:?}", other),
        }
    }

    #[test]
    fn reads_back_exported_records() {
        let mut record = MetadataRecord::new(1, "Amount", DataType::Number, ReportType::Automatic);
        record.report_code = "R5_1".to_string();
        let table = MetadataTable { records: vec![record] };

        let parsed = read_catalog(&export(&table).unwrap()).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn garbage_bytes_are_a_processing_error() {
        assert!(matches!(
            read_catalog(b"not a workbook"),
            Err(AppError::FileProcessingError(_))
        ));
    }
}
