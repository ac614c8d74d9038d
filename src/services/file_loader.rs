use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::NaiveDateTime;
use csv::{ReaderBuilder, Trim};
use encoding_rs::{UTF_8, WINDOWS_1251};

use crate::error::AppError;
use crate::models::{CellValue, Dataset};

pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["csv", "xlsx", "xls", "xlsm", "xlsb", "ods"];

const NA_VALUES: [&str; 10] = [
    "nan", "NaN", "NA", "N/A", "n/a", "#N/A", "null", "NULL", "None", "<NA>",
];

/// Loads an uploaded file into a [`Dataset`], dispatching on the file extension.
pub fn load_from_bytes(file_name: &str, bytes: &[u8]) -> Result<Dataset, AppError> {
    let start = std::time::Instant::now();
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    tracing::info!("Loading {} ({} bytes)", file_name, bytes.len());

    let dataset = match extension.as_str() {
        "csv" => load_csv(bytes),
        ext if SUPPORTED_EXTENSIONS.contains(&ext) => load_workbook(bytes),
        _ => {
            tracing::error!("Unsupported file type: {}", file_name);
            return Err(AppError::InvalidInput(format!(
                "Unsupported file type '{}'; expected one of: {}",
                file_name,
                SUPPORTED_EXTENSIONS.join(", ")
            )));
        }
    }
    .map_err(|e| {
        tracing::error!("Failed to load {}: {}", file_name, e);
        match e {
            AppError::FileProcessingError(msg) => {
                AppError::FileProcessingError(format!("Failed to load file: {}", msg))
            }
            other => other,
        }
    })?;

    tracing::info!(
        "Loaded {} rows x {} columns in {:?}",
        dataset.row_count,
        dataset.column_count(),
        start.elapsed()
    );
    Ok(dataset)
}

/// Comma-separated UTF-8 first, then semicolon-separated (Windows-1251 when the
/// bytes are not valid UTF-8), then a lossy comma-separated read that is
/// accepted as is.
pub fn load_csv(bytes: &[u8]) -> Result<Dataset, AppError> {
    let (utf8, _, malformed) = UTF_8.decode(bytes);

    if !malformed {
        if let Ok(dataset) = parse_csv(&utf8, b',') {
            if dataset.column_count() > 1 {
                return Ok(dataset);
            }
        }
    }

    tracing::warn!("Comma-separated read produced a single column, retrying with ';'");
    let semicolon_text = if malformed {
        WINDOWS_1251.decode(bytes).0
    } else {
        utf8.clone()
    };
    if let Ok(dataset) = parse_csv(&semicolon_text, b';') {
        if dataset.column_count() > 1 {
            return Ok(dataset);
        }
    }

    tracing::warn!("Semicolon-separated read failed, falling back to default CSV settings");
    parse_csv(&utf8, b',')
}

fn parse_csv(text: &str, delimiter: u8) -> Result<Dataset, AppError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::Headers)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| header_name(i, h))
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(csv_cell).collect());
    }

    Ok(Dataset::from_rows(headers, rows))
}

fn csv_cell(raw: &str) -> CellValue {
    let value = raw.trim();
    if value.is_empty() || NA_VALUES.contains(&value) {
        return CellValue::Empty;
    }
    if matches!(value, "true" | "True" | "TRUE") {
        return CellValue::Bool(true);
    }
    if matches!(value, "false" | "False" | "FALSE") {
        return CellValue::Bool(false);
    }
    match value.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(raw.to_string()),
    }
}

fn header_name(index: usize, raw: &str) -> String {
    let name = raw.trim();
    if name.is_empty() {
        format!("Unnamed: {}", index)
    } else {
        name.to_string()
    }
}

/// First worksheet only; the first row holds the column names.
pub fn load_workbook(bytes: &[u8]) -> Result<Dataset, AppError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| AppError::FileProcessingError(format!("Failed to open workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::FileProcessingError("No sheets found in workbook".to_string()))?
        .map_err(|e| AppError::FileProcessingError(format!("Failed to read worksheet: {}", e)))?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(row) => row
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell {
                Data::Empty => header_name(i, ""),
                Data::Float(f) => crate::models::format_number(*f),
                other => header_name(i, &other.to_string()),
            })
            .collect::<Vec<_>>(),
        None => {
            tracing::warn!("First worksheet is empty");
            return Ok(Dataset::default());
        }
    };

    let data: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();

    Ok(Dataset::from_rows(headers, data))
}

fn workbook_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::Date)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .map(CellValue::Date)
            .unwrap_or_else(|_| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_csv_is_read_as_utf8() {
        let dataset = load_csv("id,name\n1,Анна\n2,\n".as_bytes()).unwrap();
        assert_eq!(dataset.column_names(), vec!["id", "name"]);
        assert_eq!(dataset.row_count, 2);
        assert_eq!(dataset.columns[0].values, vec![CellValue::Number(1.0), CellValue::Number(2.0)]);
        assert_eq!(dataset.columns[1].values, vec!["Анна".into(), CellValue::Empty]);
    }

    #[test]
    fn semicolon_cp1251_csv_falls_back() {
        let (encoded, _, _) = WINDOWS_1251.encode("код;имя\n1;Иван\n");
        let dataset = load_csv(&encoded).unwrap();
        assert_eq!(dataset.column_names(), vec!["код", "имя"]);
        assert_eq!(dataset.columns[1].values, vec!["Иван".into()]);
    }

    #[test]
    fn single_column_csv_is_accepted_last() {
        let dataset = load_csv(b"only\na\nb\n").unwrap();
        assert_eq!(dataset.column_names(), vec!["only"]);
        assert_eq!(dataset.row_count, 2);
    }

    #[test]
    fn na_markers_and_booleans() {
        assert_eq!(csv_cell("NaN"), CellValue::Empty);
        assert_eq!(csv_cell("True"), CellValue::Bool(true));
        assert_eq!(csv_cell("3,5"), CellValue::Text("3,5".into()));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        assert!(matches!(
            load_from_bytes("report.pdf", b"%PDF"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn broken_workbook_is_a_processing_error() {
        assert!(matches!(
            load_from_bytes("report.xlsx", b"definitely not a zip"),
            Err(AppError::FileProcessingError(_))
        ));
    }

    #[test]
    fn workbook_first_row_is_header() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "ID").unwrap();
        sheet.write_string(0, 1, "Name").unwrap();
        sheet.write_number(1, 0, 7).unwrap();
        sheet.write_string(1, 1, "Ann").unwrap();
        sheet.write_number(2, 0, 8).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let dataset = load_from_bytes("source.XLSX", &bytes).unwrap();
        assert_eq!(dataset.column_names(), vec!["ID", "Name"]);
        assert_eq!(dataset.columns[0].values, vec![CellValue::Number(7.0), CellValue::Number(8.0)]);
        assert_eq!(dataset.columns[1].values, vec!["Ann".into(), CellValue::Empty]);
    }
}
