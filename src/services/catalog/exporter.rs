use rust_xlsxwriter::{Format, Workbook, Worksheet};

use super::types::{Field, MetadataRecord, MetadataTable, SHEET_TITLE};
use crate::error::AppError;

pub const MAX_COLUMN_WIDTH: usize = 50;
const WIDTH_PADDING: usize = 2;

const TECHNICAL_ROW: u32 = 0;
const LABEL_ROW: u32 = 1;
const FIRST_DATA_ROW: u32 = 2;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub fn attributes_file_name(report_id: &str) -> String {
    format!("{}_attributes.xlsx", report_id)
}

/// Serializes the table into a single-sheet workbook.
///
/// Row 1 holds the hidden technical keys, row 2 the bold labels and data
/// starts at row 3. Rows 1-2 stay frozen while scrolling.
pub fn export(table: &MetadataTable) -> Result<Vec<u8>, AppError> {
    let start = std::time::Instant::now();
    tracing::info!("Exporting {} attribute records", table.len());

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_TITLE)?;

    write_headers(worksheet)?;

    for (offset, record) in table.iter().enumerate() {
        let row = FIRST_DATA_ROW + offset as u32;
        write_record(worksheet, row, record)?;
    }

    for (col, width) in column_widths(table).into_iter().enumerate() {
        worksheet.set_column_width(col as u16, width as f64)?;
    }

    let buffer = workbook.save_to_buffer().map_err(|e| {
        tracing::error!("Failed to serialize workbook: {}", e);
        AppError::ExportError(format!("Failed to serialize workbook: {}", e))
    })?;

    tracing::info!(
        "Workbook of {} bytes written in {:?}",
        buffer.len(),
        start.elapsed()
    );
    Ok(buffer)
}

fn write_headers(worksheet: &mut Worksheet) -> Result<(), AppError> {
    let bold = Format::new().set_bold();

    for (col, field) in Field::ALL.iter().enumerate() {
        worksheet.write_string(TECHNICAL_ROW, col as u16, field.key())?;
        worksheet.write_string_with_format(LABEL_ROW, col as u16, field.label(), &bold)?;
    }

    worksheet.set_row_hidden(TECHNICAL_ROW)?;
    worksheet.set_freeze_panes(FIRST_DATA_ROW, 0)?;
    Ok(())
}

fn write_record(worksheet: &mut Worksheet, row: u32, record: &MetadataRecord) -> Result<(), AppError> {
    for (col, field) in Field::ALL.iter().enumerate() {
        let col = col as u16;
        match field {
            Field::Index => {
                worksheet.write_number(row, col, record.index as f64)?;
            }
            _ => {
                let value = record.value(*field);
                // blank cells are left unwritten
                if !value.is_empty() {
                    worksheet.write_string(row, col, value)?;
                }
            }
        }
    }
    Ok(())
}

/// Longest text per column across both header rows and all records, plus
/// padding, capped at [`MAX_COLUMN_WIDTH`].
pub fn column_widths(table: &MetadataTable) -> Vec<usize> {
    Field::ALL
        .iter()
        .map(|field| {
            let header = field.key().chars().count().max(field.label().chars().count());
            let data = table
                .iter()
                .map(|r| r.value(*field).chars().count())
                .max()
                .unwrap_or(0);
            (header.max(data) + WIDTH_PADDING).min(MAX_COLUMN_WIDTH)
        })
        .collect()
}
