use super::inference::classify;
use super::types::{MetadataRecord, MetadataTable, ReportType};
use crate::models::Column;

/// Builds one metadata record per input column, in input order, numbered from 1.
///
/// Attribute codes (`{report_id}_{index}`) are assigned in a second pass once
/// every record carries its final index.
pub fn build(columns: &[Column], report_id: &str, report_type: ReportType) -> MetadataTable {
    tracing::info!(
        "Building attribute catalogue for report {} ({}) from {} columns",
        report_id,
        report_type,
        columns.len()
    );

    let mut records: Vec<MetadataRecord> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let data_type = classify(&column.values);
            tracing::debug!("Column '{}' classified as {}", column.name, data_type);
            MetadataRecord::new(i + 1, &column.name, data_type, report_type)
        })
        .collect();

    for record in records.iter_mut() {
        record.report_code = attribute_code(report_id, record.index);
    }

    MetadataTable { records }
}

pub fn attribute_code(report_id: &str, index: usize) -> String {
    format!("{}_{}", report_id, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;
    use crate::services::catalog::types::{DataType, ILA_SYSTEM_LINK};

    fn column(name: &str, values: &[&str]) -> Column {
        Column::new(name, values.iter().map(|v| CellValue::from(*v)).collect())
    }

    #[test]
    fn empty_input_builds_empty_table() {
        let table = build(&[], "R001", ReportType::Manual);
        assert!(table.is_empty());
    }

    #[test]
    fn codes_follow_input_order() {
        let columns = vec![column("b", &["x"]), column("a", &["y"]), column("c", &["z"])];
        let table = build(&columns, "Q1", ReportType::Automatic);

        let codes: Vec<&str> = table.iter().map(|r| r.report_code.as_str()).collect();
        let names: Vec<&str> = table.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(codes, vec!["Q1_1", "Q1_2", "Q1_3"]);
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn semi_automatic_uses_manual_defaults() {
        let table = build(&[column("x", &["1"])], "R1", ReportType::SemiAutomatic);
        let record = &table.records[0];
        assert_eq!(record.tech_algorithm, "Manual entry");
        assert_eq!(record.source_type, "Manual fill");
        assert_eq!(record.system_link, "");
    }

    #[test]
    fn ila_sets_system_link() {
        let table = build(&[column("x", &["a"]), column("y", &["b"])], "R1", ReportType::Ila);
        for record in table.iter() {
            assert_eq!(record.system_link, ILA_SYSTEM_LINK);
            assert_eq!(record.tech_algorithm, "");
            assert_eq!(record.source_type, "Database");
            assert_eq!(record.data_type, DataType::Text);
        }
    }

    #[test]
    fn fixed_fields_are_constant() {
        let table = build(&[column("x", &["a"])], "R1", ReportType::Manual);
        let record = &table.records[0];
        assert_eq!(record.algorithm_changed, "no");
        assert_eq!(record.required, "yes");
        assert_eq!(record.classification, "Base");
        assert!(record.description.is_empty());
        assert!(record.example.is_empty());
        assert!(record.code_table.is_empty());
        assert!(record.to_delete.is_empty());
    }
}
