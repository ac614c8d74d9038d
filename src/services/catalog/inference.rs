use std::collections::HashSet;

use once_cell::sync::Lazy;

use super::types::DataType;
use super::utils::{is_date_string, is_numeric_string};
use crate::models::CellValue;

pub const DATE_RATIO: f64 = 0.7;
pub const NUMERIC_RATIO: f64 = 0.8;
pub const MAX_FLAG_VALUES: usize = 3;

static FLAG_VOCABULARY: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "yes", "no", "y", "n",
        "true", "false",
        "1", "0",
        "on", "off",
        "active", "inactive",
        "да", "нет", "вкл", "выкл", "активен", "неактивен",
    ]
    .into_iter()
    .collect()
});

fn is_date(value: &CellValue) -> bool {
    match value {
        CellValue::Date(_) => true,
        CellValue::Text(s) => is_date_string(s),
        _ => false,
    }
}

fn is_numeric(value: &CellValue) -> bool {
    match value {
        CellValue::Number(n) => !n.is_nan(),
        CellValue::Text(s) => is_numeric_string(s),
        _ => false,
    }
}

/// Infers the data type of one column from its raw values.
///
/// Checks run in priority order (flag, date, number) and the first match wins.
/// A column with nothing but missing values is text.
pub fn classify(values: &[CellValue]) -> DataType {
    let present: Vec<&CellValue> = values.iter().filter(|v| !v.is_missing()).collect();
    if present.is_empty() {
        return DataType::Text;
    }
    let total = present.len() as f64;

    let distinct: HashSet<String> = present
        .iter()
        .map(|v| v.render().trim().to_lowercase())
        .collect();
    if distinct.len() <= MAX_FLAG_VALUES
        && distinct.iter().all(|v| FLAG_VOCABULARY.contains(v.as_str()))
    {
        return DataType::Flag;
    }

    let date_count = present.iter().filter(|v| is_date(v)).count();
    if date_count as f64 / total > DATE_RATIO {
        return DataType::Date;
    }

    let numeric_count = present.iter().filter(|v| is_numeric(v)).count();
    if numeric_count as f64 / total > NUMERIC_RATIO {
        return DataType::Number;
    }

    DataType::Text
}
