use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const SHEET_TITLE: &str = "Report attribute";
pub const DEFAULT_REPORT_ID: &str = "R001";

pub const CHANGE_INDICATOR: &str = "no";
pub const REQUIRED: &str = "yes";
pub const CLASSIFICATION: &str = "Base";
pub const MANUAL_TECH_ALGORITHM: &str = "Manual entry";
pub const MANUAL_SOURCE_TYPE: &str = "Manual fill";
pub const DATABASE_SOURCE_TYPE: &str = "Database";
pub const ILA_SYSTEM_LINK: &str = "ILA One";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Text,
    Number,
    Date,
    Flag,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Text => "text",
            DataType::Number => "number",
            DataType::Date => "date",
            DataType::Flag => "flag",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "текст" => Ok(DataType::Text),
            "number" | "число" => Ok(DataType::Number),
            "date" | "дата" => Ok(DataType::Date),
            "flag" | "флаг" => Ok(DataType::Flag),
            other => Err(AppError::ParseError(format!("Unknown data type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ReportType {
    #[default]
    Manual,
    #[serde(rename = "Semi-automatic")]
    SemiAutomatic,
    Automatic,
    #[serde(rename = "ILA")]
    Ila,
}

impl ReportType {
    pub const ALL: [ReportType; 4] = [
        ReportType::Manual,
        ReportType::SemiAutomatic,
        ReportType::Automatic,
        ReportType::Ila,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Manual => "Manual",
            ReportType::SemiAutomatic => "Semi-automatic",
            ReportType::Automatic => "Automatic",
            ReportType::Ila => "ILA",
        }
    }

    pub fn is_manual(&self) -> bool {
        matches!(self, ReportType::Manual | ReportType::SemiAutomatic)
    }

    pub fn tech_algorithm_default(&self) -> &'static str {
        if self.is_manual() {
            MANUAL_TECH_ALGORITHM
        } else {
            ""
        }
    }

    pub fn source_type_default(&self) -> &'static str {
        if self.is_manual() {
            MANUAL_SOURCE_TYPE
        } else {
            DATABASE_SOURCE_TYPE
        }
    }

    pub fn system_link_default(&self) -> &'static str {
        match self {
            ReportType::Ila => ILA_SYSTEM_LINK,
            _ => "",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manual" | "ручной" => Ok(ReportType::Manual),
            "semi-automatic" | "semi_automatic" | "semiautomatic" | "полуавтоматический" => {
                Ok(ReportType::SemiAutomatic)
            }
            "automatic" | "автоматический" => Ok(ReportType::Automatic),
            "ila" | "ила" => Ok(ReportType::Ila),
            other => Err(AppError::InvalidInput(format!("Unknown report type: {}", other))),
        }
    }
}

/// Output columns of the catalogue sheet. Declaration order is the column order;
/// every header row and data row is written by iterating [`Field::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ReportCode,
    Index,
    Name,
    Description,
    TechAsIs,
    BusinessAlgorithm,
    TechAlgorithm,
    AlgorithmChanged,
    DbObjectLink,
    SourceType,
    SystemLink,
    TermCodes,
    TermNames,
    TermParent,
    TermDomain,
    Required,
    DataType,
    Classification,
    CodeTable,
    Example,
    ToDelete,
}

impl Field {
    pub const COUNT: usize = 21;

    pub const ALL: [Field; Field::COUNT] = [
        Field::ReportCode,
        Field::Index,
        Field::Name,
        Field::Description,
        Field::TechAsIs,
        Field::BusinessAlgorithm,
        Field::TechAlgorithm,
        Field::AlgorithmChanged,
        Field::DbObjectLink,
        Field::SourceType,
        Field::SystemLink,
        Field::TermCodes,
        Field::TermNames,
        Field::TermParent,
        Field::TermDomain,
        Field::Required,
        Field::DataType,
        Field::Classification,
        Field::CodeTable,
        Field::Example,
        Field::ToDelete,
    ];

    /// Technical key written to the hidden first row.
    pub fn key(&self) -> &'static str {
        match self {
            Field::ReportCode => "ReportCode_info",
            Field::Index => "Noreportfield_info",
            Field::Name => "name",
            Field::Description => "description",
            Field::TechAsIs => "TechAsIs",
            Field::BusinessAlgorithm => "BussAlgorythm",
            Field::TechAlgorithm => "TechAlgorythm",
            Field::AlgorithmChanged => "algorithms_change_info",
            Field::DbObjectLink => "dbobjectlink",
            Field::SourceType => "base_type_info",
            Field::SystemLink => "related_it_system_info",
            Field::TermCodes => "reportfields_codes",
            Field::TermNames => "reportfields_names",
            Field::TermParent => "reportfields_parent_term",
            Field::TermDomain => "reportfields_domain",
            Field::Required => "required_attribute_info",
            Field::DataType => "base_type_report_field",
            Field::Classification => "base_calc_ref_ind_info",
            Field::CodeTable => "codeTable_info",
            Field::Example => "example",
            Field::ToDelete => "isToDelete_info",
        }
    }

    /// Human-readable label written to the bold second row.
    pub fn label(&self) -> &'static str {
        match self {
            Field::ReportCode => "Report attribute code",
            Field::Index => "Report attribute No.",
            Field::Name => "Attribute name",
            Field::Description => "Attribute description",
            Field::TechAsIs => "Technical algorithm AS IS",
            Field::BusinessAlgorithm => "Business algorithm AS IS",
            Field::TechAlgorithm => "Technical algorithm TO BE",
            Field::AlgorithmChanged => "Algorithm changed",
            Field::DbObjectLink => "Physical attributes",
            Field::SourceType => "Data source type",
            Field::SystemLink => "Link to information system",
            Field::TermCodes => "Term code(s)",
            Field::TermNames => "Term name(s)",
            Field::TermParent => "Parent entity of term(s)",
            Field::TermDomain => "Term domain(s)",
            Field::Required => "Required attribute",
            Field::DataType => "Base attribute type (Text, Number, Date, Flag)",
            Field::Classification => "Attribute kind (Base, Calculated, Reference)",
            Field::CodeTable => "Reference table name",
            Field::Example => "Note",
            Field::ToDelete => "Marked for deletion",
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.key() == key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    pub report_code: String,
    pub index: usize,
    pub name: String,
    pub description: String,
    pub tech_as_is: String,
    pub business_algorithm: String,
    pub tech_algorithm: String,
    pub algorithm_changed: String,
    pub db_object_link: String,
    pub source_type: String,
    pub system_link: String,
    pub term_codes: String,
    pub term_names: String,
    pub term_parent: String,
    pub term_domain: String,
    pub required: String,
    pub data_type: DataType,
    pub classification: String,
    pub code_table: String,
    pub example: String,
    pub to_delete: String,
}

impl MetadataRecord {
    /// A record with fixed constants and report-type defaults. The code is left
    /// blank until the table is fully indexed.
    pub fn new(index: usize, name: &str, data_type: DataType, report_type: ReportType) -> Self {
        Self {
            report_code: String::new(),
            index,
            name: name.to_string(),
            description: String::new(),
            tech_as_is: String::new(),
            business_algorithm: String::new(),
            tech_algorithm: report_type.tech_algorithm_default().to_string(),
            algorithm_changed: CHANGE_INDICATOR.to_string(),
            db_object_link: String::new(),
            source_type: report_type.source_type_default().to_string(),
            system_link: report_type.system_link_default().to_string(),
            term_codes: String::new(),
            term_names: String::new(),
            term_parent: String::new(),
            term_domain: String::new(),
            required: REQUIRED.to_string(),
            data_type,
            classification: CLASSIFICATION.to_string(),
            code_table: String::new(),
            example: String::new(),
            to_delete: String::new(),
        }
    }

    pub fn value(&self, field: Field) -> String {
        match field {
            Field::ReportCode => self.report_code.clone(),
            Field::Index => self.index.to_string(),
            Field::Name => self.name.clone(),
            Field::Description => self.description.clone(),
            Field::TechAsIs => self.tech_as_is.clone(),
            Field::BusinessAlgorithm => self.business_algorithm.clone(),
            Field::TechAlgorithm => self.tech_algorithm.clone(),
            Field::AlgorithmChanged => self.algorithm_changed.clone(),
            Field::DbObjectLink => self.db_object_link.clone(),
            Field::SourceType => self.source_type.clone(),
            Field::SystemLink => self.system_link.clone(),
            Field::TermCodes => self.term_codes.clone(),
            Field::TermNames => self.term_names.clone(),
            Field::TermParent => self.term_parent.clone(),
            Field::TermDomain => self.term_domain.clone(),
            Field::Required => self.required.clone(),
            Field::DataType => self.data_type.to_string(),
            Field::Classification => self.classification.clone(),
            Field::CodeTable => self.code_table.clone(),
            Field::Example => self.example.clone(),
            Field::ToDelete => self.to_delete.clone(),
        }
    }

    fn set(&mut self, field: Field, value: String) -> Result<(), AppError> {
        match field {
            Field::ReportCode => self.report_code = value,
            Field::Index => {
                self.index = value.trim().parse().map_err(|_| {
                    AppError::ParseError(format!("Invalid attribute number: '{}'", value))
                })?
            }
            Field::Name => self.name = value,
            Field::Description => self.description = value,
            Field::TechAsIs => self.tech_as_is = value,
            Field::BusinessAlgorithm => self.business_algorithm = value,
            Field::TechAlgorithm => self.tech_algorithm = value,
            Field::AlgorithmChanged => self.algorithm_changed = value,
            Field::DbObjectLink => self.db_object_link = value,
            Field::SourceType => self.source_type = value,
            Field::SystemLink => self.system_link = value,
            Field::TermCodes => self.term_codes = value,
            Field::TermNames => self.term_names = value,
            Field::TermParent => self.term_parent = value,
            Field::TermDomain => self.term_domain = value,
            Field::Required => self.required = value,
            Field::DataType => self.data_type = value.parse()?,
            Field::Classification => self.classification = value,
            Field::CodeTable => self.code_table = value,
            Field::Example => self.example = value,
            Field::ToDelete => self.to_delete = value,
        }
        Ok(())
    }

    /// All values in column order.
    pub fn cells(&self) -> Vec<String> {
        Field::ALL.iter().map(|f| self.value(*f)).collect()
    }

    /// Rebuilds a record from one sheet row laid out in [`Field::ALL`] order.
    pub fn from_cells(cells: &[String]) -> Result<Self, AppError> {
        if cells.len() != Field::COUNT {
            return Err(AppError::ParseError(format!(
                "Expected {} cells per row, found {}",
                Field::COUNT,
                cells.len()
            )));
        }

        let mut record = MetadataRecord {
            report_code: String::new(),
            index: 0,
            name: String::new(),
            description: String::new(),
            tech_as_is: String::new(),
            business_algorithm: String::new(),
            tech_algorithm: String::new(),
            algorithm_changed: String::new(),
            db_object_link: String::new(),
            source_type: String::new(),
            system_link: String::new(),
            term_codes: String::new(),
            term_names: String::new(),
            term_parent: String::new(),
            term_domain: String::new(),
            required: String::new(),
            data_type: DataType::Text,
            classification: String::new(),
            code_table: String::new(),
            example: String::new(),
            to_delete: String::new(),
        };
        for (field, value) in Field::ALL.iter().zip(cells) {
            record.set(*field, value.clone())?;
        }
        Ok(record)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataTable {
    pub records: Vec<MetadataRecord>,
}

impl MetadataTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetadataRecord> {
        self.records.iter()
    }

    /// Most frequent data type; ties go to whichever appears first.
    pub fn dominant_type(&self) -> Option<DataType> {
        let mut counts: Vec<(DataType, usize)> = Vec::new();
        for record in &self.records {
            match counts.iter_mut().find(|(t, _)| *t == record.data_type) {
                Some((_, n)) => *n += 1,
                None => counts.push((record.data_type, 1)),
            }
        }

        let mut best: Option<(DataType, usize)> = None;
        for (data_type, n) in counts {
            if best.map_or(true, |(_, m)| n > m) {
                best = Some((data_type, n));
            }
        }
        best.map(|(t, _)| t)
    }

    pub fn summary(&self, report_type: ReportType) -> CatalogSummary {
        CatalogSummary {
            attribute_count: self.len(),
            dominant_type: self.dominant_type(),
            report_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub attribute_count: usize,
    pub dominant_type: Option<DataType>,
    pub report_type: ReportType,
}
