pub mod builder;
pub mod exporter;
pub mod inference;
pub mod reader;
pub mod types;
pub mod utils;

pub use builder::build;
pub use exporter::{attributes_file_name, export};
pub use inference::classify;
pub use reader::read_catalog;
pub use types::{CatalogSummary, DataType, Field, MetadataRecord, MetadataTable, ReportType};
