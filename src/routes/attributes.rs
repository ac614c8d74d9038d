use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, Method},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    error::AppError,
    models::Dataset,
    services::{
        catalog::{
            self,
            exporter::XLSX_CONTENT_TYPE,
            types::{CatalogSummary, MetadataRecord, ReportType},
        },
        file_loader,
    },
    AppState,
};

pub fn routes(max_file_size: usize) -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/attributes/preview", post(preview_attributes))
        .route("/attributes/export", post(export_attributes))
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(cors)
}

#[derive(Debug)]
struct UploadForm {
    file_name: String,
    file_data: Bytes,
    report_id: String,
    report_type: ReportType,
}

async fn read_form(mut multipart: Multipart, default_report_id: &str) -> Result<UploadForm, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut report_id = String::new();
    let mut report_type = ReportType::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Malformed upload: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Failed to read upload: {}", e)))?;
                file = Some((file_name, data));
            }
            "report_id" => {
                report_id = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Invalid report_id: {}", e)))?;
            }
            "report_type" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Invalid report_type: {}", e)))?;
                report_type = value.parse()?;
            }
            other => tracing::debug!("Ignoring form field '{}'", other),
        }
    }

    let (file_name, file_data) =
        file.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    let report_id = match report_id.trim() {
        "" => default_report_id.to_string(),
        id => id.to_string(),
    };

    Ok(UploadForm {
        file_name,
        file_data,
        report_id,
        report_type,
    })
}

fn load_and_build(form: &UploadForm) -> Result<(Dataset, catalog::MetadataTable), AppError> {
    let dataset = file_loader::load_from_bytes(&form.file_name, &form.file_data)?;
    let table = catalog::build(&dataset.columns, &form.report_id, form.report_type);
    Ok((dataset, table))
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    file_name: String,
    row_count: usize,
    column_count: usize,
    report_id: String,
    summary: CatalogSummary,
    records: Vec<MetadataRecord>,
}

async fn preview_attributes(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<PreviewResponse>, AppError> {
    let form = read_form(multipart, &state.config.default_report_id).await?;
    tracing::info!(
        "Preview requested for {} (report {}, {})",
        form.file_name,
        form.report_id,
        form.report_type
    );

    let (dataset, table) = load_and_build(&form)?;
    let summary = table.summary(form.report_type);

    Ok(Json(PreviewResponse {
        file_name: form.file_name,
        row_count: dataset.row_count,
        column_count: dataset.column_count(),
        report_id: form.report_id,
        summary,
        records: table.records,
    }))
}

async fn export_attributes(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let start = std::time::Instant::now();
    let form = read_form(multipart, &state.config.default_report_id).await?;
    tracing::info!(
        "Export requested for {} (report {}, {})",
        form.file_name,
        form.report_id,
        form.report_type
    );

    let (_, table) = load_and_build(&form)?;
    let workbook = catalog::export(&table)?;
    let file_name = catalog::attributes_file_name(&form.report_id);

    tracing::info!(
        "Export of {} attributes completed in {:?}",
        table.len(),
        start.elapsed()
    );

    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ),
    ];
    Ok((headers, workbook))
}
