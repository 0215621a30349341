use crate::excel::write_workbook;
use crate::models::{SheetWarning, UploadedFile};
use crate::service::report::{build_report, sorted_rows, title_case_item};
use crate::service::MergerService;
use axum::{
    extract::{Multipart, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Error body, also carrying the skip warnings gathered before the failure.
#[derive(Debug, Serialize)]
pub struct MergeErrorResponse {
    pub success: bool,
    pub message: String,
    pub warnings: Vec<SheetWarning>,
}

/// JSON preview of the merged summary (the on-page table, as data).
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub success: bool,
    pub message: String,
    pub columns: Vec<String>,
    pub rows: Vec<PreviewRow>,
    pub warnings: Vec<SheetWarning>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PreviewRow {
    pub item: String,
    pub quantities: Vec<BigDecimal>,
    pub total: BigDecimal,
    pub price: Option<BigDecimal>,
}

/// Health check
pub async fn health_check() -> &'static str {
    "OK"
}

/// Drain the multipart form into uploaded files. Every field that carries a
/// filename is treated as an upload; other fields are ignored.
async fn collect_uploads(mut multipart: Multipart) -> Result<Vec<UploadedFile>, String> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        let Some(file_name) = field.file_name().map(|name| name.to_string()) else {
            continue;
        };
        let data = field.bytes().await.map_err(|e| e.to_string())?;
        files.push(UploadedFile {
            name: file_name,
            bytes: data.to_vec(),
        });
    }
    Ok(files)
}

/// Merge endpoint: uploads in, downloadable workbook out.
///
/// POST /api/merge (multipart form, repeated `files` field)
pub async fn merge_download(
    State(service): State<Arc<MergerService>>,
    multipart: Multipart,
) -> Response {
    let files = match collect_uploads(multipart).await {
        Ok(files) => files,
        Err(message) => {
            return error_response(StatusCode::BAD_REQUEST, message, Vec::new());
        }
    };
    if files.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "No files uploaded".to_string(),
            Vec::new(),
        );
    }

    let outcome = match service.merge_files(&files) {
        Ok(outcome) => outcome,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error: {}", e),
                Vec::new(),
            );
        }
    };
    if outcome.summary.is_empty() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "No usable order data found in the uploaded files".to_string(),
            outcome.warnings,
        );
    }

    match write_workbook(&build_report(&outcome)) {
        Ok(blob) => {
            let filename = format!("{}.xlsx", service.config().output_filename);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, XLSX_MIME.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                    (
                        HeaderName::from_static("x-merge-warnings"),
                        outcome.warnings.len().to_string(),
                    ),
                ],
                blob,
            )
                .into_response()
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error: {}", e),
            outcome.warnings,
        ),
    }
}

/// Preview endpoint: same pipeline, JSON table instead of a blob.
///
/// POST /api/merge/preview
pub async fn merge_preview(
    State(service): State<Arc<MergerService>>,
    multipart: Multipart,
) -> Response {
    let files = match collect_uploads(multipart).await {
        Ok(files) => files,
        Err(message) => {
            return error_response(StatusCode::BAD_REQUEST, message, Vec::new());
        }
    };
    if files.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "No files uploaded".to_string(),
            Vec::new(),
        );
    }

    match service.merge_files(&files) {
        Ok(outcome) => {
            if outcome.summary.is_empty() {
                return error_response(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "No usable order data found in the uploaded files".to_string(),
                    outcome.warnings,
                );
            }

            let summary = &outcome.summary;
            let with_price = summary.has_prices();

            let mut columns = vec!["Item".to_string()];
            columns.extend(summary.period_labels.iter().cloned());
            columns.push("Total Quantity".to_string());
            if with_price {
                columns.push("Price".to_string());
            }

            let rows = sorted_rows(summary)
                .into_iter()
                .map(|(item, row)| PreviewRow {
                    item: title_case_item(item),
                    quantities: row.quantities.clone(),
                    total: row.total.clone(),
                    price: row.price.clone(),
                })
                .collect();

            let response = PreviewResponse {
                success: true,
                message: format!(
                    "Merged {} file(s) into {} item(s)",
                    outcome.per_file.len(),
                    summary.rows.len()
                ),
                columns,
                rows,
                warnings: outcome.warnings,
                generated_at: Utc::now(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error: {}", e),
            Vec::new(),
        ),
    }
}

fn error_response(status: StatusCode, message: String, warnings: Vec<SheetWarning>) -> Response {
    let response = MergeErrorResponse {
        success: false,
        message,
        warnings,
    };
    (status, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SkipReason;
    use std::str::FromStr;

    #[test]
    fn preview_serializes_quantities_as_exact_decimals() {
        let response = PreviewResponse {
            success: true,
            message: "Merged 2 file(s) into 1 item(s)".to_string(),
            columns: vec![
                "Item".to_string(),
                "First Order Quantity".to_string(),
                "Total Quantity".to_string(),
                "Price".to_string(),
            ],
            rows: vec![PreviewRow {
                item: "Masks".to_string(),
                quantities: vec![BigDecimal::from(5)],
                total: BigDecimal::from(5),
                price: Some(BigDecimal::from_str("12.5").unwrap()),
            }],
            warnings: vec![SheetWarning::for_sheet(
                "orders.xlsx",
                "Cover",
                SkipReason::NoHeaderFound,
            )],
            generated_at: Utc::now(),
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["rows"][0]["item"], "Masks");
        assert_eq!(value["rows"][0]["total"], "5");
        assert_eq!(value["rows"][0]["price"], "12.5");
        assert_eq!(value["warnings"][0]["sheet"], "Cover");
    }
}
