use crate::config::PipelineConfig;
use crate::excel::decode_file;
use crate::models::{AggregateTable, MergedSummary, SheetWarning, SkipReason, UploadedFile};
use crate::service::extractor::{extract_sheet, locate_header_row};
use crate::service::merger::{aggregate_sheets, merge_periods};
use crate::service::report::period_label;

/// Everything one pipeline run produced: the reconciled summary, the
/// per-file detail tables, and the skip warnings accumulated along the way.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub summary: MergedSummary,
    /// One entry per decodable input file, in upload order: (file stem,
    /// per-sheet aggregate).
    pub per_file: Vec<(String, AggregateTable)>,
    pub warnings: Vec<SheetWarning>,
}

/// Merger service - runs the full reconciliation pipeline for one request.
///
/// Stateless between invocations; every call operates on its own freshly
/// decoded copies of the uploaded data.
pub struct MergerService {
    config: PipelineConfig,
}

impl MergerService {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline over the uploaded files.
    ///
    /// Sheet- and file-level problems become warnings in the outcome, not
    /// errors; an outcome with an empty summary means no sheet anywhere had
    /// usable data. Only an empty upload list is a hard error.
    pub fn merge_files(
        &self,
        files: &[UploadedFile],
    ) -> Result<MergeOutcome, Box<dyn std::error::Error + Send + Sync>> {
        if files.is_empty() {
            return Err("no files supplied".into());
        }

        let mut warnings: Vec<SheetWarning> = Vec::new();
        let mut per_file: Vec<(String, AggregateTable)> = Vec::new();

        for file in files {
            // 1. Decode the upload once into raw grids. A file that fails to
            //    decode is excluded; the run continues with the rest.
            let grids = match decode_file(file) {
                Ok(grids) => grids,
                Err(e) => {
                    tracing::warn!("[{}] decode failed: {}", file.name, e);
                    warnings.push(SheetWarning::for_file(
                        &file.name,
                        SkipReason::DecodeFailed(e.to_string()),
                    ));
                    continue;
                }
            };
            tracing::info!("[{}] decoded {} sheet(s)", file.name, grids.len());

            // 2. Locate the header and extract each candidate sheet.
            let mut extracted = Vec::new();
            for grid in &grids {
                if grid.is_empty() {
                    tracing::warn!("[{}] sheet '{}' skipped: blank", file.name, grid.name);
                    warnings.push(SheetWarning::for_sheet(
                        &file.name,
                        &grid.name,
                        SkipReason::EmptySheet,
                    ));
                    continue;
                }

                let header_row = match locate_header_row(grid, self.config.header_scan_limit) {
                    Some(row) => row,
                    None => {
                        tracing::warn!("[{}] sheet '{}' skipped: no header row", file.name, grid.name);
                        warnings.push(SheetWarning::for_sheet(
                            &file.name,
                            &grid.name,
                            SkipReason::NoHeaderFound,
                        ));
                        continue;
                    }
                };

                match extract_sheet(grid, header_row) {
                    Ok(sheet) => {
                        tracing::info!(
                            "[{}] sheet '{}': header at row {}, {} item(s)",
                            file.name,
                            grid.name,
                            header_row,
                            sheet.quantities.len()
                        );
                        extracted.push((grid.name.clone(), sheet));
                    }
                    Err(reason) => {
                        tracing::warn!("[{}] sheet '{}' skipped: {}", file.name, grid.name, reason);
                        warnings.push(SheetWarning::for_sheet(&file.name, &grid.name, reason));
                    }
                }
            }

            // 3. Aggregate the file's sheets. A decoded file with no usable
            //    sheets still occupies its period column, as zeroes.
            let aggregate = aggregate_sheets(extracted);
            if aggregate.is_empty() {
                tracing::warn!("[{}] contributed no rows", file.name);
            }
            per_file.push((file.stem().to_string(), aggregate));
        }

        // 4. Merge the per-file aggregates across periods.
        let labeled = per_file
            .iter()
            .enumerate()
            .map(|(idx, (_, table))| (period_label(idx), table.clone()))
            .collect();
        let summary = merge_periods(labeled);

        tracing::info!(
            "merge complete: {} file(s), {} item(s), {} warning(s)",
            per_file.len(),
            summary.rows.len(),
            warnings.len()
        );

        Ok(MergeOutcome {
            summary,
            per_file,
            warnings,
        })
    }
}
