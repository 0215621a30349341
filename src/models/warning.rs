use serde::{Deserialize, Serialize};

/// Why a sheet (or a whole file) contributed nothing to the merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// No row in the scan window contained the required header keywords.
    NoHeaderFound,
    /// A header row was found but yielded no item-identity column.
    NoCanonicalColumns,
    /// The sheet held no data rows under its header.
    EmptySheet,
    /// The file bytes could not be decoded at all.
    DecodeFailed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoHeaderFound => write!(f, "no header row detected"),
            SkipReason::NoCanonicalColumns => write!(f, "no item column after normalization"),
            SkipReason::EmptySheet => write!(f, "sheet has no data rows"),
            SkipReason::DecodeFailed(detail) => write!(f, "file could not be decoded: {}", detail),
        }
    }
}

/// A non-fatal, per-sheet or per-file issue. Warnings accumulate in the
/// pipeline outcome instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetWarning {
    pub file: String,
    /// `None` for file-level issues such as a decode failure.
    pub sheet: Option<String>,
    pub reason: SkipReason,
}

impl SheetWarning {
    pub fn for_sheet(file: &str, sheet: &str, reason: SkipReason) -> Self {
        Self {
            file: file.to_string(),
            sheet: Some(sheet.to_string()),
            reason,
        }
    }

    pub fn for_file(file: &str, reason: SkipReason) -> Self {
        Self {
            file: file.to_string(),
            sheet: None,
            reason,
        }
    }
}

impl std::fmt::Display for SheetWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.sheet {
            Some(sheet) => write!(f, "{} / {}: {}", self.file, sheet, self.reason),
            None => write!(f, "{}: {}", self.file, self.reason),
        }
    }
}
