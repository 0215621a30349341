pub mod field;
pub mod table;
pub mod warning;

pub use field::{fold_label, normalize_label, CanonicalField};
pub use table::{
    AggregateTable, ExtractedSheet, MergedRow, MergedSummary, RawGrid, UploadedFile,
};
pub use warning::{SheetWarning, SkipReason};
