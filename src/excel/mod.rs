pub mod decode;
pub mod encode;

pub use decode::decode_file;
pub use encode::{write_workbook, ReportCell, ReportSheet};
