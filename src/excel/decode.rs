use crate::models::{RawGrid, UploadedFile};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

/// Decode an uploaded file into raw text grids, one per sheet.
///
/// The declared filename extension selects the decode path: `csv` is read as
/// a single delimited grid, anything else goes through the spreadsheet
/// reader. Each upload is decoded exactly once; header detection and
/// extraction later operate on the in-memory grids.
pub fn decode_file(
    file: &UploadedFile,
) -> Result<Vec<RawGrid>, Box<dyn std::error::Error + Send + Sync>> {
    match file.extension().as_str() {
        "csv" => decode_csv(file),
        _ => decode_workbook(file),
    }
}

/// Read a delimited file into one grid. No header row is assumed here; rows
/// are kept verbatim so the header locator can find the label row itself.
fn decode_csv(
    file: &UploadedFile,
) -> Result<Vec<RawGrid>, Box<dyn std::error::Error + Send + Sync>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file.bytes.as_slice());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    Ok(vec![RawGrid {
        name: file.stem().to_string(),
        rows,
    }])
}

/// Read a workbook (xlsx/xls/xlsm/ods) from the uploaded bytes. Every sheet
/// becomes a candidate grid; a sheet whose range cannot be read is logged
/// and skipped rather than failing the file.
fn decode_workbook(
    file: &UploadedFile,
) -> Result<Vec<RawGrid>, Box<dyn std::error::Error + Send + Sync>> {
    let cursor = Cursor::new(file.bytes.as_slice());
    let mut workbook = open_workbook_auto_from_rs(cursor)?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut grids = Vec::new();

    for name in &sheet_names {
        let range = match workbook.worksheet_range(name) {
            Ok(range) => range,
            Err(e) => {
                tracing::warn!("[{}] sheet '{}' unreadable: {}", file.name, name, e);
                continue;
            }
        };

        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();

        grids.push(RawGrid {
            name: name.clone(),
            rows,
        });
    }

    Ok(grids)
}

/// Render a spreadsheet cell as text. Whole-number floats drop their
/// fractional zero so "10.0" and "10" fold to the same token.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_are_read_verbatim() {
        let file = UploadedFile {
            name: "orders.csv".to_string(),
            bytes: b"Monthly Orders,,\nItem,Qty,Price\nGloves,10,2.5\n".to_vec(),
        };

        let grids = decode_file(&file).unwrap();
        assert_eq!(grids.len(), 1);
        assert_eq!(grids[0].name, "orders");
        // The pre-header banner row survives; header detection happens later.
        assert_eq!(grids[0].rows[0][0], "Monthly Orders");
        assert_eq!(grids[0].rows[1], vec!["Item", "Qty", "Price"]);
        assert_eq!(grids[0].rows[2], vec!["Gloves", "10", "2.5"]);
    }

    #[test]
    fn ragged_csv_rows_are_tolerated() {
        let file = UploadedFile {
            name: "ragged.csv".to_string(),
            bytes: b"Item,Qty\nGloves,10,extra\nMasks\n".to_vec(),
        };

        let grids = decode_file(&file).unwrap();
        assert_eq!(grids[0].rows.len(), 3);
        assert_eq!(grids[0].rows[1].len(), 3);
        assert_eq!(grids[0].rows[2].len(), 1);
    }

    #[test]
    fn corrupt_workbook_is_an_error() {
        let file = UploadedFile {
            name: "broken.xlsx".to_string(),
            bytes: b"definitely not a zip archive".to_vec(),
        };
        assert!(decode_file(&file).is_err());
    }

    #[test]
    fn whole_number_floats_render_without_fraction() {
        assert_eq!(cell_to_string(&Data::Float(10.0)), "10");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }
}
