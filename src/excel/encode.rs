use rust_xlsxwriter::{Format, Workbook};

/// One cell of a report table.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportCell {
    Text(String),
    Number(f64),
    Empty,
}

/// A named, header-plus-rows table ready for serialization. Purely a
/// data-to-bytes shape; the report formatter decides content and order.
#[derive(Debug, Clone)]
pub struct ReportSheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<ReportCell>>,
}

/// Serialize the report tables into one workbook, one worksheet per table,
/// returned as an in-memory blob for the download surface.
pub fn write_workbook(
    sheets: &[ReportSheet],
) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sanitize_sheet_name(&sheet.name))?;

        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
        }

        for (row_idx, row) in sheet.rows.iter().enumerate() {
            let row_num = (row_idx + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                match cell {
                    ReportCell::Text(s) => {
                        worksheet.write_string(row_num, col as u16, s)?;
                    }
                    ReportCell::Number(n) => {
                        worksheet.write_number(row_num, col as u16, *n)?;
                    }
                    ReportCell::Empty => {}
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Worksheet names cap at 31 chars and reject a handful of characters;
/// uploaded filenames feed into them, so clean them up first.
fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => ' ',
            _ => c,
        })
        .collect();
    let capped: String = cleaned.trim().chars().take(31).collect();
    let capped = capped.trim_end().to_string();
    if capped.is_empty() {
        "Sheet".to_string()
    } else {
        capped
    }
}
