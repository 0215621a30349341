use crate::excel::{ReportCell, ReportSheet};
use crate::models::{AggregateTable, MergedRow, MergedSummary};
use crate::service::pipeline::MergeOutcome;
use bigdecimal::ToPrimitive;

/// Display label of the Nth period quantity column.
pub fn period_label(index: usize) -> String {
    match index {
        0 => "First Order Quantity".to_string(),
        1 => "Second Order Quantity".to_string(),
        2 => "Third Order Quantity".to_string(),
        _ => format!("Order {} Quantity", index + 1),
    }
}

/// Worksheet name for the Nth input file's detail table.
pub fn period_sheet_name(index: usize) -> String {
    match index {
        0 => "First Order".to_string(),
        1 => "Second Order".to_string(),
        2 => "Third Order".to_string(),
        _ => format!("Order {}", index + 1),
    }
}

/// Title-case a folded item identity for display. Grouping always uses the
/// folded key; this form exists only in output.
pub fn title_case_item(folded: &str) -> String {
    let mut out = String::with_capacity(folded.len());
    let mut prev_alphabetic = false;
    for c in folded.chars() {
        if c.is_alphabetic() && !prev_alphabetic {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_alphabetic = c.is_alphabetic();
    }
    out
}

/// Rows of the summary in presentation order: total descending, stable for
/// ties. A display convention, not a structural invariant.
pub fn sorted_rows(summary: &MergedSummary) -> Vec<(&String, &MergedRow)> {
    let mut rows: Vec<(&String, &MergedRow)> = summary.rows.iter().collect();
    rows.sort_by(|(_, a), (_, b)| b.total.cmp(&a.total));
    rows
}

/// Build the "Combined Summary" table: Item | period quantities | Total
/// Quantity | Price (only when any row has one).
pub fn summary_sheet(summary: &MergedSummary) -> ReportSheet {
    let with_price = summary.has_prices();

    let mut headers = vec!["Item".to_string()];
    headers.extend(summary.period_labels.iter().cloned());
    headers.push("Total Quantity".to_string());
    if with_price {
        headers.push("Price".to_string());
    }

    let rows = sorted_rows(summary)
        .into_iter()
        .map(|(item, row)| {
            let mut cells = vec![ReportCell::Text(title_case_item(item))];
            for quantity in &row.quantities {
                cells.push(number_cell(quantity));
            }
            cells.push(number_cell(&row.total));
            if with_price {
                cells.push(match &row.price {
                    Some(price) => number_cell(price),
                    None => ReportCell::Empty,
                });
            }
            cells
        })
        .collect();

    ReportSheet {
        name: "Combined Summary".to_string(),
        headers,
        rows,
    }
}

/// Build one input file's detail table: Item | per-sheet quantities | Total
/// Quantity, sorted like the summary.
pub fn file_sheet(name: String, table: &AggregateTable) -> ReportSheet {
    let mut headers = vec!["Item".to_string()];
    headers.extend(table.columns.iter().cloned());
    headers.push("Total Quantity".to_string());

    let totals = table.totals();
    let mut items: Vec<&String> = table.rows.keys().collect();
    items.sort_by(|a, b| totals[*b].cmp(&totals[*a]));

    let rows = items
        .into_iter()
        .map(|item| {
            let mut cells = vec![ReportCell::Text(title_case_item(item))];
            for quantity in &table.rows[item] {
                cells.push(number_cell(quantity));
            }
            cells.push(number_cell(&totals[item]));
            cells
        })
        .collect();

    ReportSheet {
        name,
        headers,
        rows,
    }
}

/// Assemble the full report: one detail sheet per input file, then the
/// combined summary.
pub fn build_report(outcome: &MergeOutcome) -> Vec<ReportSheet> {
    let mut sheets: Vec<ReportSheet> = outcome
        .per_file
        .iter()
        .enumerate()
        .map(|(idx, (_, table))| file_sheet(period_sheet_name(idx), table))
        .collect();
    sheets.push(summary_sheet(&outcome.summary));
    sheets
}

fn number_cell(value: &bigdecimal::BigDecimal) -> ReportCell {
    ReportCell::Number(value.to_f64().unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    fn dec(v: &str) -> BigDecimal {
        BigDecimal::from_str(v).unwrap()
    }

    #[test]
    fn title_casing_matches_display_convention() {
        assert_eq!(title_case_item("gloves"), "Gloves");
        assert_eq!(title_case_item("nitrile gloves (large)"), "Nitrile Gloves (Large)");
        assert_eq!(title_case_item("x-ray film"), "X-Ray Film");
    }

    #[test]
    fn period_labels_follow_file_order() {
        assert_eq!(period_label(0), "First Order Quantity");
        assert_eq!(period_label(1), "Second Order Quantity");
        assert_eq!(period_label(3), "Order 4 Quantity");
        assert_eq!(period_sheet_name(1), "Second Order");
    }

    #[test]
    fn summary_rows_sort_by_total_descending() {
        let mut summary = MergedSummary::default();
        summary.period_labels.push("First Order Quantity".to_string());
        for (item, total) in [("masks", "5"), ("gloves", "13"), ("syringes", "7")] {
            summary.rows.insert(
                item.to_string(),
                MergedRow {
                    quantities: vec![dec(total)],
                    total: dec(total),
                    price: None,
                },
            );
        }

        let sheet = summary_sheet(&summary);
        assert_eq!(sheet.headers, ["Item", "First Order Quantity", "Total Quantity"]);
        let first_cells: Vec<&ReportCell> = sheet.rows.iter().map(|row| &row[0]).collect();
        assert_eq!(
            first_cells,
            [
                &ReportCell::Text("Gloves".to_string()),
                &ReportCell::Text("Syringes".to_string()),
                &ReportCell::Text("Masks".to_string()),
            ]
        );
    }

    #[test]
    fn price_column_appears_only_when_recorded() {
        let mut summary = MergedSummary::default();
        summary.period_labels.push("First Order Quantity".to_string());
        summary.rows.insert(
            "masks".to_string(),
            MergedRow {
                quantities: vec![dec("2")],
                total: dec("2"),
                price: Some(dec("12.5")),
            },
        );
        summary.rows.insert(
            "gloves".to_string(),
            MergedRow {
                quantities: vec![dec("9")],
                total: dec("9"),
                price: None,
            },
        );

        let sheet = summary_sheet(&summary);
        assert_eq!(
            sheet.headers,
            ["Item", "First Order Quantity", "Total Quantity", "Price"]
        );
        // Gloves sorts first (9 > 2) and has an empty price cell.
        assert_eq!(sheet.rows[0][3], ReportCell::Empty);
        assert_eq!(sheet.rows[1][3], ReportCell::Number(12.5));
    }
}
