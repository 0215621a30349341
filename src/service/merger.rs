use crate::models::{AggregateTable, ExtractedSheet, MergedRow, MergedSummary};
use bigdecimal::{BigDecimal, Zero};
use indexmap::IndexMap;

/// Combine a file's extracted sheets into one table via successive outer
/// joins on item identity.
///
/// The fold runs left-to-right over the given sheet order, so column order
/// is reproducible; the resulting row set and values do not depend on the
/// order. Cells absent in a given sheet are zero, not missing.
pub fn aggregate_sheets(per_sheet: Vec<(String, ExtractedSheet)>) -> AggregateTable {
    let mut table = AggregateTable::default();

    for (sheet_name, extracted) in per_sheet {
        let col = table.columns.len();
        table.columns.push(sheet_name);

        // Widen every existing row with a zero for the new column.
        for quantities in table.rows.values_mut() {
            quantities.push(BigDecimal::zero());
        }

        for (item, quantity) in extracted.quantities {
            let row = table
                .rows
                .entry(item)
                .or_insert_with(|| vec![BigDecimal::zero(); col + 1]);
            row[col] = quantity;
        }

        // Merge the price side-channel, first observation wins.
        for (item, price) in extracted.prices {
            if !table.prices.contains_key(&item) {
                table.prices.insert(item, price);
            }
        }
    }

    table
}

/// Outer-join per-file aggregates (periods/branches) into the final summary.
///
/// Each file is first reduced to one total-quantity column. Missing
/// combinations default to zero; `total` is fixed here as the exact sum of
/// the period columns and never recomputed downstream. Prices attach
/// left-biased: the earliest file that recorded a price for an item wins.
/// A single file is simply the degenerate fold - its totals become the
/// summary and the total column equals the one quantity column.
pub fn merge_periods(files: Vec<(String, AggregateTable)>) -> MergedSummary {
    let mut summary = MergedSummary::default();
    let mut prices: IndexMap<String, BigDecimal> = IndexMap::new();

    for (label, table) in files {
        let period = summary.period_labels.len();
        summary.period_labels.push(label);

        for row in summary.rows.values_mut() {
            row.quantities.push(BigDecimal::zero());
        }

        for (item, total) in table.totals() {
            let row = summary.rows.entry(item).or_insert_with(|| MergedRow {
                quantities: vec![BigDecimal::zero(); period + 1],
                total: BigDecimal::zero(),
                price: None,
            });
            row.quantities[period] = total;
        }

        for (item, price) in table.prices {
            if !prices.contains_key(&item) {
                prices.insert(item, price);
            }
        }
    }

    for (item, row) in summary.rows.iter_mut() {
        let mut total = BigDecimal::zero();
        for quantity in &row.quantities {
            total += quantity;
        }
        row.total = total;
        row.price = prices.get(item).cloned();
    }

    summary
}
