use bigdecimal::{BigDecimal, Zero};
use indexmap::IndexMap;

/// One uploaded file exactly as the upload surface delivered it.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Declared extension, lowercased; selects the decode path.
    pub fn extension(&self) -> String {
        self.name.rsplit('.').next().unwrap_or("").to_lowercase()
    }

    /// Filename without its extension, for period labels and logs.
    pub fn stem(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) if idx > 0 => &self.name[..idx],
            _ => &self.name,
        }
    }
}

/// A sheet decoded into plain text cells. No header is assumed; the header
/// row position is detected later, in memory, without re-reading the bytes.
#[derive(Debug, Clone)]
pub struct RawGrid {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl RawGrid {
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(|cell| cell.trim().is_empty()))
    }
}

/// Per-sheet extraction result - quantities grouped by folded item identity,
/// plus a price side-channel keeping the first observed price per item.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedSheet {
    pub quantities: IndexMap<String, BigDecimal>,
    pub prices: IndexMap<String, BigDecimal>,
}

impl ExtractedSheet {
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Accumulate a quantity for an item; duplicate rows sum, not concatenate.
    pub fn add_quantity(&mut self, item: String, quantity: BigDecimal) {
        let entry = self.quantities.entry(item).or_insert_with(BigDecimal::zero);
        *entry = &*entry + &quantity;
    }

    /// Record a price for an item. Prices are never summed; the first
    /// observed value wins.
    pub fn record_price(&mut self, item: &str, price: BigDecimal) {
        if !self.prices.contains_key(item) {
            self.prices.insert(item.to_string(), price);
        }
    }
}

/// Per-file table: one quantity column per contributing sheet, outer-joined
/// on item identity with zero fill, plus the file's merged price channel.
#[derive(Debug, Clone, Default)]
pub struct AggregateTable {
    /// Contributing sheet names, in workbook order.
    pub columns: Vec<String>,
    /// Folded item identity -> one quantity per column.
    pub rows: IndexMap<String, Vec<BigDecimal>>,
    pub prices: IndexMap<String, BigDecimal>,
}

impl AggregateTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Reduce to one total-quantity column (the shape the period merger
    /// consumes). Row order is preserved.
    pub fn totals(&self) -> IndexMap<String, BigDecimal> {
        self.rows
            .iter()
            .map(|(item, quantities)| {
                let mut total = BigDecimal::zero();
                for quantity in quantities {
                    total += quantity;
                }
                (item.clone(), total)
            })
            .collect()
    }
}

/// One row of the final reconciled summary.
#[derive(Debug, Clone)]
pub struct MergedRow {
    /// One quantity per period column, zero-filled.
    pub quantities: Vec<BigDecimal>,
    /// Sum of `quantities`, fixed at merge time.
    pub total: BigDecimal,
    pub price: Option<BigDecimal>,
}

/// The final cross-period, cross-branch summary.
#[derive(Debug, Clone, Default)]
pub struct MergedSummary {
    /// Display labels of the period quantity columns, in input-file order.
    pub period_labels: Vec<String>,
    /// Folded item identity -> merged row.
    pub rows: IndexMap<String, MergedRow>,
}

impl MergedSummary {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// True when any row carries a price, i.e. the report needs the column.
    pub fn has_prices(&self) -> bool {
        self.rows.values().any(|row| row.price.is_some())
    }
}
