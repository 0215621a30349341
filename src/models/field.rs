use serde::{Deserialize, Serialize};

/// Canonical column roles that raw spreadsheet headers are normalized onto.
///
/// The enum order is load-bearing: when several synonym lists match the same
/// label, the first field in this order wins. See `match_label`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    ItemIdentity,
    Quantity,
    Price,
    Notes,
    Serial,
}

/// Matching order for `match_label`.
pub const FIELD_ORDER: [CanonicalField; 5] = [
    CanonicalField::ItemIdentity,
    CanonicalField::Quantity,
    CanonicalField::Price,
    CanonicalField::Notes,
    CanonicalField::Serial,
];

impl CanonicalField {
    /// Lowercase substrings recognized for this field, English and Arabic.
    /// Branch files use either language, with free casing and whitespace.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            CanonicalField::ItemIdentity => {
                &["item", "product", "equipment name", "الصنف", "المنتج", "اسم الجهاز"]
            }
            CanonicalField::Quantity => &["qty", "quantity", "number", "الكمية", "العدد"],
            CanonicalField::Price => &["price", "السعر"],
            CanonicalField::Notes => &["notes", "ملاحظات"],
            CanonicalField::Serial => &["serial", "تسلسل"],
        }
    }

    /// Stable key used when a canonical column is named in output/config.
    pub fn key(&self) -> &'static str {
        match self {
            CanonicalField::ItemIdentity => "item",
            CanonicalField::Quantity => "quantity",
            CanonicalField::Price => "price",
            CanonicalField::Notes => "notes",
            CanonicalField::Serial => "serial",
        }
    }

    /// Map a raw header label to a canonical field.
    ///
    /// The lowercased, trimmed label is tested for substring containment
    /// against each field's synonyms in `FIELD_ORDER`; the first field with
    /// any hit wins, not the most specific one. "Serial Number" therefore
    /// lands on `Quantity`, since "number" is a quantity synonym. Accepted
    /// imprecision of the substring policy.
    pub fn match_label(raw: &str) -> Option<CanonicalField> {
        let label = fold_label(raw);
        FIELD_ORDER
            .into_iter()
            .find(|field| field.synonyms().iter().any(|syn| label.contains(syn)))
    }
}

/// Normalize a raw header label: its canonical key when recognized,
/// otherwise the lowercased trimmed label passed through unchanged.
/// Unrecognized headers are neither errors nor dropped, they just never
/// merge into a canonical column.
pub fn normalize_label(raw: &str) -> String {
    match CanonicalField::match_label(raw) {
        Some(field) => field.key().to_string(),
        None => fold_label(raw),
    }
}

/// Case-fold a label or item identity for matching/grouping.
pub fn fold_label(raw: &str) -> String {
    raw.trim().to_lowercase()
}
