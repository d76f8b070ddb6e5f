use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One candidate row as submitted by a sync integration
///
/// The eight named fields are required; anything else the integration sends
/// is kept in `extra` so that its `validate_upsert` hook can use it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRow {
    /// Source-native key, unique per (module, source)
    pub import_key: String,

    /// Natural key of the target account, resolved at load time
    pub account_import_key: String,

    /// Description
    pub name: String,

    #[serde(rename = "ref")]
    pub reference: String,

    pub date: NaiveDate,

    /// Quantity
    pub unit_amount: f64,

    pub price_unit: f64,

    pub amount: f64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ImportRow {
    /// Whether the import key is usable (not empty, not only whitespace)
    pub fn has_import_key(&self) -> bool {
        !self.import_key.trim().is_empty()
    }

    /// String value of an extra field, if present and a string
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }

    /// Integer value of an extra field, if present and an integer
    pub fn extra_i64(&self, key: &str) -> Option<i64> {
        self.extra.get(key).and_then(Value::as_i64)
    }
}

/// Composite natural key of an imported row
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NaturalKey {
    pub sync_module: String,
    pub source: String,
    pub import_key: String,
}

impl NaturalKey {
    pub fn new(
        sync_module: impl Into<String>,
        source: impl Into<String>,
        import_key: impl Into<String>,
    ) -> Self {
        Self {
            sync_module: sync_module.into(),
            source: source.into(),
            import_key: import_key.into(),
        }
    }
}

impl std::fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.sync_module, self.source, self.import_key)
    }
}

/// Insert payload built by the reconciler and handed to the integration hook
///
/// `sync_module`, `source` and `currency` are resolved on the host side;
/// the rest comes from the submitted row. The optional fields are left
/// empty by the reconciler and may be filled in by `validate_upsert`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewImportedRow {
    pub sync_module: String,
    pub source: String,
    pub import_key: String,
    pub account_import_key: String,
    pub name: String,
    pub reference: String,
    pub date: NaiveDate,
    pub unit_amount: f64,
    pub price_unit: f64,
    pub amount: f64,
    pub currency: String,
    pub import_user: Option<String>,
    /// Explicit target account; overrides the one resolved at load time
    pub analytic_account_id: Option<i64>,
    pub product_id: Option<i64>,
    pub metadata: Option<String>,
    /// Note describing why a row was processed the way it was
    pub log: Option<String>,
    pub must_force: bool,
    /// Mapping rule applied to the row, if any
    pub data_mapping_id: Option<i64>,
}

impl NewImportedRow {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(&self.sync_module, &self.source, &self.import_key)
    }
}

/// A persisted imported row
///
/// Read-only once created, except for `data.log`, `data.data_mapping_id`
/// and `processed`, which the load step sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedRow {
    pub id: i64,
    #[serde(flatten)]
    pub data: NewImportedRow,
    /// Date the row was promoted into the ledger
    pub processed: Option<NaiveDate>,
}

impl ImportedRow {
    pub fn is_processed(&self) -> bool {
        self.processed.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_import_row_keeps_unknown_fields_in_extra() {
        let row: ImportRow = serde_json::from_value(json!({
            "import_key": "T-1",
            "account_import_key": "PRJ-1",
            "name": "Consulting",
            "ref": "INV-7",
            "date": "2024-03-01",
            "unit_amount": 2.0,
            "price_unit": 50.0,
            "amount": 100.0,
            "user": "alice",
            "product_id": 4
        }))
        .unwrap();

        assert_eq!(row.reference, "INV-7");
        assert_eq!(row.extra_str("user"), Some("alice"));
        assert_eq!(row.extra_i64("product_id"), Some(4));
        assert!(!row.extra.contains_key("ref"));
    }

    #[test]
    fn test_import_row_missing_required_field_fails() {
        let result: std::result::Result<ImportRow, _> = serde_json::from_value(json!({
            "import_key": "T-1",
            "name": "Consulting"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_whitespace_import_key_is_not_usable() {
        let mut row: ImportRow = serde_json::from_value(json!({
            "import_key": "  \t",
            "account_import_key": "PRJ-1",
            "name": "n",
            "ref": "r",
            "date": "2024-03-01",
            "unit_amount": 0.0,
            "price_unit": 0.0,
            "amount": 0.0
        }))
        .unwrap();
        assert!(!row.has_import_key());

        row.import_key = "K".to_string();
        assert!(row.has_import_key());
    }

    #[test]
    fn test_natural_key_display() {
        let key = NaturalKey::new("etl_harvest", "harvest", "T-1");
        assert_eq!(key.to_string(), "etl_harvest/harvest/T-1");
    }
}
