//! Integration hooks
//!
//! Every sync integration supplies a `SyncSource`: the code identifying the
//! system it imports from and the validation/transform applied to each new
//! row before it is written.

use crate::model::{ImportRow, NewImportedRow};

/// Capability interface each import integration implements
pub trait SyncSource {
    /// Logical code identifying the source system or endpoint
    fn sync_source_code(&self) -> String;

    /// Validate or alter a row about to be inserted
    ///
    /// `original` is the row as submitted, `candidate` the payload built by
    /// the reconciler. Return the (possibly modified) candidate to accept the
    /// row, or an error message to abort the batch at this row.
    ///
    /// # Errors
    ///
    /// The returned message becomes the batch's failure payload.
    fn validate_upsert(
        &self,
        original: &ImportRow,
        candidate: NewImportedRow,
    ) -> Result<NewImportedRow, String>;
}

/// Accepts every row unchanged
///
/// Copies the commonly sent optional fields (`user`, `product_id`,
/// `analytic_account_id`, `metadata`, `force`) from the submitted row.
#[derive(Debug, Clone)]
pub struct PassThroughSync {
    code: String,
}

impl PassThroughSync {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

impl SyncSource for PassThroughSync {
    fn sync_source_code(&self) -> String {
        self.code.clone()
    }

    fn validate_upsert(
        &self,
        original: &ImportRow,
        mut candidate: NewImportedRow,
    ) -> Result<NewImportedRow, String> {
        candidate.import_user = original.extra_str("user").map(str::to_string);
        candidate.product_id = original.extra_i64("product_id");
        candidate.analytic_account_id = original.extra_i64("analytic_account_id");
        candidate.metadata = original.extra_str("metadata").map(str::to_string);
        candidate.must_force = original
            .extra
            .get("force")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_row() -> ImportRow {
        serde_json::from_value(json!({
            "import_key": "T-1",
            "account_import_key": "PRJ-1",
            "name": "Consulting",
            "ref": "INV-7",
            "date": "2024-03-01",
            "unit_amount": 2.0,
            "price_unit": 50.0,
            "amount": 100.0,
            "user": "alice",
            "product_id": 9,
            "force": true
        }))
        .unwrap()
    }

    fn candidate_for(row: &ImportRow) -> NewImportedRow {
        NewImportedRow {
            sync_module: "etl".to_string(),
            source: "harvest".to_string(),
            import_key: row.import_key.clone(),
            account_import_key: row.account_import_key.clone(),
            name: row.name.clone(),
            reference: row.reference.clone(),
            date: row.date,
            unit_amount: row.unit_amount,
            price_unit: row.price_unit,
            amount: row.amount,
            currency: "USD".to_string(),
            import_user: None,
            analytic_account_id: None,
            product_id: None,
            metadata: None,
            log: None,
            must_force: false,
            data_mapping_id: None,
        }
    }

    #[test]
    fn test_pass_through_copies_optional_fields() {
        let hook = PassThroughSync::new("harvest");
        let row = sample_row();
        let accepted = hook.validate_upsert(&row, candidate_for(&row)).unwrap();

        assert_eq!(hook.sync_source_code(), "harvest");
        assert_eq!(accepted.import_user.as_deref(), Some("alice"));
        assert_eq!(accepted.product_id, Some(9));
        assert!(accepted.must_force);
        assert_eq!(accepted.analytic_account_id, None);
    }
}
