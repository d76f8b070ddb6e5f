#![allow(clippy::unwrap_used)]

mod common;

use std::collections::BTreeSet;

use common::{rows, MODULE, SOURCE};
use etlshell_core::{batch_upsert, MemoryImportLedger, PassThroughSync, UpsertSettings};
use proptest::prelude::*;

proptest! {
    #[test]
    fn prop_replaying_a_batch_inserts_nothing(keys in prop::collection::vec("[A-F]{1,2}", 0..20)) {
        let mut ledger = MemoryImportLedger::new();
        let hook = PassThroughSync::new(SOURCE);
        let settings = UpsertSettings::new(MODULE, "USD");
        let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let batch = rows(&key_refs);

        let first = batch_upsert(&mut ledger, &hook, &settings, batch.clone());
        let distinct: BTreeSet<_> = keys.iter().collect();
        prop_assert!(first.is_ok());
        prop_assert_eq!(first.inserted(), distinct.len());
        prop_assert_eq!(ledger.len(), distinct.len());

        let second = batch_upsert(&mut ledger, &hook, &settings, batch);
        prop_assert!(second.is_ok());
        prop_assert_eq!(second.inserted(), 0);
        prop_assert_eq!(ledger.len(), distinct.len());
    }

    #[test]
    fn prop_single_failure_leaves_every_other_row(
        keys in prop::collection::btree_set("[a-z]{3}", 1..12),
        pick in any::<prop::sample::Index>(),
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let failing = pick.get(&keys).clone();
        let mut ledger = MemoryImportLedger::new();
        ledger.fail_commits_for(failing.clone());
        let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();

        let outcome = batch_upsert(
            &mut ledger,
            &PassThroughSync::new(SOURCE),
            &UpsertSettings::new(MODULE, "USD"),
            rows(&key_refs),
        );

        prop_assert!(!outcome.is_ok());
        prop_assert_eq!(outcome.failures().len(), 1);
        prop_assert_eq!(&outcome.failures()[0].import_key, &failing);
        prop_assert_eq!(ledger.len(), keys.len() - 1);
    }
}
