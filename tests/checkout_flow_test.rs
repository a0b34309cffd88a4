mod common;

use async_trait::async_trait;
use common::{account, checkout, checkout_with, enabled_config, order};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sepa_debit::application::registry::ValidationOutcome;
use sepa_debit::domain::account::{CustomerAccountSnapshot, RawAccountFields};
use sepa_debit::domain::customer::CheckoutContext;
use sepa_debit::domain::mandate::{METHOD_CODE, MandateForm, MandateRecord};
use sepa_debit::domain::ports::{CustomerProfileStore, MandateStore};
use sepa_debit::error::{DebitError, Result};
use sepa_debit::infrastructure::in_memory::{InMemoryCustomerProfileStore, InMemoryMandateStore};
use std::collections::HashSet;
use std::sync::Arc;

/// A mandate table that is down.
struct BrokenMandateStore;

#[async_trait]
impl MandateStore for BrokenMandateStore {
    async fn insert(&self, _record: MandateRecord) -> Result<()> {
        Err(DebitError::IoError(std::io::Error::other("mandate table locked")))
    }
    async fn update(&self, _record: MandateRecord) -> Result<()> {
        Err(DebitError::IoError(std::io::Error::other("mandate table locked")))
    }
    async fn get(&self, _order_id: u64) -> Result<Option<MandateRecord>> {
        Ok(None)
    }
    async fn pending(&self) -> Result<Vec<MandateRecord>> {
        Ok(Vec::new())
    }
}

/// A customer table that is down.
struct BrokenCustomerStore;

#[async_trait]
impl CustomerProfileStore for BrokenCustomerStore {
    async fn save_snapshot(&self, _snapshot: CustomerAccountSnapshot) -> Result<()> {
        Err(DebitError::IoError(std::io::Error::other("customer table locked")))
    }
    async fn get_snapshot(&self, _customer_id: u64) -> Result<Option<CustomerAccountSnapshot>> {
        Ok(None)
    }
}

#[test]
fn test_reveal_returns_captured_values() {
    let checkout = checkout(enabled_config());
    let mut rng = rand::thread_rng();

    for _ in 0..20 {
        let swift: String = (&mut rng).sample_iter(&Alphanumeric).take(11).map(char::from).collect();
        let iban: String = (&mut rng).sample_iter(&Alphanumeric).take(22).map(char::from).collect();
        let info = checkout
            .assign_payment_data(RawAccountFields {
                debit_swift: Some(swift.clone()),
                debit_iban: Some(iban.clone()),
                ..RawAccountFields::default()
            })
            .unwrap();

        let revealed = checkout.vault().reveal(&info).unwrap();
        assert_eq!(revealed.swift, Some(swift));
        assert_eq!(revealed.iban, Some(iban));
    }
}

#[test]
fn test_inactive_method_is_never_offered() {
    let mut config = enabled_config();
    config.active = false;
    config.allow_all_groups = true;
    config.minimum_orders = 0;
    let checkout = checkout(config);

    assert!(!checkout.offer(1, &CheckoutContext::guest(0)));
    assert!(!checkout.offer(1, &CheckoutContext::registered(1, 1, 50)));
}

#[tokio::test]
async fn test_mandate_failure_does_not_fail_order() {
    let checkout = checkout_with(
        enabled_config(),
        Box::new(BrokenMandateStore),
        InMemoryCustomerProfileStore::new(),
    );
    let info = checkout
        .assign_payment_data(account("Erika Mustermann", "DE89370400440532013000"))
        .unwrap();

    let follow_up = checkout
        .after_order_saved(&order(1, 1, Some(3)), info, &MandateForm::new("Berlin", "1"))
        .await
        .expect("order workflow must complete");

    assert!(follow_up.mandate.is_none());
    assert!(follow_up.snapshot_saved);
}

#[tokio::test]
async fn test_snapshot_failure_does_not_fail_order() {
    let checkout = checkout_with(
        enabled_config(),
        Box::new(InMemoryMandateStore::new()),
        BrokenCustomerStore,
    );
    let info = checkout
        .assign_payment_data(account("Erika Mustermann", "DE89370400440532013000"))
        .unwrap();

    let follow_up = checkout
        .after_order_saved(&order(1, 1, Some(3)), info, &MandateForm::new("Berlin", "1"))
        .await
        .unwrap();

    assert!(!follow_up.snapshot_saved);
    assert!(follow_up.mandate.is_some());
}

#[tokio::test]
async fn test_snapshot_keeps_latest_order() {
    let checkout = checkout(enabled_config());
    let form = MandateForm::new("Berlin", "1");

    let first = checkout
        .assign_payment_data(account("Erika Mustermann", "DE89370400440532013000"))
        .unwrap();
    checkout
        .after_order_saved(&order(1, 1, Some(3)), first, &form)
        .await
        .unwrap();

    let second = checkout
        .assign_payment_data(account("Erika Musterfrau", "DE02120300000000202051"))
        .unwrap();
    checkout
        .after_order_saved(&order(2, 2, Some(3)), second, &form)
        .await
        .unwrap();

    let (snapshot, revealed) = checkout.vault().prefill(3).await.unwrap().unwrap();
    assert_eq!(snapshot.owner_name, "Erika Musterfrau");
    assert_eq!(revealed.iban.as_deref(), Some("DE02120300000000202051"));
}

#[test]
fn test_rejected_mandate_blocks_order() {
    let checkout = checkout(enabled_config());

    for form in [MandateForm::new("", "1"), MandateForm::new("Berlin", "0")] {
        let outcome = checkout.validate_before_save(1, METHOD_CODE, &form);
        assert!(outcome.is_rejected());
        let response = outcome.response();
        assert!(!response.success);
        assert!(response.error);
    }

    assert_eq!(
        checkout.validate_before_save(1, METHOD_CODE, &MandateForm::new("Berlin", "1")),
        ValidationOutcome::Accepted
    );
}

#[tokio::test]
async fn test_concurrent_guest_orders_get_unique_references() {
    let checkout = Arc::new(checkout(enabled_config()));

    let mut handles = Vec::new();
    for order_id in 1..=50 {
        let checkout = checkout.clone();
        handles.push(tokio::spawn(async move {
            let info = checkout
                .assign_payment_data(account("Guest", "DE89370400440532013000"))
                .unwrap();
            // Every guest shares customer 0 and the same quote id
            checkout
                .after_order_saved(&order(order_id, 7, None), info, &MandateForm::new("Berlin", "1"))
                .await
                .unwrap()
                .mandate
                .unwrap()
                .mandate_reference
        }));
    }

    let mut references = HashSet::new();
    for handle in handles {
        references.insert(handle.await.unwrap());
    }
    assert_eq!(references.len(), 50);
    assert_eq!(checkout.registry().pending().await.unwrap().len(), 50);
}
