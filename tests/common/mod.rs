use sepa_debit::application::checkout::DebitCheckout;
use sepa_debit::application::registry::MandateRegistry;
use sepa_debit::application::vault::AccountVault;
use sepa_debit::config::{DebitConfig, Settings};
use sepa_debit::domain::account::RawAccountFields;
use sepa_debit::domain::mandate::{METHOD_CODE, PlacedOrder};
use sepa_debit::domain::ports::{CustomerProfileStore, MandateStoreBox};
use sepa_debit::infrastructure::cipher::AesGcmCipher;
use sepa_debit::infrastructure::in_memory::{
    InMemoryCustomerProfileStore, InMemoryMandateStore, InMemoryOrderPaymentStore,
};
use std::io::Write;
use std::path::Path;

pub const KEY: [u8; 32] = [42u8; 32];

pub fn enabled_config() -> DebitConfig {
    DebitConfig {
        active: true,
        save_account_data: true,
        generate_mandate: true,
        ..DebitConfig::default()
    }
}

pub fn checkout_with(
    config: DebitConfig,
    mandates: MandateStoreBox,
    customers: impl CustomerProfileStore + 'static,
) -> DebitCheckout {
    let vault = AccountVault::new(
        Box::new(AesGcmCipher::new(&KEY)),
        Box::new(InMemoryOrderPaymentStore::new()),
        Box::new(customers),
    );
    DebitCheckout::new(
        Settings::with_default(config),
        vault,
        MandateRegistry::new(mandates),
    )
}

pub fn checkout(config: DebitConfig) -> DebitCheckout {
    checkout_with(
        config,
        Box::new(InMemoryMandateStore::new()),
        InMemoryCustomerProfileStore::new(),
    )
}

pub fn account(owner: &str, iban: &str) -> RawAccountFields {
    RawAccountFields {
        debit_cc_owner: Some(owner.to_string()),
        debit_swift: Some("COBADEFFXXX".to_string()),
        debit_iban: Some(iban.to_string()),
        debit_city: Some("Berlin".to_string()),
        debit_country: Some("DE".to_string()),
        ..RawAccountFields::default()
    }
}

pub fn order(order_id: u64, quote_id: u64, customer_id: Option<u64>) -> PlacedOrder {
    PlacedOrder {
        order_id,
        increment_id: format!("1{:08}", order_id),
        quote_id,
        customer_id,
        store_id: 1,
        website_id: 1,
        payment_method: METHOD_CODE.to_string(),
    }
}

pub fn write_csv(path: &Path, rows: &[&str]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    writeln!(
        file,
        "order_id,increment_id,quote_id,customer_id,customer_group,completed_orders,store_id,website_id,payment_method,debit_cc_owner,cc_owner,debit_swift,debit_iban,debit_company,debit_street,debit_city,debit_country,debit_email,mandate_city,mandate_accept"
    )?;
    for row in rows {
        writeln!(file, "{}", row)?;
    }
    Ok(())
}
