use crate::config::DebitConfig;
use crate::domain::account::{
    CustomerAccountSnapshot, DebitType, EncryptedField, PaymentAccountInfo, RawAccountFields,
    RevealedAccount,
};
use crate::domain::mandate::PlacedOrder;
use crate::domain::ports::{CipherBox, CustomerProfileStoreBox, OrderPaymentStoreBox};
use crate::error::Result;
use chrono::Utc;

/// Captures bank account data from checkout and keeps it encrypted.
///
/// SWIFT and IBAN are encrypted before they leave `capture` and are only
/// decrypted again on explicit request through `reveal`, `masked` or
/// `prefill`.
pub struct AccountVault {
    cipher: CipherBox,
    orders: OrderPaymentStoreBox,
    customers: CustomerProfileStoreBox,
}

impl AccountVault {
    pub fn new(
        cipher: CipherBox,
        orders: OrderPaymentStoreBox,
        customers: CustomerProfileStoreBox,
    ) -> Self {
        Self {
            cipher,
            orders,
            customers,
        }
    }

    /// Builds the payment record from the submitted form.
    ///
    /// The owner falls back to the generic card owner field. Absent SWIFT or
    /// IBAN stay absent; everything else defaults to an empty string.
    pub fn capture(&self, raw: RawAccountFields) -> Result<PaymentAccountInfo> {
        let owner_name = present(raw.debit_cc_owner)
            .or_else(|| present(raw.cc_owner))
            .unwrap_or_default();

        Ok(PaymentAccountInfo {
            owner_name,
            swift: self.seal(raw.debit_swift)?,
            iban: self.seal(raw.debit_iban)?,
            company: raw.debit_company.unwrap_or_default(),
            street: raw.debit_street.unwrap_or_default(),
            city: raw.debit_city.unwrap_or_default(),
            country_id: raw.debit_country.unwrap_or_default(),
            email: raw.debit_email.unwrap_or_default(),
            debit_type: DebitType::Sepa,
        })
    }

    fn seal(&self, value: Option<String>) -> Result<Option<EncryptedField>> {
        present(value).map(|v| self.cipher.encrypt(&v)).transpose()
    }

    /// Decrypts SWIFT and IBAN.
    pub fn reveal(&self, info: &PaymentAccountInfo) -> Result<RevealedAccount> {
        Ok(RevealedAccount {
            swift: self.open(info.swift.as_ref())?,
            iban: self.open(info.iban.as_ref())?,
        })
    }

    fn open(&self, value: Option<&EncryptedField>) -> Result<Option<String>> {
        value.map(|v| self.cipher.decrypt(v)).transpose()
    }

    /// Decrypted and masked SWIFT/IBAN for confirmations.
    pub fn masked(&self, info: &PaymentAccountInfo) -> Result<RevealedAccount> {
        Ok(self.reveal(info)?.masked())
    }

    /// Stores the captured data on the order's payment record.
    pub async fn attach_to_order(&self, order_id: u64, info: PaymentAccountInfo) -> Result<()> {
        self.orders.store(order_id, info).await
    }

    pub async fn order_account(&self, order_id: u64) -> Result<Option<PaymentAccountInfo>> {
        self.orders.get(order_id).await
    }

    /// Mirrors the account data onto the customer profile.
    ///
    /// Returns whether a snapshot was written. Guests and stores with
    /// `save_account_data` off are skipped.
    pub async fn save_to_profile(
        &self,
        config: &DebitConfig,
        order: &PlacedOrder,
        info: &PaymentAccountInfo,
    ) -> Result<bool> {
        if !order.is_debit() || !config.save_account_data {
            return Ok(false);
        }
        let Some(customer_id) = order.customer_id else {
            return Ok(false);
        };

        let snapshot = CustomerAccountSnapshot {
            customer_id,
            updated_at: Utc::now(),
            account: info.clone(),
        };
        self.customers.save_snapshot(snapshot).await?;
        tracing::debug!(customer_id, order_id = order.order_id, "saved account snapshot");
        Ok(true)
    }

    /// Previously saved account data for a new checkout form.
    pub async fn prefill(
        &self,
        customer_id: u64,
    ) -> Result<Option<(PaymentAccountInfo, RevealedAccount)>> {
        match self.customers.get_snapshot(customer_id).await? {
            Some(snapshot) => {
                let revealed = self.reveal(&snapshot.account)?;
                Ok(Some((snapshot.account, revealed)))
            }
            None => Ok(None),
        }
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
