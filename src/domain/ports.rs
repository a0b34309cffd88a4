use super::account::{CustomerAccountSnapshot, EncryptedField, PaymentAccountInfo};
use super::mandate::MandateRecord;
use crate::error::Result;
use async_trait::async_trait;

/// Reversible keyed encryption for bank account fields.
pub trait Cipher: Send + Sync {
    fn encrypt(&self, plaintext: &str) -> Result<EncryptedField>;
    fn decrypt(&self, ciphertext: &EncryptedField) -> Result<String>;
}

#[async_trait]
pub trait MandateStore: Send + Sync {
    /// Inserts a new record.
    ///
    /// Fails with `DebitError::MandateExists` when the order already has a
    /// record and with `DebitError::DuplicateReference` when the reference is
    /// taken. Existing records are never overwritten.
    async fn insert(&self, record: MandateRecord) -> Result<()>;
    /// Overwrites the record stored for `record.order_id`.
    async fn update(&self, record: MandateRecord) -> Result<()>;
    async fn get(&self, order_id: u64) -> Result<Option<MandateRecord>>;
    async fn pending(&self) -> Result<Vec<MandateRecord>>;
}

#[async_trait]
pub trait CustomerProfileStore: Send + Sync {
    async fn save_snapshot(&self, snapshot: CustomerAccountSnapshot) -> Result<()>;
    async fn get_snapshot(&self, customer_id: u64) -> Result<Option<CustomerAccountSnapshot>>;
}

#[async_trait]
pub trait OrderPaymentStore: Send + Sync {
    async fn store(&self, order_id: u64, info: PaymentAccountInfo) -> Result<()>;
    async fn get(&self, order_id: u64) -> Result<Option<PaymentAccountInfo>>;
}

pub type CipherBox = Box<dyn Cipher>;
pub type MandateStoreBox = Box<dyn MandateStore>;
pub type CustomerProfileStoreBox = Box<dyn CustomerProfileStore>;
pub type OrderPaymentStoreBox = Box<dyn OrderPaymentStore>;
