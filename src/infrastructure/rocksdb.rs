use crate::domain::account::{CustomerAccountSnapshot, PaymentAccountInfo};
use crate::domain::mandate::MandateRecord;
use crate::domain::ports::{CustomerProfileStore, MandateStore, OrderPaymentStore};
use crate::error::{DebitError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for mandate records keyed by order id.
pub const CF_MANDATES: &str = "mandates";
/// Column Family mapping mandate references to order ids.
pub const CF_MANDATE_REFERENCES: &str = "mandate_references";
/// Column Family for customer account snapshots.
pub const CF_CUSTOMER_ACCOUNTS: &str = "customer_accounts";
/// Column Family for the account data of order payments.
pub const CF_ORDER_PAYMENTS: &str = "order_payments";

/// A persistent store implementation using RocksDB.
///
/// Implements every store port on one database, one Column Family per
/// entity. Mandate inserts are serialised so the reference index check and
/// the write happen as one step.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    insert_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [
            CF_MANDATES,
            CF_MANDATE_REFERENCES,
            CF_CUSTOMER_ACCOUNTS,
            CF_ORDER_PAYMENTS,
        ]
        .into_iter()
        .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self {
            db: Arc::new(db),
            insert_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            DebitError::InternalError(Box::new(std::io::Error::other(format!(
                "{} column family not found",
                name
            ))))
        })
    }

    fn put<T: Serialize>(&self, name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(name)?;
        self.db.put_cf(cf, key, encode(value)?)?;
        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(name)?;
        match self.db.get_pinned_cf(cf, key)? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| {
        DebitError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Serialization error: {}", e),
        )))
    })
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        DebitError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

#[async_trait]
impl MandateStore for RocksDBStore {
    async fn insert(&self, record: MandateRecord) -> Result<()> {
        let _guard = self.insert_lock.lock().await;

        let order_key = record.order_id.to_be_bytes();
        let mandates = self.cf(CF_MANDATES)?;
        if self.db.get_pinned_cf(mandates, order_key)?.is_some() {
            return Err(DebitError::MandateExists(record.order_id));
        }

        let references = self.cf(CF_MANDATE_REFERENCES)?;
        let reference_key = record.mandate_reference.as_bytes();
        if self.db.get_pinned_cf(references, reference_key)?.is_some() {
            return Err(DebitError::DuplicateReference(record.mandate_reference));
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(references, reference_key, order_key);
        batch.put_cf(mandates, order_key, encode(&record)?);
        self.db.write(batch)?;

        Ok(())
    }

    async fn update(&self, record: MandateRecord) -> Result<()> {
        let key = record.order_id.to_be_bytes();
        if self.db.get_pinned_cf(self.cf(CF_MANDATES)?, key)?.is_none() {
            return Err(DebitError::MandateNotFound(record.order_id));
        }
        self.put(CF_MANDATES, &key, &record)
    }

    async fn get(&self, order_id: u64) -> Result<Option<MandateRecord>> {
        self.load(CF_MANDATES, &order_id.to_be_bytes())
    }

    async fn pending(&self) -> Result<Vec<MandateRecord>> {
        let cf = self.cf(CF_MANDATES)?;

        // Big-endian keys iterate in order id order
        let mut pending = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let record: MandateRecord = decode(&value)?;
            if !record.is_generated {
                pending.push(record);
            }
        }

        Ok(pending)
    }
}

#[async_trait]
impl CustomerProfileStore for RocksDBStore {
    async fn save_snapshot(&self, snapshot: CustomerAccountSnapshot) -> Result<()> {
        let key = snapshot.customer_id.to_be_bytes();
        self.put(CF_CUSTOMER_ACCOUNTS, &key, &snapshot)
    }

    async fn get_snapshot(&self, customer_id: u64) -> Result<Option<CustomerAccountSnapshot>> {
        self.load(CF_CUSTOMER_ACCOUNTS, &customer_id.to_be_bytes())
    }
}

#[async_trait]
impl OrderPaymentStore for RocksDBStore {
    async fn store(&self, order_id: u64, info: PaymentAccountInfo) -> Result<()> {
        self.put(CF_ORDER_PAYMENTS, &order_id.to_be_bytes(), &info)
    }

    async fn get(&self, order_id: u64) -> Result<Option<PaymentAccountInfo>> {
        self.load(CF_ORDER_PAYMENTS, &order_id.to_be_bytes())
    }
}
