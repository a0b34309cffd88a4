use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of trailing characters left readable by [`mask`].
pub const VISIBLE_SUFFIX: usize = 3;

/// Replaces every character but the last three with `*`.
///
/// Values of three characters or fewer are returned as they are.
pub fn mask(value: &str) -> String {
    let len = value.chars().count();
    if len <= VISIBLE_SUFFIX {
        return value.to_string();
    }
    let hidden = len - VISIBLE_SUFFIX;
    value
        .chars()
        .enumerate()
        .map(|(i, c)| if i < hidden { '*' } else { c })
        .collect()
}

/// Kind of debit collected for an order.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum DebitType {
    #[default]
    Sepa,
}

/// Ciphertext produced by the configured [`Cipher`](super::ports::Cipher).
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(transparent)]
pub struct EncryptedField(String);

impl EncryptedField {
    pub fn new(ciphertext: String) -> Self {
        Self(ciphertext)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Bank account fields as submitted by the checkout form.
#[derive(Default, Deserialize, Clone, PartialEq)]
pub struct RawAccountFields {
    pub debit_cc_owner: Option<String>,
    pub cc_owner: Option<String>,
    pub debit_swift: Option<String>,
    pub debit_iban: Option<String>,
    pub debit_company: Option<String>,
    pub debit_street: Option<String>,
    pub debit_city: Option<String>,
    pub debit_country: Option<String>,
    pub debit_email: Option<String>,
}

impl fmt::Debug for RawAccountFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawAccountFields")
            .field("debit_cc_owner", &self.debit_cc_owner)
            .field("cc_owner", &self.cc_owner)
            .field("debit_swift", &self.debit_swift.as_deref().map(mask))
            .field("debit_iban", &self.debit_iban.as_deref().map(mask))
            .field("debit_company", &self.debit_company)
            .field("debit_city", &self.debit_city)
            .field("debit_country", &self.debit_country)
            .finish_non_exhaustive()
    }
}

/// Account data stored on an order's payment record.
///
/// SWIFT and IBAN only ever live here in encrypted form.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
pub struct PaymentAccountInfo {
    pub owner_name: String,
    pub swift: Option<EncryptedField>,
    pub iban: Option<EncryptedField>,
    pub company: String,
    pub street: String,
    pub city: String,
    pub country_id: String,
    pub email: String,
    pub debit_type: DebitType,
}

/// Copy of the last captured account data kept on a customer profile.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct CustomerAccountSnapshot {
    pub customer_id: u64,
    pub updated_at: DateTime<Utc>,
    pub account: PaymentAccountInfo,
}

/// Decrypted SWIFT/IBAN pair.
///
/// `Debug` prints the masked form so the values cannot leak into logs.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct RevealedAccount {
    pub swift: Option<String>,
    pub iban: Option<String>,
}

impl RevealedAccount {
    /// Masked copy suitable for confirmation mails and info blocks.
    pub fn masked(&self) -> RevealedAccount {
        RevealedAccount {
            swift: self.swift.as_deref().map(mask),
            iban: self.iban.as_deref().map(mask),
        }
    }
}

impl fmt::Debug for RevealedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealedAccount")
            .field("swift", &self.swift.as_deref().map(mask))
            .field("iban", &self.iban.as_deref().map(mask))
            .finish()
    }
}
