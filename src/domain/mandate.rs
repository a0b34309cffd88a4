use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Code the host uses for orders paid by direct debit.
pub const METHOD_CODE: &str = "debit";

/// Upper bound for mandate references set by the SEPA rulebook.
pub const MAX_REFERENCE_LEN: usize = 35;

/// Hex characters of the digest at the end of every reference.
const DIGEST_HEX_LEN: usize = 16;

/// Message shown when the mandate fields are missing at checkout.
pub const MANDATE_REJECTION_MESSAGE: &str = "Please agree to grant us the SEPA direct debit mandate or fill in the city of mandate signature. Thank you.";

/// An order that the host has already saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order_id: u64,
    pub increment_id: String,
    pub quote_id: u64,
    /// `None` for guest checkouts.
    pub customer_id: Option<u64>,
    pub store_id: u32,
    pub website_id: u32,
    pub payment_method: String,
}

impl PlacedOrder {
    pub fn is_debit(&self) -> bool {
        self.payment_method == METHOD_CODE
    }

    /// Customer id used for reference derivation; guests map to 0.
    pub fn reference_customer_id(&self) -> u64 {
        self.customer_id.unwrap_or(0)
    }
}

/// Mandate parameters posted with the order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MandateForm {
    pub mandate_city: Option<String>,
    pub mandate_accept: Option<String>,
}

impl MandateForm {
    pub fn new(city: impl Into<String>, accept: impl Into<String>) -> Self {
        Self {
            mandate_city: Some(city.into()),
            mandate_accept: Some(accept.into()),
        }
    }

    /// City with surrounding whitespace removed, if any is left.
    pub fn city(&self) -> Option<&str> {
        self.mandate_city
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// True only for an explicit `1` or `true`.
    pub fn accepted(&self) -> bool {
        match self.mandate_accept.as_deref().map(str::trim) {
            Some(v) => v == "1" || v.eq_ignore_ascii_case("true"),
            None => false,
        }
    }
}

/// Lifecycle of a mandate row.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum MandateStatus {
    Pending,
    Generated,
}

/// Mandate reference bookkeeping for one order.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct MandateRecord {
    pub order_id: u64,
    pub website_id: u32,
    pub store_id: u32,
    pub increment_id: String,
    pub mandate_reference: String,
    pub mandate_city: String,
    pub is_generated: bool,
}

impl MandateRecord {
    pub fn pending(order: &PlacedOrder, mandate_reference: String, mandate_city: String) -> Self {
        Self {
            order_id: order.order_id,
            website_id: order.website_id,
            store_id: order.store_id,
            increment_id: order.increment_id.clone(),
            mandate_reference,
            mandate_city,
            is_generated: false,
        }
    }

    pub fn status(&self) -> MandateStatus {
        if self.is_generated {
            MandateStatus::Generated
        } else {
            MandateStatus::Pending
        }
    }
}

/// Derives the mandate reference for a customer/quote pair.
///
/// The increment id keeps guest orders (customer 0) apart and `attempt`
/// moves to a fresh reference after a uniqueness conflict. The customer id
/// is printed only when it fits next to the prefix; the full 16 digit
/// digest is always kept.
pub fn mandate_reference(
    prefix: &str,
    customer_id: u64,
    quote_id: u64,
    increment_id: &str,
    attempt: u32,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(customer_id.to_be_bytes());
    hasher.update(quote_id.to_be_bytes());
    hasher.update(increment_id.as_bytes());
    hasher.update(attempt.to_be_bytes());
    let digest = hasher.finalize();

    let room = MAX_REFERENCE_LEN - DIGEST_HEX_LEN;
    let mut head = format!("{}{}", prefix, customer_id);
    if head.len() > room {
        head = prefix.to_string();
    }
    while head.len() > room {
        head.pop();
    }
    format!("{}{}", head, hex::encode_upper(&digest[..DIGEST_HEX_LEN / 2]))
}
