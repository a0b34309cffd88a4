use crate::domain::account::RawAccountFields;
use crate::domain::customer::CheckoutContext;
use crate::domain::mandate::{MandateForm, PlacedOrder};
use crate::error::{DebitError, Result};
use serde::Deserialize;
use std::io::Read;

/// One checkout submission: the shopper, the posted form and the order the
/// host saves if the submission passes.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CheckoutRow {
    pub order_id: u64,
    pub increment_id: String,
    pub quote_id: u64,
    pub customer_id: Option<u64>,
    #[serde(default)]
    pub customer_group: u32,
    #[serde(default)]
    pub completed_orders: u32,
    pub store_id: u32,
    pub website_id: u32,
    pub payment_method: String,
    pub debit_cc_owner: Option<String>,
    pub cc_owner: Option<String>,
    pub debit_swift: Option<String>,
    pub debit_iban: Option<String>,
    pub debit_company: Option<String>,
    pub debit_street: Option<String>,
    pub debit_city: Option<String>,
    pub debit_country: Option<String>,
    pub debit_email: Option<String>,
    pub mandate_city: Option<String>,
    pub mandate_accept: Option<String>,
}

impl CheckoutRow {
    pub fn context(&self) -> CheckoutContext {
        CheckoutContext {
            customer_id: self.customer_id,
            customer_group: self.customer_group,
            completed_orders: self.completed_orders,
        }
    }

    pub fn order(&self) -> PlacedOrder {
        PlacedOrder {
            order_id: self.order_id,
            increment_id: self.increment_id.clone(),
            quote_id: self.quote_id,
            customer_id: self.customer_id,
            store_id: self.store_id,
            website_id: self.website_id,
            payment_method: self.payment_method.clone(),
        }
    }

    pub fn mandate_form(&self) -> MandateForm {
        MandateForm {
            mandate_city: self.mandate_city.clone(),
            mandate_accept: self.mandate_accept.clone(),
        }
    }

    pub fn account_fields(&self) -> RawAccountFields {
        RawAccountFields {
            debit_cc_owner: self.debit_cc_owner.clone(),
            cc_owner: self.cc_owner.clone(),
            debit_swift: self.debit_swift.clone(),
            debit_iban: self.debit_iban.clone(),
            debit_company: self.debit_company.clone(),
            debit_street: self.debit_street.clone(),
            debit_city: self.debit_city.clone(),
            debit_country: self.debit_country.clone(),
            debit_email: self.debit_email.clone(),
        }
    }
}

/// Reads checkout submissions from a CSV source.
///
/// Wraps `csv::Reader` with whitespace trimming and flexible record lengths,
/// so trailing empty columns may be left out.
pub struct CheckoutReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CheckoutReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes the rows.
    pub fn rows(self) -> impl Iterator<Item = Result<CheckoutRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(DebitError::from))
    }
}
