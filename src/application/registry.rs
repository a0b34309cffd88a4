use crate::config::DebitConfig;
use crate::domain::mandate::{
    MANDATE_REJECTION_MESSAGE, MandateForm, MandateRecord, PlacedOrder, mandate_reference,
};
use crate::domain::ports::MandateStoreBox;
use crate::error::{DebitError, Result};
use serde::Serialize;

/// Fresh references tried before giving up on a conflicting one.
pub const MAX_REFERENCE_ATTEMPTS: u32 = 3;

/// Result of the pre-save mandate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted,
    /// Mandate generation is off for the store.
    NotRequired,
    /// The order must not be saved; the message goes back to the shopper.
    Rejected(String),
}

impl ValidationOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, ValidationOutcome::Rejected(_))
    }

    /// Body the checkout endpoint answers with.
    pub fn response(&self) -> CheckoutResponse {
        match self {
            ValidationOutcome::Rejected(message) => CheckoutResponse::failure(message.clone()),
            _ => CheckoutResponse::success(),
        }
    }
}

/// JSON body returned to the checkout frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_messages: Option<String>,
}

impl CheckoutResponse {
    pub fn success() -> Self {
        Self {
            success: true,
            error: false,
            error_messages: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: true,
            error_messages: Some(message.into()),
        }
    }
}

/// Issues mandate references and tracks their export state.
pub struct MandateRegistry {
    store: MandateStoreBox,
}

impl MandateRegistry {
    pub fn new(store: MandateStoreBox) -> Self {
        Self { store }
    }

    /// Checks the mandate fields posted with a debit order.
    pub fn require_mandate_acceptance(
        &self,
        config: &DebitConfig,
        form: &MandateForm,
    ) -> ValidationOutcome {
        if !config.generate_mandate {
            return ValidationOutcome::NotRequired;
        }
        if form.city().is_none() || !form.accepted() {
            return ValidationOutcome::Rejected(MANDATE_REJECTION_MESSAGE.to_string());
        }
        ValidationOutcome::Accepted
    }

    /// Records the mandate for a saved order.
    ///
    /// Only debit orders of stores with mandate generation get a record. An
    /// order that already has one keeps it untouched and gets it back.
    /// Storage failures are logged and reported as `None`; they never reach
    /// the caller, whose order is already placed.
    pub async fn issue(
        &self,
        config: &DebitConfig,
        order: &PlacedOrder,
        mandate_city: &str,
    ) -> Option<MandateRecord> {
        if !order.is_debit() || !config.generate_mandate {
            return None;
        }

        match self.insert_unique(config, order, mandate_city).await {
            Ok(record) => {
                tracing::info!(
                    order_id = record.order_id,
                    increment_id = %record.increment_id,
                    mandate_reference = %record.mandate_reference,
                    "issued mandate reference"
                );
                Some(record)
            }
            Err(e) => {
                tracing::error!(
                    order_id = order.order_id,
                    increment_id = %order.increment_id,
                    error = %e,
                    "failed to record mandate, order needs manual follow-up"
                );
                None
            }
        }
    }

    async fn insert_unique(
        &self,
        config: &DebitConfig,
        order: &PlacedOrder,
        mandate_city: &str,
    ) -> Result<MandateRecord> {
        let mut attempt = 0;
        loop {
            let reference = mandate_reference(
                &config.mandate_reference_prefix,
                order.reference_customer_id(),
                order.quote_id,
                &order.increment_id,
                attempt,
            );
            let record = MandateRecord::pending(order, reference, mandate_city.to_string());

            match self.store.insert(record.clone()).await {
                Ok(()) => return Ok(record),
                Err(DebitError::DuplicateReference(reference))
                    if attempt + 1 < MAX_REFERENCE_ATTEMPTS =>
                {
                    tracing::warn!(%reference, attempt, "mandate reference conflict, retrying");
                    attempt += 1;
                }
                Err(DebitError::MandateExists(order_id)) => {
                    tracing::info!(order_id, "mandate already recorded");
                    return self
                        .store
                        .get(order_id)
                        .await?
                        .ok_or(DebitError::MandateNotFound(order_id));
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn find(&self, order_id: u64) -> Result<Option<MandateRecord>> {
        self.store.get(order_id).await
    }

    /// Mandates still waiting for the batch exporter.
    pub async fn pending(&self) -> Result<Vec<MandateRecord>> {
        self.store.pending().await
    }

    /// Moves a mandate from pending to generated.
    pub async fn mark_generated(&self, order_id: u64) -> Result<MandateRecord> {
        let mut record = self
            .store
            .get(order_id)
            .await?
            .ok_or(DebitError::MandateNotFound(order_id))?;
        if record.is_generated {
            return Err(DebitError::AlreadyGenerated(record.mandate_reference));
        }

        record.is_generated = true;
        self.store.update(record.clone()).await?;
        Ok(record)
    }
}
