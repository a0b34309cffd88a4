use super::eligibility::EligibilityChecker;
use super::registry::{MandateRegistry, ValidationOutcome};
use super::vault::AccountVault;
use crate::config::Settings;
use crate::domain::account::{PaymentAccountInfo, RawAccountFields};
use crate::domain::customer::CheckoutContext;
use crate::domain::mandate::{METHOD_CODE, MandateForm, MandateRecord, PlacedOrder};
use crate::error::Result;

/// What happened after the host saved an order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderFollowUp {
    pub snapshot_saved: bool,
    pub mandate: Option<MandateRecord>,
}

/// Entry of the payment method list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodListing {
    pub title: String,
    pub custom_text: Option<String>,
}

/// The direct-debit checkout workflow.
///
/// The host calls one method per lifecycle point:
///
/// 1. [`listing`](Self::listing) while building the payment method list,
/// 2. [`assign_payment_data`](Self::assign_payment_data) when the form is posted,
/// 3. [`validate_before_save`](Self::validate_before_save) before the order is saved,
/// 4. [`after_order_saved`](Self::after_order_saved) once the order is durable.
pub struct DebitCheckout {
    settings: Settings,
    vault: AccountVault,
    registry: MandateRegistry,
}

impl DebitCheckout {
    pub fn new(settings: Settings, vault: AccountVault, registry: MandateRegistry) -> Self {
        Self {
            settings,
            vault,
            registry,
        }
    }

    pub fn vault(&self) -> &AccountVault {
        &self.vault
    }

    pub fn registry(&self) -> &MandateRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Whether direct debit is listed for this shopper.
    pub fn offer(&self, store_id: u32, context: &CheckoutContext) -> bool {
        EligibilityChecker::new(self.settings.for_store(store_id)).is_available(context)
    }

    /// Title and custom text of the method, or `None` when it is not offered.
    pub fn listing(&self, store_id: u32, context: &CheckoutContext) -> Option<MethodListing> {
        if !self.offer(store_id, context) {
            return None;
        }
        let config = self.settings.for_store(store_id);
        Some(MethodListing {
            title: config.title.clone(),
            custom_text: config.custom_text.clone(),
        })
    }

    pub fn assign_payment_data(&self, raw: RawAccountFields) -> Result<PaymentAccountInfo> {
        self.vault.capture(raw)
    }

    /// Gate run before the order is saved. Other payment methods pass.
    pub fn validate_before_save(
        &self,
        store_id: u32,
        payment_method: &str,
        form: &MandateForm,
    ) -> ValidationOutcome {
        if payment_method != METHOD_CODE {
            return ValidationOutcome::NotRequired;
        }
        let outcome = self
            .registry
            .require_mandate_acceptance(self.settings.for_store(store_id), form);
        if outcome.is_rejected() {
            tracing::info!(store_id, "order blocked, mandate not accepted");
        }
        outcome
    }

    /// Post-save work: order payment record, profile mirror, mandate.
    ///
    /// Only the payment record write can fail the call. The profile mirror
    /// and the mandate are best effort and are logged when they fail.
    pub async fn after_order_saved(
        &self,
        order: &PlacedOrder,
        info: PaymentAccountInfo,
        form: &MandateForm,
    ) -> Result<OrderFollowUp> {
        if !order.is_debit() {
            return Ok(OrderFollowUp::default());
        }
        let config = self.settings.for_store(order.store_id);

        self.vault.attach_to_order(order.order_id, info.clone()).await?;

        let snapshot_saved = match self.vault.save_to_profile(config, order, &info).await {
            Ok(saved) => saved,
            Err(e) => {
                tracing::error!(order_id = order.order_id, error = %e, "failed to save account snapshot");
                false
            }
        };

        let city = form.city().unwrap_or_default();
        let mandate = self.registry.issue(config, order, city).await;

        Ok(OrderFollowUp {
            snapshot_saved,
            mandate,
        })
    }
}
