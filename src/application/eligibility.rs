use crate::config::DebitConfig;
use crate::domain::customer::CheckoutContext;

/// Decides whether direct debit is offered to a shopper.
///
/// Every failure mode resolves to "not available"; the checker never errors.
pub struct EligibilityChecker<'a> {
    config: &'a DebitConfig,
}

impl<'a> EligibilityChecker<'a> {
    pub fn new(config: &'a DebitConfig) -> Self {
        Self { config }
    }

    pub fn is_available(&self, context: &CheckoutContext) -> bool {
        if !self.config.active {
            return false;
        }

        if let Err(e) = self.config.validate() {
            tracing::warn!(error = %e, "direct debit disabled by invalid configuration");
            return false;
        }

        self.group_allowed(context) && self.has_order_history(context)
    }

    fn group_allowed(&self, context: &CheckoutContext) -> bool {
        self.config.allow_all_groups
            || self
                .config
                .allowed_customer_groups
                .contains(&context.customer_group)
    }

    // Guests have no history, so any non-zero minimum excludes them.
    fn has_order_history(&self, context: &CheckoutContext) -> bool {
        let minimum = self.config.minimum_orders;
        if minimum == 0 {
            return true;
        }
        !context.is_guest() && context.completed_orders >= minimum
    }
}
