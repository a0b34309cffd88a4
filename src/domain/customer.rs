use serde::Deserialize;

/// What the host knows about the shopper when building the method list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct CheckoutContext {
    /// `None` for guest checkouts.
    pub customer_id: Option<u64>,
    pub customer_group: u32,
    /// Orders the customer has completed before this checkout.
    pub completed_orders: u32,
}

impl CheckoutContext {
    pub fn guest(customer_group: u32) -> Self {
        Self {
            customer_id: None,
            customer_group,
            completed_orders: 0,
        }
    }

    pub fn registered(customer_id: u64, customer_group: u32, completed_orders: u32) -> Self {
        Self {
            customer_id: Some(customer_id),
            customer_group,
            completed_orders,
        }
    }

    pub fn is_guest(&self) -> bool {
        self.customer_id.is_none()
    }
}
