//! Application layer containing the direct-debit workflow.
//!
//! `DebitCheckout` is the entry point for the host shop. It composes the
//! `AccountVault`, the `EligibilityChecker` and the `MandateRegistry` and
//! exposes one method per checkout lifecycle point.

pub mod checkout;
pub mod eligibility;
pub mod registry;
pub mod vault;
