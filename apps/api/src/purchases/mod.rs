// Purchases: checkout validation, pending purchase persistence, messaging
// hand-off and admin approval.

pub mod checkout;
pub mod handlers;
pub mod handoff;
pub mod phone;
pub mod store;
