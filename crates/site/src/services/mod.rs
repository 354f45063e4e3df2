//! External collaborators and orchestration.
//!
//! - [`mollie`] - payment provider API client
//! - [`orders`] - order submission flow: validate, price, persist, pay

pub mod mollie;
pub mod orders;
