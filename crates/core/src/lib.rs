//! Lemongrass Core - Shared domain types.
//!
//! This crate provides the domain model shared by the Lemongrass components:
//! - `site` - Public ordering site and API
//! - future staff-facing tooling (order board, kitchen display)
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Order entity, line items, status machine, ids, emails, money
//! - [`cart`] - The in-progress order aggregate

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartSummary};
pub use types::*;
