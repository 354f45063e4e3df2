//! Lemongrass site library.
//!
//! This crate provides the ordering site as a library, allowing the router
//! to be driven directly in tests without binding a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod menu;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
