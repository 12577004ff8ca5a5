//! Admin backend for a small equipment shop: two product catalogs, a payment
//! ledger with receipt export, and dashboard figures. Every list is mirrored
//! to a named slot of a key-value store after each change.

pub mod audit;
pub mod config;
pub mod confirm;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod models;
pub mod receipt;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;
