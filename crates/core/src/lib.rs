//! Core business logic for Stockbook.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! It decides what a sale or purchase does to stock levels and counterparty
//! balances; the `db` crate carries those decisions out inside one transaction.
//!
//! # Modules
//!
//! - `inventory` - Stock adjustment planning with the never-negative rule
//! - `counterparty` - Running balances, ledger entries and payments
//! - `trade` - Sale and purchase validation, pricing and reconciliation planning
//! - `amount` - Storage limits shared by quantities and money

pub mod amount;
pub mod counterparty;
pub mod inventory;
pub mod trade;
