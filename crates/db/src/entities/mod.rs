//! `SeaORM` entity definitions.

pub mod counterparties;
pub mod counterparty_ledger_entries;
pub mod counterparty_notes;
pub mod counterparty_payments;
pub mod inventory_records;
pub mod sea_orm_active_enums;
pub mod trade_lines;
pub mod trades;
