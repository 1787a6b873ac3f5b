//! Initial database migration.
//!
//! Creates the inventory, trade and counterparty tables. Quantities and money
//! are `NUMERIC(19, 4)`; the core crate rejects values these columns would
//! round or overflow.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: COUNTERPARTIES
        // ============================================================
        db.execute_unprepared(COUNTERPARTIES_SQL).await?;
        db.execute_unprepared(COUNTERPARTY_PAYMENTS_SQL).await?;
        db.execute_unprepared(COUNTERPARTY_NOTES_SQL).await?;

        // ============================================================
        // PART 2: TRADES
        // ============================================================
        db.execute_unprepared(TRADES_SQL).await?;
        db.execute_unprepared(TRADE_LINES_SQL).await?;

        // ============================================================
        // PART 3: LEDGER & INVENTORY
        // ============================================================
        db.execute_unprepared(COUNTERPARTY_LEDGER_ENTRIES_SQL).await?;
        db.execute_unprepared(INVENTORY_RECORDS_SQL).await?;

        // ============================================================
        // PART 4: INDEXES
        // ============================================================
        for index in INDEXES_SQL {
            db.execute_unprepared(index).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        for table in [
            "inventory_records",
            "counterparty_ledger_entries",
            "trade_lines",
            "trades",
            "counterparty_notes",
            "counterparty_payments",
            "counterparties",
        ] {
            db.execute_unprepared(&format!("DROP TABLE IF EXISTS {table};"))
                .await?;
        }
        Ok(())
    }
}

const COUNTERPARTIES_SQL: &str = r"
CREATE TABLE counterparties (
    id UUID PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    role VARCHAR(16) NOT NULL,
    phone VARCHAR(64),
    address TEXT,
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT uq_counterparties_name_role UNIQUE (name, role),
    CONSTRAINT chk_counterparties_role CHECK (role IN ('client', 'supplier'))
);
";

const COUNTERPARTY_PAYMENTS_SQL: &str = r"
CREATE TABLE counterparty_payments (
    id UUID PRIMARY KEY,
    counterparty_id UUID NOT NULL REFERENCES counterparties(id) ON DELETE CASCADE,
    amount NUMERIC(19, 4) NOT NULL,
    paid_at TIMESTAMPTZ NOT NULL,
    memo TEXT,
    created_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT chk_payments_positive CHECK (amount > 0)
);
";

const COUNTERPARTY_NOTES_SQL: &str = r"
CREATE TABLE counterparty_notes (
    id UUID PRIMARY KEY,
    counterparty_id UUID NOT NULL REFERENCES counterparties(id) ON DELETE CASCADE,
    text TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
";

const TRADES_SQL: &str = r"
CREATE TABLE trades (
    id UUID PRIMARY KEY,
    kind VARCHAR(16) NOT NULL,
    counterparty_name VARCHAR(255) NOT NULL,
    counterparty_id UUID REFERENCES counterparties(id) ON DELETE SET NULL,
    occurred_at TIMESTAMPTZ NOT NULL,
    period INTEGER NOT NULL,
    total NUMERIC(19, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT chk_trades_kind CHECK (kind IN ('sale', 'purchase'))
);
";

const TRADE_LINES_SQL: &str = r"
CREATE TABLE trade_lines (
    id UUID PRIMARY KEY,
    trade_id UUID NOT NULL REFERENCES trades(id) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    product_name VARCHAR(255) NOT NULL,
    quantity NUMERIC(19, 4) NOT NULL,
    unit_price NUMERIC(19, 4) NOT NULL,
    line_total NUMERIC(19, 4) NOT NULL,
    CONSTRAINT chk_trade_lines_quantity CHECK (quantity > 0),
    CONSTRAINT chk_trade_lines_price CHECK (unit_price > 0)
);
";

// One entry per trade: the unique source_trade_id is the 1:1 link.
const COUNTERPARTY_LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE counterparty_ledger_entries (
    id UUID PRIMARY KEY,
    counterparty_id UUID NOT NULL REFERENCES counterparties(id) ON DELETE CASCADE,
    kind VARCHAR(16) NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    occurred_at TIMESTAMPTZ NOT NULL,
    lines JSONB NOT NULL,
    source_trade_id UUID,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT uq_ledger_entries_source_trade UNIQUE (source_trade_id),
    CONSTRAINT chk_ledger_entries_kind CHECK (kind IN ('sale', 'purchase')),
    CONSTRAINT chk_ledger_entries_amount CHECK (amount >= 0)
);
";

const INVENTORY_RECORDS_SQL: &str = r"
CREATE TABLE inventory_records (
    id UUID PRIMARY KEY,
    product_name VARCHAR(255) NOT NULL,
    period INTEGER NOT NULL,
    quantity NUMERIC(19, 4) NOT NULL,
    unit_price NUMERIC(19, 4) NOT NULL,
    total_value NUMERIC(19, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    CONSTRAINT uq_inventory_product_period UNIQUE (product_name, period),
    CONSTRAINT chk_inventory_quantity CHECK (quantity >= 0)
);
";

const INDEXES_SQL: [&str; 5] = [
    "CREATE INDEX idx_ledger_entries_counterparty ON counterparty_ledger_entries(counterparty_id, occurred_at);",
    "CREATE INDEX idx_payments_counterparty ON counterparty_payments(counterparty_id, paid_at);",
    "CREATE INDEX idx_notes_counterparty ON counterparty_notes(counterparty_id);",
    "CREATE INDEX idx_trades_kind_period ON trades(kind, period, occurred_at);",
    "CREATE INDEX idx_trade_lines_trade ON trade_lines(trade_id, position);",
];
