//! Ledger schema.
//!
//! Creates the chart of accounts, fiscal calendar, journal, subledger
//! (open items, payments, post-dated cheques), fixed asset register and bank
//! statement tables. Status and type columns are
//! lowercase text checked against the domain's serialized names.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: CHART OF ACCOUNTS & DETERMINATION
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(ACCOUNT_MAPPINGS_SQL).await?;

        // ============================================================
        // PART 2: FISCAL CALENDAR
        // ============================================================
        db.execute_unprepared(FISCAL_YEARS_SQL).await?;
        db.execute_unprepared(ACCOUNTING_PERIODS_SQL).await?;

        // ============================================================
        // PART 3: JOURNAL
        // ============================================================
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_ENTRY_LINES_SQL).await?;
        db.execute_unprepared(ENTRY_SEQUENCES_SQL).await?;

        // ============================================================
        // PART 4: SUBLEDGER
        // ============================================================
        db.execute_unprepared(OPEN_ITEMS_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;
        db.execute_unprepared(PDC_CHEQUES_SQL).await?;

        // ============================================================
        // PART 5: FIXED ASSETS
        // ============================================================
        db.execute_unprepared(FIXED_ASSETS_SQL).await?;

        // ============================================================
        // PART 6: BANK RECONCILIATION
        // ============================================================
        db.execute_unprepared(BANK_STATEMENTS_SQL).await?;
        db.execute_unprepared(BANK_STATEMENT_LINES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    code VARCHAR(20) PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    description TEXT,
    account_type VARCHAR(20) NOT NULL,
    parent_code VARCHAR(20) REFERENCES accounts(code) DEFERRABLE INITIALLY DEFERRED,
    opening_balance NUMERIC(19, 2) NOT NULL DEFAULT 0,
    current_balance NUMERIC(19, 2) NOT NULL DEFAULT 0,
    opening_balance_locked BOOLEAN NOT NULL DEFAULT false,
    is_cash_account BOOLEAN NOT NULL DEFAULT false,
    overdraft_allowed BOOLEAN NOT NULL DEFAULT false,
    is_contra_account BOOLEAN NOT NULL DEFAULT false,
    is_fixed_deposit BOOLEAN NOT NULL DEFAULT false,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_account_type CHECK (
        account_type IN ('asset', 'liability', 'equity', 'income', 'expense')
    ),
    CONSTRAINT chk_account_not_own_parent CHECK (parent_code IS NULL OR parent_code <> code)
);

CREATE INDEX idx_accounts_parent ON accounts(parent_code);
";

const ACCOUNT_MAPPINGS_SQL: &str = r"
CREATE TABLE account_mappings (
    transaction_type VARCHAR(64) PRIMARY KEY,
    account_code VARCHAR(20) NOT NULL REFERENCES accounts(code),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const FISCAL_YEARS_SQL: &str = r"
CREATE TABLE fiscal_years (
    id UUID PRIMARY KEY,
    name VARCHAR(50) NOT NULL UNIQUE,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status VARCHAR(10) NOT NULL DEFAULT 'open',
    CONSTRAINT chk_fiscal_year_dates CHECK (end_date > start_date),
    CONSTRAINT chk_fiscal_year_status CHECK (status IN ('open', 'closing', 'closed'))
);

CREATE INDEX idx_fiscal_years_start ON fiscal_years(start_date);
";

const ACCOUNTING_PERIODS_SQL: &str = r"
CREATE TABLE accounting_periods (
    id UUID PRIMARY KEY,
    fiscal_year_id UUID NOT NULL REFERENCES fiscal_years(id) ON DELETE CASCADE,
    period_number SMALLINT NOT NULL,
    name VARCHAR(50) NOT NULL,
    start_date DATE NOT NULL,
    end_date DATE NOT NULL,
    status VARCHAR(10) NOT NULL DEFAULT 'open',
    CONSTRAINT chk_period_dates CHECK (end_date >= start_date),
    CONSTRAINT chk_period_number CHECK (period_number > 0),
    CONSTRAINT chk_period_status CHECK (status IN ('open', 'locked', 'closed')),
    UNIQUE (fiscal_year_id, period_number)
);

CREATE INDEX idx_accounting_periods_dates ON accounting_periods(start_date, end_date);
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY,
    entry_number VARCHAR(40) UNIQUE,
    entry_date DATE NOT NULL,
    reference VARCHAR(255) NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    status VARCHAR(10) NOT NULL,
    entry_type VARCHAR(20) NOT NULL,
    source_module VARCHAR(30) NOT NULL,
    source_id VARCHAR(255),
    is_system_generated BOOLEAN NOT NULL DEFAULT false,
    is_locked BOOLEAN NOT NULL DEFAULT false,
    carry_forward BOOLEAN NOT NULL DEFAULT false,
    fiscal_year_id UUID REFERENCES fiscal_years(id),
    period_id UUID REFERENCES accounting_periods(id),
    total_debit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    total_credit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    reversal_of UUID REFERENCES journal_entries(id) DEFERRABLE INITIALLY DEFERRED,
    reversed_by UUID REFERENCES journal_entries(id) DEFERRABLE INITIALLY DEFERRED,
    posting_sequence BIGINT UNIQUE,
    created_by VARCHAR(100) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    posted_at TIMESTAMPTZ,
    posted_by VARCHAR(100),
    CONSTRAINT chk_entry_status CHECK (status IN ('draft', 'posted', 'reversed')),
    CONSTRAINT chk_posted_entry_balanced CHECK (status = 'draft' OR total_debit = total_credit),
    CONSTRAINT chk_posted_entry_numbered CHECK (
        status = 'draft' OR (entry_number IS NOT NULL AND posting_sequence IS NOT NULL)
    )
);

CREATE INDEX idx_journal_entries_date ON journal_entries(entry_date, posting_sequence);
CREATE INDEX idx_journal_entries_source ON journal_entries(source_module, source_id);
";

const JOURNAL_ENTRY_LINES_SQL: &str = r"
CREATE TABLE journal_entry_lines (
    entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    line_number INTEGER NOT NULL,
    account_code VARCHAR(20) NOT NULL REFERENCES accounts(code),
    description TEXT NOT NULL DEFAULT '',
    debit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 2) NOT NULL DEFAULT 0,
    PRIMARY KEY (entry_id, line_number),
    CONSTRAINT chk_line_non_negative CHECK (debit >= 0 AND credit >= 0),
    CONSTRAINT chk_line_one_side CHECK ((debit = 0) <> (credit = 0))
);

CREATE INDEX idx_journal_entry_lines_account ON journal_entry_lines(account_code);
";

const ENTRY_SEQUENCES_SQL: &str = r"
CREATE TABLE entry_sequences (
    prefix VARCHAR(20) NOT NULL,
    year INTEGER NOT NULL,
    last_value INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (prefix, year),
    CONSTRAINT chk_sequence_non_negative CHECK (last_value >= 0)
);
";

const OPEN_ITEMS_SQL: &str = r"
CREATE TABLE open_items (
    id UUID PRIMARY KEY,
    kind VARCHAR(12) NOT NULL,
    party VARCHAR(255) NOT NULL,
    document_ref VARCHAR(100) NOT NULL,
    document_date DATE NOT NULL,
    due_date DATE NOT NULL,
    total NUMERIC(19, 2) NOT NULL,
    allocated NUMERIC(19, 2) NOT NULL DEFAULT 0,
    entry_id UUID NOT NULL REFERENCES journal_entries(id),
    status VARCHAR(12) NOT NULL,
    CONSTRAINT chk_open_item_kind CHECK (kind IN ('receivable', 'payable')),
    CONSTRAINT chk_open_item_status CHECK (status IN ('open', 'paid', 'cancelled')),
    CONSTRAINT chk_open_item_allocation CHECK (allocated >= 0 AND allocated <= total),
    UNIQUE (kind, document_ref)
);

CREATE INDEX idx_open_items_party ON open_items(kind, party, due_date);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY,
    direction VARCHAR(10) NOT NULL,
    party VARCHAR(255) NOT NULL,
    payment_date DATE NOT NULL,
    bank_account_code VARCHAR(20) NOT NULL REFERENCES accounts(code),
    amount NUMERIC(19, 2) NOT NULL,
    allocated NUMERIC(19, 2) NOT NULL DEFAULT 0,
    reference VARCHAR(255) NOT NULL DEFAULT '',
    entry_id UUID NOT NULL REFERENCES journal_entries(id),
    allocations JSONB NOT NULL DEFAULT '[]'::jsonb,
    CONSTRAINT chk_payment_direction CHECK (direction IN ('received', 'made')),
    CONSTRAINT chk_payment_amount CHECK (amount > 0 AND allocated >= 0 AND allocated <= amount)
);

CREATE INDEX idx_payments_bank ON payments(bank_account_code, payment_date);
";

const PDC_CHEQUES_SQL: &str = r"
CREATE TABLE pdc_cheques (
    cheque_number VARCHAR(50) PRIMARY KEY,
    party VARCHAR(255) NOT NULL,
    cheque_date DATE NOT NULL,
    deposit_date DATE NOT NULL,
    amount NUMERIC(19, 2) NOT NULL,
    allocations JSONB NOT NULL DEFAULT '[]'::jsonb,
    status VARCHAR(20) NOT NULL,
    bank_account_code VARCHAR(20) REFERENCES accounts(code),
    deposit_entry UUID NOT NULL REFERENCES journal_entries(id),
    clearance_entry UUID REFERENCES journal_entries(id),
    bounce_date DATE,
    bounce_reason TEXT,
    CONSTRAINT chk_cheque_status CHECK (status IN ('deposited', 'cleared', 'bounced')),
    CONSTRAINT chk_cheque_amount CHECK (amount > 0)
);

CREATE INDEX idx_pdc_cheques_status ON pdc_cheques(status, cheque_date);
";

const FIXED_ASSETS_SQL: &str = r"
CREATE TABLE fixed_assets (
    code VARCHAR(50) PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    acquisition_date DATE NOT NULL,
    acquisition_cost NUMERIC(19, 2) NOT NULL,
    salvage_value NUMERIC(19, 2) NOT NULL DEFAULT 0,
    useful_life_months INTEGER NOT NULL,
    method VARCHAR(20) NOT NULL,
    accumulated_depreciation NUMERIC(19, 2) NOT NULL DEFAULT 0,
    depreciation_runs INTEGER NOT NULL DEFAULT 0,
    last_depreciation_date DATE,
    status VARCHAR(20) NOT NULL,
    acquisition_entry UUID REFERENCES journal_entries(id),
    disposal_entry UUID REFERENCES journal_entries(id),
    CONSTRAINT chk_asset_method CHECK (method IN ('straight_line', 'declining_balance')),
    CONSTRAINT chk_asset_status CHECK (status IN ('active', 'fully_depreciated', 'disposed')),
    CONSTRAINT chk_asset_values CHECK (
        acquisition_cost > 0 AND salvage_value >= 0 AND salvage_value <= acquisition_cost
    )
);
";

const BANK_STATEMENTS_SQL: &str = r"
CREATE TABLE bank_statements (
    id UUID PRIMARY KEY,
    reference VARCHAR(100) NOT NULL,
    bank_account_code VARCHAR(20) NOT NULL REFERENCES accounts(code),
    period_start DATE NOT NULL,
    period_end DATE NOT NULL,
    opening_balance NUMERIC(19, 2) NOT NULL,
    closing_balance NUMERIC(19, 2) NOT NULL,
    status VARCHAR(10) NOT NULL,
    CONSTRAINT chk_statement_dates CHECK (period_end >= period_start),
    CONSTRAINT chk_statement_status CHECK (status IN ('open', 'finalized'))
);
";

const BANK_STATEMENT_LINES_SQL: &str = r"
CREATE TABLE bank_statement_lines (
    statement_id UUID NOT NULL REFERENCES bank_statements(id) ON DELETE CASCADE,
    line_number INTEGER NOT NULL,
    line_date DATE NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    reference VARCHAR(255) NOT NULL DEFAULT '',
    money_in NUMERIC(19, 2) NOT NULL DEFAULT 0,
    money_out NUMERIC(19, 2) NOT NULL DEFAULT 0,
    matched JSONB,
    adjustment_entry UUID REFERENCES journal_entries(id),
    PRIMARY KEY (statement_id, line_number),
    CONSTRAINT chk_statement_line_one_side CHECK ((money_in = 0) <> (money_out = 0))
);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS bank_statement_lines;
DROP TABLE IF EXISTS bank_statements;
DROP TABLE IF EXISTS fixed_assets;
DROP TABLE IF EXISTS pdc_cheques;
DROP TABLE IF EXISTS payments;
DROP TABLE IF EXISTS open_items;
DROP TABLE IF EXISTS entry_sequences;
DROP TABLE IF EXISTS journal_entry_lines;
DROP TABLE IF EXISTS journal_entries;
DROP TABLE IF EXISTS accounting_periods;
DROP TABLE IF EXISTS fiscal_years;
DROP TABLE IF EXISTS account_mappings;
DROP TABLE IF EXISTS accounts;
";
