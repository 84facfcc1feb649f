//! Initial ledger schema.
//!
//! Creates the chart of accounts, account history, general ledger,
//! member accounting ledger and branch settings tables together with the
//! triggers that keep history and ledger rows append-only.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(ACCOUNT_HISTORIES_SQL).await?;

        // ============================================================
        // PART 2: LEDGER
        // ============================================================
        db.execute_unprepared(GENERAL_LEDGER_SQL).await?;
        db.execute_unprepared(MEMBER_LEDGER_SQL).await?;

        // ============================================================
        // PART 3: BRANCH CONFIGURATION
        // ============================================================
        db.execute_unprepared(BRANCH_SETTINGS_SQL).await?;

        // ============================================================
        // PART 4: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

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
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    branch_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    account_type VARCHAR(32) NOT NULL,
    general_ledger_type VARCHAR(32),
    sort_index NUMERIC NOT NULL DEFAULT 0,
    min_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    max_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    computation_type VARCHAR(32) NOT NULL DEFAULT 'Straight',
    lumpsum_computation_type VARCHAR(32) NOT NULL DEFAULT 'None',
    interest_standard_computation VARCHAR(32) NOT NULL DEFAULT 'None',
    interest_standard NUMERIC(19, 4) NOT NULL DEFAULT 0,
    interest_secured NUMERIC(19, 4) NOT NULL DEFAULT 0,
    fines_amort NUMERIC(19, 4) NOT NULL DEFAULT 0,
    fines_maturity NUMERIC(19, 4) NOT NULL DEFAULT 0,
    fines_grace_period_amortization INTEGER NOT NULL DEFAULT 0,
    fines_grace_period_maturity INTEGER NOT NULL DEFAULT 0,
    additional_grace_period INTEGER NOT NULL DEFAULT 0,
    no_grace_period_daily BOOLEAN NOT NULL DEFAULT false,
    yearly_subscription_fee NUMERIC(19, 4) NOT NULL DEFAULT 0,
    cut_off_days INTEGER NOT NULL DEFAULT 0,
    cut_off_months INTEGER NOT NULL DEFAULT 0,
    compassion_fund BOOLEAN NOT NULL DEFAULT false,
    compassion_fund_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    show_in_withdraw BOOLEAN NOT NULL DEFAULT true,
    show_in_deposit BOOLEAN NOT NULL DEFAULT true,
    show_in_journal BOOLEAN NOT NULL DEFAULT true,
    show_in_payment BOOLEAN NOT NULL DEFAULT true,
    show_in_adjustment BOOLEAN NOT NULL DEFAULT true,
    show_in_journal_voucher BOOLEAN NOT NULL DEFAULT true,
    show_in_check_voucher BOOLEAN NOT NULL DEFAULT true,
    is_internal BOOLEAN NOT NULL DEFAULT false,
    cash_on_hand BOOLEAN NOT NULL DEFAULT false,
    paid_up_share_capital BOOLEAN NOT NULL DEFAULT false,
    cash_and_cash_equivalence BOOLEAN NOT NULL DEFAULT false,
    currency_id UUID,
    loan_account_id UUID REFERENCES accounts(id) ON DELETE RESTRICT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_by UUID NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_by UUID NOT NULL,

    CONSTRAINT chk_account_type CHECK (account_type IN (
        'Deposit', 'Loan', 'A/R-Ledger', 'A/R-Aging', 'Fines', 'Interest',
        'SVF-Ledger', 'W-Off', 'A/P-Ledger', 'Other', 'Time Deposit'
    )),
    CONSTRAINT chk_general_ledger_type CHECK (general_ledger_type IN (
        'Assets', 'Liabilities', 'Equity', 'Revenue', 'Expenses'
    )),
    CONSTRAINT chk_computation_type CHECK (computation_type IN (
        'Straight', 'Diminishing', 'DiminishingStraight'
    )),
    CONSTRAINT chk_lumpsum_computation_type CHECK (lumpsum_computation_type IN (
        'None', 'ComputeFinesMaturity', 'ComputeInterestMaturity', 'ComputeAdvanceInterest'
    )),
    CONSTRAINT chk_interest_standard_computation CHECK (
        interest_standard_computation IN ('None', 'Yearly', 'Monthly')
    )
);

-- Chart order within a branch
CREATE INDEX idx_accounts_chart ON accounts(organization_id, branch_id, general_ledger_type, sort_index);

-- Sibling lookup by name for insertion keys
CREATE INDEX idx_accounts_name ON accounts(organization_id, branch_id, general_ledger_type, name);

-- Linked accounts (deletion guard)
CREATE INDEX idx_accounts_loan_account ON accounts(loan_account_id) WHERE loan_account_id IS NOT NULL;
";

const ACCOUNT_HISTORIES_SQL: &str = r"
-- No FK to accounts: history outlives deleted accounts
CREATE TABLE account_histories (
    id UUID PRIMARY KEY,
    account_id UUID NOT NULL,
    organization_id UUID NOT NULL,
    branch_id UUID NOT NULL,
    kind VARCHAR(16) NOT NULL,
    loan_account_id UUID,
    currency_id UUID,
    attributes JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    created_by UUID NOT NULL,

    CONSTRAINT chk_history_kind CHECK (kind IN ('created', 'before_update'))
);

-- Point-in-time lookup per account
CREATE INDEX idx_account_histories_account
    ON account_histories(account_id, organization_id, branch_id, created_at DESC, updated_at DESC);

-- Branch-wide reconstruction
CREATE INDEX idx_account_histories_scope
    ON account_histories(organization_id, branch_id, created_at DESC);
";

const GENERAL_LEDGER_SQL: &str = r"
CREATE TABLE general_ledger_entries (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    branch_id UUID NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    member_profile_id UUID,
    debit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit NUMERIC(19, 4) NOT NULL DEFAULT 0,
    balance NUMERIC(19, 4) NOT NULL,
    scope_sequence BIGINT NOT NULL,
    source VARCHAR(32) NOT NULL,
    entry_date TIMESTAMPTZ NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    created_by UUID NOT NULL,
    payment_type_id UUID,
    transaction_id UUID,
    reference_number VARCHAR(100),
    description TEXT,

    CONSTRAINT chk_debit_non_negative CHECK (debit >= 0),
    CONSTRAINT chk_credit_non_negative CHECK (credit >= 0),
    CONSTRAINT chk_scope_sequence_positive CHECK (scope_sequence > 0),
    CONSTRAINT chk_source CHECK (source IN (
        'withdraw', 'deposit', 'journal', 'payment', 'adjustment', 'journal voucher',
        'check voucher', 'loan', 'savings interest', 'mutual contribution',
        'disbursement', 'blotter'
    ))
);

-- Latest-entry lookup per scope (posting hot path)
CREATE INDEX idx_gl_scope_latest
    ON general_ledger_entries(organization_id, branch_id, account_id, member_profile_id, created_at DESC, scope_sequence DESC);

-- Daily collection report
CREATE INDEX idx_gl_branch_day
    ON general_ledger_entries(organization_id, branch_id, entry_date);
";

const MEMBER_LEDGER_SQL: &str = r"
CREATE TABLE member_accounting_ledgers (
    id UUID PRIMARY KEY,
    organization_id UUID NOT NULL,
    branch_id UUID NOT NULL,
    member_profile_id UUID NOT NULL,
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    count BIGINT NOT NULL DEFAULT 0,
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    last_pay TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL,
    created_by UUID NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL,
    updated_by UUID NOT NULL,

    CONSTRAINT uq_member_accounting_ledger
        UNIQUE (member_profile_id, account_id, organization_id, branch_id)
);
";

const BRANCH_SETTINGS_SQL: &str = r"
CREATE TABLE branch_settings (
    organization_id UUID NOT NULL,
    branch_id UUID NOT NULL,
    maintain_balance BOOLEAN NOT NULL DEFAULT false,
    allow_negative_withdraw_balance BOOLEAN NOT NULL DEFAULT false,
    cash_on_hand_account_id UUID REFERENCES accounts(id) ON DELETE RESTRICT,
    paid_up_share_capital_account_id UUID REFERENCES accounts(id) ON DELETE RESTRICT,
    shortage_account_id UUID REFERENCES accounts(id) ON DELETE RESTRICT,
    overage_account_id UUID REFERENCES accounts(id) ON DELETE RESTRICT,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    PRIMARY KEY (organization_id, branch_id)
);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_append_only_mutation
-- Ledger entries and history snapshots are never rewritten
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_append_only_mutation()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION '% rows are append-only', TG_TABLE_NAME;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_gl_append_only
BEFORE UPDATE OR DELETE ON general_ledger_entries
FOR EACH ROW
EXECUTE FUNCTION prevent_append_only_mutation();

CREATE TRIGGER trg_account_histories_append_only
BEFORE UPDATE OR DELETE ON account_histories
FOR EACH ROW
EXECUTE FUNCTION prevent_append_only_mutation();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS branch_settings CASCADE;
DROP TABLE IF EXISTS member_accounting_ledgers CASCADE;
DROP TABLE IF EXISTS general_ledger_entries CASCADE;
DROP TABLE IF EXISTS account_histories CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP FUNCTION IF EXISTS prevent_append_only_mutation();
";
