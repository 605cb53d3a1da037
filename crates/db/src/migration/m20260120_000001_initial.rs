//! Initial database migration.
//!
//! Creates all enums, tables, indexes, and the `updated_at` trigger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: IDENTITY
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(SESSIONS_SQL).await?;

        // ============================================================
        // PART 3: COMPANY & TREASURY
        // ============================================================
        db.execute_unprepared(COMPANY_SETTINGS_SQL).await?;
        db.execute_unprepared(CASH_EVENTS_SQL).await?;

        // ============================================================
        // PART 4: CLIENTS, LOANS & PAYMENTS
        // ============================================================
        db.execute_unprepared(CLIENTS_SQL).await?;
        db.execute_unprepared(LOANS_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS & FUNCTIONS
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

const ENUMS_SQL: &str = r"
-- Client lifecycle
CREATE TYPE client_status AS ENUM (
    'active',
    'inactive'
);

-- Coarse credit classification
CREATE TYPE credit_score AS ENUM (
    'low',
    'fair',
    'good',
    'excellent'
);

-- Loan lifecycle
CREATE TYPE loan_status AS ENUM (
    'active',
    'overdue',
    'paid'
);

-- Payment record status (only 'paid' rows are ever inserted)
CREATE TYPE payment_status AS ENUM (
    'paid',
    'pending',
    'overdue'
);

-- How the stated interest rate applies over time
CREATE TYPE rate_period AS ENUM (
    'daily',
    'weekly',
    'monthly',
    'flat_total'
);

-- Treasury cash movements
CREATE TYPE cash_event_kind AS ENUM (
    'capital_adjustment',
    'loan_disbursed',
    'loan_written_back',
    'interest_collected'
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    full_name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const SESSIONS_SQL: &str = r"
CREATE TABLE sessions (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    refresh_token_hash VARCHAR(255) NOT NULL,
    user_agent VARCHAR(512),
    expires_at TIMESTAMPTZ NOT NULL,
    revoked_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_sessions_user_id ON sessions(user_id);
CREATE INDEX idx_sessions_token_hash ON sessions(refresh_token_hash);
";

const COMPANY_SETTINGS_SQL: &str = r"
CREATE TABLE company_settings (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
    company_name VARCHAR(255) NOT NULL,
    document VARCHAR(32),
    email VARCHAR(255),
    phone VARCHAR(32),
    address VARCHAR(512),
    initial_capital NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const CASH_EVENTS_SQL: &str = r"
-- Append-only: rows are inserted, never updated or deleted.
-- The cash balance is initial_capital + SUM(amount) over this table.
CREATE TABLE cash_events (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    loan_id UUID,
    kind cash_event_kind NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    occurred_on DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_cash_events_owner_id ON cash_events(owner_id);
CREATE INDEX idx_cash_events_loan_id ON cash_events(loan_id);
";

const CLIENTS_SQL: &str = r"
CREATE TABLE clients (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    national_id VARCHAR(32) NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(32),
    address VARCHAR(512),
    monthly_income NUMERIC(19, 4) NOT NULL DEFAULT 0,
    credit_score credit_score NOT NULL DEFAULT 'fair',
    status client_status NOT NULL DEFAULT 'active',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ
);

CREATE INDEX idx_clients_owner_id ON clients(owner_id);
CREATE INDEX idx_clients_national_id ON clients(owner_id, national_id);
";

const LOANS_SQL: &str = r"
CREATE TABLE loans (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    client_id UUID NOT NULL REFERENCES clients(id),
    principal NUMERIC(19, 4) NOT NULL,
    rate_percent NUMERIC(9, 4) NOT NULL,
    rate_period rate_period NOT NULL,
    installments INTEGER NOT NULL,
    term_days INTEGER NOT NULL DEFAULT 0,
    installment_value NUMERIC(19, 4) NOT NULL,
    total_amount NUMERIC(19, 4) NOT NULL,
    start_date DATE NOT NULL,
    status loan_status NOT NULL DEFAULT 'active',
    remaining_balance NUMERIC(19, 4) NOT NULL,
    next_payment_date DATE NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    deleted_at TIMESTAMPTZ,

    CONSTRAINT chk_loans_principal_positive CHECK (principal > 0),
    CONSTRAINT chk_loans_installments_positive CHECK (installments > 0)
);

CREATE INDEX idx_loans_owner_id ON loans(owner_id);
CREATE INDEX idx_loans_client_id ON loans(client_id);
CREATE INDEX idx_loans_status ON loans(owner_id, status);
CREATE INDEX idx_loans_next_payment ON loans(owner_id, next_payment_date);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    loan_id UUID NOT NULL REFERENCES loans(id),
    amount NUMERIC(19, 4) NOT NULL,
    paid_on DATE NOT NULL,
    installment_number INTEGER NOT NULL,
    status payment_status NOT NULL DEFAULT 'paid',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_payments_amount_positive CHECK (amount > 0),
    CONSTRAINT uq_payments_loan_installment UNIQUE (loan_id, installment_number)
);

CREATE INDEX idx_payments_owner_id ON payments(owner_id);
CREATE INDEX idx_payments_loan_id ON payments(loan_id);
";

const TRIGGERS_SQL: &str = r"
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_users_updated_at
    BEFORE UPDATE ON users
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_sessions_updated_at
    BEFORE UPDATE ON sessions
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_company_settings_updated_at
    BEFORE UPDATE ON company_settings
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_clients_updated_at
    BEFORE UPDATE ON clients
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_loans_updated_at
    BEFORE UPDATE ON loans
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS payments CASCADE;
DROP TABLE IF EXISTS loans CASCADE;
DROP TABLE IF EXISTS clients CASCADE;
DROP TABLE IF EXISTS cash_events CASCADE;
DROP TABLE IF EXISTS company_settings CASCADE;
DROP TABLE IF EXISTS sessions CASCADE;
DROP TABLE IF EXISTS users CASCADE;

DROP FUNCTION IF EXISTS set_updated_at CASCADE;

DROP TYPE IF EXISTS cash_event_kind;
DROP TYPE IF EXISTS rate_period;
DROP TYPE IF EXISTS payment_status;
DROP TYPE IF EXISTS loan_status;
DROP TYPE IF EXISTS credit_score;
DROP TYPE IF EXISTS client_status;
";
