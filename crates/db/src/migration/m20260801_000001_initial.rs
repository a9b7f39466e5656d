//! Initial schema: users, trips, members, expenses, invitations.
//!
//! Constraints worth noting:
//! - `chk_member_identity` keeps the real/virtual member invariant at the
//!   storage level: a row has either a linked user or a display name,
//!   never both.
//! - The partial unique indexes back the "already a member" and
//!   "duplicate pending invitation" conflict checks under concurrency.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(INITIAL_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(
            r"
DROP TABLE IF EXISTS trip_invitations CASCADE;
DROP TABLE IF EXISTS expense_participants CASCADE;
DROP TABLE IF EXISTS expenses CASCADE;
DROP TABLE IF EXISTS trip_members CASCADE;
DROP TABLE IF EXISTS trips CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP TYPE IF EXISTS invite_type;
DROP TYPE IF EXISTS invitation_status;
DROP TYPE IF EXISTS member_role;
",
        )
        .await?;
        Ok(())
    }
}

const INITIAL_SQL: &str = r"
-- Enums
CREATE TYPE member_role AS ENUM ('admin', 'member');
CREATE TYPE invitation_status AS ENUM ('pending', 'accepted', 'rejected', 'expired', 'cancelled');
CREATE TYPE invite_type AS ENUM ('add', 'replace');

-- Users (owned by the external auth system; mirrored minimally)
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    display_name VARCHAR(120) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Trips
CREATE TABLE trips (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(200) NOT NULL,
    description TEXT,
    owner_id UUID NOT NULL REFERENCES users(id),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_trips_owner ON trips(owner_id);

-- Trip members. Expenses reference these rows, never users directly,
-- so replacing a virtual member is an in-place UPDATE.
CREATE TABLE trip_members (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    trip_id UUID NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
    user_id UUID REFERENCES users(id),
    is_virtual BOOLEAN NOT NULL DEFAULT false,
    display_name VARCHAR(120),
    role member_role NOT NULL DEFAULT 'member',
    contribution NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (contribution >= 0),
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_member_identity CHECK (
        (user_id IS NOT NULL AND is_virtual = false)
        OR (user_id IS NULL AND is_virtual = true AND display_name IS NOT NULL)
    )
);

CREATE INDEX idx_trip_members_trip ON trip_members(trip_id) WHERE is_active;

-- One active membership per user per trip
CREATE UNIQUE INDEX uq_trip_members_user
    ON trip_members(trip_id, user_id)
    WHERE user_id IS NOT NULL AND is_active;

-- Expenses. Amounts are non-negative; income is a flag, not a sign.
CREATE TABLE expenses (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    trip_id UUID NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
    description VARCHAR(500) NOT NULL,
    amount NUMERIC(14, 2) NOT NULL CHECK (amount >= 0),
    is_income BOOLEAN NOT NULL DEFAULT false,
    payer_member_id UUID NOT NULL REFERENCES trip_members(id),
    is_paid_from_fund BOOLEAN NOT NULL DEFAULT false,
    expense_date DATE NOT NULL,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_expenses_trip ON expenses(trip_id, expense_date DESC);
CREATE INDEX idx_expenses_payer ON expenses(payer_member_id);

-- Per-member expense shares
CREATE TABLE expense_participants (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    expense_id UUID NOT NULL REFERENCES expenses(id) ON DELETE CASCADE,
    trip_member_id UUID NOT NULL REFERENCES trip_members(id),
    share_amount NUMERIC(14, 2) NOT NULL CHECK (share_amount >= 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_expense_participant UNIQUE (expense_id, trip_member_id)
);

CREATE INDEX idx_expense_participants_member ON expense_participants(trip_member_id);

-- Trip invitations
CREATE TABLE trip_invitations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    trip_id UUID NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
    invited_user_id UUID NOT NULL REFERENCES users(id),
    invite_type invite_type NOT NULL DEFAULT 'add',
    target_member_id UUID REFERENCES trip_members(id),
    status invitation_status NOT NULL DEFAULT 'pending',
    message TEXT,
    created_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    expires_at TIMESTAMPTZ NOT NULL,
    responded_at TIMESTAMPTZ,
    CONSTRAINT chk_replace_has_target CHECK (
        invite_type <> 'replace' OR target_member_id IS NOT NULL
    ),
    CONSTRAINT chk_expires_future CHECK (expires_at > created_at)
);

-- One pending invitation per user per trip
CREATE UNIQUE INDEX uq_trip_invitations_pending
    ON trip_invitations(trip_id, invited_user_id)
    WHERE status = 'pending';

CREATE INDEX idx_trip_invitations_user ON trip_invitations(invited_user_id, status);

-- Sweep of expired pending invitations
CREATE INDEX idx_trip_invitations_expiry ON trip_invitations(expires_at) WHERE status = 'pending';
";
