//! `SeaORM` entity definitions for the Patungan schema.

pub mod expense_participants;
pub mod expenses;
pub mod sea_orm_active_enums;
pub mod trip_invitations;
pub mod trip_members;
pub mod trips;
pub mod users;
