//! `SeaORM` entity definitions.

pub mod cash_events;
pub mod clients;
pub mod company_settings;
pub mod loans;
pub mod payments;
pub mod sea_orm_active_enums;
pub mod sessions;
pub mod users;
