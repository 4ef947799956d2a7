//! Business rules that do not touch the database.

pub mod commission;
pub mod discount;
pub mod inventory;
pub mod payout;
