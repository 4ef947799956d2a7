pub mod admin;
pub mod auth;
pub mod cart;
pub mod discounts;
pub mod orders;
pub mod payouts;
pub mod products;
