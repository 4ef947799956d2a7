pub mod audit_logs;
pub mod cart_items;
pub mod discount_code_usages;
pub mod discount_codes;
pub mod order_items;
pub mod orders;
pub mod payout_items;
pub mod payout_requests;
pub mod products;
pub mod seller_earnings;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use cart_items::Entity as CartItems;
pub use discount_code_usages::Entity as DiscountCodeUsages;
pub use discount_codes::Entity as DiscountCodes;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use payout_items::Entity as PayoutItems;
pub use payout_requests::Entity as PayoutRequests;
pub use products::Entity as Products;
pub use seller_earnings::Entity as SellerEarnings;
pub use users::Entity as Users;
