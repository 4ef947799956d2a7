use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{PayoutItem, PayoutRequest, SellerEarning};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayoutRequest {
    pub amount: i64,
    pub payment_method: String,
    pub payment_details: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProcessPayoutRequest {
    pub approve: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PayoutSummary {
    pub available_balance: i64,
    pub pending_balance: i64,
    pub paid_out_total: i64,
    pub total_net_earnings: i64,
    pub earnings: Vec<SellerEarning>,
    pub payout_requests: Vec<PayoutRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PayoutWithItems {
    pub payout: PayoutRequest,
    pub items: Vec<PayoutItem>,
}
