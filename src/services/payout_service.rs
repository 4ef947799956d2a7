use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::payouts::{CreatePayoutRequest, PayoutSummary, PayoutWithItems, ProcessPayoutRequest},
    entity::{
        payout_items::{ActiveModel as PayoutItemActive, Column as PayoutItemCol, Entity as PayoutItems},
        payout_requests::{
            ActiveModel as PayoutActive, Column as PayoutCol, Entity as PayoutRequests,
        },
        seller_earnings::{Column as EarningCol, Entity as SellerEarnings},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{EarningStatus, PayoutItem, PayoutRequest, PayoutStatus, SellerEarning},
    response::{ApiResponse, Meta},
    rules::payout::allocate,
    state::AppState,
};

fn sum_with_status(earnings: &[SellerEarning], status: EarningStatus) -> i64 {
    earnings
        .iter()
        .filter(|e| e.status == status.as_str())
        .map(|e| e.net_earnings)
        .sum()
}

pub async fn payout_summary(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<PayoutSummary>> {
    ensure_admin(user)?;
    let earnings: Vec<SellerEarning> = SellerEarnings::find()
        .filter(EarningCol::SellerId.eq(user.user_id))
        .order_by_desc(EarningCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(SellerEarning::from)
        .collect();

    let payout_requests = PayoutRequests::find()
        .filter(PayoutCol::SellerId.eq(user.user_id))
        .order_by_desc(PayoutCol::RequestedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(PayoutRequest::from)
        .collect();

    let summary = PayoutSummary {
        available_balance: sum_with_status(&earnings, EarningStatus::Available),
        pending_balance: sum_with_status(&earnings, EarningStatus::PendingPayout),
        paid_out_total: sum_with_status(&earnings, EarningStatus::PaidOut),
        total_net_earnings: earnings.iter().map(|e| e.net_earnings).sum(),
        earnings,
        payout_requests,
    };
    Ok(ApiResponse::success("Payouts", summary, Some(Meta::empty())))
}

/// Creates a payout request covered by the seller's `available` earnings,
/// oldest first. Every earning touched moves to `pending_payout`.
pub async fn request_payout(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePayoutRequest,
) -> AppResult<ApiResponse<PayoutWithItems>> {
    ensure_admin(user)?;
    if payload.amount <= 0 {
        return Err(AppError::BadRequest("amount must be greater than 0".into()));
    }
    let payment_method = payload.payment_method.trim();
    if payment_method.is_empty() {
        return Err(AppError::BadRequest("payment method is required".into()));
    }

    let txn = state.orm.begin().await?;

    let available: Vec<(Uuid, i64)> = SellerEarnings::find()
        .filter(
            Condition::all()
                .add(EarningCol::SellerId.eq(user.user_id))
                .add(EarningCol::Status.eq(EarningStatus::Available.as_str())),
        )
        .order_by_asc(EarningCol::CreatedAt)
        .order_by_asc(EarningCol::Id)
        .all(&txn)
        .await?
        .into_iter()
        .map(|e| (e.id, e.net_earnings))
        .collect();
    let balance: i64 = available.iter().map(|(_, net)| net).sum();

    let allocations = match allocate(&available, payload.amount) {
        Some(allocations) => allocations,
        None => {
            txn.rollback().await?;
            return Err(AppError::BadRequest(format!(
                "Requested amount exceeds available balance of {balance}"
            )));
        }
    };

    let payout = PayoutActive {
        id: Set(Uuid::new_v4()),
        seller_id: Set(user.user_id),
        amount: Set(payload.amount),
        status: Set(PayoutStatus::Pending.as_str().to_string()),
        payment_method: Set(payment_method.to_string()),
        payment_details: Set(payload.payment_details),
        requested_at: Set(Utc::now().into()),
        processed_at: Set(None),
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(allocations.len());
    for allocation in &allocations {
        let item = PayoutItemActive {
            id: Set(Uuid::new_v4()),
            payout_request_id: Set(payout.id),
            earning_id: Set(allocation.earning_id),
            amount: Set(allocation.amount),
        }
        .insert(&txn)
        .await?;
        items.push(PayoutItem::from(item));

        let flipped = SellerEarnings::update_many()
            .col_expr(
                EarningCol::Status,
                Expr::value(EarningStatus::PendingPayout.as_str()),
            )
            .filter(EarningCol::Id.eq(allocation.earning_id))
            .filter(EarningCol::Status.eq(EarningStatus::Available.as_str()))
            .exec(&txn)
            .await?;
        if flipped.rows_affected == 0 {
            txn.rollback().await?;
            return Err(AppError::BadRequest(
                "Earnings changed while requesting payout, please retry".into(),
            ));
        }
    }

    txn.commit().await?;

    tracing::info!(
        payout_id = %payout.id,
        seller_id = %user.user_id,
        amount = payout.amount,
        earnings = items.len(),
        "payout requested"
    );
    audit::record(
        &state.orm,
        user.user_id,
        "payout_request",
        "payout_requests",
        serde_json::json!({ "payout_id": payout.id, "amount": payout.amount }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payout requested",
        PayoutWithItems {
            payout: PayoutRequest::from(payout),
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Settles (`approve`) or rejects a pending payout request. Rejected
/// earnings become available again. A seller never processes their own
/// request.
pub async fn process_payout(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: ProcessPayoutRequest,
) -> AppResult<ApiResponse<PayoutWithItems>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let payout = match PayoutRequests::find_by_id(id).one(&txn).await? {
        Some(p) => p,
        None => {
            txn.rollback().await?;
            return Err(AppError::NotFound);
        }
    };
    if payout.seller_id == user.user_id {
        txn.rollback().await?;
        tracing::warn!(payout_id = %payout.id, admin_id = %user.user_id, "attempt to process own payout");
        return Err(AppError::Forbidden);
    }
    if payout.status != PayoutStatus::Pending.as_str() {
        txn.rollback().await?;
        return Err(AppError::BadRequest("Payout request already processed".into()));
    }

    let items = PayoutItems::find()
        .filter(PayoutItemCol::PayoutRequestId.eq(payout.id))
        .all(&txn)
        .await?;
    let earning_ids: Vec<Uuid> = items.iter().map(|i| i.earning_id).collect();

    let (payout_status, earning_status) = if payload.approve {
        (PayoutStatus::Completed, EarningStatus::PaidOut)
    } else {
        (PayoutStatus::Rejected, EarningStatus::Available)
    };

    SellerEarnings::update_many()
        .col_expr(EarningCol::Status, Expr::value(earning_status.as_str()))
        .filter(EarningCol::Id.is_in(earning_ids))
        .filter(EarningCol::Status.eq(EarningStatus::PendingPayout.as_str()))
        .exec(&txn)
        .await?;

    let mut active: PayoutActive = payout.into();
    active.status = Set(payout_status.as_str().to_string());
    active.processed_at = Set(Some(Utc::now().into()));
    let payout = active.update(&txn).await?;

    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "payout_process",
        "payout_requests",
        serde_json::json!({ "payout_id": payout.id, "status": payout.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payout processed",
        PayoutWithItems {
            payout: PayoutRequest::from(payout),
            items: items.into_iter().map(PayoutItem::from).collect(),
        },
        Some(Meta::empty()),
    ))
}
