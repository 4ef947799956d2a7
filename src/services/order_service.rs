use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::orders::{CheckoutRequest, OrderList, OrderWithItems},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        discount_code_usages::ActiveModel as UsageActive,
        discount_codes::{Column as CodeCol, Entity as DiscountCodes},
        order_items::{ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{Column as ProdCol, Entity as Products},
        seller_earnings::ActiveModel as EarningActive,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{EarningStatus, Order, OrderItem, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    rules::commission::{COMMISSION_RATE_BPS, split_line},
    services::{cart_service, discount_service},
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status {
        condition = condition.add(OrderCol::Status.eq(status.as_str()));
    }

    let mut finder = Orders::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Order::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let items = order_items(state, order.id).await?;

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub(crate) async fn order_items(state: &AppState, order_id: Uuid) -> AppResult<Vec<OrderItem>> {
    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order_id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderItem::from)
        .collect();
    Ok(items)
}

/// Turns the caller's cart into an order.
///
/// Stock and the discount are validated against fresh rows before anything
/// is written. The writes run in one transaction; the stock decrement and the
/// discount counter are conditional so a concurrent checkout that got there
/// first makes this one fail instead of overselling.
pub async fn checkout(
    state: &AppState,
    user: &AuthUser,
    payload: CheckoutRequest,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let shipping_address = payload.shipping_address.trim();
    if shipping_address.is_empty() {
        return Err(AppError::BadRequest("Shipping address is required".into()));
    }

    let lines = cart_service::load_cart_lines(&state.orm, user.user_id).await?;
    if lines.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    for line in &lines {
        if line.quantity <= 0 {
            return Err(AppError::BadRequest("Cart has invalid quantity".into()));
        }
        if line.quantity > line.product.stock_quantity {
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}: {} available",
                line.product.name, line.product.stock_quantity
            )));
        }
    }

    let subtotal = cart_service::subtotal(&lines);
    let discount = match payload.discount_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => Some(
            discount_service::redeemable_discount(&state.orm, user.user_id, code, subtotal)
                .await?,
        ),
        _ => None,
    };
    let discount_amount = discount.as_ref().map_or(0, |(_, amount)| *amount);

    let now = Utc::now();
    let txn = state.orm.begin().await?;

    let order = OrderActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        subtotal_amount: Set(subtotal),
        discount_amount: Set(discount_amount),
        discount_code: Set(discount.as_ref().map(|(code, _)| code.code.clone())),
        total_amount: Set(subtotal - discount_amount),
        status: Set(OrderStatus::Pending.as_str().to_string()),
        shipping_address: Set(shipping_address.to_string()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await?;

    let mut items: Vec<OrderItem> = Vec::with_capacity(lines.len());
    for line in &lines {
        let item = OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product.id),
            quantity: Set(line.quantity),
            price: Set(line.product.price),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;
        items.push(OrderItem::from(item));

        // reduce stock
        let decremented = Products::update_many()
            .col_expr(
                ProdCol::StockQuantity,
                Expr::col(ProdCol::StockQuantity).sub(line.quantity),
            )
            .filter(ProdCol::Id.eq(line.product.id))
            .filter(ProdCol::StockQuantity.gte(line.quantity))
            .exec(&txn)
            .await?;
        if decremented.rows_affected == 0 {
            txn.rollback().await?;
            return Err(AppError::BadRequest(format!(
                "Insufficient stock for {}",
                line.product.name
            )));
        }

        let split = split_line(line.product.price, line.quantity);
        EarningActive {
            id: Set(Uuid::new_v4()),
            seller_id: Set(line.product.owner_user_id),
            order_id: Set(order.id),
            product_id: Set(line.product.id),
            quantity: Set(line.quantity),
            unit_price: Set(line.product.price),
            total_earnings: Set(split.total),
            commission_rate: Set(COMMISSION_RATE_BPS),
            commission_amount: Set(split.commission),
            net_earnings: Set(split.net),
            status: Set(EarningStatus::Available.as_str().to_string()),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;
    }

    if let Some((code, _)) = &discount {
        UsageActive {
            id: Set(Uuid::new_v4()),
            discount_code_id: Set(code.id),
            user_id: Set(user.user_id),
            order_id: Set(order.id),
            used_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        let mut guard = Condition::all().add(CodeCol::Id.eq(code.id));
        if let Some(max_uses) = code.max_uses {
            guard = guard.add(CodeCol::CurrentUses.lt(max_uses));
        }
        let bumped = DiscountCodes::update_many()
            .col_expr(CodeCol::CurrentUses, Expr::col(CodeCol::CurrentUses).add(1))
            .filter(guard)
            .exec(&txn)
            .await?;
        if bumped.rows_affected == 0 {
            txn.rollback().await?;
            return Err(AppError::BadRequest(
                "Discount code has reached its usage limit".into(),
            ));
        }
    }

    // clear cart
    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        order_id = %order.id,
        user_id = %user.user_id,
        total = order.total_amount,
        lines = items.len(),
        "checkout completed"
    );
    audit::record(
        &state.orm,
        user.user_id,
        "checkout",
        "orders",
        serde_json::json!({ "order_id": order.id, "discount_code": order.discount_code }),
    )
    .await;

    Ok(ApiResponse::success(
        "Checkout success",
        OrderWithItems {
            order: Order::from(order),
            items,
        },
        Some(Meta::empty()),
    ))
}
