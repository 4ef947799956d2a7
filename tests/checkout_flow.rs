mod common;

use common::{NewCode, NewProduct};
use marketplace_api::{
    dto::{cart::AddToCartRequest, orders::CheckoutRequest},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        discount_code_usages::{Column as UsageCol, Entity as DiscountCodeUsages},
        discount_codes::Entity as DiscountCodes,
        orders::Entity as Orders,
        products::{ActiveModel as ProductActive, Entity as Products},
        seller_earnings::{Column as EarningCol, Entity as SellerEarnings},
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::EarningStatus,
    services::{cart_service, order_service},
    state::AppState,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

async fn add(state: &AppState, user: &AuthUser, product_id: Uuid, quantity: i32) -> anyhow::Result<()> {
    cart_service::add_to_cart(state, user, AddToCartRequest { product_id, quantity }).await?;
    Ok(())
}

fn checkout_request(code: Option<&str>) -> CheckoutRequest {
    CheckoutRequest {
        shipping_address: "1 High Street, London".into(),
        discount_code: code.map(str::to_string),
    }
}

#[tokio::test]
async fn checkout_with_discount_creates_order_and_settles_everything() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let seller = common::create_seller(&state, common::ADMIN_EMAIL).await?;
    let buyer = common::create_buyer(&state, "buyer@shop.test").await?;
    let boots = common::create_product(&state, &seller, NewProduct::new("Boots", 3_000, 5)).await?;
    let scarf = common::create_product(&state, &seller, NewProduct::new("Scarf", 4_000, 1)).await?;
    let code = common::create_code(&state, NewCode::percentage("SAVE10", 10, 5_000)).await?;

    add(&state, &buyer, boots.id, 2).await?;
    add(&state, &buyer, scarf.id, 1).await?;

    let placed = order_service::checkout(&state, &buyer, checkout_request(Some("save10")))
        .await?
        .data
        .unwrap();
    assert_eq!(placed.order.subtotal_amount, 10_000);
    assert_eq!(placed.order.discount_amount, 1_000);
    assert_eq!(placed.order.total_amount, 9_000);
    assert_eq!(placed.order.discount_code.as_deref(), Some("SAVE10"));
    assert_eq!(placed.order.status, "pending");
    assert_eq!(placed.items.len(), 2);

    assert_eq!(Orders::find().count(&state.orm).await?, 1);
    let cart_rows = CartItems::find()
        .filter(CartCol::UserId.eq(buyer.user_id))
        .count(&state.orm)
        .await?;
    assert_eq!(cart_rows, 0);

    let boots_after = Products::find_by_id(boots.id).one(&state.orm).await?.unwrap();
    let scarf_after = Products::find_by_id(scarf.id).one(&state.orm).await?.unwrap();
    assert_eq!(boots_after.stock_quantity, 3);
    assert_eq!(scarf_after.stock_quantity, 0);

    let earnings = SellerEarnings::find()
        .filter(EarningCol::SellerId.eq(seller.user_id))
        .order_by_asc(EarningCol::TotalEarnings)
        .all(&state.orm)
        .await?;
    assert_eq!(earnings.len(), 2);
    let splits: Vec<(i64, i64, i64)> = earnings
        .iter()
        .map(|e| (e.total_earnings, e.commission_amount, e.net_earnings))
        .collect();
    assert_eq!(splits, vec![(4_000, 200, 3_800), (6_000, 300, 5_700)]);
    assert!(earnings.iter().all(|e| e.commission_rate == 500));
    assert!(earnings.iter().all(|e| e.status == EarningStatus::Available.as_str()));

    let usages = DiscountCodeUsages::find()
        .filter(UsageCol::DiscountCodeId.eq(code.id))
        .all(&state.orm)
        .await?;
    assert_eq!(usages.len(), 1);
    assert_eq!(usages[0].user_id, buyer.user_id);
    assert_eq!(usages[0].order_id, placed.order.id);
    let code_after = DiscountCodes::find_by_id(code.id).one(&state.orm).await?.unwrap();
    assert_eq!(code_after.current_uses, 1);

    // the same buyer cannot redeem the code twice
    add(&state, &buyer, boots.id, 2).await?;
    let hat = common::create_product(&state, &seller, NewProduct::new("Hat", 5_000, 2)).await?;
    add(&state, &buyer, hat.id, 1).await?;
    let second = order_service::checkout(&state, &buyer, checkout_request(Some("SAVE10"))).await;
    let err = second.expect_err("second redemption must fail");
    assert!(matches!(err, AppError::BadRequest(_)));
    assert_eq!(Orders::find().count(&state.orm).await?, 1);
    Ok(())
}

#[tokio::test]
async fn checkout_without_code_charges_subtotal() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let seller = common::create_seller(&state, common::ADMIN_EMAIL).await?;
    let buyer = common::create_buyer(&state, "buyer@shop.test").await?;
    let kettle = common::create_product(&state, &seller, NewProduct::new("Kettle", 2_599, 3)).await?;
    add(&state, &buyer, kettle.id, 1).await?;

    let placed = order_service::checkout(&state, &buyer, checkout_request(None))
        .await?
        .data
        .unwrap();
    assert_eq!(placed.order.total_amount, 2_599);
    assert_eq!(placed.order.discount_amount, 0);
    assert!(placed.order.discount_code.is_none());

    // 5% of 2599 is 129.95, rounded half up
    let earning = SellerEarnings::find().one(&state.orm).await?.unwrap();
    assert_eq!(earning.commission_amount, 130);
    assert_eq!(earning.net_earnings, 2_469);
    Ok(())
}

#[tokio::test]
async fn checkout_fails_cleanly_when_stock_ran_out() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let seller = common::create_seller(&state, common::ADMIN_EMAIL).await?;
    let buyer = common::create_buyer(&state, "buyer@shop.test").await?;
    let clock = common::create_product(&state, &seller, NewProduct::new("Clock", 1_500, 2)).await?;
    add(&state, &buyer, clock.id, 2).await?;

    // another sale drained the shelf after the item was carted
    let mut active: ProductActive = clock.clone().into();
    active.stock_quantity = Set(1);
    active.update(&state.orm).await?;

    let result = order_service::checkout(&state, &buyer, checkout_request(None)).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    assert_eq!(Orders::find().count(&state.orm).await?, 0);
    assert_eq!(SellerEarnings::find().count(&state.orm).await?, 0);
    let stock = Products::find_by_id(clock.id).one(&state.orm).await?.unwrap().stock_quantity;
    assert_eq!(stock, 1);
    let cart_rows = CartItems::find()
        .filter(CartCol::UserId.eq(buyer.user_id))
        .count(&state.orm)
        .await?;
    assert_eq!(cart_rows, 1);
    Ok(())
}

#[tokio::test]
async fn checkout_rejects_empty_cart_and_blank_address() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let seller = common::create_seller(&state, common::ADMIN_EMAIL).await?;
    let buyer = common::create_buyer(&state, "buyer@shop.test").await?;

    let empty = order_service::checkout(&state, &buyer, checkout_request(None)).await;
    let err = empty.expect_err("empty cart");
    assert_eq!(common::bad_request_message(&err), Some("Cart is empty"));

    let toaster = common::create_product(&state, &seller, NewProduct::new("Toaster", 3_500, 4)).await?;
    add(&state, &buyer, toaster.id, 1).await?;
    let blank = order_service::checkout(
        &state,
        &buyer,
        CheckoutRequest {
            shipping_address: "   ".into(),
            discount_code: None,
        },
    )
    .await;
    let err = blank.expect_err("blank address");
    assert_eq!(common::bad_request_message(&err), Some("Shipping address is required"));
    assert_eq!(Orders::find().count(&state.orm).await?, 0);
    Ok(())
}

#[tokio::test]
async fn exhausted_code_blocks_checkout() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let seller = common::create_seller(&state, common::ADMIN_EMAIL).await?;
    let buyer = common::create_buyer(&state, "buyer@shop.test").await?;
    let rug = common::create_product(&state, &seller, NewProduct::new("Rug", 9_000, 2)).await?;
    common::create_code(
        &state,
        NewCode {
            max_uses: Some(3),
            current_uses: 3,
            ..NewCode::percentage("LIMITED", 20, 0)
        },
    )
    .await?;
    add(&state, &buyer, rug.id, 1).await?;

    let result = order_service::checkout(&state, &buyer, checkout_request(Some("LIMITED"))).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert_eq!(Orders::find().count(&state.orm).await?, 0);
    let stock = Products::find_by_id(rug.id).one(&state.orm).await?.unwrap().stock_quantity;
    assert_eq!(stock, 2);
    Ok(())
}

#[tokio::test]
async fn duplicate_cart_rows_become_one_order_item() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let seller = common::create_seller(&state, common::ADMIN_EMAIL).await?;
    let buyer = common::create_buyer(&state, "buyer@shop.test").await?;
    let candle = common::create_product(&state, &seller, NewProduct::new("Candle", 1_000, 8)).await?;

    common::insert_cart_row(&state, &buyer, candle.id, 2).await?;
    common::insert_cart_row(&state, &buyer, candle.id, 3).await?;

    let placed = order_service::checkout(&state, &buyer, checkout_request(None))
        .await?
        .data
        .unwrap();
    assert_eq!(placed.order.total_amount, 5_000);
    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.items[0].quantity, 5);

    let stock = Products::find_by_id(candle.id).one(&state.orm).await?.unwrap().stock_quantity;
    assert_eq!(stock, 3);
    let cart_rows = CartItems::find()
        .filter(CartCol::UserId.eq(buyer.user_id))
        .count(&state.orm)
        .await?;
    assert_eq!(cart_rows, 0);
    Ok(())
}
