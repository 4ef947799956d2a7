mod common;

use common::NewProduct;
use marketplace_api::{
    dto::cart::{AddToCartRequest, UpdateCartItemRequest},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        products::Entity as Products,
    },
    error::AppError,
    services::cart_service,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

#[tokio::test]
async fn adding_same_product_increments_existing_row() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let seller = common::create_seller(&state, common::ADMIN_EMAIL).await?;
    let buyer = common::create_buyer(&state, "buyer@shop.test").await?;
    let product = common::create_product(&state, &seller, NewProduct::new("Mug", 800, 5)).await?;

    for quantity in [2, 1] {
        cart_service::add_to_cart(
            &state,
            &buyer,
            AddToCartRequest {
                product_id: product.id,
                quantity,
            },
        )
        .await?;
    }

    let rows = CartItems::find()
        .filter(CartCol::UserId.eq(buyer.user_id))
        .all(&state.orm)
        .await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity, 3);
    Ok(())
}

#[tokio::test]
async fn adding_beyond_stock_is_rejected_without_mutation() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let seller = common::create_seller(&state, common::ADMIN_EMAIL).await?;
    let buyer = common::create_buyer(&state, "buyer@shop.test").await?;
    let product = common::create_product(&state, &seller, NewProduct::new("Lamp", 2_000, 4)).await?;

    cart_service::add_to_cart(
        &state,
        &buyer,
        AddToCartRequest {
            product_id: product.id,
            quantity: 3,
        },
    )
    .await?;

    let result = cart_service::add_to_cart(
        &state,
        &buyer,
        AddToCartRequest {
            product_id: product.id,
            quantity: 2,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let rows = CartItems::find()
        .filter(CartCol::UserId.eq(buyer.user_id))
        .all(&state.orm)
        .await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity, 3);
    Ok(())
}

#[tokio::test]
async fn add_rejects_bad_quantities_and_unknown_products() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let seller = common::create_seller(&state, common::ADMIN_EMAIL).await?;
    let buyer = common::create_buyer(&state, "buyer@shop.test").await?;
    let product = common::create_product(&state, &seller, NewProduct::new("Pen", 100, 50)).await?;

    for quantity in [0, -1, cart_service::MAX_QUANTITY_PER_ADD + 1] {
        let result = cart_service::add_to_cart(
            &state,
            &buyer,
            AddToCartRequest {
                product_id: product.id,
                quantity,
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))), "quantity {quantity}");
    }

    let result = cart_service::add_to_cart(
        &state,
        &buyer,
        AddToCartRequest {
            product_id: uuid::Uuid::new_v4(),
            quantity: 1,
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let count = CartItems::find().count(&state.orm).await?;
    assert_eq!(count, 0);
    Ok(())
}

#[tokio::test]
async fn cart_listing_drops_rows_for_deleted_products() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let seller = common::create_seller(&state, common::ADMIN_EMAIL).await?;
    let buyer = common::create_buyer(&state, "buyer@shop.test").await?;
    let kept = common::create_product(&state, &seller, NewProduct::new("Kept", 1_250, 10)).await?;
    let gone = common::create_product(&state, &seller, NewProduct::new("Gone", 500, 10)).await?;

    for (product_id, quantity) in [(kept.id, 2), (gone.id, 1)] {
        cart_service::add_to_cart(&state, &buyer, AddToCartRequest { product_id, quantity })
            .await?;
    }
    Products::delete_by_id(gone.id).exec(&state.orm).await?;

    let cart = cart_service::list_cart(&state, &buyer).await?.data.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].product.id, kept.id);
    assert_eq!(cart.items[0].line_total, 2_500);
    assert_eq!(cart.subtotal, 2_500);
    Ok(())
}

#[tokio::test]
async fn quantity_updates_are_bounded_by_stock() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let seller = common::create_seller(&state, common::ADMIN_EMAIL).await?;
    let buyer = common::create_buyer(&state, "buyer@shop.test").await?;
    let product = common::create_product(&state, &seller, NewProduct::new("Cap", 900, 3)).await?;

    cart_service::add_to_cart(
        &state,
        &buyer,
        AddToCartRequest {
            product_id: product.id,
            quantity: 1,
        },
    )
    .await?;

    let updated = cart_service::update_quantity(
        &state,
        &buyer,
        product.id,
        UpdateCartItemRequest { quantity: 3 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.quantity, 3);

    for quantity in [4, 0] {
        let result = cart_service::update_quantity(
            &state,
            &buyer,
            product.id,
            UpdateCartItemRequest { quantity },
        )
        .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))), "quantity {quantity}");
    }

    cart_service::remove_from_cart(&state, &buyer, product.id).await?;
    let again = cart_service::remove_from_cart(&state, &buyer, product.id).await;
    assert!(matches!(again, Err(AppError::NotFound)));

    let missing = cart_service::update_quantity(
        &state,
        &buyer,
        product.id,
        UpdateCartItemRequest { quantity: 1 },
    )
    .await;
    assert!(matches!(missing, Err(AppError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn duplicate_rows_for_one_product_are_merged() -> anyhow::Result<()> {
    let state = common::setup_state().await?;
    let seller = common::create_seller(&state, common::ADMIN_EMAIL).await?;
    let buyer = common::create_buyer(&state, "buyer@shop.test").await?;
    let bottle = common::create_product(&state, &seller, NewProduct::new("Bottle", 1_000, 20)).await?;

    common::insert_cart_row(&state, &buyer, bottle.id, 2).await?;
    common::insert_cart_row(&state, &buyer, bottle.id, 3).await?;

    let cart = cart_service::list_cart(&state, &buyer).await?.data.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 5);
    assert_eq!(cart.subtotal, 5_000);

    // the next add folds the duplicates into a single row
    let added = cart_service::add_to_cart(
        &state,
        &buyer,
        AddToCartRequest {
            product_id: bottle.id,
            quantity: 1,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(added.quantity, 6);

    let rows = CartItems::find()
        .filter(CartCol::UserId.eq(buyer.user_id))
        .all(&state.orm)
        .await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity, 6);
    Ok(())
}
