use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::cart::{AddToCartRequest, CartLine, CartList, CartSummary, UpdateCartItemRequest},
    entity::{
        cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{CartItem, Product},
    response::{ApiResponse, Deleted, Meta},
    services::discount_service,
    state::AppState,
};

/// Largest quantity a single add-to-cart may request.
pub const MAX_QUANTITY_PER_ADD: i32 = 10;

/// A cart row joined to its current product row.
#[derive(Debug, Clone)]
pub struct EnrichedLine {
    pub cart_item_id: Uuid,
    pub product: ProductModel,
    pub quantity: i32,
}

impl EnrichedLine {
    pub fn line_total(&self) -> i64 {
        self.product.price * i64::from(self.quantity)
    }
}

pub fn subtotal(lines: &[EnrichedLine]) -> i64 {
    lines.iter().map(EnrichedLine::line_total).sum()
}

/// Loads the caller's cart and joins every row to its product with a second
/// query. Rows for the same product are merged into one line; rows whose
/// product has been deleted are dropped.
pub async fn load_cart_lines<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> AppResult<Vec<EnrichedLine>> {
    let rows = CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .order_by_asc(CartCol::CreatedAt)
        .all(conn)
        .await?;
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let product_ids: Vec<Uuid> = rows.iter().map(|r| r.product_id).collect();
    let products: HashMap<Uuid, ProductModel> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut lines: Vec<EnrichedLine> = Vec::with_capacity(rows.len());
    let mut line_for_product: HashMap<Uuid, usize> = HashMap::new();
    for row in rows {
        if let Some(&idx) = line_for_product.get(&row.product_id) {
            lines[idx].quantity += row.quantity;
            continue;
        }
        match products.get(&row.product_id) {
            Some(product) => {
                line_for_product.insert(row.product_id, lines.len());
                lines.push(EnrichedLine {
                    cart_item_id: row.id,
                    product: product.clone(),
                    quantity: row.quantity,
                });
            }
            None => {
                tracing::debug!(cart_item_id = %row.id, product_id = %row.product_id, "dropping cart row for missing product");
            }
        }
    }
    Ok(lines)
}

pub async fn list_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartList>> {
    let lines = load_cart_lines(&state.orm, user.user_id).await?;
    let subtotal = subtotal(&lines);
    let total = lines.len() as i64;

    let items = lines
        .into_iter()
        .map(|line| CartLine {
            id: line.cart_item_id,
            line_total: line.line_total(),
            quantity: line.quantity,
            product: Product::from(line.product),
        })
        .collect();

    Ok(ApiResponse::success(
        "OK",
        CartList { items, subtotal },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn cart_summary(
    state: &AppState,
    user: &AuthUser,
    discount_code: Option<String>,
) -> AppResult<ApiResponse<CartSummary>> {
    let lines = load_cart_lines(&state.orm, user.user_id).await?;
    let subtotal = subtotal(&lines);

    let (code, discount_amount) = match discount_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => {
            let (code, amount) =
                discount_service::redeemable_discount(&state.orm, user.user_id, code, subtotal)
                    .await?;
            (Some(code.code), amount)
        }
        _ => (None, 0),
    };

    Ok(ApiResponse::success(
        "OK",
        CartSummary {
            item_count: lines.iter().map(|l| i64::from(l.quantity)).sum(),
            subtotal,
            discount_code: code,
            discount_amount,
            total: subtotal - discount_amount,
        },
        None,
    ))
}

/// Every row the caller holds for `product_id`, oldest first. Normally one;
/// concurrent adds can leave more.
async fn find_cart_rows(
    state: &AppState,
    user_id: Uuid,
    product_id: Uuid,
) -> AppResult<Vec<crate::entity::cart_items::Model>> {
    let rows = CartItems::find()
        .filter(
            Condition::all()
                .add(CartCol::UserId.eq(user_id))
                .add(CartCol::ProductId.eq(product_id)),
        )
        .order_by_asc(CartCol::CreatedAt)
        .all(&state.orm)
        .await?;
    Ok(rows)
}

/// Sets `quantity` on the first row and deletes any duplicates after it.
async fn store_single_row(
    state: &AppState,
    rows: Vec<crate::entity::cart_items::Model>,
    quantity: i32,
) -> AppResult<crate::entity::cart_items::Model> {
    let mut rows = rows.into_iter();
    let first = rows.next().ok_or(AppError::NotFound)?;
    let extra: Vec<Uuid> = rows.map(|r| r.id).collect();
    if !extra.is_empty() {
        tracing::debug!(cart_item_id = %first.id, merged = extra.len(), "merging duplicate cart rows");
        CartItems::delete_many()
            .filter(CartCol::Id.is_in(extra))
            .exec(&state.orm)
            .await?;
    }
    let mut active: CartActive = first.into();
    active.quantity = Set(quantity);
    Ok(active.update(&state.orm).await?)
}

/// Adds to an existing row for the same product instead of duplicating it.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }
    if payload.quantity > MAX_QUANTITY_PER_ADD {
        return Err(AppError::BadRequest(format!(
            "quantity cannot exceed {MAX_QUANTITY_PER_ADD} per add"
        )));
    }

    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("product not found".to_string()))?;

    let existing = find_cart_rows(state, user.user_id, payload.product_id).await?;
    let combined = existing.iter().map(|row| row.quantity).sum::<i32>() + payload.quantity;
    if combined > product.stock_quantity {
        return Err(AppError::BadRequest(format!(
            "Only {} of {} in stock",
            product.stock_quantity, product.name
        )));
    }

    let cart_item = if existing.is_empty() {
        CartActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.user_id),
            product_id: Set(payload.product_id),
            quantity: Set(payload.quantity),
            created_at: Set(Utc::now().into()),
        }
        .insert(&state.orm)
        .await?
    } else {
        store_single_row(state, existing, combined).await?
    };

    audit::record(
        &state.orm,
        user.user_id,
        "cart_update",
        "cart_items",
        serde_json::json!({ "product_id": payload.product_id, "quantity": cart_item.quantity }),
    )
    .await;

    Ok(ApiResponse::success("Added to cart", CartItem::from(cart_item), None))
}

pub async fn update_quantity(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    payload: UpdateCartItemRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let rows = find_cart_rows(state, user.user_id, product_id).await?;
    if rows.is_empty() {
        return Err(AppError::NotFound);
    }

    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest("product not found".to_string()))?;
    if payload.quantity > product.stock_quantity {
        return Err(AppError::BadRequest(format!(
            "Only {} of {} in stock",
            product.stock_quantity, product.name
        )));
    }

    let cart_item = store_single_row(state, rows, payload.quantity).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "cart_update",
        "cart_items",
        serde_json::json!({ "product_id": product_id, "quantity": cart_item.quantity }),
    )
    .await;

    Ok(ApiResponse::success("Updated", CartItem::from(cart_item), None))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<Deleted>> {
    let result = CartItems::delete_many()
        .filter(
            Condition::all()
                .add(CartCol::ProductId.eq(product_id))
                .add(CartCol::UserId.eq(user.user_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        user.user_id,
        "cart_remove",
        "cart_items",
        serde_json::json!({ "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Removed from cart",
        Deleted { id: product_id },
        Some(Meta::empty()),
    ))
}
