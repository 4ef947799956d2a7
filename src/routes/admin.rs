use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        admin::InventoryStats,
        discounts::{CreateDiscountCodeRequest, DiscountCodeList, UpdateDiscountCodeRequest},
        orders::{OrderList, OrderWithItems, UpdateOrderStatusRequest},
        payouts::{CreatePayoutRequest, PayoutSummary, PayoutWithItems, ProcessPayoutRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{DiscountCode, Order, Product},
    response::{ApiResponse, Deleted},
    routes::params::{OrderListQuery, Pagination},
    services::{admin_service, discount_service, payout_service, product_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_my_products).post(create_product))
        .route("/products/{id}", put(update_product).delete(delete_product))
        .route("/inventory/stats", get(inventory_stats))
        .route(
            "/discount-codes",
            get(list_discount_codes).post(create_discount_code),
        )
        .route(
            "/discount-codes/{id}",
            put(update_discount_code).delete(delete_discount_code),
        )
        .route("/orders", get(list_all_orders))
        .route("/orders/{id}", get(get_order_admin))
        .route("/orders/{id}/status", patch(update_order_status))
        .route("/payouts", get(payout_summary).post(request_payout))
        .route("/payouts/{id}", patch(process_payout))
}

#[utoipa::path(
    get,
    path = "/api/admin/products",
    params(Pagination),
    responses(
        (status = 200, description = "Products owned by the current seller", body = ApiResponse<ProductList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_my_products(
    State(state): State<AppState>,
    user: AuthUser,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_my_products(&state, &user, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/products",
    request_body = CreateProductRequest,
    responses(
        (status = 200, description = "Product created", body = ApiResponse<Product>),
        (status = 400, description = "Invalid product"),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::create_product(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ApiResponse<Product>),
        (status = 404, description = "Not one of the seller's products"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let resp = product_service::update_product(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted", body = ApiResponse<Deleted>),
        (status = 404, description = "Not one of the seller's products"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let resp = product_service::delete_product(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/inventory/stats",
    responses(
        (status = 200, description = "Inventory statistics for the seller", body = ApiResponse<InventoryStats>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn inventory_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<InventoryStats>>> {
    let resp = admin_service::seller_inventory_stats(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/discount-codes",
    responses(
        (status = 200, description = "All discount codes", body = ApiResponse<DiscountCodeList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_discount_codes(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<DiscountCodeList>>> {
    let resp = discount_service::list_discount_codes(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/discount-codes",
    request_body = CreateDiscountCodeRequest,
    responses(
        (status = 200, description = "Discount code created", body = ApiResponse<DiscountCode>),
        (status = 400, description = "Invalid or duplicate code"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_discount_code(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateDiscountCodeRequest>,
) -> AppResult<Json<ApiResponse<DiscountCode>>> {
    let resp = discount_service::create_discount_code(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/discount-codes/{id}",
    params(
        ("id" = Uuid, Path, description = "Discount code ID")
    ),
    request_body = UpdateDiscountCodeRequest,
    responses(
        (status = 200, description = "Discount code updated", body = ApiResponse<DiscountCode>),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_discount_code(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDiscountCodeRequest>,
) -> AppResult<Json<ApiResponse<DiscountCode>>> {
    let resp = discount_service::update_discount_code(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/discount-codes/{id}",
    params(
        ("id" = Uuid, Path, description = "Discount code ID")
    ),
    responses(
        (status = 200, description = "Discount code deleted", body = ApiResponse<Deleted>),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_discount_code(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let resp = discount_service::delete_discount_code(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(OrderListQuery),
    responses(
        (status = 200, description = "Get all orders (admin only)", body = ApiResponse<OrderList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = admin_service::list_all_orders(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with items", body = ApiResponse<OrderWithItems>),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_order_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderWithItems>>> {
    let resp = admin_service::get_order_admin(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/orders/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Order status updated", body = ApiResponse<Order>),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let resp = admin_service::update_order_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/payouts",
    responses(
        (status = 200, description = "Seller earnings, balances and payout requests", body = ApiResponse<PayoutSummary>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payouts"
)]
pub async fn payout_summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PayoutSummary>>> {
    let resp = payout_service::payout_summary(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/payouts",
    request_body = CreatePayoutRequest,
    responses(
        (status = 200, description = "Payout requested", body = ApiResponse<PayoutWithItems>),
        (status = 400, description = "Amount exceeds available balance"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payouts"
)]
pub async fn request_payout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePayoutRequest>,
) -> AppResult<Json<ApiResponse<PayoutWithItems>>> {
    let resp = payout_service::request_payout(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/payouts/{id}",
    params(
        ("id" = Uuid, Path, description = "Payout request ID")
    ),
    request_body = ProcessPayoutRequest,
    responses(
        (status = 200, description = "Payout completed or rejected", body = ApiResponse<PayoutWithItems>),
        (status = 400, description = "Already processed"),
        (status = 404, description = "Not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payouts"
)]
pub async fn process_payout(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProcessPayoutRequest>,
) -> AppResult<Json<ApiResponse<PayoutWithItems>>> {
    let resp = payout_service::process_payout(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
