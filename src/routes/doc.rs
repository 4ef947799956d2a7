use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        admin::InventoryStats,
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartLine, CartList, CartSummary, UpdateCartItemRequest},
        discounts::{
            ApplyDiscountRequest, CreateDiscountCodeRequest, DiscountCodeList, DiscountQuote,
            UpdateDiscountCodeRequest,
        },
        orders::{CheckoutRequest, OrderList, OrderWithItems, UpdateOrderStatusRequest},
        payouts::{CreatePayoutRequest, PayoutSummary, PayoutWithItems, ProcessPayoutRequest},
        products::{CategoryList, CreateProductRequest, ProductList, UpdateProductRequest},
    },
    models::{
        CartItem, DiscountCode, DiscountType, EarningStatus, Order, OrderItem, OrderStatus,
        PayoutItem, PayoutRequest, PayoutStatus, Product, ProductCondition, Role, SellerEarning,
        User,
    },
    response::{ApiResponse, Deleted, Meta},
    routes::{admin, auth, cart, discounts, health, orders, params, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        auth::me,
        products::list_products,
        products::list_categories,
        products::get_product,
        cart::cart_list,
        cart::cart_summary,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        discounts::apply_discount,
        orders::list_orders,
        orders::checkout,
        orders::get_order,
        admin::list_my_products,
        admin::create_product,
        admin::update_product,
        admin::delete_product,
        admin::inventory_stats,
        admin::list_discount_codes,
        admin::create_discount_code,
        admin::update_discount_code,
        admin::delete_discount_code,
        admin::list_all_orders,
        admin::get_order_admin,
        admin::update_order_status,
        admin::payout_summary,
        admin::request_payout,
        admin::process_payout
    ),
    components(
        schemas(
            User,
            Role,
            Product,
            ProductCondition,
            CartItem,
            Order,
            OrderItem,
            OrderStatus,
            DiscountCode,
            DiscountType,
            SellerEarning,
            EarningStatus,
            PayoutRequest,
            PayoutItem,
            PayoutStatus,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartLine,
            CartList,
            CartSummary,
            ApplyDiscountRequest,
            DiscountQuote,
            CreateDiscountCodeRequest,
            UpdateDiscountCodeRequest,
            DiscountCodeList,
            CheckoutRequest,
            UpdateOrderStatusRequest,
            OrderList,
            OrderWithItems,
            CreateProductRequest,
            UpdateProductRequest,
            ProductList,
            CategoryList,
            InventoryStats,
            CreatePayoutRequest,
            ProcessPayoutRequest,
            PayoutSummary,
            PayoutWithItems,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Deleted,
            Meta,
            health::HealthData,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartList>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<PayoutSummary>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Catalog browsing and search"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Discounts", description = "Discount code redemption"),
        (name = "Orders", description = "Checkout and order history"),
        (name = "Admin", description = "Seller dashboard: products, inventory, discount codes, orders"),
        (name = "Payouts", description = "Seller earnings and payout requests"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
