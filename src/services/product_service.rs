use chrono::Utc;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{CategoryList, CreateProductRequest, ProductList, UpdateProductRequest},
    entity::products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Product, ProductCondition},
    response::{ApiResponse, Deleted, Meta},
    routes::params::{PRODUCT_PAGE_LIMIT, Pagination, ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
};

/// Escapes `LIKE` wildcards so user text matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Free text is matched case-insensitively and ORed across the descriptive
/// columns; every other active filter is ANDed on top.
pub fn listing_condition(query: &ProductQuery) -> Condition {
    let mut condition = Condition::all();

    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(&search.to_lowercase()));
        let like_search = |column: Column| {
            Expr::expr(Func::lower(Expr::col(column)))
                .like(LikeExpr::new(pattern.clone()).escape('\\'))
        };
        condition = condition.add(
            Condition::any()
                .add(like_search(Column::Name))
                .add(like_search(Column::Brand))
                .add(like_search(Column::Description))
                .add(like_search(Column::Category)),
        );
    }

    if let Some(category) = query.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        condition = condition.add(Column::Category.eq(category));
    }

    if let Some(product_condition) = query.condition {
        condition = condition.add(Column::Condition.eq(product_condition.as_str()));
    }

    condition
}

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query
        .pagination()
        .normalize_with(PRODUCT_PAGE_LIMIT, PRODUCT_PAGE_LIMIT);
    let condition = listing_condition(&query);
    tracing::debug!(?condition, "product listing filter");

    let sort_col = match query.sort_by.unwrap_or(ProductSortBy::CreatedAt) {
        ProductSortBy::CreatedAt => Column::CreatedAt,
        ProductSortBy::Price => Column::Price,
        ProductSortBy::Name => Column::Name,
    };

    let mut finder = Products::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::success("Product", Product::from(product), None))
}

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let categories: Vec<Option<String>> = Products::find()
        .select_only()
        .column(Column::Category)
        .distinct()
        .order_by_asc(Column::Category)
        .into_tuple()
        .all(&state.orm)
        .await?;

    let items = categories
        .into_iter()
        .flatten()
        .filter(|c| !c.trim().is_empty())
        .collect();
    Ok(ApiResponse::success("Categories", CategoryList { items }, None))
}

/// Products owned by the calling seller.
pub async fn list_my_products(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();
    let finder = Products::find()
        .filter(Column::OwnerUserId.eq(user.user_id))
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub(crate) async fn find_owned(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ProductModel> {
    Products::find()
        .filter(
            Condition::all()
                .add(Column::Id.eq(id))
                .add(Column::OwnerUserId.eq(user.user_id)),
        )
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

fn validate_fields(name: &str, price: i64, stock_quantity: i32) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".into()));
    }
    if price <= 0 {
        return Err(AppError::BadRequest("price must be greater than 0".into()));
    }
    if stock_quantity < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".into()));
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    validate_fields(&payload.name, payload.price, payload.stock_quantity)?;

    let now = Utc::now();
    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        brand: Set(non_empty(payload.brand)),
        description: Set(non_empty(payload.description)),
        price: Set(payload.price),
        stock_quantity: Set(payload.stock_quantity),
        category: Set(non_empty(payload.category)),
        image_url: Set(non_empty(payload.image_url)),
        sku: Set(non_empty(payload.sku)),
        condition: Set(payload
            .condition
            .unwrap_or(ProductCondition::New)
            .as_str()
            .to_string()),
        weight: Set(payload.weight),
        dimensions: Set(non_empty(payload.dimensions)),
        owner_user_id: Set(user.user_id),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let existing = find_owned(state, user, id).await?;

    validate_fields(
        payload.name.as_deref().unwrap_or(&existing.name),
        payload.price.unwrap_or(existing.price),
        payload.stock_quantity.unwrap_or(existing.stock_quantity),
    )?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if payload.brand.is_some() {
        active.brand = Set(non_empty(payload.brand));
    }
    if payload.description.is_some() {
        active.description = Set(non_empty(payload.description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(stock) = payload.stock_quantity {
        active.stock_quantity = Set(stock);
    }
    if payload.category.is_some() {
        active.category = Set(non_empty(payload.category));
    }
    if payload.image_url.is_some() {
        active.image_url = Set(non_empty(payload.image_url));
    }
    if payload.sku.is_some() {
        active.sku = Set(non_empty(payload.sku));
    }
    if let Some(condition) = payload.condition {
        active.condition = Set(condition.as_str().to_string());
    }
    if let Some(weight) = payload.weight {
        active.weight = Set(Some(weight));
    }
    if payload.dimensions.is_some() {
        active.dimensions = Set(non_empty(payload.dimensions));
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        Product::from(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Deleted>> {
    ensure_admin(user)?;
    let result = Products::delete_many()
        .filter(
            Condition::all()
                .add(Column::Id.eq(id))
                .add(Column::OwnerUserId.eq(user.user_id)),
        )
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success("Deleted", Deleted { id }, Some(Meta::empty())))
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }
}
