use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::discounts::{
        ApplyDiscountRequest, CreateDiscountCodeRequest, DiscountCodeList, DiscountQuote,
        UpdateDiscountCodeRequest,
    },
    entity::{
        discount_code_usages::{Column as UsageCol, Entity as DiscountCodeUsages},
        discount_codes::{
            ActiveModel as CodeActive, Column as CodeCol, Entity as DiscountCodes,
            Model as CodeModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{DiscountCode, DiscountType},
    response::{ApiResponse, Deleted, Meta},
    rules::discount::{self, normalize_code},
    services::cart_service,
    state::AppState,
};

pub async fn find_active_code<C: ConnectionTrait>(
    conn: &C,
    code: &str,
) -> AppResult<Option<CodeModel>> {
    let found = DiscountCodes::find()
        .filter(
            Condition::all()
                .add(CodeCol::Code.eq(normalize_code(code)))
                .add(CodeCol::IsActive.eq(true)),
        )
        .one(conn)
        .await?;
    Ok(found)
}

pub async fn has_used_code<C: ConnectionTrait>(
    conn: &C,
    code_id: Uuid,
    user_id: Uuid,
) -> AppResult<bool> {
    let uses = DiscountCodeUsages::find()
        .filter(
            Condition::all()
                .add(UsageCol::DiscountCodeId.eq(code_id))
                .add(UsageCol::UserId.eq(user_id)),
        )
        .count(conn)
        .await?;
    Ok(uses > 0)
}

/// Looks the code up and checks every eligibility rule for this user and
/// subtotal. Returns the code with the amount it takes off.
pub async fn redeemable_discount<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    code: &str,
    subtotal: i64,
) -> AppResult<(CodeModel, i64)> {
    let found = find_active_code(conn, code)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid discount code".into()))?;
    let already_used = has_used_code(conn, found.id, user_id).await?;

    match discount::evaluate(&found, subtotal, Utc::now(), already_used) {
        Ok(amount) => Ok((found, amount)),
        Err(rejection) => {
            tracing::warn!(code = %found.code, %user_id, reason = %rejection, "discount code rejected");
            Err(rejection.into())
        }
    }
}

pub async fn apply_discount(
    state: &AppState,
    user: &AuthUser,
    payload: ApplyDiscountRequest,
) -> AppResult<ApiResponse<DiscountQuote>> {
    if payload.code.trim().is_empty() {
        return Err(AppError::BadRequest("Please enter a discount code".into()));
    }
    let lines = cart_service::load_cart_lines(&state.orm, user.user_id).await?;
    let subtotal = cart_service::subtotal(&lines);

    let (code, discount_amount) =
        redeemable_discount(&state.orm, user.user_id, &payload.code, subtotal).await?;

    Ok(ApiResponse::success(
        "Discount applied",
        DiscountQuote {
            code: code.code,
            description: code.description,
            subtotal,
            discount_amount,
            total: subtotal - discount_amount,
        },
        None,
    ))
}

fn validate_terms(
    discount_type: DiscountType,
    value: i64,
    minimum_order_amount: i64,
    max_uses: Option<i32>,
) -> AppResult<()> {
    match discount_type {
        DiscountType::Percentage if !(1..=100).contains(&value) => {
            return Err(AppError::BadRequest(
                "percentage must be between 1 and 100".into(),
            ));
        }
        DiscountType::Fixed if value <= 0 => {
            return Err(AppError::BadRequest(
                "fixed discount must be greater than 0".into(),
            ));
        }
        _ => {}
    }
    if minimum_order_amount < 0 {
        return Err(AppError::BadRequest(
            "minimum order amount cannot be negative".into(),
        ));
    }
    if matches!(max_uses, Some(max) if max <= 0) {
        return Err(AppError::BadRequest("max uses must be greater than 0".into()));
    }
    Ok(())
}

pub async fn list_discount_codes(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<DiscountCodeList>> {
    ensure_admin(user)?;
    let items: Vec<DiscountCode> = DiscountCodes::find()
        .order_by_desc(CodeCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(DiscountCode::from)
        .collect();
    let total = items.len() as i64;
    Ok(ApiResponse::success(
        "Discount codes",
        DiscountCodeList { items },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn create_discount_code(
    state: &AppState,
    user: &AuthUser,
    payload: CreateDiscountCodeRequest,
) -> AppResult<ApiResponse<DiscountCode>> {
    ensure_admin(user)?;
    let code = normalize_code(&payload.code);
    if code.is_empty() {
        return Err(AppError::BadRequest("code is required".into()));
    }
    validate_terms(
        payload.discount_type,
        payload.discount_value,
        payload.minimum_order_amount,
        payload.max_uses,
    )?;

    let taken = DiscountCodes::find()
        .filter(CodeCol::Code.eq(code.as_str()))
        .count(&state.orm)
        .await?;
    if taken > 0 {
        return Err(AppError::BadRequest("Discount code already exists".into()));
    }

    let created = CodeActive {
        id: Set(Uuid::new_v4()),
        code: Set(code),
        description: Set(payload.description),
        discount_type: Set(payload.discount_type.as_str().to_string()),
        discount_value: Set(payload.discount_value),
        minimum_order_amount: Set(payload.minimum_order_amount),
        max_uses: Set(payload.max_uses),
        current_uses: Set(0),
        expires_at: Set(payload.expires_at.map(Into::into)),
        is_active: Set(payload.is_active),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        user.user_id,
        "discount_code_create",
        "discount_codes",
        serde_json::json!({ "discount_code_id": created.id, "code": created.code }),
    )
    .await;

    Ok(ApiResponse::success(
        "Discount code created",
        DiscountCode::from(created),
        Some(Meta::empty()),
    ))
}

pub async fn update_discount_code(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateDiscountCodeRequest,
) -> AppResult<ApiResponse<DiscountCode>> {
    ensure_admin(user)?;
    let existing = DiscountCodes::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let current_type = DiscountType::parse(&existing.discount_type)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown discount type stored")))?;
    validate_terms(
        payload.discount_type.unwrap_or(current_type),
        payload.discount_value.unwrap_or(existing.discount_value),
        payload
            .minimum_order_amount
            .unwrap_or(existing.minimum_order_amount),
        payload.max_uses.or(existing.max_uses),
    )?;

    let mut active: CodeActive = existing.into();
    if payload.description.is_some() {
        active.description = Set(payload.description);
    }
    if let Some(discount_type) = payload.discount_type {
        active.discount_type = Set(discount_type.as_str().to_string());
    }
    if let Some(value) = payload.discount_value {
        active.discount_value = Set(value);
    }
    if let Some(minimum) = payload.minimum_order_amount {
        active.minimum_order_amount = Set(minimum);
    }
    if let Some(max_uses) = payload.max_uses {
        active.max_uses = Set(Some(max_uses));
    }
    if let Some(expires_at) = payload.expires_at {
        active.expires_at = Set(Some(expires_at.into()));
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "discount_code_update",
        "discount_codes",
        serde_json::json!({ "discount_code_id": updated.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        DiscountCode::from(updated),
        Some(Meta::empty()),
    ))
}

pub async fn delete_discount_code(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Deleted>> {
    ensure_admin(user)?;
    // Redemption history keeps a re-created code from being used twice.
    let redeemed = DiscountCodeUsages::find()
        .filter(UsageCol::DiscountCodeId.eq(id))
        .count(&state.orm)
        .await?;
    if redeemed > 0 {
        return Err(AppError::BadRequest(
            "Discount code has been redeemed, deactivate it instead".into(),
        ));
    }

    let result = DiscountCodes::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        user.user_id,
        "discount_code_delete",
        "discount_codes",
        serde_json::json!({ "discount_code_id": id }),
    )
    .await;

    Ok(ApiResponse::success("Deleted", Deleted { id }, Some(Meta::empty())))
}
