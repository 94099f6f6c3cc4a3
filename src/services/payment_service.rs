use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::payments::CreatePaymentRequest,
    entity::{
        orders::{Column as OrderCol, Entity as Orders},
        payments::{ActiveModel as PaymentActive, Model as PaymentModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Payment,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Record a payment attempt against one of the caller's orders. The amount is
/// the order total; several attempts per order are fine. No provider
/// round-trip happens here.
pub async fn create_payment(
    state: &AppState,
    user: &AuthUser,
    order_id: Uuid,
    payload: CreatePaymentRequest,
) -> AppResult<ApiResponse<Payment>> {
    if payload.method.trim().is_empty() {
        return Err(AppError::BadRequest("method must not be empty".into()));
    }

    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(order_id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let payment = PaymentActive {
        id: Set(Uuid::new_v4()),
        order_id: Set(order.id),
        method: Set(payload.method),
        amount: Set(order.total_price),
        currency: Set("RWF".to_string()),
        status: Set("pending".to_string()),
        provider_payment_id: Set(None),
        provider_raw: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "payment_created",
        Some("payments"),
        Some(serde_json::json!({ "order_id": order.id, "payment_id": payment.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Payment recorded",
        payment_from_entity(payment),
        Some(Meta::empty()),
    ))
}

fn payment_from_entity(model: PaymentModel) -> Payment {
    Payment {
        id: model.id,
        order_id: model.order_id,
        method: model.method,
        amount: model.amount,
        currency: model.currency,
        status: model.status,
        provider_payment_id: model.provider_payment_id,
        provider_raw: model.provider_raw,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
