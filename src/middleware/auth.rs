use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::header,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

use crate::{dto::auth::Claims, error::AppError};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Privileged operations, each gated by [`authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ManageCatalog,
    ManageOrders,
    ManageUsers,
    RetrievePaymentToken,
}

/// The single place that decides whether an actor may perform a privileged
/// action. Superusers can do everything; staff cover day-to-day dashboard
/// work; promoting users is reserved for superusers.
pub fn authorize(user: &AuthUser, action: Action) -> Result<(), AppError> {
    let allowed = match action {
        Action::ManageCatalog | Action::ManageOrders | Action::RetrievePaymentToken => {
            user.is_staff || user.is_superuser
        }
        Action::ManageUsers => user.is_superuser,
    };
    if allowed { Ok(()) } else { Err(AppError::Forbidden) }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or_else(|| AppError::BadRequest("Missing Authorization header".into()))?;

        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::BadRequest("Invalid Authorization header".into()))?;

        if !auth_str.starts_with("Bearer ") {
            return Err(AppError::BadRequest("Invalid Authorization scheme".into()));
        }
        let token = auth_str.trim_start_matches("Bearer ").trim();

        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| AppError::Internal(anyhow::anyhow!("JWT_SECRET is not set")))?;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::BadRequest("Invalid or expired token".into()))?;

        let user_id = Uuid::parse_str(&decoded.claims.sub)
            .map_err(|_| AppError::BadRequest("Invalid user id in token".into()))?;

        Ok(AuthUser {
            user_id,
            is_staff: decoded.claims.staff,
            is_superuser: decoded.claims.superuser,
        })
    }
}

/// Without an Authorization header the extractor yields `None`; a header that
/// is present but invalid is still rejected.
impl<S> OptionalFromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;
    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        if parts.headers.get(header::AUTHORIZATION).is_none() {
            return Ok(None);
        }
        <Self as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .map(Some)
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{Action, AuthUser, authorize};

    fn user(is_staff: bool, is_superuser: bool) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            is_staff,
            is_superuser,
        }
    }

    #[test]
    fn plain_users_are_denied_everywhere() {
        let customer = user(false, false);
        for action in [
            Action::ManageCatalog,
            Action::ManageOrders,
            Action::ManageUsers,
            Action::RetrievePaymentToken,
        ] {
            assert!(authorize(&customer, action).is_err());
        }
    }

    #[test]
    fn staff_cover_dashboard_work_but_not_user_management() {
        let staff = user(true, false);
        assert!(authorize(&staff, Action::ManageCatalog).is_ok());
        assert!(authorize(&staff, Action::ManageOrders).is_ok());
        assert!(authorize(&staff, Action::RetrievePaymentToken).is_ok());
        assert!(authorize(&staff, Action::ManageUsers).is_err());
    }

    #[test]
    fn superusers_are_allowed_everything() {
        let root = user(false, true);
        for action in [
            Action::ManageCatalog,
            Action::ManageOrders,
            Action::ManageUsers,
            Action::RetrievePaymentToken,
        ] {
            assert!(authorize(&root, action).is_ok());
        }
    }
}
