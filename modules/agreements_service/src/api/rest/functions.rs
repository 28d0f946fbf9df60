//! Privileged user-administration endpoints
//!
//! These keep the flat `{"error": ...}` / `{"success": true}` bodies of the
//! hosted functions they replace. Checks run in a fixed order: method, bearer
//! token, admin role, then request body.

use super::dto::{CreateUserRequest, DeleteUserRequest, ProfileDto};
use crate::contract::ProfileRole;
use crate::domain::{AdminError, NewUser, UserAdministration};
use axum::{
    body::Bytes,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;

type Admin = Extension<Arc<UserAdministration>>;

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdminError::MissingToken | AdminError::InvalidToken => StatusCode::UNAUTHORIZED,
            AdminError::NotAdmin => StatusCode::FORBIDDEN,
            AdminError::BadRequest(_) | AdminError::Provider(_) => StatusCode::BAD_REQUEST,
            AdminError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error_response(status, self.to_string())
    }
}

/// Token from an `Authorization: Bearer <token>` header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then_some(token.trim())
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AdminError> {
    serde_json::from_slice(body)
        .map_err(|e| AdminError::BadRequest(format!("invalid request body: {}", e)))
}

fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

/// `POST /functions/create-user`
pub async fn create_user(
    Extension(admin): Admin,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        return method_not_allowed();
    }
    match create_user_inner(&admin, &headers, &body).await {
        Ok(profile) => (
            StatusCode::OK,
            Json(json!({ "success": true, "user": ProfileDto::from(profile) })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn create_user_inner(
    admin: &UserAdministration,
    headers: &HeaderMap,
    body: &Bytes,
) -> Result<crate::contract::Profile, AdminError> {
    let caller = admin.authorize_admin(bearer_token(headers)).await?;
    let req: CreateUserRequest = parse_body(body)?;

    let role = match req.role.as_deref() {
        None => ProfileRole::User,
        Some(raw) => ProfileRole::parse(raw.trim())
            .ok_or_else(|| AdminError::BadRequest(format!("invalid role: {:?}", raw)))?,
    };
    admin
        .create_user(
            &caller,
            NewUser {
                email: req.email,
                password: req.password,
                full_name: req.full_name,
                role,
                area_id: req.area_id,
            },
        )
        .await
}

/// `POST /functions/delete-user`
pub async fn delete_user(
    Extension(admin): Admin,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        return method_not_allowed();
    }
    let result = async {
        let caller = admin.authorize_admin(bearer_token(&headers)).await?;
        let req: DeleteUserRequest = parse_body(&body)?;
        if req.user_id == caller.id {
            return Err(AdminError::BadRequest(
                "administrators cannot delete their own account".to_string(),
            ));
        }
        admin.delete_user(&caller, req.user_id).await
    }
    .await;

    match result {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true }))).into_response(),
        Err(e) => e.into_response(),
    }
}
