//! HTTP Handlers

use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Value, json};
use std::sync::Arc;

use boundary::{BoundaryMediator, RequestContext};
use kernel::error::app_error::{AppError, AppResult};

use crate::application::config::AuthConfig;
use crate::application::{
    ChangePasswordInput, ChangePasswordUseCase, RefreshInput, RefreshUseCase, RegisterInput,
    RegisterUseCase, SignInInput, SignInUseCase, TokenService,
};
use crate::domain::repository::AccountRepository;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ChangePasswordRequest, LoginRequest, RefreshRequest, RegisterRequest, RegisterResponse,
    TokenPairResponse,
};
use crate::presentation::middleware::Principal;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub tokens: Arc<TokenService>,
    pub mediator: BoundaryMediator,
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<Json<RegisterResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());

    let input = RegisterInput {
        email: req.email,
        display_name: req.display_name,
        password: req.password,
    };

    let output = use_case.execute(input).await?;

    Ok(Json(RegisterResponse {
        identifier: state.mediator.payload().id_codec().encode(output.account_id),
    }))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<TokenPairResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );

    let input = SignInInput {
        email: req.email,
        password: req.password,
    };

    let output = use_case.execute(input).await?;

    Ok(Json(TokenPairResponse {
        identifier: state.mediator.payload().id_codec().encode(output.account_id),
        access_token: output.tokens.access_token,
        refresh_token: output.tokens.refresh_token,
    }))
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /api/auth/refresh
pub async fn refresh<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RefreshRequest>,
) -> AuthResult<Json<TokenPairResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let use_case = RefreshUseCase::new(state.repo.clone(), state.tokens.clone());

    let output = use_case
        .execute(RefreshInput {
            refresh_token: req.refresh_token,
        })
        .await?;

    Ok(Json(TokenPairResponse {
        identifier: state.mediator.payload().id_codec().encode(output.account_id),
        access_token: output.tokens.access_token,
        refresh_token: output.tokens.refresh_token,
    }))
}

// ============================================================================
// Change Password (requires authentication)
// ============================================================================

/// POST /api/auth/password
pub async fn change_password<R>(
    State(state): State<AuthAppState<R>>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<ChangePasswordRequest>,
) -> AuthResult<StatusCode>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let use_case = ChangePasswordUseCase::new(state.repo.clone(), state.config.clone());

    use_case
        .execute(ChangePasswordInput {
            account_id: principal.0,
            current_password: req.current_password,
            new_password: req.new_password,
        })
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Current Account (requires authentication)
// ============================================================================

/// GET /api/auth/me
///
/// Runs through the full mediator pipeline: the handler assembles a tree
/// with internal identifiers and the encode stage rewrites them before
/// the response leaves the process.
pub async fn me<R>(
    State(state): State<AuthAppState<R>>,
    Extension(principal): Extension<Principal>,
) -> AppResult<impl IntoResponse>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let ctx = RequestContext::new(Value::Null).with_principal(principal.0);
    let repo = state.repo.clone();

    let body = state
        .mediator
        .dispatch(ctx, |ctx| async move {
            let account_id = ctx
                .principal()
                .ok_or_else(|| AppError::unauthorized("Missing principal"))?;

            let account = repo
                .find_by_id(account_id)
                .await
                .map_err(|e: AuthError| e.to_app_error())?
                .ok_or_else(|| AppError::not_found("Account not found"))?;

            Ok(json!({
                "identifier": account.account_id.as_i64(),
                "displayName": account.display_name.as_str(),
                "email": account.email.as_str(),
                "createdAt": account.created_at.timestamp_millis(),
            }))
        })
        .await?;

    Ok(Json(body))
}
