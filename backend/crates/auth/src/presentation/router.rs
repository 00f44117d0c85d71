//! Auth Router

use axum::{
    Router,
    extract::Request,
    middleware::{Next, from_fn},
    routing::{get, post},
};
use std::sync::Arc;

use boundary::{BoundaryMediator, OpaqueIdCodec};

use crate::application::config::AuthConfig;
use crate::application::token::TokenService;
use crate::domain::repository::AccountRepository;
use crate::infra::postgres::PgAccountRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{TokenMiddlewareState, require_access_token};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAccountRepository, config: AuthConfig, codec: OpaqueIdCodec) -> Router {
    auth_router_generic(repo, config, codec)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R>(repo: R, config: AuthConfig, codec: OpaqueIdCodec) -> Router
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let tokens = Arc::new(TokenService::new(&config));

    let state = AuthAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
        tokens: tokens.clone(),
        mediator: BoundaryMediator::new(codec),
    };

    let mw_state = TokenMiddlewareState { tokens };

    let guarded = Router::new()
        .route("/me", get(handlers::me::<R>))
        .route("/password", post(handlers::change_password::<R>))
        .route_layer(from_fn(move |req: Request, next: Next| {
            require_access_token(mw_state.clone(), req, next)
        }));

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::login::<R>))
        .route("/refresh", post(handlers::refresh::<R>))
        .merge(guarded)
        .with_state(state)
}
