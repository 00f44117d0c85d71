//! Boundary Mediator
//!
//! The pipeline every request body passes through: decode inbound
//! identifiers, run the business handler, encode outbound identifiers.
//! Authentication happens *before* dispatch (token middleware resolves
//! the principal); the mediator only threads it along.
//!
//! The request context is an explicit value returned stage to stage, not
//! a shared accumulator mutated by middleware.

use std::future::Future;

use kernel::error::app_error::AppResult;
use kernel::id::AccountId;
use serde_json::Value;

use crate::codec::OpaqueIdCodec;
use crate::payload::PayloadCodec;

/// Request-scoped context threaded through the pipeline
///
/// Immutable until finalized: every stage consumes a context and returns
/// an updated one.
#[derive(Debug, Clone)]
pub struct RequestContext {
    body: Value,
    principal: Option<AccountId>,
}

impl RequestContext {
    /// Context for an unguarded request
    pub fn new(body: Value) -> Self {
        Self {
            body,
            principal: None,
        }
    }

    /// Attach the authenticated principal (resolved by token middleware)
    pub fn with_principal(self, principal: AccountId) -> Self {
        Self {
            principal: Some(principal),
            ..self
        }
    }

    /// The request body at the current stage
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Consume the context, yielding the body
    pub fn into_body(self) -> Value {
        self.body
    }

    /// The authenticated account, if the route was guarded
    pub fn principal(&self) -> Option<AccountId> {
        self.principal
    }

    fn map_body(self, f: impl FnOnce(Value) -> Value) -> Self {
        Self {
            body: f(self.body),
            ..self
        }
    }
}

/// Orchestrates identifier transforms around business handlers
#[derive(Clone)]
pub struct BoundaryMediator {
    payload: PayloadCodec,
}

impl BoundaryMediator {
    pub fn new(codec: OpaqueIdCodec) -> Self {
        Self {
            payload: PayloadCodec::new(codec),
        }
    }

    /// Access the payload codec (for handlers encoding ad hoc values)
    pub fn payload(&self) -> &PayloadCodec {
        &self.payload
    }

    /// Run a handler inside the decode -> handle -> encode pipeline
    ///
    /// The handler sees a context whose body holds internal identifiers;
    /// whatever tree it returns is re-encoded before leaving the process.
    /// Works the same for guarded and unguarded routes - for the latter
    /// the context simply carries no principal.
    pub async fn dispatch<F, Fut>(&self, ctx: RequestContext, handler: F) -> AppResult<Value>
    where
        F: FnOnce(RequestContext) -> Fut,
        Fut: Future<Output = AppResult<Value>>,
    {
        let ctx = ctx.map_body(|body| self.payload.decode(body));
        let response = handler(ctx).await?;
        Ok(self.payload.encode(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::error::app_error::AppError;
    use kernel::id::Id;
    use serde_json::json;

    fn mediator() -> BoundaryMediator {
        BoundaryMediator::new(OpaqueIdCodec::new([9u8; 32]))
    }

    #[tokio::test]
    async fn test_dispatch_decodes_then_encodes() {
        let mediator = mediator();
        let opaque = mediator.payload().id_codec().encode_id(42);

        let ctx = RequestContext::new(json!({"identifier": opaque, "title": "updated"}));

        let out = mediator
            .dispatch(ctx, |ctx| async move {
                // Handler sees the internal key, not the opaque string
                assert_eq!(ctx.body()["identifier"], json!(42));
                assert_eq!(ctx.body()["title"], "updated");
                Ok(json!({"identifier": 42, "owner": {"identifier": 7}}))
            })
            .await
            .unwrap();

        // Response identifiers left the pipeline encoded
        assert!(out["identifier"].is_string());
        assert!(out["owner"]["identifier"].is_string());
        assert_eq!(
            mediator.payload().id_codec().decode_id(out["identifier"].as_str().unwrap()),
            Ok(42)
        );
    }

    #[tokio::test]
    async fn test_dispatch_threads_principal() {
        let mediator = mediator();
        let ctx = RequestContext::new(Value::Null).with_principal(Id::from_raw(5));

        mediator
            .dispatch(ctx, |ctx| async move {
                assert_eq!(ctx.principal().map(|p| p.as_i64()), Some(5));
                Ok(Value::Null)
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dispatch_propagates_handler_error() {
        let mediator = mediator();
        let ctx = RequestContext::new(Value::Null);

        let result = mediator
            .dispatch(ctx, |_| async { Err(AppError::not_found("Item not found")) })
            .await;

        assert_eq!(result.unwrap_err().status_code(), 404);
    }

    #[tokio::test]
    async fn test_unguarded_context_has_no_principal() {
        let mediator = mediator();
        let ctx = RequestContext::new(json!({"email": "a@example.com"}));

        mediator
            .dispatch(ctx, |ctx| async move {
                assert!(ctx.principal().is_none());
                Ok(Value::Null)
            })
            .await
            .unwrap();
    }
}
