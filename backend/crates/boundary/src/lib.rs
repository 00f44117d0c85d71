//! Boundary Crate - Identifier Obfuscation and Request Mediation
//!
//! Everything that crosses the HTTP boundary passes through this crate:
//! - `codec` - keyed, invertible cipher turning internal `BIGSERIAL` keys
//!   into fixed-width opaque strings (and back)
//! - `payload` - schema-free recursive walk over JSON request/response
//!   bodies, transforming every identifier it recognizes
//! - `mediator` - the decode -> handle -> encode pipeline handlers run in
//!
//! ## Security Model
//! - Internal identifiers never leave the process in clear form
//! - Decoded identifiers are untrusted until a repository lookup confirms
//!   they exist; a forged opaque string decodes to a miss, not a crash
//! - Codec secrets are constructor parameters, never process-wide state

pub mod codec;
pub mod mediator;
pub mod payload;

// Re-exports for convenience
pub use codec::{CodecError, OpaqueIdCodec};
pub use mediator::{BoundaryMediator, RequestContext};
pub use payload::PayloadCodec;
