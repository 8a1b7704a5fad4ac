//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span and returned to the client)
//! 4. CORS
//! 5. Rate limiting (public menu routes only)

pub mod rate_limit;
pub mod request_id;

pub use rate_limit::{checkout_rate_limiter, menu_rate_limiter};
pub use request_id::request_id_middleware;
