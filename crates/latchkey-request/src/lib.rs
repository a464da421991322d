//! Request augmentation for latchkey.
//!
//! Every outgoing request, whoever issues it, passes through a single
//! [`RequestPipeline`] before it reaches the HTTP client:
//!
//! ```text
//! RequestMetadata ──→ default headers ──→ interceptors ──→ transport
//!                     (Authorization)     (X-CSRF-Token, ...)
//! ```
//!
//! - [`RequestPipeline`] holds default headers and the interceptor
//!   registry. Registrations are RAII guards ([`InterceptorRegistration`]).
//! - [`CookieSource`] is where cookie values come from (a reqwest cookie
//!   jar in production, a closure in tests).
//! - [`ForgeryTokenBridge`] copies the `csrf_token` cookie into the
//!   `X-CSRF-Token` header, reading the cookie fresh on every request.

mod cookie;
mod csrf;
mod error;
mod pipeline;

pub use cookie::{CookieSource, JarCookies, parse_cookie};
pub use csrf::ForgeryTokenBridge;
pub use error::RequestError;
pub use pipeline::{
    Interceptor, InterceptorRegistration, RequestMetadata, RequestPipeline,
};
