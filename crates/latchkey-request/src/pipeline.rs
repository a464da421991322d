//! The outgoing request pipeline: default headers plus interceptors.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use latchkey_protocol::{AccessToken, BEARER_SCHEME};
use parking_lot::RwLock;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};

use crate::RequestError;

// ---------------------------------------------------------------------------
// RequestMetadata
// ---------------------------------------------------------------------------

/// Everything about an outgoing request except its body.
///
/// Interceptors receive one of these by value and hand back the (possibly
/// modified) metadata. They never see the body.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl RequestMetadata {
    /// Metadata with no headers.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
        }
    }

    /// Returns a header as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// `true` for methods that change server state.
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self.method,
            Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
        )
    }
}

// ---------------------------------------------------------------------------
// Interceptor
// ---------------------------------------------------------------------------

/// A request-level hook that may rewrite outgoing metadata.
///
/// Interceptors run synchronously on every request, in registration order,
/// after default headers have been applied.
pub trait Interceptor: Send + Sync + 'static {
    /// Returns the metadata to send.
    fn intercept(&self, request: RequestMetadata) -> RequestMetadata;
}

// ---------------------------------------------------------------------------
// RequestPipeline
// ---------------------------------------------------------------------------

/// Shared pipeline every outgoing request passes through.
///
/// One pipeline is created per HTTP client and shared (`Arc`) between the
/// client, which calls [`prepare`](Self::prepare) on each request, and the
/// components that shape requests (the session controller sets the bearer
/// header and registers the CSRF bridge).
#[derive(Default)]
pub struct RequestPipeline {
    defaults: RwLock<HeaderMap>,
    interceptors: RwLock<Vec<(u64, Arc<dyn Interceptor>)>>,
    next_id: AtomicU64,
}

impl RequestPipeline {
    /// Creates an empty pipeline.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sets a header sent on every request unless the request sets it.
    pub fn set_default_header(&self, name: HeaderName, value: HeaderValue) {
        self.defaults.write().insert(name, value);
    }

    /// Removes a default header entirely.
    pub fn remove_default_header(&self, name: &HeaderName) {
        self.defaults.write().remove(name);
    }

    /// Returns a copy of the current default headers.
    pub fn default_headers(&self) -> HeaderMap {
        self.defaults.read().clone()
    }

    /// Installs `Authorization: Bearer <token>` as a default header.
    ///
    /// The header value is flagged sensitive so `Debug` output of the
    /// header map doesn't show it.
    ///
    /// # Errors
    /// [`RequestError::InvalidHeaderValue`] if the token contains bytes
    /// that can't appear in a header. The previous header is removed in
    /// that case so a stale credential is never sent.
    pub fn set_bearer(&self, token: &AccessToken) -> Result<(), RequestError> {
        let value = HeaderValue::from_str(&format!("{BEARER_SCHEME} {}", token.expose()));
        match value {
            Ok(mut value) => {
                value.set_sensitive(true);
                self.set_default_header(AUTHORIZATION, value);
                Ok(())
            }
            Err(_) => {
                self.clear_bearer();
                Err(RequestError::InvalidHeaderValue(AUTHORIZATION.to_string()))
            }
        }
    }

    /// Removes the `Authorization` default header.
    pub fn clear_bearer(&self) {
        self.remove_default_header(&AUTHORIZATION);
    }

    /// `true` if a bearer header is currently installed.
    pub fn has_bearer(&self) -> bool {
        self.defaults.read().contains_key(AUTHORIZATION)
    }

    /// Registers an interceptor for every subsequent request.
    ///
    /// The returned guard removes the interceptor when dropped, so an
    /// owner that is torn down and recreated never leaves a duplicate
    /// behind.
    #[must_use = "dropping the registration unregisters the interceptor"]
    pub fn register(self: &Arc<Self>, interceptor: Arc<dyn Interceptor>) -> InterceptorRegistration {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.interceptors.write().push((id, interceptor));
        tracing::debug!(id, "request interceptor registered");
        InterceptorRegistration {
            id,
            pipeline: Arc::downgrade(self),
        }
    }

    /// Number of registered interceptors.
    pub fn interceptor_count(&self) -> usize {
        self.interceptors.read().len()
    }

    /// Applies default headers, then every interceptor, to `request`.
    pub fn prepare(&self, mut request: RequestMetadata) -> RequestMetadata {
        for (name, value) in self.defaults.read().iter() {
            if !request.headers.contains_key(name) {
                request.headers.insert(name.clone(), value.clone());
            }
        }

        // Snapshot so interceptors run without holding the lock; an
        // interceptor may itself register or unregister.
        let interceptors: Vec<Arc<dyn Interceptor>> = self
            .interceptors
            .read()
            .iter()
            .map(|(_, i)| Arc::clone(i))
            .collect();

        interceptors
            .iter()
            .fold(request, |req, interceptor| interceptor.intercept(req))
    }

    fn unregister(&self, id: u64) {
        let mut interceptors = self.interceptors.write();
        let before = interceptors.len();
        interceptors.retain(|(existing, _)| *existing != id);
        if interceptors.len() != before {
            tracing::debug!(id, "request interceptor unregistered");
        }
    }
}

impl fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("defaults", &*self.defaults.read())
            .field("interceptors", &self.interceptor_count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// InterceptorRegistration
// ---------------------------------------------------------------------------

/// RAII handle for a registered interceptor.
///
/// Holds only a weak reference to the pipeline: if the pipeline is gone
/// first, dropping the registration is a no-op.
#[derive(Debug)]
pub struct InterceptorRegistration {
    id: u64,
    pipeline: Weak<RequestPipeline>,
}

impl InterceptorRegistration {
    /// Unregisters now. Equivalent to dropping the guard.
    pub fn unregister(self) {
        drop(self);
    }
}

impl Drop for InterceptorRegistration {
    fn drop(&mut self) {
        if let Some(pipeline) = self.pipeline.upgrade() {
            pipeline.unregister(self.id);
        }
    }
}
