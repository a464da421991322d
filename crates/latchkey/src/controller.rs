//! The session controller: login, logout, renewal and bootstrap.
//!
//! This is the only writer of session state. It composes the three
//! lower-level pieces:
//!
//! - [`CredentialStore`]: who is signed in, and the current access token.
//! - [`RefreshScheduler`]: renews the token a minute before it expires.
//! - [`RequestPipeline`]: mirrors the token into `Authorization` and holds
//!   the [`ForgeryTokenBridge`] registration.
//!
//! # Concurrency
//!
//! Every public operation may run concurrently with every other one
//! (including a scheduled renewal firing on a runtime worker). Two rules
//! keep state consistent:
//!
//! 1. **One refresh at a time.** Bootstrap, [`refresh_now`] and the
//!    scheduled renewal all go through a single shared in-flight refresh.
//!    A second caller awaits the first caller's network call instead of
//!    issuing its own, and the result is applied exactly once.
//! 2. **Stale results are dropped.** Login, logout and shutdown advance an
//!    epoch. A refresh or profile fetch that completes after the epoch
//!    moved writes nothing; it can't resurrect a session the user just
//!    ended, or clobber one they just started.
//!
//! Results are applied while holding the epoch lock, so "check epoch,
//! then write" is atomic with respect to logout.
//!
//! [`refresh_now`]: SessionController::refresh_now

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared, WeakShared};
use latchkey_gateway::{AuthGateway, GatewayError, HttpAuthGateway};
use latchkey_protocol::{AccessGrant, AccessToken, LoginRequest, User};
use latchkey_request::{
    CookieSource, ForgeryTokenBridge, InterceptorRegistration, RequestError, RequestPipeline,
};
use latchkey_store::{CredentialStore, Session};
use latchkey_timer::{RefreshScheduler, Timer};
use parking_lot::Mutex;
use reqwest::header::HeaderName;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{SessionConfig, SessionError, SessionState};

// ---------------------------------------------------------------------------
// Shared refresh
// ---------------------------------------------------------------------------

/// What a refresh attempt amounted to. Cloned to every awaiting caller.
#[derive(Debug, Clone)]
enum RefreshOutcome {
    Renewed(AccessGrant),
    Failed(Arc<GatewayError>),
    /// Nobody was signed in, so nothing was sent.
    NoSession,
    Superseded,
}

type RefreshFuture = BoxFuture<'static, RefreshOutcome>;
type InflightRefresh = Shared<RefreshFuture>;

/// Guarded by one lock so that a result commit and an epoch bump can't
/// interleave.
#[derive(Debug, Default)]
struct Lifecycle {
    epoch: u64,
    shut_down: bool,
}

struct Inner<G: AuthGateway, T: Timer> {
    gateway: G,
    store: CredentialStore,
    scheduler: RefreshScheduler<T>,
    pipeline: Arc<RequestPipeline>,
    /// `None` after shutdown, or when built without a cookie source.
    csrf: Mutex<Option<InterceptorRegistration>>,
    state: watch::Sender<SessionState>,
    loading: AtomicBool,
    lifecycle: Mutex<Lifecycle>,
    /// The refresh currently in flight, keyed by the epoch it started in.
    /// Held weakly: the callers awaiting it own it, and the future holds a
    /// strong reference back to `Inner` while it runs.
    inflight: Mutex<Option<(u64, WeakShared<RefreshFuture>)>>,
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

/// Orchestrates the session lifecycle.
///
/// A cheap handle: clones share the same session. When the last handle is
/// dropped the renewal timer is cancelled and the anti-forgery interceptor
/// is deregistered, exactly as if [`shutdown`](Self::shutdown) had run.
///
/// ## Lifecycle
///
/// ```text
/// bootstrap() ──→ [Authenticated] ──refresh_now() / timer──→ [Authenticated]
///     │                 ▲    │                                    │
///     │      login() ───┘    └──── logout() ──→ [Unauthenticated] ◄┘ failure
///     └──── failure ──→ [Unauthenticated]
/// ```
pub struct SessionController<G: AuthGateway, T: Timer> {
    inner: Arc<Inner<G, T>>,
}

impl<G: AuthGateway, T: Timer> Clone for SessionController<G, T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: AuthGateway, T: Timer> SessionController<G, T> {
    /// Starts building a controller over `gateway`, scheduling renewals
    /// on `timer`.
    pub fn builder(gateway: G, timer: T) -> SessionControllerBuilder<G, T> {
        SessionControllerBuilder {
            gateway,
            timer,
            pipeline: None,
            cookies: None,
            config: SessionConfig::default(),
        }
    }

    // -- operations ---------------------------------------------------------

    /// Tries to restore a session from the server's long-lived cookie.
    ///
    /// Refreshes the access token, arms renewal, then fetches the profile.
    /// Any failure along the way clears local state; a token whose profile
    /// can't be fetched is treated as no session at all. Nothing is
    /// returned as an error: a missing session is the normal first-visit
    /// case.
    ///
    /// Only runs from `Unauthenticated`. A call made while another
    /// bootstrap is running waits for that one and reports its result;
    /// from any other state it's a no-op. The loading flag is cleared when
    /// the first bootstrap finishes, or is dropped unfinished.
    ///
    /// Returns whether a session is held afterwards.
    pub async fn bootstrap(&self) -> bool {
        let inner = &self.inner;
        if inner.is_shut_down() {
            return self.is_authenticated();
        }

        let started = inner.transition(SessionState::Unauthenticated, SessionState::Bootstrapping);
        if !started {
            if self.state() == SessionState::Bootstrapping {
                debug!("bootstrap already running, waiting for it");
                let mut states = inner.state.subscribe();
                let _ = states
                    .wait_for(|state| *state != SessionState::Bootstrapping)
                    .await;
            } else {
                debug!(state = %self.state(), "bootstrap skipped");
            }
            inner.finish_loading();
            return self.is_authenticated();
        }

        let _restoring = Restoring(inner);
        let epoch = inner.epoch();
        debug!("restoring session");

        match inner.refresh_shared().await {
            RefreshOutcome::Renewed(_) => inner.restore_profile(epoch).await,
            RefreshOutcome::Failed(error) if error.is_unauthorized() => {
                debug!("no session to restore");
            }
            RefreshOutcome::Failed(error) => {
                warn!(error = %error, "session restore failed");
            }
            RefreshOutcome::NoSession | RefreshOutcome::Superseded => {
                debug!("bootstrap superseded");
            }
        }

        self.is_authenticated()
    }

    /// Signs in with a username and password.
    ///
    /// On success the user and token are stored together, the bearer
    /// header is installed and renewal is armed. On failure nothing
    /// changes.
    ///
    /// # Errors
    /// - [`SessionError::InvalidCredentials`] with the server's message on
    ///   a 401.
    /// - [`SessionError::Gateway`] for anything else the server or network
    ///   does.
    /// - [`SessionError::ShutDown`] after [`shutdown`](Self::shutdown).
    pub async fn login(&self, request: &LoginRequest) -> Result<User, SessionError> {
        let inner = &self.inner;
        if inner.is_shut_down() {
            return Err(SessionError::ShutDown);
        }

        let response = inner.gateway.login(request).await.map_err(|error| match error {
            GatewayError::Unauthorized(message) => {
                debug!(username = %request.username, "login rejected");
                SessionError::InvalidCredentials(message)
            }
            other => {
                warn!(username = %request.username, error = %other, "login failed");
                SessionError::Gateway(other)
            }
        })?;

        let grant = response.grant();
        let user = response.user;
        {
            let mut lifecycle = inner.lifecycle.lock();
            if lifecycle.shut_down {
                return Err(SessionError::ShutDown);
            }
            lifecycle.epoch += 1;
            inner.store.set(user.clone(), grant.token.clone());
            inner.sync_bearer(&grant.token);
            inner.arm_renewal(grant.expires_in);
            inner.state.send_replace(SessionState::Authenticated);
        }
        inner.finish_loading();

        info!(
            user_id = %user.id,
            username = %user.username,
            expires_in = grant.expires_in,
            "logged in"
        );
        Ok(user)
    }

    /// Signs out.
    ///
    /// The server call is best effort. Whatever it does (including this
    /// future being dropped half-way) the timer is disarmed, the store is
    /// cleared and the bearer header removed.
    pub async fn logout(&self) {
        let inner = &self.inner;
        inner.lifecycle.lock().epoch += 1;
        let _cleanup = SignOut(inner);

        if let Err(error) = inner.gateway.logout().await {
            warn!(error = %error, "server logout failed, clearing local session anyway");
        }
    }

    /// Renews the access token now.
    ///
    /// Joins a renewal that is already in flight rather than starting a
    /// second one. On success the token is replaced (the user is kept) and
    /// renewal re-armed. On failure the session is cleared. When nobody is
    /// signed in (and no bootstrap is running) nothing is sent.
    ///
    /// # Errors
    /// - [`SessionError::NoSession`] if nobody is signed in, or the server
    ///   has no session for us.
    /// - [`SessionError::RenewalFailed`] for any other failure.
    /// - [`SessionError::Superseded`] if a login or logout landed while the
    ///   request was in flight.
    pub async fn refresh_now(&self) -> Result<(), SessionError> {
        if self.inner.is_shut_down() {
            return Err(SessionError::ShutDown);
        }
        match self.inner.refresh_shared().await {
            RefreshOutcome::Renewed(_) => Ok(()),
            RefreshOutcome::Failed(error) if error.is_unauthorized() => Err(SessionError::NoSession),
            RefreshOutcome::Failed(error) => Err(SessionError::RenewalFailed(error)),
            RefreshOutcome::NoSession => Err(SessionError::NoSession),
            RefreshOutcome::Superseded => Err(SessionError::Superseded),
        }
    }

    /// Replaces the stored user after a profile edit made elsewhere.
    ///
    /// Local only; the token and the timer are untouched. Ignored (and
    /// `false` returned) when no one is signed in, so a late profile
    /// response can't make a signed-out store look authenticated.
    pub fn update_user(&self, user: User) -> bool {
        let _lifecycle = self.inner.lifecycle.lock();
        if !self.inner.store.is_authenticated() {
            debug!(username = %user.username, "profile update ignored, not signed in");
            return false;
        }
        self.inner.store.set_user(user);
        true
    }

    /// Re-reads the profile from `GET /auth/me` and stores it.
    ///
    /// # Errors
    /// [`SessionError::ProfileUnavailable`] if the fetch fails. The session
    /// itself is left alone.
    pub async fn reload_user(&self) -> Result<User, SessionError> {
        let epoch = self.inner.epoch();
        let user = self
            .inner
            .gateway
            .current_user()
            .await
            .map_err(SessionError::ProfileUnavailable)?;

        let stored = self.inner.commit(epoch, || {
            if self.inner.store.is_authenticated() {
                self.inner.store.set_user(user.clone());
            }
        });
        stored.map(|()| user).ok_or(SessionError::Superseded)
    }

    /// Cancels the renewal timer and deregisters the anti-forgery
    /// interceptor. Idempotent.
    ///
    /// The stored session is kept for reading, but every later operation
    /// except `logout` is refused and in-flight results are discarded. A
    /// renewal in flight leaves the state `Authenticated`; a bootstrap in
    /// flight is abandoned and leaves it `Unauthenticated`.
    pub fn shutdown(&self) {
        let inner = &self.inner;
        {
            let mut lifecycle = inner.lifecycle.lock();
            if lifecycle.shut_down {
                return;
            }
            lifecycle.shut_down = true;
            lifecycle.epoch += 1;
            inner.scheduler.disarm();
            let state = *inner.state.borrow();
            match state {
                SessionState::Refreshing => {
                    inner.state.send_replace(SessionState::Authenticated);
                }
                SessionState::Bootstrapping => inner.clear_local(),
                SessionState::Authenticated | SessionState::Unauthenticated => {}
            }
        }
        if let Some(registration) = inner.csrf.lock().take() {
            registration.unregister();
        }
        inner.inflight.lock().take();
        info!("session controller shut down");
    }

    // -- accessors ----------------------------------------------------------

    /// A snapshot of the current session.
    pub fn session(&self) -> Session {
        self.inner.store.get()
    }

    pub fn user(&self) -> Option<User> {
        self.inner.store.user()
    }

    /// The access token, for callers that can't go through the pipeline.
    pub fn access_token(&self) -> Option<AccessToken> {
        self.inner.store.access_token()
    }

    /// `true` while a user is held.
    pub fn is_authenticated(&self) -> bool {
        self.inner.store.is_authenticated()
    }

    /// `true` until the first bootstrap (or login) finishes.
    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> SessionState {
        *self.inner.state.borrow()
    }

    /// Receives every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.store.subscribe()
    }

    /// Receives every state transition.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// The request pipeline the bearer header is mirrored into.
    pub fn pipeline(&self) -> &Arc<RequestPipeline> {
        &self.inner.pipeline
    }

    /// `true` while a renewal timer is armed.
    pub fn is_renewal_armed(&self) -> bool {
        self.inner.scheduler.is_armed()
    }
}

impl<T: Timer> SessionController<HttpAuthGateway, T> {
    /// A controller wired to an [`HttpAuthGateway`]: its client's pipeline
    /// carries the bearer header, and its cookie jar feeds the
    /// anti-forgery bridge.
    pub fn over_http(
        gateway: HttpAuthGateway,
        timer: T,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let pipeline = Arc::clone(gateway.client().pipeline());
        let cookies: Arc<dyn CookieSource> = Arc::new(gateway.client().cookies());
        Self::builder(gateway, timer)
            .pipeline(pipeline)
            .cookies(cookies)
            .config(config)
            .build()
    }
}

impl<G: AuthGateway, T: Timer> std::fmt::Debug for SessionController<G, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state())
            .field("session", &self.session())
            .field("loading", &self.is_loading())
            .field("scheduler", &self.inner.scheduler)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for [`SessionController`].
///
/// ```rust,ignore
/// let controller = SessionController::builder(gateway, TokioTimer)
///     .pipeline(Arc::clone(client.pipeline()))
///     .cookies(Arc::new(client.cookies()))
///     .build()?;
/// ```
pub struct SessionControllerBuilder<G: AuthGateway, T: Timer> {
    gateway: G,
    timer: T,
    pipeline: Option<Arc<RequestPipeline>>,
    cookies: Option<Arc<dyn CookieSource>>,
    config: SessionConfig,
}

impl<G: AuthGateway, T: Timer> SessionControllerBuilder<G, T> {
    /// The pipeline outgoing requests pass through. Defaults to a fresh
    /// one, which only makes sense if nothing else sends requests.
    pub fn pipeline(mut self, pipeline: Arc<RequestPipeline>) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Where the anti-forgery cookie is read from. Without one, no
    /// anti-forgery header is added.
    pub fn cookies(mut self, cookies: Arc<dyn CookieSource>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the controller and registers the anti-forgery bridge.
    ///
    /// # Errors
    /// [`SessionError::Request`] if `csrf_header` isn't a valid header
    /// name.
    pub fn build(self) -> Result<SessionController<G, T>, SessionError> {
        let config = self.config;
        let header = HeaderName::from_bytes(config.csrf_header.as_bytes())
            .map_err(|_| RequestError::InvalidHeaderName(config.csrf_header.clone()))?;
        let pipeline = self.pipeline.unwrap_or_else(RequestPipeline::new);

        let csrf = match self.cookies {
            Some(source) => {
                let bridge = ForgeryTokenBridge::with_names(source, config.csrf_cookie, header);
                Some(pipeline.register(Arc::new(bridge)))
            }
            None => {
                debug!("no cookie source, anti-forgery header disabled");
                None
            }
        };

        let (state, _) = watch::channel(SessionState::Unauthenticated);
        let inner = Inner {
            gateway: self.gateway,
            store: CredentialStore::new(),
            scheduler: RefreshScheduler::with_buffer(self.timer, config.refresh_buffer),
            pipeline,
            csrf: Mutex::new(csrf),
            state,
            loading: AtomicBool::new(true),
            lifecycle: Mutex::new(Lifecycle::default()),
            inflight: Mutex::new(None),
        };

        Ok(SessionController {
            inner: Arc::new(inner),
        })
    }
}

// ---------------------------------------------------------------------------
// Inner
// ---------------------------------------------------------------------------

impl<G: AuthGateway, T: Timer> Inner<G, T> {
    fn epoch(&self) -> u64 {
        self.lifecycle.lock().epoch
    }

    fn is_shut_down(&self) -> bool {
        self.lifecycle.lock().shut_down
    }

    /// Runs `apply` under the lifecycle lock if `epoch` is still current.
    fn commit<R>(&self, epoch: u64, apply: impl FnOnce() -> R) -> Option<R> {
        let lifecycle = self.lifecycle.lock();
        if lifecycle.epoch != epoch || lifecycle.shut_down {
            return None;
        }
        Some(apply())
    }

    /// Moves `from` → `to`. Returns `false` if the state wasn't `from`.
    fn transition(&self, from: SessionState, to: SessionState) -> bool {
        self.state.send_if_modified(|state| {
            if *state == from {
                *state = to;
                true
            } else {
                false
            }
        })
    }

    fn finish_loading(&self) {
        if self.loading.swap(false, Ordering::SeqCst) {
            debug!("initial session check finished");
        }
    }

    fn sync_bearer(&self, token: &AccessToken) {
        if let Err(error) = self.pipeline.set_bearer(token) {
            warn!(error = %error, "access token unusable as a header, requests go out without it");
        }
    }

    /// Drops every trace of the session locally.
    fn clear_local(&self) {
        self.scheduler.disarm();
        self.store.clear();
        self.pipeline.clear_bearer();
        self.state.send_replace(SessionState::Unauthenticated);
    }

    fn arm_renewal(self: &Arc<Self>, ttl_secs: u64) {
        let weak = Arc::downgrade(self);
        self.scheduler.arm(ttl_secs, move || scheduled_renewal(weak));
    }

    /// Returns the in-flight refresh for the current epoch, starting one
    /// if there is none.
    fn refresh_shared(self: &Arc<Self>) -> InflightRefresh {
        let epoch = self.epoch();
        let mut slot = self.inflight.lock();
        if let Some((started_in, pending)) = slot.as_ref() {
            if *started_in == epoch {
                if let Some(pending) = pending.upgrade() {
                    debug!("joining in-flight refresh");
                    return pending;
                }
            }
        }
        let pending = run_refresh(Arc::downgrade(self), epoch).shared();
        *slot = pending.downgrade().map(|weak| (epoch, weak));
        pending
    }

    /// Marks a refresh as started. `false` when there is no session (or
    /// bootstrap) for it to renew.
    fn begin_refresh(&self) -> bool {
        let state = *self.state.borrow();
        match state {
            SessionState::Authenticated => {
                self.state.send_replace(SessionState::Refreshing);
                true
            }
            SessionState::Refreshing | SessionState::Bootstrapping => true,
            SessionState::Unauthenticated => false,
        }
    }

    fn release_inflight(&self, epoch: u64) {
        let mut slot = self.inflight.lock();
        if matches!(slot.as_ref(), Some((started_in, _)) if *started_in == epoch) {
            *slot = None;
        }
    }

    /// Second half of bootstrap: a token is held, now resolve the user.
    async fn restore_profile(&self, epoch: u64) {
        match self.gateway.current_user().await {
            Ok(user) => {
                let restored = self.commit(epoch, || {
                    info!(user_id = %user.id, username = %user.username, "session restored");
                    self.store.set_user(user);
                    self.state.send_replace(SessionState::Authenticated);
                });
                if restored.is_none() {
                    debug!("discarding profile from an earlier session");
                }
            }
            Err(error) => {
                if self.commit(epoch, || self.clear_local()).is_some() {
                    warn!(error = %error, "profile fetch failed, discarding restored token");
                }
            }
        }
    }
}

/// Clears local session state when dropped, so logout cleans up even if
/// its future is cancelled mid-request.
struct SignOut<'a, G: AuthGateway, T: Timer>(&'a Inner<G, T>);

impl<G: AuthGateway, T: Timer> Drop for SignOut<'_, G, T> {
    fn drop(&mut self) {
        let _lifecycle = self.0.lifecycle.lock();
        self.0.clear_local();
        info!("logged out");
    }
}

/// Abandons a bootstrap that is dropped before it settles, so the state
/// never stays `Bootstrapping` and the token it may have fetched is not
/// left behind without a user.
struct Restoring<'a, G: AuthGateway, T: Timer>(&'a Inner<G, T>);

impl<G: AuthGateway, T: Timer> Drop for Restoring<'_, G, T> {
    fn drop(&mut self) {
        {
            let mut lifecycle = self.0.lifecycle.lock();
            let stuck = *self.0.state.borrow() == SessionState::Bootstrapping;
            if stuck {
                lifecycle.epoch += 1;
                self.0.clear_local();
                debug!("bootstrap abandoned");
            }
        }
        self.0.finish_loading();
    }
}

/// Frees the in-flight slot when a refresh ends. If every caller went away
/// mid-request, also puts `Refreshing` back to `Authenticated`.
struct Settle<'a, G: AuthGateway, T: Timer> {
    inner: &'a Inner<G, T>,
    epoch: u64,
}

impl<G: AuthGateway, T: Timer> Drop for Settle<'_, G, T> {
    fn drop(&mut self) {
        let inner = self.inner;
        inner.commit(self.epoch, || {
            inner.transition(SessionState::Refreshing, SessionState::Authenticated)
        });
        inner.release_inflight(self.epoch);
    }
}

/// One refresh round trip, applied at most once.
fn run_refresh<G: AuthGateway, T: Timer>(weak: Weak<Inner<G, T>>, epoch: u64) -> RefreshFuture {
    async move {
        let Some(inner) = weak.upgrade() else {
            return RefreshOutcome::Superseded;
        };
        let _settle = Settle {
            inner: &inner,
            epoch,
        };
        match inner.commit(epoch, || inner.begin_refresh()) {
            Some(true) => renew(&inner, epoch).await,
            Some(false) => {
                debug!("no session to renew");
                RefreshOutcome::NoSession
            }
            None => RefreshOutcome::Superseded,
        }
    }
    .boxed()
}

async fn renew<G: AuthGateway, T: Timer>(inner: &Arc<Inner<G, T>>, epoch: u64) -> RefreshOutcome {
    let result = inner.gateway.refresh().await;
    match result {
        Ok(response) => {
            let grant = response.into_grant();
            let applied = inner.commit(epoch, || {
                inner.store.set_access_token(grant.token.clone());
                inner.sync_bearer(&grant.token);
                inner.arm_renewal(grant.expires_in);
                inner.transition(SessionState::Refreshing, SessionState::Authenticated);
            });
            if applied.is_some() {
                debug!(expires_in = grant.expires_in, "access token renewed");
                RefreshOutcome::Renewed(grant)
            } else {
                debug!("discarding refresh result from an earlier session");
                RefreshOutcome::Superseded
            }
        }
        Err(error) => {
            let error = Arc::new(error);
            if inner.commit(epoch, || inner.clear_local()).is_some() {
                debug!(error = %error, "refresh failed, local session cleared");
                RefreshOutcome::Failed(error)
            } else {
                RefreshOutcome::Superseded
            }
        }
    }
}

/// The task the scheduler runs when the token is due.
fn scheduled_renewal<G: AuthGateway, T: Timer>(weak: Weak<Inner<G, T>>) -> BoxFuture<'static, ()> {
    async move {
        let Some(inner) = weak.upgrade() else {
            return;
        };
        debug!("access token due for renewal");
        match inner.refresh_shared().await {
            RefreshOutcome::Renewed(_) => {}
            RefreshOutcome::Failed(error) => {
                warn!(error = %error, "scheduled renewal failed, session ended");
            }
            RefreshOutcome::NoSession | RefreshOutcome::Superseded => {
                debug!("scheduled renewal superseded");
            }
        }
    }
    .boxed()
}
