//! The production gateway: `/auth` endpoints over [`ApiClient`].

use std::sync::Arc;

use latchkey_protocol::{
    ChangePasswordRequest, LoginRequest, LoginResponse, ProfileUpdate, TokenResponse, User, paths,
};
use reqwest::Method;

use crate::client::decode;
use crate::{ApiClient, AuthGateway, GatewayError};

/// [`AuthGateway`] backed by real HTTP.
///
/// Cheap to clone; clones share the client, its cookie jar and its
/// request pipeline.
#[derive(Debug, Clone)]
pub struct HttpAuthGateway {
    client: Arc<ApiClient>,
}

impl HttpAuthGateway {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// The underlying client, for issuing non-auth requests through the
    /// same pipeline and cookie jar.
    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    /// `PATCH /auth/me`. Returns the updated profile.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, GatewayError> {
        self.client.patch_json(paths::ME, update).await
    }

    /// `POST /auth/change-password`.
    ///
    /// A wrong current password comes back as a status error (usually
    /// [`GatewayError::Unauthorized`] or `InvalidResponse` for a 400).
    pub async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> Result<(), GatewayError> {
        self.client
            .send(Method::POST, paths::CHANGE_PASSWORD, Some(request))
            .await?;
        Ok(())
    }
}

impl AuthGateway for HttpAuthGateway {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, GatewayError> {
        tracing::debug!(username = %request.username, "login request");
        self.client.post_json(paths::LOGIN, request).await
    }

    async fn logout(&self) -> Result<(), GatewayError> {
        self.client
            .send::<()>(Method::POST, paths::LOGOUT, None)
            .await?;
        Ok(())
    }

    async fn refresh(&self) -> Result<TokenResponse, GatewayError> {
        let response = self
            .client
            .send::<()>(Method::POST, paths::REFRESH, None)
            .await?;
        decode(response).await
    }

    async fn current_user(&self) -> Result<User, GatewayError> {
        self.client.get_json(paths::ME).await
    }
}
