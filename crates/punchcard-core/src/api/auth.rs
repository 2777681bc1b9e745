use super::{ApiClient, ApiError};
use crate::models::{
    Credentials, LoginResponse, PasswordChange, ProfileResponse, ProfileUpdate, Registration,
    RegistrationResponse, Resource,
};

/// `/auth` endpoints
pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }
}

impl AuthApi<'_> {
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.client.post("/auth/login", credentials).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<RegistrationResponse, ApiError> {
        self.client.post("/auth/register", registration).await
    }

    pub async fn profile(&self) -> Result<ProfileResponse, ApiError> {
        self.client.get("/auth/profile").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Resource, ApiError> {
        self.client.put("/auth/profile", update).await
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<Resource, ApiError> {
        self.client.post("/auth/change-password", change).await
    }
}
