use async_trait::async_trait;

use super::client::HttpClient;
use crate::app::models::{AuthResponse, LoginRequest, RegisterRequest, User, UserRole};
use crate::error::ApiError;

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError>;

    async fn register(
        &self,
        email: &str,
        password: &str,
        organization_id: &str,
        role: Option<UserRole>,
    ) -> Result<AuthResponse, ApiError>;

    /// The user owning the current bearer token
    async fn get_current_user(&self) -> Result<User, ApiError>;
}

#[async_trait]
impl AuthApi for HttpClient {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let payload = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("/users/login", &payload).await
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        organization_id: &str,
        role: Option<UserRole>,
    ) -> Result<AuthResponse, ApiError> {
        let payload = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            organization_id: organization_id.to_string(),
            role,
        };
        self.post("/users/register", &payload).await
    }

    async fn get_current_user(&self) -> Result<User, ApiError> {
        self.get("/users/me").await
    }
}
