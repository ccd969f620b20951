use async_trait::async_trait;

use super::client::HttpClient;
use crate::app::models::{CreateOrganizationRequest, Organization, OrganizationUser};
use crate::error::ApiError;

#[async_trait]
pub trait OrganizationApi: Send + Sync {
    async fn create_organization(&self, name: &str) -> Result<Organization, ApiError>;

    /// Everyone in the caller's organization
    async fn get_organization_users(&self) -> Result<Vec<OrganizationUser>, ApiError>;
}

#[async_trait]
impl OrganizationApi for HttpClient {
    async fn create_organization(&self, name: &str) -> Result<Organization, ApiError> {
        let payload = CreateOrganizationRequest {
            name: name.to_string(),
        };
        self.post("/organizations", &payload).await
    }

    async fn get_organization_users(&self) -> Result<Vec<OrganizationUser>, ApiError> {
        self.get("/organizations/users").await
    }
}
