use async_trait::async_trait;

use super::client::HttpClient;
use crate::app::models::{AddProjectMemberRequest, CreateProjectRequest, Project, ProjectMember};
use crate::error::ApiError;

#[async_trait]
pub trait ProjectApi: Send + Sync {
    async fn get_user_projects(&self) -> Result<Vec<Project>, ApiError>;

    async fn create_project(&self, name: &str, organization_id: &str)
        -> Result<Project, ApiError>;

    // Duplicate membership is rejected (or not) by the server
    async fn add_user_to_project(&self, project_id: &str, user_id: &str) -> Result<(), ApiError>;

    async fn get_project_users(&self, project_id: &str) -> Result<Vec<ProjectMember>, ApiError>;
}

#[async_trait]
impl ProjectApi for HttpClient {
    async fn get_user_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get("/projects").await
    }

    async fn create_project(
        &self,
        name: &str,
        organization_id: &str,
    ) -> Result<Project, ApiError> {
        let payload = CreateProjectRequest {
            name: name.to_string(),
            organization_id: organization_id.to_string(),
        };
        self.post("/projects", &payload).await
    }

    async fn add_user_to_project(&self, project_id: &str, user_id: &str) -> Result<(), ApiError> {
        let payload = AddProjectMemberRequest {
            user_id: user_id.to_string(),
        };
        self.post_void(&format!("/projects/{project_id}/users"), &payload)
            .await
    }

    async fn get_project_users(&self, project_id: &str) -> Result<Vec<ProjectMember>, ApiError> {
        self.get(&format!("/projects/{project_id}/users")).await
    }
}
