use async_trait::async_trait;

use super::client::HttpClient;
use crate::app::models::{
    CreateTaskRequest, Task, TaskFilters, TaskPage, TaskStatus, UpdateTaskAssigneeRequest,
    UpdateTaskRequest, UpdateTaskStatusRequest,
};
use crate::error::ApiError;

/// Task endpoints. The three update calls address independent fields and
/// must only be issued for fields that actually changed.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn get_tasks(&self, filters: &TaskFilters) -> Result<TaskPage, ApiError>;

    async fn create_task(&self, data: &CreateTaskRequest) -> Result<Task, ApiError>;

    async fn update_task(&self, id: &str, data: &UpdateTaskRequest) -> Result<Task, ApiError>;

    async fn update_task_status(&self, id: &str, status: TaskStatus) -> Result<Task, ApiError>;

    /// `None` unassigns the task
    async fn update_task_assignee(
        &self,
        id: &str,
        assignee_id: Option<&str>,
    ) -> Result<Task, ApiError>;

    async fn delete_task(&self, id: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl TaskApi for HttpClient {
    async fn get_tasks(&self, filters: &TaskFilters) -> Result<TaskPage, ApiError> {
        self.get_with_query("/tasks", filters).await
    }

    async fn create_task(&self, data: &CreateTaskRequest) -> Result<Task, ApiError> {
        self.post("/tasks", data).await
    }

    async fn update_task(&self, id: &str, data: &UpdateTaskRequest) -> Result<Task, ApiError> {
        self.put(&format!("/tasks/{id}"), data).await
    }

    async fn update_task_status(&self, id: &str, status: TaskStatus) -> Result<Task, ApiError> {
        self.patch(
            &format!("/tasks/{id}/status"),
            &UpdateTaskStatusRequest { status },
        )
        .await
    }

    async fn update_task_assignee(
        &self,
        id: &str,
        assignee_id: Option<&str>,
    ) -> Result<Task, ApiError> {
        let payload = UpdateTaskAssigneeRequest {
            assignee_id: assignee_id.map(str::to_string),
        };
        self.patch(&format!("/tasks/{id}/assignee"), &payload).await
    }

    async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/tasks/{id}")).await
    }
}
