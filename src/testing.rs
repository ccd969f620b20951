//! In-memory backend that records every call, for view and session tests.
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::api::{AuthApi, OrganizationApi, ProjectApi, TaskApi};
use crate::app::models::*;
use crate::error::ApiError;

#[derive(Default)]
pub struct FakeState {
    pub calls: Vec<&'static str>,
    pub failures: HashMap<&'static str, (u16, Option<String>)>,
    pub current_user: Option<User>,
    pub projects: Vec<Project>,
    pub organization_users: Vec<OrganizationUser>,
    pub project_members: Vec<ProjectMember>,
    pub tasks: Vec<Task>,
    pub task_filters: Vec<TaskFilters>,
    pub registered: Vec<RegisterRequest>,
    pub created_organizations: Vec<String>,
    pub created_projects: Vec<(String, String)>,
    pub added_members: Vec<(String, String)>,
    pub created_tasks: Vec<CreateTaskRequest>,
    pub task_updates: Vec<(String, UpdateTaskRequest)>,
    pub status_updates: Vec<(String, TaskStatus)>,
    pub assignee_updates: Vec<(String, Option<String>)>,
    pub deleted_tasks: Vec<String>,
}

#[derive(Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state().calls.clone()
    }

    pub fn fail(&self, call: &'static str, status: u16) {
        self.state().failures.insert(call, (status, None));
    }

    pub fn fail_with_message(&self, call: &'static str, status: u16, message: &str) {
        self.state()
            .failures
            .insert(call, (status, Some(message.to_string())));
    }

    // Records the call and returns the configured failure, if any
    fn record(&self, call: &'static str) -> Result<MutexGuard<'_, FakeState>, ApiError> {
        let mut state = self.state();
        state.calls.push(call);
        if let Some((status, message)) = state.failures.get(call).cloned() {
            return Err(ApiError::Status { status, message });
        }
        Ok(state)
    }
}

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn sample_user(role: UserRole) -> User {
    User {
        id: "user-1".into(),
        email: "me@example.com".into(),
        role,
        organization_id: "4b4f5c3e-8a7d-4f7e-9a36-2c1d0e9f8a11".into(),
    }
}

pub fn sample_project(id: &str, name: &str) -> Project {
    Project {
        id: id.into(),
        name: name.into(),
        organization_id: "org-1".into(),
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn org_user(id: &str, email: &str) -> OrganizationUser {
    OrganizationUser {
        id: id.into(),
        email: email.into(),
        role: UserRole::Member,
    }
}

pub fn member(id: &str, email: &str) -> ProjectMember {
    ProjectMember {
        id: id.into(),
        email: email.into(),
        role: UserRole::Member,
    }
}

pub fn sample_task(id: &str, status: TaskStatus) -> Task {
    Task {
        id: id.into(),
        title: format!("Task {id}"),
        description: None,
        status,
        project_id: "project-1".into(),
        assignee_id: None,
        due_date: Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap(),
        completed_at: None,
        created_at: timestamp(),
        updated_at: timestamp(),
        assignee: None,
    }
}

#[async_trait]
impl AuthApi for FakeApi {
    async fn login(&self, email: &str, _password: &str) -> Result<AuthResponse, ApiError> {
        let _state = self.record("login")?;
        Ok(AuthResponse {
            user: User {
                email: email.into(),
                ..sample_user(UserRole::Admin)
            },
            token: format!("token-{email}"),
        })
    }

    async fn register(
        &self,
        email: &str,
        password: &str,
        organization_id: &str,
        role: Option<UserRole>,
    ) -> Result<AuthResponse, ApiError> {
        let mut state = self.record("register")?;
        state.registered.push(RegisterRequest {
            email: email.into(),
            password: password.into(),
            organization_id: organization_id.into(),
            role,
        });
        Ok(AuthResponse {
            user: User {
                id: "user-new".into(),
                email: email.into(),
                role: role.unwrap_or(UserRole::Member),
                organization_id: organization_id.into(),
            },
            token: format!("token-{email}"),
        })
    }

    async fn get_current_user(&self) -> Result<User, ApiError> {
        let state = self.record("get_current_user")?;
        state.current_user.clone().ok_or(ApiError::Status {
            status: 401,
            message: None,
        })
    }
}

#[async_trait]
impl OrganizationApi for FakeApi {
    async fn create_organization(&self, name: &str) -> Result<Organization, ApiError> {
        let mut state = self.record("create_organization")?;
        state.created_organizations.push(name.into());
        Ok(Organization {
            id: "org-new".into(),
            name: name.into(),
            created_at: timestamp(),
            updated_at: timestamp(),
        })
    }

    async fn get_organization_users(&self) -> Result<Vec<OrganizationUser>, ApiError> {
        let state = self.record("get_organization_users")?;
        Ok(state.organization_users.clone())
    }
}

#[async_trait]
impl ProjectApi for FakeApi {
    async fn get_user_projects(&self) -> Result<Vec<Project>, ApiError> {
        let state = self.record("get_user_projects")?;
        Ok(state.projects.clone())
    }

    async fn create_project(
        &self,
        name: &str,
        organization_id: &str,
    ) -> Result<Project, ApiError> {
        let mut state = self.record("create_project")?;
        state
            .created_projects
            .push((name.into(), organization_id.into()));
        let project = sample_project("project-new", name);
        state.projects.push(project.clone());
        Ok(project)
    }

    async fn add_user_to_project(&self, project_id: &str, user_id: &str) -> Result<(), ApiError> {
        let mut state = self.record("add_user_to_project")?;
        state
            .added_members
            .push((project_id.into(), user_id.into()));
        Ok(())
    }

    async fn get_project_users(&self, _project_id: &str) -> Result<Vec<ProjectMember>, ApiError> {
        let state = self.record("get_project_users")?;
        Ok(state.project_members.clone())
    }
}

#[async_trait]
impl TaskApi for FakeApi {
    async fn get_tasks(&self, filters: &TaskFilters) -> Result<TaskPage, ApiError> {
        let mut state = self.record("get_tasks")?;
        state.task_filters.push(filters.clone());
        Ok(TaskPage {
            tasks: state.tasks.clone(),
            total: state.tasks.len() as u64,
        })
    }

    async fn create_task(&self, data: &CreateTaskRequest) -> Result<Task, ApiError> {
        let mut state = self.record("create_task")?;
        state.created_tasks.push(data.clone());
        Ok(Task {
            title: data.title.clone(),
            ..sample_task("task-new", data.status.unwrap_or(TaskStatus::ToDo))
        })
    }

    async fn update_task(&self, id: &str, data: &UpdateTaskRequest) -> Result<Task, ApiError> {
        let mut state = self.record("update_task")?;
        state.task_updates.push((id.into(), data.clone()));
        Ok(sample_task(id, TaskStatus::ToDo))
    }

    async fn update_task_status(&self, id: &str, status: TaskStatus) -> Result<Task, ApiError> {
        let mut state = self.record("update_task_status")?;
        state.status_updates.push((id.into(), status));
        Ok(sample_task(id, status))
    }

    async fn update_task_assignee(
        &self,
        id: &str,
        assignee_id: Option<&str>,
    ) -> Result<Task, ApiError> {
        let mut state = self.record("update_task_assignee")?;
        state
            .assignee_updates
            .push((id.into(), assignee_id.map(str::to_string)));
        Ok(sample_task(id, TaskStatus::ToDo))
    }

    async fn delete_task(&self, id: &str) -> Result<(), ApiError> {
        let mut state = self.record("delete_task")?;
        state.deleted_tasks.push(id.into());
        Ok(())
    }
}
