use chrono::Utc;
use now::DateTimeNow;
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::ListItem;

use crate::api::TrackerApi;
use crate::app::form::Submission;
use crate::app::modals::AddMemberModal;
use crate::app::models::{
    OrganizationUser, Project, ProjectMember, Task, TaskFilters, TaskStatus, UserRole,
};
use crate::app::task_modal::TaskModalState;

/// One project's task board, members and dialogs
pub struct ProjectDetailsState {
    pub project: Project,
    pub members: Vec<ProjectMember>,
    pub tasks: Vec<Task>,
    pub organization_users: Vec<OrganizationUser>,
    pub error: Option<String>,
    pub column: usize,
    rows: [Option<usize>; 3],
    pending_delete: Option<Task>,
    pub task_modal: TaskModalState,
    pub add_member_modal: AddMemberModal,
}

impl ProjectDetailsState {
    pub fn new(project: Project) -> ProjectDetailsState {
        ProjectDetailsState {
            project,
            members: Vec::new(),
            tasks: Vec::new(),
            organization_users: Vec::new(),
            error: None,
            column: 0,
            rows: [None; 3],
            pending_delete: None,
            task_modal: TaskModalState::default(),
            add_member_modal: AddMemberModal::default(),
        }
    }

    pub fn dialog_active(&self) -> bool {
        self.task_modal.dialog_active || self.add_member_modal.is_active()
    }

    /// Reloads everything the view shows. Any failed fetch puts the whole
    /// view into its error state.
    pub async fn load(&mut self, api: &dyn TrackerApi) {
        let filters = TaskFilters::for_project(self.project.id.as_str());
        let result = tokio::try_join!(
            api.get_project_users(&self.project.id),
            api.get_tasks(&filters),
            api.get_organization_users(),
        );

        match result {
            Ok((members, page, organization_users)) => {
                tracing::debug!(
                    project_id = %self.project.id,
                    tasks = page.tasks.len(),
                    total = page.total,
                    "project loaded"
                );
                self.error = None;
                self.members = members;
                self.tasks = page.tasks;
                self.organization_users = organization_users;
                self.clamp_selection();
            }
            Err(err) => {
                tracing::error!(error = %err, project_id = %self.project.id, "failed to fetch project");
                self.error = Some(err.user_message("Failed to fetch project details"));
            }
        }
    }

    /// Tasks of one board column, in server order
    pub fn column_tasks(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.status == status).collect()
    }

    pub fn selected_row(&self, column: usize) -> Option<usize> {
        self.rows.get(column).copied().flatten()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let status = TaskStatus::ALL[self.column];
        let row = self.selected_row(self.column)?;
        self.column_tasks(status).get(row).copied()
    }

    pub fn next_column(&mut self) {
        self.column = (self.column + 1) % TaskStatus::ALL.len();
    }

    pub fn previous_column(&mut self) {
        self.column = (self.column + TaskStatus::ALL.len() - 1) % TaskStatus::ALL.len();
    }

    pub fn next_task(&mut self) {
        let len = self.column_tasks(TaskStatus::ALL[self.column]).len();
        if len == 0 {
            return;
        }
        self.rows[self.column] = Some(match self.rows[self.column] {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        });
    }

    pub fn previous_task(&mut self) {
        let len = self.column_tasks(TaskStatus::ALL[self.column]).len();
        if len == 0 {
            return;
        }
        self.rows[self.column] = Some(match self.rows[self.column] {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        });
    }

    fn clamp_selection(&mut self) {
        for (column, status) in TaskStatus::ALL.iter().enumerate() {
            let len = self.tasks.iter().filter(|t| t.status == *status).count();
            self.rows[column] = match self.rows[column] {
                Some(_) if len == 0 => None,
                Some(i) => Some(i.min(len - 1)),
                None => None,
            };
        }
    }

    pub fn open_create_task(&mut self) {
        self.task_modal
            .create_a_new_task(&self.project.id, &self.members);
    }

    pub fn open_edit_task(&mut self) {
        if let Some(task) = self.selected_task().cloned() {
            self.task_modal.edit_task(&task, &self.members);
        }
    }

    pub fn open_add_member(&mut self) {
        self.add_member_modal
            .open(&self.project.id, &self.organization_users, &self.members);
    }

    /// Task awaiting delete confirmation
    pub fn pending_delete(&self) -> Option<&Task> {
        self.pending_delete.as_ref()
    }

    pub fn request_delete(&mut self) {
        self.pending_delete = self.selected_task().cloned();
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Deletes the confirmed task. A failure is only logged.
    pub async fn confirm_delete(&mut self, api: &dyn TrackerApi) {
        let Some(task) = self.pending_delete.take() else {
            return;
        };
        match api.delete_task(&task.id).await {
            Ok(()) => {
                tracing::info!(task_id = %task.id, "task deleted");
                self.load(api).await;
            }
            Err(err) => tracing::error!(error = %err, task_id = %task.id, "failed to delete task"),
        }
    }

    pub async fn submit_task(&mut self, api: &dyn TrackerApi) -> Submission {
        let outcome = self.task_modal.submit(api).await;
        if outcome == Submission::Saved {
            self.load(api).await;
            self.task_modal.close();
        }
        outcome
    }

    pub async fn submit_member(&mut self, api: &dyn TrackerApi) -> Submission {
        let outcome = self.add_member_modal.submit(api).await;
        if outcome == Submission::Saved {
            self.load(api).await;
            self.add_member_modal.close();
        }
        outcome
    }

    // Not done and due before today
    pub fn get_overdue(&self) -> Vec<&Task> {
        let today = Utc::now().beginning_of_day();
        self.tasks
            .iter()
            .filter(|task| task.status != TaskStatus::Done && task.due_date < today)
            .collect()
    }
}

// Build the UI (list) for one board column
pub fn get_column_items_ui<'a>(tasks: &[&'a Task], can_manage: bool) -> Vec<ListItem<'a>> {
    tasks
        .iter()
        .map(|&task| {
            let badge = match &task.assignee {
                Some(assignee) => assignee
                    .email
                    .chars()
                    .next()
                    .map(|c| c.to_ascii_uppercase().to_string())
                    .unwrap_or_default(),
                None => "-".to_string(),
            };
            let mut lines = vec![Line::from(vec![
                Span::from(format!("[{badge}] ")).fg(Color::Cyan),
                Span::from(task.title.as_str()),
            ])];
            if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
                lines.push(Line::from(Span::styled(
                    format!("    {description}"),
                    Style::default().fg(Color::Gray),
                )));
            }
            let mut due = format!("    Due: {}", task.due_date.format("%b %d"));
            if can_manage {
                due.push_str("  (e/x)");
            }
            lines.push(Line::from(due));
            ListItem::new(lines).style(Style::default().fg(Color::White))
        })
        .collect()
}

pub fn get_column_title(status: TaskStatus, count: usize) -> String {
    format!("{} ({count})", status.label())
}

// Build the UI (lines) for the project statistics and members
pub fn get_statistics_ui(state: &ProjectDetailsState) -> Vec<Line<'_>> {
    let mut lines = vec![
        Line::from(format!("Total tasks: {}", state.tasks.len())),
        Line::from(format!("Overdue: {}", state.get_overdue().len())),
        Line::raw(""),
        Line::from(Span::from("Members").bold()),
    ];
    lines.extend(state.members.iter().map(|member| {
        Line::from(format!("{} ({})", member.email, member.role.label()))
    }));
    lines
}

// Build the UI (lines) for the command help; editing is Admin-only
pub fn get_instructions_ui<'a>(role: UserRole) -> Vec<Line<'a>> {
    let mut lines: Vec<Line> = vec![
        "Left/Right - column, Up/Down - task".into(),
        "r - refresh".into(),
    ];
    match role {
        UserRole::Admin => {
            lines.push("a - new task".into());
            lines.push("e - edit task".into());
            lines.push("x - delete task".into());
            lines.push("m - add member".into());
        }
        UserRole::Member => {}
    }
    lines.push("Esc - back to dashboard".into());
    lines
}
