use chrono::{DateTime, NaiveDate, Utc};
use derivative::Derivative;
use futures_util::future::try_join_all;
use ratatui::text::Line;

use crate::api::TrackerApi;
use crate::app::form::{get_form_ui, Cursor, EditableForm, FormRow, Submission};
use crate::app::models::{
    CreateTaskRequest, ProjectMember, Task, TaskStatus, UpdateTaskRequest,
};
use crate::error::ApiError;

const DATE_FORMAT: &str = "%Y-%m-%d";

// Rows of the dialog, top to bottom
const TITLE_ROW: usize = 0;
const DESCRIPTION_ROW: usize = 1;
const STATUS_ROW: usize = 2;
const DUE_DATE_ROW: usize = 3;
const ASSIGNEE_ROW: usize = 4;

/// Current content of the task being edited/created
#[derive(Debug, Clone, PartialEq, Derivative)]
#[derivative(Default)]
pub struct TaskFormContent {
    pub title: String,
    pub description: String,
    #[derivative(Default(value = "TaskStatus::ToDo"))]
    pub status: TaskStatus,
    pub due_date: String,
    pub assignee_id: Option<String>,
}

/// One call needed to bring a task in line with the edit form
#[derive(Debug, Clone, PartialEq)]
pub enum TaskChange {
    /// Title, description and due date travel together
    Details(UpdateTaskRequest),
    Status(TaskStatus),
    Assignee(Option<String>),
}

/// Diffs the form against the task it was opened with.
/// Each endpoint appears at most once and only when its fields changed.
pub fn plan_task_changes(
    original: &Task,
    content: &TaskFormContent,
    due_date: NaiveDate,
) -> Vec<TaskChange> {
    let mut changes = Vec::new();

    if content.title != original.title
        || content.description != original.description.as_deref().unwrap_or_default()
        || due_date != original.due_day()
    {
        changes.push(TaskChange::Details(UpdateTaskRequest {
            title: Some(content.title.clone()),
            description: Some(content.description.clone()),
            due_date: Some(start_of_day(due_date)),
            ..UpdateTaskRequest::default()
        }));
    }

    if content.status != original.status {
        changes.push(TaskChange::Status(content.status));
    }

    if content.assignee_id != original.assignee_id {
        changes.push(TaskChange::Assignee(content.assignee_id.clone()));
    }

    changes
}

/// Issues the planned calls concurrently; the first failure wins
pub async fn apply_task_changes(
    api: &dyn TrackerApi,
    task_id: &str,
    changes: &[TaskChange],
) -> Result<(), ApiError> {
    if changes.is_empty() {
        return Ok(());
    }

    let calls = changes.iter().map(|change| match change {
        TaskChange::Details(update) => api.update_task(task_id, update),
        TaskChange::Status(status) => api.update_task_status(task_id, *status),
        TaskChange::Assignee(assignee_id) => {
            api.update_task_assignee(task_id, assignee_id.as_deref())
        }
    });
    try_join_all(calls).await?;
    Ok(())
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(chrono::NaiveTime::MIN).and_utc()
}

// State object for the task dialog.
// Keeps the task it was opened with so edits can be diffed on submit.
#[derive(Default)]
pub struct TaskModalState {
    pub dialog_active: bool,
    project_id: String,
    original: Option<Task>,
    content: TaskFormContent,
    assignees: Vec<ProjectMember>,
    cursor: Cursor,
    error_message: Option<String>,
    submitting: bool,
}

impl EditableForm for TaskFormContent {
    fn row_count(&self) -> usize {
        5
    }

    fn text_at(&mut self, row: usize) -> Option<&mut String> {
        match row {
            TITLE_ROW => Some(&mut self.title),
            DESCRIPTION_ROW => Some(&mut self.description),
            DUE_DATE_ROW => Some(&mut self.due_date),
            _ => None,
        }
    }

    fn cycle_choice(&mut self, row: usize, forward: bool) {
        if row == STATUS_ROW {
            let i = self.status.column();
            let len = TaskStatus::ALL.len();
            let next = if forward { (i + 1) % len } else { (i + len - 1) % len };
            self.status = TaskStatus::ALL[next];
        }
    }
}

impl TaskModalState {
    // Opens the dialog and prepares to accept an input for the new task
    pub fn create_a_new_task(&mut self, project_id: &str, assignees: &[ProjectMember]) {
        self.reset();
        self.dialog_active = true;
        self.project_id = project_id.to_string();
        self.assignees = assignees.to_vec();
    }

    // Opens the dialog pre-filled with an existing task
    pub fn edit_task(&mut self, task: &Task, assignees: &[ProjectMember]) {
        self.reset();
        self.dialog_active = true;
        self.project_id = task.project_id.clone();
        self.assignees = assignees.to_vec();
        self.content = TaskFormContent {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            status: task.status,
            due_date: task.due_day().format(DATE_FORMAT).to_string(),
            assignee_id: task.assignee_id.clone(),
        };
        self.cursor.x = self.content.title.chars().count();
        self.original = Some(task.clone());
    }

    pub fn is_editing(&self) -> bool {
        self.original.is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn content(&self) -> &TaskFormContent {
        &self.content
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Closing discards whatever was typed
    pub fn close(&mut self) {
        self.reset();
    }

    fn reset(&mut self) {
        *self = TaskModalState::default();
    }

    pub fn move_cursor_down(&mut self) {
        self.cursor.move_down(&mut self.content);
    }

    pub fn move_cursor_up(&mut self) {
        self.cursor.move_up(&mut self.content);
    }

    // On the assignee row Left/Right walk the project members instead
    pub fn move_cursor_left(&mut self) {
        if self.cursor.y == ASSIGNEE_ROW {
            self.cycle_assignee(false);
        } else {
            self.cursor.move_left(&mut self.content);
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor.y == ASSIGNEE_ROW {
            self.cycle_assignee(true);
        } else {
            self.cursor.move_right(&mut self.content);
        }
    }

    pub fn delete_char(&mut self) {
        self.cursor.delete_char(&mut self.content);
    }

    pub fn input(&mut self, to_insert: char) {
        if self.cursor.y == ASSIGNEE_ROW {
            if to_insert == ' ' {
                self.cycle_assignee(true);
            }
            return;
        }
        self.cursor.insert(&mut self.content, to_insert);
    }

    // Options are "Unassigned" followed by every project member
    fn cycle_assignee(&mut self, forward: bool) {
        let options: Vec<Option<&str>> = std::iter::once(None)
            .chain(self.assignees.iter().map(|m| Some(m.id.as_str())))
            .collect();
        let len = options.len();
        let current = options
            .iter()
            .position(|option| *option == self.content.assignee_id.as_deref())
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.content.assignee_id = options[next].map(str::to_string);
    }

    fn validate(&self) -> Result<NaiveDate, String> {
        if self.content.title.is_empty() || self.content.due_date.is_empty() {
            return Err("Title and Due Date are required".to_string());
        }
        NaiveDate::parse_from_str(self.content.due_date.trim(), DATE_FORMAT)
            .map_err(|_| "Due date should be in format YYYY-MM-DD".to_string())
    }

    fn create_request(&self, due_date: NaiveDate) -> CreateTaskRequest {
        CreateTaskRequest {
            title: self.content.title.clone(),
            description: Some(self.content.description.clone()),
            project_id: self.project_id.clone(),
            assignee_id: self.content.assignee_id.clone(),
            status: Some(self.content.status),
            due_date: start_of_day(due_date),
        }
    }

    /// Creates the task, or sends only the updates the edit requires
    pub async fn submit(&mut self, api: &dyn TrackerApi) -> Submission {
        if !self.dialog_active || self.submitting {
            return Submission::Ignored;
        }
        self.error_message = None;

        let due_date = match self.validate() {
            Ok(due_date) => due_date,
            Err(message) => {
                self.error_message = Some(message);
                return Submission::Rejected;
            }
        };

        self.submitting = true;
        let result = match &self.original {
            Some(task) => {
                let changes = plan_task_changes(task, &self.content, due_date);
                tracing::debug!(task_id = %task.id, changes = changes.len(), "updating task");
                apply_task_changes(api, &task.id, &changes).await
            }
            None => api
                .create_task(&self.create_request(due_date))
                .await
                .map(|task| tracing::info!(task_id = %task.id, "task created")),
        };
        self.submitting = false;

        match result {
            Ok(()) => {
                self.content = TaskFormContent::default();
                self.cursor.reset();
                Submission::Saved
            }
            Err(err) => {
                tracing::error!(error = %err, "task save failed");
                self.error_message = Some(err.user_message("Failed to save task"));
                Submission::Failed
            }
        }
    }

    fn assignee_label(&self) -> String {
        let Some(id) = self.content.assignee_id.as_deref() else {
            return "Unassigned".to_string();
        };
        if let Some(member) = self.assignees.iter().find(|m| m.id == id) {
            return member.email.clone();
        }
        self.original
            .as_ref()
            .and_then(|task| task.assignee.as_ref())
            .filter(|assignee| assignee.id == id)
            .map(|assignee| assignee.email.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn title(&self) -> &'static str {
        match (self.submitting, self.is_editing()) {
            (true, _) => "Saving...",
            (false, true) => "Update Task",
            (false, false) => "Create Task",
        }
    }
}

// Returns the UI content for the task dialog
pub fn get_task_modal_ui(state: &TaskModalState) -> Vec<Line<'_>> {
    let rows = vec![
        FormRow::text("Title:       ", "Task title", &state.content.title),
        FormRow::text("Description: ", "Task description", &state.content.description),
        FormRow::choice("Status:      ", state.content.status.label()),
        FormRow::text("Due date:    ", "2024-01-31", &state.content.due_date),
        FormRow::choice("Assignee:    ", &state.assignee_label()),
    ];

    get_form_ui(
        &rows,
        state.cursor,
        state.error_message(),
        "Enter - save, Esc - cancel, Left/Right - change choice",
    )
}
