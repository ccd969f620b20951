// Small dialogs opened from the dashboard and the project view.
// Each one validates locally, calls a single endpoint and reports a Submission.
use std::collections::HashSet;
use std::future::Future;

use ratatui::text::Line;

use crate::api::TrackerApi;
use crate::app::form::{get_form_ui, Cursor, EditableForm, FormRow, Submission};
use crate::app::models::{OrganizationUser, ProjectMember};
use crate::error::ApiError;

struct NameField(String);

impl EditableForm for NameField {
    fn row_count(&self) -> usize {
        1
    }

    fn text_at(&mut self, _row: usize) -> Option<&mut String> {
        Some(&mut self.0)
    }
}

/// Single-field dialog shared by the organization and project dialogs
#[derive(Default)]
pub struct NameDialogState {
    active: bool,
    name: String,
    cursor: Cursor,
    error_message: Option<String>,
    submitting: bool,
}

impl NameDialogState {
    pub fn open(&mut self) {
        *self = NameDialogState {
            active: true,
            ..NameDialogState::default()
        };
    }

    pub fn close(&mut self) {
        *self = NameDialogState::default();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn move_cursor_left(&mut self) {
        self.edit(|cursor, field| cursor.move_left(field));
    }

    pub fn move_cursor_right(&mut self) {
        self.edit(|cursor, field| cursor.move_right(field));
    }

    pub fn delete_char(&mut self) {
        self.edit(|cursor, field| cursor.delete_char(field));
    }

    pub fn input(&mut self, to_insert: char) {
        self.edit(|cursor, field| cursor.insert(field, to_insert));
    }

    fn edit(&mut self, apply: impl FnOnce(&mut Cursor, &mut NameField)) {
        let mut field = NameField(std::mem::take(&mut self.name));
        apply(&mut self.cursor, &mut field);
        self.name = field.0;
    }

    // Submit is ignored while closed or already in flight
    fn accepts_submit(&mut self) -> bool {
        if !self.active || self.submitting {
            return false;
        }
        self.error_message = None;
        true
    }

    fn reject(&mut self, message: &str) -> Submission {
        self.error_message = Some(message.to_string());
        Submission::Rejected
    }

    // Awaits the call with the bookkeeping every name dialog shares
    async fn run<F, T>(&mut self, default_error: &str, call: F) -> Submission
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        self.submitting = true;
        let result = call.await;
        self.submitting = false;
        match result {
            Ok(_) => {
                self.name.clear();
                self.cursor.reset();
                Submission::Saved
            }
            Err(err) => {
                tracing::warn!(error = %err, "{default_error}");
                self.error_message = Some(err.user_message(default_error));
                Submission::Failed
            }
        }
    }

    fn ui<'a>(&'a self, prefix: &str, placeholder: &str, help: &'a str) -> Vec<Line<'a>> {
        let rows = vec![FormRow::text(prefix, placeholder, &self.name)];
        get_form_ui(&rows, self.cursor, self.error_message.as_deref(), help)
    }
}

#[derive(Default)]
pub struct CreateOrganizationModal {
    pub dialog: NameDialogState,
}

impl CreateOrganizationModal {
    pub async fn submit(&mut self, api: &dyn TrackerApi) -> Submission {
        if !self.dialog.accepts_submit() {
            return Submission::Ignored;
        }
        if self.dialog.name.chars().count() < 2 {
            return self
                .dialog
                .reject("Organization name must be at least 2 characters long");
        }

        let name = self.dialog.name.clone();
        self.dialog
            .run("Failed to create organization", async {
                let organization = api.create_organization(&name).await?;
                tracing::info!(organization_id = %organization.id, "organization created");
                Ok::<_, ApiError>(organization)
            })
            .await
    }

    pub fn ui(&self) -> Vec<Line<'_>> {
        self.dialog.ui(
            "Organization Name: ",
            "Enter organization name",
            "Enter - create, Esc - cancel",
        )
    }
}

#[derive(Default)]
pub struct CreateProjectModal {
    pub dialog: NameDialogState,
}

impl CreateProjectModal {
    /// The project lands in the caller's organization
    pub async fn submit(&mut self, api: &dyn TrackerApi, organization_id: &str) -> Submission {
        if !self.dialog.accepts_submit() {
            return Submission::Ignored;
        }
        if self.dialog.name.is_empty() {
            return self.dialog.reject("Project name is required");
        }

        let name = self.dialog.name.clone();
        self.dialog
            .run("Failed to create project", async {
                let project = api.create_project(&name, organization_id).await?;
                tracing::info!(project_id = %project.id, "project created");
                Ok::<_, ApiError>(project)
            })
            .await
    }

    pub fn ui(&self) -> Vec<Line<'_>> {
        self.dialog.ui(
            "Project Name: ",
            "Enter project name",
            "Enter - create, Esc - cancel",
        )
    }
}

/// Organization users that are not yet members of the project
pub fn available_users<'a>(
    organization_users: &'a [OrganizationUser],
    members: &[ProjectMember],
) -> Vec<&'a OrganizationUser> {
    let member_ids: HashSet<&str> = members.iter().map(|m| m.id.as_str()).collect();
    organization_users
        .iter()
        .filter(|user| !member_ids.contains(user.id.as_str()))
        .collect()
}

#[derive(Default)]
pub struct AddMemberModal {
    active: bool,
    project_id: String,
    candidates: Vec<OrganizationUser>,
    selected: Option<usize>,
    error_message: Option<String>,
    submitting: bool,
}

impl AddMemberModal {
    pub fn open(
        &mut self,
        project_id: &str,
        organization_users: &[OrganizationUser],
        members: &[ProjectMember],
    ) {
        *self = AddMemberModal {
            active: true,
            project_id: project_id.to_string(),
            candidates: available_users(organization_users, members)
                .into_iter()
                .cloned()
                .collect(),
            ..AddMemberModal::default()
        };
    }

    pub fn close(&mut self) {
        *self = AddMemberModal::default();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn candidates(&self) -> &[OrganizationUser] {
        &self.candidates
    }

    pub fn selected_user(&self) -> Option<&OrganizationUser> {
        self.selected.and_then(|i| self.candidates.get(i))
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Submit is disabled while nobody is left to add or a request is in flight
    pub fn can_submit(&self) -> bool {
        !self.candidates.is_empty() && !self.submitting
    }

    pub fn next(&mut self) {
        if self.candidates.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) if i + 1 < self.candidates.len() => i + 1,
            _ => 0,
        });
    }

    pub fn previous(&mut self) {
        if self.candidates.is_empty() {
            return;
        }
        let last = self.candidates.len() - 1;
        self.selected = Some(match self.selected {
            Some(0) | None => last,
            Some(i) => i - 1,
        });
    }

    pub async fn submit(&mut self, api: &dyn TrackerApi) -> Submission {
        if !self.active || !self.can_submit() {
            return Submission::Ignored;
        }
        self.error_message = None;

        let Some(user_id) = self.selected_user().map(|user| user.id.clone()) else {
            self.error_message = Some("Please select a user".to_string());
            return Submission::Rejected;
        };

        self.submitting = true;
        let result = api.add_user_to_project(&self.project_id, &user_id).await;
        self.submitting = false;

        match result {
            Ok(()) => {
                tracing::info!(project_id = %self.project_id, %user_id, "member added");
                self.selected = None;
                Submission::Saved
            }
            Err(err) => {
                tracing::warn!(error = %err, "adding member failed");
                self.error_message = Some(err.user_message("Failed to add member"));
                Submission::Failed
            }
        }
    }

    pub fn ui(&self) -> Vec<Line<'_>> {
        let mut lines: Vec<Line> = Vec::new();
        if self.candidates.is_empty() {
            lines.push(Line::raw("All organization members are already in this project."));
        } else {
            lines.push(Line::raw("Select User *"));
            for (i, user) in self.candidates.iter().enumerate() {
                let marker = if self.selected == Some(i) { ">> " } else { "   " };
                lines.push(Line::raw(format!(
                    "{marker}{} ({})",
                    user.email,
                    user.role.label()
                )));
            }
        }
        lines.push(Line::raw(""));
        if let Some(error_message) = &self.error_message {
            lines.push(Line::styled(
                error_message.as_str(),
                ratatui::style::Style::new().fg(ratatui::style::Color::Red),
            ));
            lines.push(Line::raw(""));
        }
        lines.push(Line::raw(if self.can_submit() {
            "Up/Down - choose, Enter - add member, Esc - cancel"
        } else {
            "Esc - close"
        }));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{member, org_user, FakeApi};

    fn type_name(modal: &mut CreateOrganizationModal, name: &str) {
        for c in name.chars() {
            modal.dialog.input(c);
        }
    }

    #[tokio::test]
    async fn organization_name_needs_two_chars() {
        let api = FakeApi::default();
        let mut modal = CreateOrganizationModal::default();
        modal.dialog.open();
        type_name(&mut modal, "A");

        assert_eq!(modal.submit(&api).await, Submission::Rejected);
        assert_eq!(
            modal.dialog.error_message(),
            Some("Organization name must be at least 2 characters long")
        );
        assert!(api.calls().is_empty());

        modal.dialog.input('c');
        assert_eq!(modal.submit(&api).await, Submission::Saved);
        assert_eq!(api.state().created_organizations, vec!["Ac".to_string()]);
        assert_eq!(modal.dialog.name(), "");
        assert_eq!(modal.dialog.error_message(), None);
    }

    #[tokio::test]
    async fn organization_failure_shows_server_message() {
        let api = FakeApi::default();
        api.fail_with_message("create_organization", 409, "Organization already exists");
        let mut modal = CreateOrganizationModal::default();
        modal.dialog.open();
        type_name(&mut modal, "Acme");

        assert_eq!(modal.submit(&api).await, Submission::Failed);
        assert_eq!(modal.dialog.error_message(), Some("Organization already exists"));
        assert_eq!(modal.dialog.name(), "Acme");
    }

    #[tokio::test]
    async fn project_requires_name_and_uses_organization() {
        let api = FakeApi::default();
        let mut modal = CreateProjectModal::default();
        modal.dialog.open();

        assert_eq!(modal.submit(&api, "org-1").await, Submission::Rejected);
        assert_eq!(modal.dialog.error_message(), Some("Project name is required"));

        modal.dialog.input('Q');
        modal.dialog.input('3');
        assert_eq!(modal.submit(&api, "org-1").await, Submission::Saved);
        assert_eq!(
            api.state().created_projects,
            vec![("Q3".to_string(), "org-1".to_string())]
        );
    }

    #[tokio::test]
    async fn project_failure_falls_back_to_default_message() {
        let api = FakeApi::default();
        api.fail("create_project", 500);
        let mut modal = CreateProjectModal::default();
        modal.dialog.open();
        modal.dialog.input('X');

        assert_eq!(modal.submit(&api, "org-1").await, Submission::Failed);
        assert_eq!(modal.dialog.error_message(), Some("Failed to create project"));
    }

    #[test]
    fn closing_clears_typed_name() {
        let mut modal = CreateProjectModal::default();
        modal.dialog.open();
        modal.dialog.input('Z');
        modal.dialog.close();
        assert!(!modal.dialog.is_active());
        assert_eq!(modal.dialog.name(), "");
    }

    #[test]
    fn available_users_is_set_difference_by_id() {
        let org = vec![
            org_user("u1", "a@example.com"),
            org_user("u2", "b@example.com"),
            org_user("u3", "c@example.com"),
        ];
        let members = vec![member("u2", "b@example.com"), member("u9", "gone@example.com")];
        let ids: Vec<&str> = available_users(&org, &members)
            .iter()
            .map(|u| u.id.as_str())
            .collect();
        assert_eq!(ids, vec!["u1", "u3"]);
    }

    #[tokio::test]
    async fn add_member_is_disabled_when_everyone_is_a_member() {
        let api = FakeApi::default();
        let org = vec![org_user("u1", "a@example.com")];
        let members = vec![member("u1", "a@example.com")];
        let mut modal = AddMemberModal::default();
        modal.open("p1", &org, &members);

        assert!(!modal.can_submit());
        modal.next();
        assert_eq!(modal.submit(&api).await, Submission::Ignored);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn add_member_requires_selection_then_adds() {
        let api = FakeApi::default();
        let org = vec![org_user("u1", "a@example.com"), org_user("u2", "b@example.com")];
        let members = vec![member("u1", "a@example.com")];
        let mut modal = AddMemberModal::default();
        modal.open("p1", &org, &members);
        assert!(modal.can_submit());

        assert_eq!(modal.submit(&api).await, Submission::Rejected);
        assert_eq!(modal.error_message(), Some("Please select a user"));

        modal.next();
        assert_eq!(modal.selected_user().map(|u| u.id.as_str()), Some("u2"));
        assert_eq!(modal.submit(&api).await, Submission::Saved);
        assert_eq!(
            api.state().added_members,
            vec![("p1".to_string(), "u2".to_string())]
        );
        assert_eq!(modal.selected_user(), None);
    }

    #[tokio::test]
    async fn duplicate_membership_error_is_shown_generically() {
        let api = FakeApi::default();
        api.fail("add_user_to_project", 409);
        let mut modal = AddMemberModal::default();
        modal.open("p1", &[org_user("u1", "a@example.com")], &[]);
        modal.previous();

        assert_eq!(modal.submit(&api).await, Submission::Failed);
        assert_eq!(modal.error_message(), Some("Failed to add member"));
    }
}
