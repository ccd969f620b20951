use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::ListItem;

use crate::api::TrackerApi;
use crate::app::form::Submission;
use crate::app::item_list::ItemList;
use crate::app::modals::{CreateOrganizationModal, CreateProjectModal};
use crate::app::models::{OrganizationUser, Project, User, UserRole};

/// Landing screen: the caller's projects and organization members
#[derive(Default)]
pub struct DashboardState {
    pub projects: ItemList<Project>,
    pub members: Vec<OrganizationUser>,
    pub error: Option<String>,
    pub organization_modal: CreateOrganizationModal,
    pub project_modal: CreateProjectModal,
}

impl DashboardState {
    pub fn dialog_active(&self) -> bool {
        self.organization_modal.dialog.is_active() || self.project_modal.dialog.is_active()
    }

    /// Fetches projects and members side by side. Only a project failure
    /// is shown; a member failure just leaves that panel empty.
    pub async fn load(&mut self, api: &dyn TrackerApi) {
        let (projects, members) =
            tokio::join!(api.get_user_projects(), api.get_organization_users());

        match projects {
            Ok(projects) => {
                self.error = None;
                self.projects.set_items(projects);
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to fetch projects");
                self.error = Some(err.user_message("Failed to fetch projects"));
                self.projects.clear();
            }
        }

        match members {
            Ok(members) => self.members = members,
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch organization members");
                self.members.clear();
            }
        }
    }

    pub fn selected_project(&self) -> Option<&Project> {
        if self.error.is_some() {
            return None;
        }
        self.projects.get_selected()
    }

    pub async fn submit_organization(&mut self, api: &dyn TrackerApi) -> Submission {
        let outcome = self.organization_modal.submit(api).await;
        if outcome == Submission::Saved {
            self.load(api).await;
            self.organization_modal.dialog.close();
        }
        outcome
    }

    pub async fn submit_project(&mut self, api: &dyn TrackerApi, organization_id: &str) -> Submission {
        let outcome = self.project_modal.submit(api, organization_id).await;
        if outcome == Submission::Saved {
            self.load(api).await;
            self.project_modal.dialog.close();
        }
        outcome
    }
}

// Build the UI (lines) for the signed-in user header
pub fn get_user_info_ui(user: &User) -> Vec<Line<'_>> {
    vec![
        Line::from(vec![Span::from("Email: "), Span::from(user.email.as_str()).bold()]),
        Line::from(vec![
            Span::from("Role: "),
            Span::from(user.role.label()).fg(match user.role {
                UserRole::Admin => Color::Yellow,
                UserRole::Member => Color::White,
            }),
        ]),
        Line::from(format!("Organization: {}", user.organization_id)),
        Line::from(format!("User ID: {}", user.id)),
    ]
}

// Build the UI (list) for the project list
pub fn get_project_items_ui(projects: &[Project]) -> Vec<ListItem<'_>> {
    projects
        .iter()
        .map(|project| {
            ListItem::new(vec![
                Line::from(project.name.as_str()),
                Line::from(Span::styled(
                    format!("    Created: {}", project.created_at.format("%d.%m.%Y")),
                    Style::default().fg(Color::Gray),
                )),
            ])
            .style(Style::default().fg(Color::White))
        })
        .collect()
}

// Build the UI (lines) for the organization member panel
pub fn get_member_lines_ui(members: &[OrganizationUser]) -> Vec<Line<'_>> {
    if members.is_empty() {
        return vec![Line::from(Span::styled(
            "No members to show",
            Style::default().fg(Color::Gray),
        ))];
    }
    members
        .iter()
        .map(|member| Line::from(format!("{} ({})", member.email, member.role.label())))
        .collect()
}

// Build the UI (lines) for the command help; creation is Admin-only
pub fn get_instructions_ui<'a>(role: UserRole) -> Vec<Line<'a>> {
    let mut lines: Vec<Line> = vec![
        "Up/Down - select project".into(),
        "Enter - open project".into(),
        "r - refresh".into(),
    ];
    match role {
        UserRole::Admin => {
            lines.push("o - create organization".into());
            lines.push("p - create project".into());
        }
        UserRole::Member => {}
    }
    lines.push("l - logout".into());
    lines.push("q - quit".into());
    lines
}
