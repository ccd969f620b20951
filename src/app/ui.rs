use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{prelude::*, widgets::*};
use std::{
    io,
    time::{Duration, Instant},
};

use crate::api::TrackerApi;
use crate::app::dashboard::{self, DashboardState};
use crate::app::form::Submission;
use crate::app::login::{get_login_ui, LoginState};
use crate::app::models::{TaskStatus, UserRole};
use crate::app::project_details::{self, ProjectDetailsState};
use crate::app::register::{get_register_ui, RegisterState};
use crate::app::session::AuthSession;
use crate::app::task_modal::get_task_modal_ui;

pub enum Screen {
    Login,
    Register,
    Dashboard,
    Project(Box<ProjectDetailsState>),
}

/// Work that needs the network; planned from a key press, then awaited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Register,
    LoadDashboard,
    OpenProject,
    SubmitOrganization,
    SubmitProject,
    RefreshProject,
    SubmitTask,
    SubmitMember,
    ConfirmDelete,
    Quit,
}

impl Action {
    fn busy_label(self) -> &'static str {
        match self {
            Action::Login => "Signing in...",
            Action::Register => "Registering...",
            Action::LoadDashboard | Action::OpenProject | Action::RefreshProject => "Loading...",
            Action::SubmitOrganization | Action::SubmitProject => "Creating...",
            Action::SubmitTask => "Saving...",
            Action::SubmitMember => "Adding...",
            Action::ConfirmDelete => "Deleting...",
            Action::Quit => "",
        }
    }
}

pub struct App<'a> {
    pub session: AuthSession<'a>,
    pub api: &'a dyn TrackerApi,
    pub screen: Screen,
    pub login: LoginState,
    pub register: RegisterState,
    pub dashboard: DashboardState,
    pub busy: Option<&'static str>,
}

impl<'a> App<'a> {
    /// Starts on the dashboard when the session was restored
    pub fn new(session: AuthSession<'a>, api: &'a dyn TrackerApi) -> App<'a> {
        let screen = if session.is_authenticated() {
            Screen::Dashboard
        } else {
            Screen::Login
        };
        App {
            session,
            api,
            screen,
            login: LoginState::default(),
            register: RegisterState::default(),
            dashboard: DashboardState::default(),
            busy: None,
        }
    }

    fn role(&self) -> UserRole {
        self.session.role().unwrap_or(UserRole::Member)
    }

    fn logout(&mut self) {
        self.session.logout();
        self.login.reset();
        self.dashboard = DashboardState::default();
        self.screen = Screen::Login;
    }

    /// Applies local edits directly; returns the network work a key asks for
    pub fn handle_key(&mut self, key: KeyCode) -> Option<Action> {
        match self.screen {
            Screen::Login => self.handle_login_key(key),
            Screen::Register => self.handle_register_key(key),
            Screen::Dashboard => self.handle_dashboard_key(key),
            Screen::Project(_) => self.handle_project_key(key),
        }
    }

    fn handle_login_key(&mut self, key: KeyCode) -> Option<Action> {
        let form = &mut self.login;
        match key {
            KeyCode::Esc => return Some(Action::Quit),
            KeyCode::Enter => return Some(Action::Login),
            KeyCode::Tab => self.screen = Screen::Register,
            KeyCode::Down => form.move_cursor_down(),
            KeyCode::Up => form.move_cursor_up(),
            KeyCode::Left => form.move_cursor_left(),
            KeyCode::Right => form.move_cursor_right(),
            KeyCode::Backspace => form.delete_char(),
            KeyCode::Char(to_insert) => form.input(to_insert),
            _ => {}
        }
        None
    }

    fn handle_register_key(&mut self, key: KeyCode) -> Option<Action> {
        let form = &mut self.register;
        match key {
            KeyCode::Esc => return Some(Action::Quit),
            KeyCode::Enter => return Some(Action::Register),
            KeyCode::Tab => self.screen = Screen::Login,
            KeyCode::Down => form.move_cursor_down(),
            KeyCode::Up => form.move_cursor_up(),
            KeyCode::Left => form.move_cursor_left(),
            KeyCode::Right => form.move_cursor_right(),
            KeyCode::Backspace => form.delete_char(),
            KeyCode::Char(to_insert) => form.input(to_insert),
            _ => {}
        }
        None
    }

    fn handle_project_key(&mut self, key: KeyCode) -> Option<Action> {
        let can_manage = self.session.can_manage();
        let Screen::Project(view) = &mut self.screen else {
            return None;
        };

        if view.task_modal.dialog_active {
            let modal = &mut view.task_modal;
            match key {
                KeyCode::Esc => modal.close(),
                KeyCode::Enter => return Some(Action::SubmitTask),
                KeyCode::Down => modal.move_cursor_down(),
                KeyCode::Up => modal.move_cursor_up(),
                KeyCode::Left => modal.move_cursor_left(),
                KeyCode::Right => modal.move_cursor_right(),
                KeyCode::Backspace => modal.delete_char(),
                KeyCode::Char(to_insert) => modal.input(to_insert),
                _ => {}
            }
        } else if view.add_member_modal.is_active() {
            let modal = &mut view.add_member_modal;
            match key {
                KeyCode::Esc => modal.close(),
                KeyCode::Enter => return Some(Action::SubmitMember),
                KeyCode::Down => modal.next(),
                KeyCode::Up => modal.previous(),
                _ => {}
            }
        } else if view.pending_delete().is_some() {
            match key {
                KeyCode::Char('y') => return Some(Action::ConfirmDelete),
                KeyCode::Char('n') | KeyCode::Esc => view.cancel_delete(),
                _ => {}
            }
        } else {
            match key {
                KeyCode::Char('q') => return Some(Action::Quit),
                KeyCode::Esc | KeyCode::Backspace => return Some(Action::LoadDashboard),
                KeyCode::Char('r') => return Some(Action::RefreshProject),
                KeyCode::Left => view.previous_column(),
                KeyCode::Right => view.next_column(),
                KeyCode::Down => view.next_task(),
                KeyCode::Up => view.previous_task(),
                KeyCode::Char('a') if can_manage => view.open_create_task(),
                KeyCode::Char('e') if can_manage => view.open_edit_task(),
                KeyCode::Char('x') if can_manage => view.request_delete(),
                KeyCode::Char('m') if can_manage => view.open_add_member(),
                _ => {}
            }
        }
        None
    }

    fn handle_dashboard_key(&mut self, key: KeyCode) -> Option<Action> {
        let can_manage = self.session.can_manage();
        let dashboard = &mut self.dashboard;
        if dashboard.organization_modal.dialog.is_active()
            || dashboard.project_modal.dialog.is_active()
        {
            let creating_organization = dashboard.organization_modal.dialog.is_active();
            let dialog = if creating_organization {
                &mut dashboard.organization_modal.dialog
            } else {
                &mut dashboard.project_modal.dialog
            };
            match key {
                KeyCode::Esc => dialog.close(),
                KeyCode::Enter if creating_organization => return Some(Action::SubmitOrganization),
                KeyCode::Enter => return Some(Action::SubmitProject),
                KeyCode::Left => dialog.move_cursor_left(),
                KeyCode::Right => dialog.move_cursor_right(),
                KeyCode::Backspace => dialog.delete_char(),
                KeyCode::Char(to_insert) => dialog.input(to_insert),
                _ => {}
            }
            return None;
        }

        match key {
            KeyCode::Char('q') => return Some(Action::Quit),
            KeyCode::Char('r') => return Some(Action::LoadDashboard),
            KeyCode::Enter => return Some(Action::OpenProject),
            KeyCode::Down => dashboard.projects.next(),
            KeyCode::Up => dashboard.projects.previous(),
            KeyCode::Left => dashboard.projects.unselect(),
            KeyCode::Char('o') if can_manage => dashboard.organization_modal.dialog.open(),
            KeyCode::Char('p') if can_manage => dashboard.project_modal.dialog.open(),
            KeyCode::Char('l') => self.logout(),
            _ => {}
        }
        None
    }

    /// Runs a planned action; returns false when the app should exit
    pub async fn perform(&mut self, action: Action) -> bool {
        let api = self.api;
        match action {
            Action::Quit => return false,
            Action::Login => {
                if self.login.submit(&mut self.session, api).await == Submission::Saved {
                    self.screen = Screen::Dashboard;
                    self.dashboard.load(api).await;
                }
            }
            Action::Register => {
                if self.register.submit(&mut self.session, api).await == Submission::Saved {
                    self.screen = Screen::Dashboard;
                    self.dashboard.load(api).await;
                }
            }
            Action::LoadDashboard => {
                self.screen = Screen::Dashboard;
                self.dashboard.load(api).await;
            }
            Action::OpenProject => {
                if let Some(project) = self.dashboard.selected_project().cloned() {
                    let mut view = ProjectDetailsState::new(project);
                    view.load(api).await;
                    self.screen = Screen::Project(Box::new(view));
                }
            }
            Action::SubmitOrganization => {
                self.dashboard.submit_organization(api).await;
            }
            Action::SubmitProject => {
                let organization_id = self
                    .session
                    .user()
                    .map(|user| user.organization_id.clone())
                    .unwrap_or_default();
                self.dashboard.submit_project(api, &organization_id).await;
            }
            Action::RefreshProject
            | Action::SubmitTask
            | Action::SubmitMember
            | Action::ConfirmDelete => {
                if let Screen::Project(view) = &mut self.screen {
                    match action {
                        Action::RefreshProject => view.load(api).await,
                        Action::SubmitTask => {
                            view.submit_task(api).await;
                        }
                        Action::SubmitMember => {
                            view.submit_member(api).await;
                        }
                        _ => view.confirm_delete(api).await,
                    }
                }
            }
        }
        true
    }
}

pub async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App<'_>,
    tick_rate: Duration,
) -> io::Result<()> {
    if matches!(app.screen, Screen::Dashboard) {
        app.busy = Some(Action::LoadDashboard.busy_label());
        terminal.draw(|f| draw_ui(f, &mut app))?;
        app.perform(Action::LoadDashboard).await;
        app.busy = None;
    }

    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|f| draw_ui(f, &mut app))?;
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());

        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = app.handle_key(key.code) {
                        // Draw the busy marker before suspending on the network
                        app.busy = Some(action.busy_label());
                        terminal.draw(|f| draw_ui(f, &mut app))?;
                        let keep_running = app.perform(action).await;
                        app.busy = None;
                        if !keep_running {
                            return Ok(());
                        }
                    }
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    }
}

// Draws the whole user interface
fn draw_ui(f: &mut Frame, app: &mut App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(f.size());

    let role = app.role();
    match &mut app.screen {
        Screen::Login => draw_form(f, outer[0], "Login", get_login_ui(&app.login)),
        Screen::Register => draw_form(f, outer[0], "Register", get_register_ui(&app.register)),
        Screen::Dashboard => draw_dashboard(f, outer[0], &mut app.dashboard, &app.session, role),
        Screen::Project(view) => draw_project(f, outer[0], view, role),
    }

    let status = Paragraph::new(app.busy.unwrap_or("")).style(Style::new().yellow());
    f.render_widget(status, outer[1]);
}

fn draw_form(f: &mut Frame, area: Rect, title: &str, lines: Vec<Line>) {
    let form = Paragraph::new(lines)
        .block(Block::new().title(title).borders(Borders::ALL))
        .style(Style::new().white());
    f.render_widget(form, area);
}

fn draw_dashboard(
    f: &mut Frame,
    area: Rect,
    dashboard: &mut DashboardState,
    session: &AuthSession,
    role: UserRole,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(3)])
        .split(area);

    if let Some(user) = session.user() {
        let header = Paragraph::new(dashboard::get_user_info_ui(user))
            .block(Block::new().title("Dashboard").borders(Borders::ALL));
        f.render_widget(header, rows[0]);
    }

    // Create two chunks of screen in 60-40 ratio
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    // DRAW LEFT PART
    match &dashboard.error {
        Some(error) => {
            let error = Paragraph::new(error.as_str())
                .style(Style::new().red())
                .block(Block::default().borders(Borders::ALL).title("Projects"));
            f.render_widget(error, chunks[0]);
        }
        None => {
            let projects = List::new(dashboard::get_project_items_ui(&dashboard.projects.items))
                .block(Block::default().borders(Borders::ALL).title("Projects"))
                .highlight_style(
                    Style::default()
                        .bg(Color::LightGreen)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol(">> ");
            f.render_stateful_widget(projects, chunks[0], &mut dashboard.projects.state);
        }
    }

    // DRAW RIGHT PART
    if dashboard.organization_modal.dialog.is_active() {
        let dialog = Paragraph::new(dashboard.organization_modal.ui())
            .block(Block::new().title("Create Organization").borders(Borders::ALL));
        f.render_widget(dialog, chunks[1]);
    } else if dashboard.project_modal.dialog.is_active() {
        let dialog = Paragraph::new(dashboard.project_modal.ui())
            .block(Block::new().title("Create Project").borders(Borders::ALL));
        f.render_widget(dialog, chunks[1]);
    } else {
        let right_side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        let members = Paragraph::new(dashboard::get_member_lines_ui(&dashboard.members))
            .block(Block::new().title("Organization Members").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        let instructions = Paragraph::new(dashboard::get_instructions_ui(role))
            .block(Block::new().title("Commands").borders(Borders::ALL));

        f.render_widget(members, right_side[0]);
        f.render_widget(instructions, right_side[1]);
    }
}

fn draw_project(f: &mut Frame, area: Rect, view: &mut ProjectDetailsState, role: UserRole) {
    let title = format!("Project: {}", view.project.name);
    if let Some(error) = &view.error {
        let error = Paragraph::new(vec![
            Line::from(Span::styled(error.as_str(), Style::new().red())),
            Line::from(""),
            Line::from("r - retry, Esc - back to dashboard"),
        ])
        .block(Block::new().title(title).borders(Borders::ALL));
        f.render_widget(error, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(66), Constraint::Percentage(34)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[0]);

    for (i, status) in TaskStatus::ALL.iter().enumerate() {
        let tasks = view.column_tasks(*status);
        let mut border = Style::default();
        if i == view.column {
            border = border.fg(Color::LightGreen);
        }
        let list = List::new(project_details::get_column_items_ui(
            &tasks,
            role.can_manage(),
        ))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(project_details::get_column_title(*status, tasks.len())),
        )
        .highlight_style(Style::default().bg(Color::LightGreen).add_modifier(Modifier::BOLD));

        let mut state = ListState::default();
        if i == view.column {
            state.select(view.selected_row(i));
        }
        f.render_stateful_widget(list, columns[i], &mut state);
    }

    // DRAW RIGHT PART
    if view.task_modal.dialog_active {
        let dialog = Paragraph::new(get_task_modal_ui(&view.task_modal))
            .block(Block::new().title(view.task_modal.title()).borders(Borders::ALL))
            .style(Style::new().white());
        f.render_widget(dialog, chunks[1]);
    } else if view.add_member_modal.is_active() {
        let dialog = Paragraph::new(view.add_member_modal.ui())
            .block(Block::new().title("Add Member").borders(Borders::ALL))
            .style(Style::new().white());
        f.render_widget(dialog, chunks[1]);
    } else if let Some(task) = view.pending_delete() {
        let confirm = Paragraph::new(vec![
            Line::from("Are you sure you want to delete this task?"),
            Line::from(Span::styled(task.title.as_str(), Style::new().bold())),
            Line::from(""),
            Line::from("y - delete, n - keep"),
        ])
        .block(Block::new().title("Delete Task").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
        f.render_widget(confirm, chunks[1]);
    } else {
        let right_side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        let statistics = Paragraph::new(project_details::get_statistics_ui(view))
            .block(Block::new().title(title).borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        let instructions = Paragraph::new(project_details::get_instructions_ui(role))
            .block(Block::new().title("Commands").borders(Borders::ALL));

        f.render_widget(statistics, right_side[0]);
        f.render_widget(instructions, right_side[1]);
    }
}
