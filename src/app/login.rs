use ratatui::text::Line;

use crate::api::TrackerApi;
use crate::app::form::{get_form_ui, Cursor, EditableForm, FormRow, Submission};
use crate::app::session::AuthSession;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl EditableForm for LoginForm {
    fn row_count(&self) -> usize {
        2
    }

    fn text_at(&mut self, row: usize) -> Option<&mut String> {
        match row {
            0 => Some(&mut self.email),
            1 => Some(&mut self.password),
            _ => None,
        }
    }
}

#[derive(Default)]
pub struct LoginState {
    pub form: LoginForm,
    cursor: Cursor,
    error_message: Option<String>,
    submitting: bool,
}

impl LoginState {
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn reset(&mut self) {
        *self = LoginState::default();
    }

    pub fn move_cursor_down(&mut self) {
        self.cursor.move_down(&mut self.form);
    }

    pub fn move_cursor_up(&mut self) {
        self.cursor.move_up(&mut self.form);
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor.move_left(&mut self.form);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor.move_right(&mut self.form);
    }

    pub fn delete_char(&mut self) {
        self.cursor.delete_char(&mut self.form);
    }

    pub fn input(&mut self, to_insert: char) {
        self.cursor.insert(&mut self.form, to_insert);
    }

    pub async fn submit(
        &mut self,
        session: &mut AuthSession<'_>,
        api: &dyn TrackerApi,
    ) -> Submission {
        if self.submitting {
            return Submission::Ignored;
        }
        self.error_message = None;

        if self.form.email.is_empty() || self.form.password.is_empty() {
            self.error_message = Some("Please enter email and password".to_string());
            return Submission::Rejected;
        }

        self.submitting = true;
        let result = session
            .login(api, &self.form.email, &self.form.password)
            .await;
        self.submitting = false;

        match result {
            Ok(()) => {
                self.reset();
                Submission::Saved
            }
            Err(err) => {
                tracing::warn!(error = %err, "login failed");
                self.error_message =
                    Some(err.user_message("Login failed. Please check your credentials."));
                self.form.password.clear();
                Submission::Failed
            }
        }
    }
}

pub fn get_login_ui(state: &LoginState) -> Vec<Line<'_>> {
    let rows = vec![
        FormRow::text("Email:    ", "Enter your email", &state.form.email),
        FormRow::secret("Password: ", "Enter your password", &state.form.password),
    ];
    get_form_ui(
        &rows,
        state.cursor,
        state.error_message(),
        if state.submitting {
            "Signing in..."
        } else {
            "Enter - login, Tab - register, Esc - quit"
        },
    )
}
