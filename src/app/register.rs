// Sign-up screen. Input is checked locally, in a fixed order, before anything is sent.
use std::sync::LazyLock;

use derivative::Derivative;
use ratatui::text::Line;
use regex::Regex;

use crate::api::TrackerApi;
use crate::app::form::{get_form_ui, Cursor, EditableForm, FormRow, Submission};
use crate::app::models::UserRole;
use crate::app::session::AuthSession;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

const ROLE_ROW: usize = 3;

#[derive(Debug, Clone, PartialEq, Derivative)]
#[derivative(Default)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub organization_id: String,
    #[derivative(Default(value = "UserRole::Member"))]
    pub role: UserRole,
}

impl EditableForm for RegisterForm {
    fn row_count(&self) -> usize {
        4
    }

    fn text_at(&mut self, row: usize) -> Option<&mut String> {
        match row {
            0 => Some(&mut self.email),
            1 => Some(&mut self.password),
            2 => Some(&mut self.organization_id),
            _ => None,
        }
    }

    fn cycle_choice(&mut self, row: usize, _forward: bool) {
        if row == ROLE_ROW {
            self.role = match self.role {
                UserRole::Member => UserRole::Admin,
                UserRole::Admin => UserRole::Member,
            };
        }
    }
}

// At least six characters with one letter and one digit
fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= 6
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

impl RegisterForm {
    /// First failing rule wins
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.email.is_empty() || self.password.is_empty() || self.organization_id.is_empty() {
            return Err("Please fill in all required fields");
        }
        if !EMAIL_RE.is_match(&self.email) {
            return Err("Please enter a valid email address");
        }
        if !is_valid_password(&self.password) {
            return Err(
                "Password must be at least 6 characters long and contain at least one letter and one number",
            );
        }
        if !UUID_RE.is_match(&self.organization_id) {
            return Err("Please enter a valid Organization ID (UUID format)");
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RegisterState {
    pub form: RegisterForm,
    cursor: Cursor,
    error_message: Option<String>,
    submitting: bool,
}

impl RegisterState {
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn reset(&mut self) {
        *self = RegisterState::default();
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

    /// On `Saved` the session is authenticated and the caller moves to the dashboard
    pub async fn submit(
        &mut self,
        session: &mut AuthSession<'_>,
        api: &dyn TrackerApi,
    ) -> Submission {
        if self.submitting {
            return Submission::Ignored;
        }
        self.error_message = None;

        if let Err(message) = self.form.validate() {
            self.error_message = Some(message.to_string());
            return Submission::Rejected;
        }

        self.submitting = true;
        let result = session
            .register(
                api,
                &self.form.email,
                &self.form.password,
                &self.form.organization_id,
                Some(self.form.role),
            )
            .await;
        self.submitting = false;

        match result {
            Ok(()) => {
                self.reset();
                Submission::Saved
            }
            Err(err) => {
                tracing::warn!(error = %err, "registration failed");
                self.error_message = Some(err.user_message("Registration failed. Please try again."));
                Submission::Failed
            }
        }
    }
}

pub fn get_register_ui(state: &RegisterState) -> Vec<Line<'_>> {
    let rows = vec![
        FormRow::text("Email *:           ", "Enter your email", &state.form.email),
        FormRow::secret(
            "Password *:        ",
            "Min 6 chars, 1 letter, 1 number",
            &state.form.password,
        ),
        FormRow::text(
            "Organization ID *: ",
            "Enter organization UUID",
            &state.form.organization_id,
        ),
        FormRow::choice("Role:              ", state.form.role.label()),
    ];
    get_form_ui(
        &rows,
        state.cursor,
        state.error_message(),
        if state.submitting {
            "Registering..."
        } else {
            "Enter - register, Tab - back to login, Esc - quit"
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BearerToken;
    use crate::app::storage::Storage;
    use crate::testing::FakeApi;

    const ORG_ID: &str = "4b4f5c3e-8a7d-4f7e-9a36-2c1d0e9f8a11";

    fn form(email: &str, password: &str, organization_id: &str) -> RegisterForm {
        RegisterForm {
            email: email.into(),
            password: password.into(),
            organization_id: organization_id.into(),
            role: UserRole::Member,
        }
    }

    #[test]
    fn missing_fields_fail_first() {
        // Every other rule is broken too; the required check still wins
        let result = form("", "x", "nope").validate();
        assert_eq!(result, Err("Please fill in all required fields"));
    }

    #[test]
    fn email_is_checked_before_password() {
        let result = form("not-an-email", "short", "nope").validate();
        assert_eq!(result, Err("Please enter a valid email address"));
    }

    #[test]
    fn password_is_checked_before_organization_id() {
        for password in ["abc12", "abcdefg", "1234567"] {
            let result = form("dev@example.com", password, "nope").validate();
            assert_eq!(
                result,
                Err("Password must be at least 6 characters long and contain at least one letter and one number"),
                "password {password:?}"
            );
        }
    }

    #[test]
    fn organization_id_must_be_canonical_uuid() {
        let result = form("dev@example.com", "abc123", "4b4f5c3e8a7d4f7e9a362c1d0e9f8a11").validate();
        assert_eq!(result, Err("Please enter a valid Organization ID (UUID format)"));

        let upper = ORG_ID.to_uppercase();
        assert_eq!(form("dev@example.com", "abc123!", &upper).validate(), Ok(()));
    }

    #[test]
    fn email_shape_requires_domain_dot() {
        assert!(form("a@b", "abc123", ORG_ID).validate().is_err());
        assert!(form("a b@c.d", "abc123", ORG_ID).validate().is_err());
        assert!(form("a@b.c", "abc123", ORG_ID).validate().is_ok());
    }

    #[tokio::test]
    async fn valid_input_registers_exactly_once() {
        let storage = Storage::in_memory().unwrap();
        let api = FakeApi::default();
        let mut session = AuthSession::new(&storage, BearerToken::default());
        let mut state = RegisterState {
            form: RegisterForm {
                role: UserRole::Admin,
                ..form("dev@example.com", "abc123", ORG_ID)
            },
            ..RegisterState::default()
        };

        assert_eq!(state.submit(&mut session, &api).await, Submission::Saved);
        assert!(session.is_authenticated());
        assert_eq!(api.calls(), vec!["register"]);
        let registered = &api.state().registered[0];
        assert_eq!(registered.organization_id, ORG_ID);
        assert_eq!(registered.role, Some(UserRole::Admin));
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_the_server() {
        let storage = Storage::in_memory().unwrap();
        let api = FakeApi::default();
        let mut session = AuthSession::new(&storage, BearerToken::default());
        let mut state = RegisterState {
            form: form("dev@example.com", "abcdef", ORG_ID),
            ..RegisterState::default()
        };

        assert_eq!(state.submit(&mut session, &api).await, Submission::Rejected);
        assert!(api.calls().is_empty());
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn server_rejection_is_shown_inline() {
        let storage = Storage::in_memory().unwrap();
        let api = FakeApi::default();
        api.fail_with_message("register", 404, "Organization not found");
        let mut session = AuthSession::new(&storage, BearerToken::default());
        let mut state = RegisterState {
            form: form("dev@example.com", "abc123", ORG_ID),
            ..RegisterState::default()
        };

        assert_eq!(state.submit(&mut session, &api).await, Submission::Failed);
        assert_eq!(state.error_message(), Some("Organization not found"));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn role_row_toggles_between_member_and_admin() {
        let mut state = RegisterState::default();
        for _ in 0..ROLE_ROW {
            state.move_cursor_down();
        }
        state.move_cursor_right();
        assert_eq!(state.form.role, UserRole::Admin);
        state.move_cursor_left();
        assert_eq!(state.form.role, UserRole::Member);
    }
}
