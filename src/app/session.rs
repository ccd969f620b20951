// Session state: the signed-in user and their bearer token.
// Only the methods here mutate it; views read it.
use crate::api::{AuthApi, BearerToken};
use crate::app::models::{AuthResponse, User, UserRole};
use crate::app::storage::{Storage, TOKEN_KEY};
use crate::error::ApiError;

pub struct AuthSession<'a> {
    storage: &'a Storage,
    token: BearerToken,
    user: Option<User>,
}

impl<'a> AuthSession<'a> {
    /// Picks up a persisted token, if any. The user stays unknown until [`hydrate`](Self::hydrate).
    pub fn new(storage: &'a Storage, token: BearerToken) -> AuthSession<'a> {
        let persisted = storage.load_token().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "could not read persisted token");
            None
        });
        token.set(persisted);
        AuthSession {
            storage,
            token,
            user: None,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn token(&self) -> Option<String> {
        self.token.get()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.get().is_some() && self.user.is_some()
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user.as_ref().map(|user| user.role)
    }

    pub fn can_manage(&self) -> bool {
        self.role().is_some_and(UserRole::can_manage)
    }

    /// Restores the user behind a persisted token. Runs once at startup;
    /// any failure drops the token and leaves the session signed out.
    pub async fn hydrate<A: AuthApi + ?Sized>(&mut self, api: &A) {
        if self.token.get().is_none() {
            return;
        }
        if let Ok(Some(saved_at)) = self.storage.updated_at(TOKEN_KEY) {
            tracing::debug!(%saved_at, "rehydrating session from persisted token");
        }

        match api.get_current_user().await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "session restored");
                self.user = Some(user);
            }
            Err(err) => {
                tracing::warn!(error = %err, "persisted token rejected, signing out");
                self.clear();
            }
        }
    }

    pub async fn login<A: AuthApi + ?Sized>(
        &mut self,
        api: &A,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let response = api.login(email, password).await?;
        self.establish(response);
        Ok(())
    }

    pub async fn register<A: AuthApi + ?Sized>(
        &mut self,
        api: &A,
        email: &str,
        password: &str,
        organization_id: &str,
        role: Option<UserRole>,
    ) -> Result<(), ApiError> {
        let response = api
            .register(email, password, organization_id, role)
            .await?;
        self.establish(response);
        Ok(())
    }

    /// Local only; the server is not told.
    pub fn logout(&mut self) {
        if let Some(user) = &self.user {
            tracing::info!(user_id = %user.id, "logged out");
        }
        self.clear();
    }

    fn establish(&mut self, response: AuthResponse) {
        tracing::info!(user_id = %response.user.id, role = response.user.role.label(), "signed in");
        self.token.set(Some(response.token.clone()));
        self.user = Some(response.user);
        if let Err(err) = self.storage.save_token(&response.token) {
            tracing::warn!(error = %err, "could not persist token");
        }
    }

    fn clear(&mut self) {
        self.user = None;
        self.token.set(None);
        if let Err(err) = self.storage.clear_token() {
            tracing::warn!(error = %err, "could not remove persisted token");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_user, FakeApi};

    #[tokio::test]
    async fn login_persists_token_and_sets_user() {
        let storage = Storage::in_memory().unwrap();
        let api = FakeApi::default();
        let mut session = AuthSession::new(&storage, BearerToken::default());
        assert!(!session.is_authenticated());

        session.login(&api, "admin@example.com", "secret1").await.unwrap();

        assert!(session.is_authenticated());
        assert!(session.can_manage());
        assert_eq!(storage.load_token().unwrap().as_deref(), Some("token-admin@example.com"));
        assert_eq!(api.calls(), vec!["login"]);
    }

    #[tokio::test]
    async fn hydrate_restores_user_for_persisted_token() {
        let storage = Storage::in_memory().unwrap();
        storage.save_token("stored").unwrap();
        let api = FakeApi::default();
        api.state().current_user = Some(sample_user(UserRole::Member));

        let token = BearerToken::default();
        let mut session = AuthSession::new(&storage, token.clone());
        assert_eq!(token.get().as_deref(), Some("stored"));

        session.hydrate(&api).await;
        assert!(session.is_authenticated());
        assert!(!session.can_manage());
    }

    #[tokio::test]
    async fn failed_hydrate_clears_token_silently() {
        let storage = Storage::in_memory().unwrap();
        storage.save_token("expired").unwrap();
        let api = FakeApi::default();
        api.fail("get_current_user", 401);

        let token = BearerToken::default();
        let mut session = AuthSession::new(&storage, token.clone());
        session.hydrate(&api).await;

        assert!(!session.is_authenticated());
        assert_eq!(token.get(), None);
        assert_eq!(storage.load_token().unwrap(), None);
        assert_eq!(api.calls(), vec!["get_current_user"]);
    }

    #[tokio::test]
    async fn hydrate_without_token_makes_no_call() {
        let storage = Storage::in_memory().unwrap();
        let api = FakeApi::default();
        let mut session = AuthSession::new(&storage, BearerToken::default());
        session.hydrate(&api).await;
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn logout_clears_everything_without_network() {
        let storage = Storage::in_memory().unwrap();
        let api = FakeApi::default();
        let token = BearerToken::default();
        let mut session = AuthSession::new(&storage, token.clone());
        session
            .register(&api, "new@example.com", "abc123", "org-1", Some(UserRole::Member))
            .await
            .unwrap();
        assert!(session.is_authenticated());

        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(token.get(), None);
        assert_eq!(storage.load_token().unwrap(), None);
        assert_eq!(api.calls(), vec!["register"]);
    }

    #[tokio::test]
    async fn failed_login_leaves_session_signed_out() {
        let storage = Storage::in_memory().unwrap();
        let api = FakeApi::default();
        api.fail_with_message("login", 401, "Invalid credentials");
        let mut session = AuthSession::new(&storage, BearerToken::default());

        let err = session.login(&api, "a@b.co", "wrong1").await.unwrap_err();
        assert_eq!(err.server_message(), Some("Invalid credentials"));
        assert!(!session.is_authenticated());
        assert_eq!(storage.load_token().unwrap(), None);
    }
}
