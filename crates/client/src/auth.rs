use api_types::auth::{AuthResponse, Login, Register, User};
use engine::{EngineError, filters::non_empty};

use crate::{
    api::ApiClient,
    error::{ClientError, Result},
    session::{Session, SessionContext},
};

/// Login, registration and logout over one [`SessionContext`].
#[derive(Clone, Debug)]
pub struct AuthGate {
    api: ApiClient,
}

impl AuthGate {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn session(&self) -> &SessionContext {
        self.api.session()
    }

    /// Restores the persisted session, if any.
    pub async fn restore(&self) -> Option<User> {
        self.session().restore().await
    }

    /// Exchanges credentials for a session. On failure nothing is persisted
    /// and the state is `Anonymous`.
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let username = required(username, "Username")?;
        if password.is_empty() {
            return Err(EngineError::Validation("Password is required".to_string()).into());
        }

        let payload = Login {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.authenticate(self.api.login(&payload)).await
    }

    /// Creates an account and logs straight into it.
    pub async fn register(&self, username: &str, password: &str, email: Option<&str>) -> Result<User> {
        let username = required(username, "Username")?;
        if password.is_empty() {
            return Err(EngineError::Validation("Password is required".to_string()).into());
        }

        let payload = Register {
            username: username.to_string(),
            password: password.to_string(),
            email: non_empty(email).map(str::to_string),
        };
        self.authenticate(self.api.register(&payload)).await
    }

    /// Forgets the credential locally. Calling it while logged out is a no-op.
    pub async fn logout(&self) {
        if let Some(user) = self.session().user().await {
            tracing::info!("logging out {}", user.username);
        }
        self.session().clear().await;
    }

    async fn authenticate(
        &self,
        request: impl Future<Output = Result<AuthResponse>>,
    ) -> Result<User> {
        let session = self.session();
        session.begin().await;

        let resp = match request.await {
            Ok(resp) => resp,
            Err(err) => {
                session.abort().await;
                tracing::info!("authentication failed: {err}");
                return Err(err);
            }
        };

        let user = resp.user.clone();
        session
            .establish(Session {
                token: resp.token,
                user: resp.user,
            })
            .await?;
        tracing::info!("authenticated as {}", user.username);
        Ok(user)
    }
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    non_empty(Some(value))
        .ok_or_else(|| ClientError::from(EngineError::Validation(format!("{field} is required"))))
}
