use crate::common::config::{ClientConfig, Credentials};
use crate::common::metrics;
use crate::common::types::{PelotonError, PelotonResult};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

const LOGIN_PATH: &str = "/auth/login";

#[derive(Serialize)]
struct LoginRequest<'a> {
    username_or_email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    user_id: Option<String>,
}

/// An authenticated HTTP context. Cookies set by the login endpoint live in
/// the client's cookie store and ride along on every later request.
#[derive(Clone)]
pub struct Session {
    client: ClientWithMiddleware,
}

impl Session {
    fn new(config: &ClientConfig) -> PelotonResult<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client })
    }

    pub fn http(&self) -> &ClientWithMiddleware {
        &self.client
    }
}

/// Exchanges credentials for a session and the account's user id.
pub struct PelotonAuthenticator {
    credentials: Credentials,
    config: ClientConfig,
    session: Option<Session>,
    user_id: Option<String>,
}

impl PelotonAuthenticator {
    pub fn new(credentials: Credentials, config: ClientConfig) -> Self {
        Self {
            credentials,
            config,
            session: None,
            user_id: None,
        }
    }

    /// Returns whether the login succeeded. Failures are logged, never raised.
    pub async fn login(&mut self) -> bool {
        // A fresh login never reuses the old cookie jar
        self.logout_quietly();

        match self.try_login().await {
            Ok((session, user_id)) => {
                info!("Successfully authenticated. User ID: {user_id}");
                metrics::increment_login_success();
                self.session = Some(session);
                self.user_id = Some(user_id);
                true
            }
            Err(e) => {
                match &e {
                    PelotonError::Http { status, .. } if *status == StatusCode::UNAUTHORIZED => {
                        error!("HTTP error during authentication: {e}");
                        error!("Invalid credentials");
                    }
                    PelotonError::Http { .. } => error!("HTTP error during authentication: {e}"),
                    _ => error!("Error during authentication: {e}"),
                }
                metrics::increment_login_failure();
                false
            }
        }
    }

    async fn try_login(&self) -> PelotonResult<(Session, String)> {
        let session = Session::new(&self.config)?;
        let payload = LoginRequest {
            username_or_email: self.credentials.username(),
            password: self.credentials.password(),
        };

        info!("Attempting to authenticate with Peloton API...");
        let response = session
            .http()
            .post(self.config.url(LOGIN_PATH))
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, &self.config.user_agent)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PelotonError::Http {
                status,
                endpoint: LOGIN_PATH.to_string(),
            });
        }

        let body = response.text().await?;
        let login: LoginResponse = serde_json::from_str(&body)?;

        match login.user_id.filter(|id| !id.is_empty()) {
            Some(user_id) => Ok((session, user_id)),
            None => Err(PelotonError::UnexpectedResponse(
                "Authentication response missing user_id".to_string(),
            )),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some() && self.user_id.is_some()
    }

    pub fn get_session(&self) -> PelotonResult<&Session> {
        self.session.as_ref().ok_or(PelotonError::NotAuthenticated)
    }

    pub fn get_user_id(&self) -> PelotonResult<&str> {
        match (&self.session, &self.user_id) {
            (Some(_), Some(user_id)) => Ok(user_id),
            _ => Err(PelotonError::NotAuthenticated),
        }
    }

    /// Drops the session. Safe to call when already logged out.
    pub fn logout(&mut self) {
        self.logout_quietly();
        info!("Logged out successfully");
    }

    fn logout_quietly(&mut self) {
        self.session = None;
        self.user_id = None;
    }
}
