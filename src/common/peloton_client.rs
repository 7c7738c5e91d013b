use crate::common::api_client::PelotonApiClient;
use crate::common::authenticator::PelotonAuthenticator;
use crate::common::config::{ClientConfig, Credentials};
use crate::common::types::{PelotonError, PelotonResult, Workout, WorkoutPage};
use serde_json::Value;
use std::ops::{Deref, DerefMut};
use tracing::info;

/// High-level client: one login lifecycle plus forwarding to the API client.
///
/// The client is either disconnected (no session, no API client) or
/// connected. Every data method fails with [`PelotonError::NotConnected`]
/// while disconnected, before touching the network.
pub struct PelotonClient {
    authenticator: PelotonAuthenticator,
    config: ClientConfig,
    api_client: Option<PelotonApiClient>,
}

impl PelotonClient {
    /// Builds a client from explicit credentials, falling back to
    /// `PELOTON_USERNAME` / `PELOTON_PASSWORD`.
    pub fn new(username: Option<String>, password: Option<String>) -> PelotonResult<Self> {
        let credentials = Credentials::resolve(username, password)?;
        Ok(Self::with_config(credentials, ClientConfig::from_env()?))
    }

    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Self {
        Self {
            authenticator: PelotonAuthenticator::new(credentials, config.clone()),
            config,
            api_client: None,
        }
    }

    pub async fn connect(&mut self) -> bool {
        // A new login replaces the old session, so the old API client goes too
        self.api_client = None;

        if !self.authenticator.login().await {
            return false;
        }

        let (Ok(session), Ok(user_id)) = (
            self.authenticator.get_session(),
            self.authenticator.get_user_id(),
        ) else {
            return false;
        };

        self.api_client = Some(PelotonApiClient::new(
            session.clone(),
            user_id,
            &self.config,
        ));
        info!("Successfully connected to Peloton API");
        true
    }

    pub fn disconnect(&mut self) {
        self.authenticator.logout();
        self.api_client = None;
    }

    pub fn is_connected(&self) -> bool {
        self.api_client.is_some()
    }

    /// Connects and hands back a guard that disconnects when dropped, on
    /// every exit path.
    pub async fn connected(&mut self) -> PelotonResult<ConnectedClient<'_>> {
        if !self.connect().await {
            self.disconnect();
            return Err(PelotonError::AuthenticationFailed);
        }
        Ok(ConnectedClient { client: self })
    }

    pub fn user_id(&self) -> PelotonResult<&str> {
        self.authenticator.get_user_id()
    }

    fn api(&mut self) -> PelotonResult<&mut PelotonApiClient> {
        self.api_client.as_mut().ok_or(PelotonError::NotConnected)
    }

    pub async fn get_profile(&mut self) -> PelotonResult<Value> {
        self.api()?.get_user_profile().await
    }

    pub async fn get_overview(&mut self) -> PelotonResult<Value> {
        self.api()?.get_user_overview().await
    }

    pub async fn get_workouts(
        &mut self,
        page: u32,
        limit: u32,
        joins: Option<&str>,
    ) -> PelotonResult<WorkoutPage> {
        self.api()?.get_workouts(page, limit, joins).await
    }

    pub async fn get_all_workouts(&mut self, joins: Option<&str>) -> PelotonResult<Vec<Workout>> {
        self.api()?.get_all_workouts(joins).await
    }

    pub async fn get_workout_detail(&mut self, workout_id: &str) -> PelotonResult<Value> {
        self.api()?.get_workout_detail(workout_id).await
    }

    pub async fn get_workout_performance(
        &mut self,
        workout_id: &str,
        every_n: u32,
    ) -> PelotonResult<Value> {
        self.api()?
            .get_workout_performance_graph(workout_id, every_n)
            .await
    }

    pub async fn get_ride_detail(&mut self, ride_id: &str) -> PelotonResult<Value> {
        self.api()?.get_ride_detail(ride_id).await
    }

    pub async fn get_instructor(&mut self, instructor_id: &str) -> PelotonResult<Value> {
        self.api()?.get_instructor(instructor_id).await
    }
}

/// A connected [`PelotonClient`] that disconnects on drop.
pub struct ConnectedClient<'a> {
    client: &'a mut PelotonClient,
}

impl Deref for ConnectedClient<'_> {
    type Target = PelotonClient;

    fn deref(&self) -> &Self::Target {
        self.client
    }
}

impl DerefMut for ConnectedClient<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.client
    }
}

impl Drop for ConnectedClient<'_> {
    fn drop(&mut self) {
        self.client.disconnect();
    }
}
