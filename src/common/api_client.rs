use crate::common::authenticator::Session;
use crate::common::config::ClientConfig;
use crate::common::metrics;
use crate::common::throttle::RequestThrottle;
use crate::common::types::{PelotonError, PelotonResult, Workout, WorkoutPage};
use function_timer::time;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, info};

/// Page size used when walking the full workout history.
pub const PAGE_SIZE: u32 = 100;

/// Relations embedded by default when listing workouts.
pub const DEFAULT_JOINS: &str = "ride,ride.instructor";

const PLATFORM_HEADER: HeaderName = HeaderName::from_static("peloton-platform");

/// Issues throttled, authenticated requests on behalf of one user.
pub struct PelotonApiClient {
    session: Session,
    user_id: String,
    config: ClientConfig,
    throttle: RequestThrottle,
}

impl PelotonApiClient {
    pub fn new(session: Session, user_id: impl Into<String>, config: &ClientConfig) -> Self {
        Self {
            session,
            user_id: user_id.into(),
            config: config.clone(),
            throttle: RequestThrottle::new(config.min_request_interval),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Executes one request and decodes the JSON body. Caller headers are
    /// merged over the platform header.
    pub async fn request<T: DeserializeOwned>(
        &mut self,
        method: Method,
        endpoint: &str,
        params: &[(&str, String)],
        headers: Option<HeaderMap>,
    ) -> PelotonResult<T> {
        self.throttle.wait().await;
        let result = self.execute(method, endpoint, params, headers).await;
        self.throttle.mark();

        match &result {
            Ok(_) => metrics::increment_peloton_api_success(),
            Err(e) => {
                metrics::increment_peloton_api_failure();
                match e {
                    PelotonError::Http { .. } => error!("HTTP error for {endpoint}: {e}"),
                    _ => error!("Error making request to {endpoint}: {e}"),
                }
            }
        }

        result
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, String)],
        headers: Option<HeaderMap>,
    ) -> PelotonResult<T> {
        let platform = HeaderValue::from_str(&self.config.platform).map_err(|_| {
            PelotonError::Configuration(format!(
                "invalid platform header value {:?}",
                self.config.platform
            ))
        })?;

        let mut request_headers = HeaderMap::new();
        request_headers.insert(PLATFORM_HEADER, platform);
        if let Some(extra) = headers {
            request_headers.extend(extra);
        }

        let response = self
            .session
            .http()
            .request(method, self.config.url(endpoint))
            .query(params)
            .headers(request_headers)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PelotonError::Http {
                status,
                endpoint: endpoint.to_string(),
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get<T: DeserializeOwned>(
        &mut self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> PelotonResult<T> {
        self.request(Method::GET, endpoint, params, None).await
    }

    pub async fn get_user_profile(&mut self) -> PelotonResult<Value> {
        info!("Fetching user profile...");
        self.get("/api/me", &[]).await
    }

    pub async fn get_user_overview(&mut self) -> PelotonResult<Value> {
        info!("Fetching user overview...");
        let endpoint = format!("/api/user/{}/overview", self.user_id);
        self.get(&endpoint, &[]).await
    }

    /// One page of workout history. `page` is 0-indexed; `joins` is a
    /// comma-separated list of relations to embed, e.g. `ride,ride.instructor`.
    pub async fn get_workouts(
        &mut self,
        page: u32,
        limit: u32,
        joins: Option<&str>,
    ) -> PelotonResult<WorkoutPage> {
        info!("Fetching workouts (page {page}, limit {limit})...");
        let mut params = vec![("page", page.to_string()), ("limit", limit.to_string())];
        if let Some(joins) = joins.filter(|j| !j.is_empty()) {
            params.push(("joins", joins.to_string()));
        }

        let endpoint = format!("/api/user/{}/workouts", self.user_id);
        let page = self.get(&endpoint, &params).await?;
        metrics::increment_workout_pages_fetched();
        Ok(page)
    }

    /// Walks pages from 0 until a page is empty or shorter than the page size.
    /// Any failed page aborts the walk and discards what was collected.
    #[time("get_all_workouts_duration")]
    pub async fn get_all_workouts(&mut self, joins: Option<&str>) -> PelotonResult<Vec<Workout>> {
        info!("Fetching all workouts...");
        let mut all_workouts = Vec::new();
        let mut page = 0;

        loop {
            let response = self.get_workouts(page, PAGE_SIZE, joins).await?;
            if response.is_empty() {
                break;
            }

            let fetched = response.len();
            all_workouts.extend(response.data);
            info!("Fetched {} workouts so far...", all_workouts.len());

            if fetched < PAGE_SIZE as usize {
                break;
            }

            page += 1;
        }

        info!("Fetched total of {} workouts", all_workouts.len());
        metrics::set_workouts_fetched(all_workouts.len() as u64);
        Ok(all_workouts)
    }

    pub async fn get_workout_detail(&mut self, workout_id: &str) -> PelotonResult<Value> {
        info!("Fetching workout detail for {workout_id}...");
        self.get(&format!("/api/workout/{workout_id}"), &[]).await
    }

    /// Performance samples for a workout, one every `every_n` seconds.
    pub async fn get_workout_performance_graph(
        &mut self,
        workout_id: &str,
        every_n: u32,
    ) -> PelotonResult<Value> {
        info!("Fetching performance graph for workout {workout_id}...");
        let endpoint = format!("/api/workout/{workout_id}/performance_graph");
        self.get(&endpoint, &[("every_n", every_n.to_string())])
            .await
    }

    pub async fn get_ride_detail(&mut self, ride_id: &str) -> PelotonResult<Value> {
        info!("Fetching ride detail for {ride_id}...");
        self.get(&format!("/api/ride/{ride_id}/details"), &[]).await
    }

    pub async fn get_instructor(&mut self, instructor_id: &str) -> PelotonResult<Value> {
        info!("Fetching instructor detail for {instructor_id}...");
        self.get(&format!("/api/instructor/{instructor_id}"), &[])
            .await
    }
}
