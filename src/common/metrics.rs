use metrics::{counter, gauge};

/// Error/Reliability Metrics - Success/Failure pairs
pub fn increment_peloton_api_success() {
    counter!("peloton_api_total", "result" => "success").increment(1);
}

pub fn increment_peloton_api_failure() {
    counter!("peloton_api_total", "result" => "failure").increment(1);
}

pub fn increment_login_success() {
    counter!("peloton_login_total", "result" => "success").increment(1);
}

pub fn increment_login_failure() {
    counter!("peloton_login_total", "result" => "failure").increment(1);
}

/// Business Logic Metrics
pub fn increment_workout_pages_fetched() {
    counter!("workout_pages_fetched").increment(1);
}

pub fn set_workouts_fetched(count: u64) {
    gauge!("workouts_fetched").set(count as f64);
}
