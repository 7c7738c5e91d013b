pub mod common;

// Re-export the client surface for convenience
pub use common::api_client::PelotonApiClient;
pub use common::authenticator::PelotonAuthenticator;
pub use common::config::{ClientConfig, Credentials};
pub use common::peloton_client::{ConnectedClient, PelotonClient};
pub use common::types::{PelotonError, PelotonResult, Workout, WorkoutPage};
