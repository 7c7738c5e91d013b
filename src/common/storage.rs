use crate::common::types::{PelotonResult, Workout};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const LATEST_FILE_NAME: &str = "workouts_latest.json";
pub const API_DUMP_PREFIX: &str = "workouts";
pub const CSV_DUMP_PREFIX: &str = "workouts_csv_import";

#[derive(Debug, Clone)]
pub struct SavedDump {
    pub timestamped: PathBuf,
    pub latest: PathBuf,
}

/// Writes `records` to `{prefix}_{timestamp}.json` and to the shared
/// "latest" file in `output_dir`, creating the directory if needed.
pub fn save_workouts(output_dir: &Path, prefix: &str, records: &[Workout]) -> PelotonResult<SavedDump> {
    fs::create_dir_all(output_dir)?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let timestamped = output_dir.join(format!("{prefix}_{timestamp}.json"));
    let latest = output_dir.join(LATEST_FILE_NAME);

    let json = serde_json::to_string_pretty(records)?;

    info!("Saving to {}...", timestamped.display());
    fs::write(&timestamped, &json)?;
    fs::write(&latest, &json)?;
    info!(
        "Saved {} workouts to {} and {}",
        records.len(),
        timestamped.display(),
        latest.display()
    );

    Ok(SavedDump { timestamped, latest })
}

pub fn load_workouts(path: &Path) -> PelotonResult<Vec<Workout>> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::PelotonError;
    use serde_json::json;
    use tempdir::TempDir;

    fn sample_workouts() -> Vec<Workout> {
        vec![
            json!({
                "id": "w3",
                "created_at": 1700000300,
                "total_work": 312450.5,
                "ride": {"title": "30 min Power Zone", "fitness_discipline": "cycling"}
            }),
            json!({"id": "w1", "created_at": 1700000100, "total_work": null}),
            json!({"zeta": 1, "alpha": 2, "id": "w2"}),
        ]
    }

    #[test]
    fn test_dump_round_trips_in_order() {
        let dir = TempDir::new("peloton_storage").unwrap();
        let output_dir = dir.path().join("data").join("raw");
        let workouts = sample_workouts();

        let saved = save_workouts(&output_dir, API_DUMP_PREFIX, &workouts).unwrap();

        assert_eq!(load_workouts(&saved.timestamped).unwrap(), workouts);
        assert_eq!(load_workouts(&saved.latest).unwrap(), workouts);
    }

    #[test]
    fn test_dump_keeps_field_order_and_file_names() {
        let dir = TempDir::new("peloton_storage").unwrap();
        let saved = save_workouts(dir.path(), CSV_DUMP_PREFIX, &sample_workouts()).unwrap();

        let name = saved.timestamped.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("workouts_csv_import_"));
        assert!(name.ends_with(".json"));
        assert_eq!(saved.latest, dir.path().join(LATEST_FILE_NAME));

        let text = fs::read_to_string(&saved.latest).unwrap();
        let zeta = text.find("\"zeta\"").unwrap();
        let alpha = text.find("\"alpha\"").unwrap();
        assert!(zeta < alpha, "object keys must keep their original order");
    }

    #[test]
    fn test_empty_dump() {
        let dir = TempDir::new("peloton_storage").unwrap();
        let saved = save_workouts(dir.path(), API_DUMP_PREFIX, &[]).unwrap();
        assert!(load_workouts(&saved.latest).unwrap().is_empty());
    }

    #[test]
    fn test_load_rejects_malformed_dump() {
        let dir = TempDir::new("peloton_storage").unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "[{\"id\": ").unwrap();

        assert!(matches!(
            load_workouts(&path),
            Err(PelotonError::Serialization(_))
        ));
        assert!(matches!(
            load_workouts(&dir.path().join("missing.json")),
            Err(PelotonError::Io(_))
        ));
    }
}
