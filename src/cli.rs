use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

use peloton_history::PelotonClient;
use peloton_history::common::api_client::DEFAULT_JOINS;
use peloton_history::common::csv_import::{CsvSummary, import_csv};
use peloton_history::common::storage::{API_DUMP_PREFIX, CSV_DUMP_PREFIX, save_workouts};
use peloton_history::common::summary::WorkoutSummary;

#[derive(Parser)]
#[command(version, about = "Fetch and archive Peloton workout history")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the full workout history and save it as JSON
    Fetch {
        /// Directory for the JSON dumps
        #[arg(short, long, env = "PELOTON_DATA_DIR", default_value = "data/raw")]
        output_dir: PathBuf,
        /// Relations to embed in each workout
        #[arg(short, long, default_value = DEFAULT_JOINS)]
        joins: String,
    },
    /// Log in and print a few recent workouts
    Check,
    /// Convert a workout CSV export to JSON
    Import {
        /// Path to the exported CSV file
        csv: PathBuf,
        /// Directory for the JSON dumps
        #[arg(short, long, env = "PELOTON_DATA_DIR", default_value = "data/raw")]
        output_dir: PathBuf,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Fetch { output_dir, joins } => fetch_workouts(&output_dir, &joins).await,
            Commands::Check => check_connection().await,
            Commands::Import { csv, output_dir } => import_workouts(&csv, &output_dir),
        }
    }
}

fn connect_client() -> Result<PelotonClient> {
    PelotonClient::new(None, None).context("Make sure PELOTON_USERNAME and PELOTON_PASSWORD are set (see .env)")
}

async fn fetch_workouts(output_dir: &Path, joins: &str) -> Result<()> {
    let mut client = connect_client()?;

    info!("Connecting to Peloton API...");
    let mut connected = client
        .connected()
        .await
        .context("Failed to connect. Check your credentials.")?;

    info!("Fetching all workouts (this may take a while), joins: {joins}");
    let workouts = connected.get_all_workouts(Some(joins)).await?;
    info!("Successfully fetched {} workouts", workouts.len());

    let saved = save_workouts(output_dir, API_DUMP_PREFIX, &workouts)?;
    info!("Saved to {} and {}", saved.timestamped.display(), saved.latest.display());

    let summary = WorkoutSummary::from_workouts(&workouts);
    info!("Workouts by type:");
    for (discipline, count) in &summary.by_discipline {
        info!("  {discipline}: {count}");
    }
    info!(
        "Total output across all workouts: {:.1} kJ",
        summary.total_output_kj
    );

    Ok(())
}

async fn check_connection() -> Result<()> {
    let mut client = connect_client()?;

    info!("Connecting to Peloton API...");
    if !client.connect().await {
        bail!("Failed to connect. Check your credentials in .env");
    }

    let result = print_recent_activity(&mut client).await;
    client.disconnect();
    result?;

    info!("All checks passed, API connection working.");
    Ok(())
}

async fn print_recent_activity(client: &mut PelotonClient) -> Result<()> {
    let profile = client.get_profile().await?;
    info!("Username: {}", text(&profile, "username"));
    info!("User ID: {}", text(&profile, "id"));
    info!("Location: {}", text(&profile, "location"));

    let overview = client.get_overview().await?;
    let total = overview
        .pointer("/workout_counts/0/count")
        .map(Value::to_string)
        .unwrap_or_else(|| "N/A".to_string());
    info!("Total workouts: {total}");

    let recent = client.get_workouts(0, 5, Some(DEFAULT_JOINS)).await?;
    info!("Found {} recent workouts:", recent.len());
    for (i, workout) in recent.data.iter().enumerate() {
        let ride = workout.get("ride").unwrap_or(&Value::Null);
        let minutes = ride.get("duration").and_then(Value::as_f64).unwrap_or(0.0) / 60.0;

        info!("Workout {}:", i + 1);
        info!("  ID: {}", text(workout, "id"));
        info!("  Date: {}", text(workout, "created_at"));
        info!("  Class: {}", text(ride, "title"));
        info!(
            "  Instructor: {}",
            ride.get("instructor")
                .map(|instructor| text(instructor, "name"))
                .unwrap_or_else(|| "N/A".to_string())
        );
        info!("  Duration: {minutes:.0} minutes");
        if let Some(work) = workout.get("total_work").and_then(Value::as_f64) {
            info!("  Total Output: {:.1} kJ", work / 1000.0);
        }
    }

    Ok(())
}

fn import_workouts(csv: &Path, output_dir: &Path) -> Result<()> {
    let import = import_csv(csv).with_context(|| format!("Failed to import {}", csv.display()))?;

    let summary = CsvSummary::from_import(&import);
    info!("Total workouts: {}", summary.total_workouts);
    if let Some((column, counts)) = &summary.by_type {
        info!("Workouts by {column}:");
        for (workout_type, count) in counts {
            info!("  {workout_type}: {count}");
        }
    }
    if let Some((_, first, last)) = &summary.date_range {
        info!("Date range: {first} to {last}");
    }

    let saved = save_workouts(output_dir, CSV_DUMP_PREFIX, &import.records)?;
    info!("Import complete: {}", saved.timestamped.display());
    Ok(())
}

fn text(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "N/A".to_string(),
        Some(other) => other.to_string(),
    }
}
