use crate::common::types::Workout;
use std::collections::HashMap;

/// Aggregate view of a fetched workout list.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutSummary {
    pub total_workouts: usize,
    /// Workout counts per fitness discipline, largest first.
    pub by_discipline: Vec<(String, usize)>,
    pub total_output_kj: f64,
}

impl WorkoutSummary {
    pub fn from_workouts(workouts: &[Workout]) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut total_output_kj = 0.0;

        for workout in workouts {
            let discipline = workout
                .get("ride")
                .and_then(|ride| ride.get("fitness_discipline"))
                .and_then(|d| d.as_str())
                .unwrap_or("Unknown");
            *counts.entry(discipline.to_string()).or_default() += 1;

            // total_work is reported in joules
            if let Some(work) = workout.get("total_work").and_then(|w| w.as_f64()) {
                total_output_kj += work / 1000.0;
            }
        }

        Self {
            total_workouts: workouts.len(),
            by_discipline: sorted_counts(counts),
            total_output_kj,
        }
    }
}

/// Largest count first, ties broken by name so output is stable.
pub(crate) fn sorted_counts(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut sorted: Vec<_> = counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}
