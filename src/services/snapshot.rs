use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub name: String,
    // Count endpoint total, not the number of listed workouts.
    pub workout_count: u64,
    // API order.
    pub workouts: Vec<NormalizedWorkout>,
    pub today_count: u32,
    pub week_count: u32,
    pub month_count: u32,
    pub year_count: u32,
    pub refreshed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedWorkout {
    pub id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub exercises: Vec<NormalizedExercise>,
    pub total_volume_kg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedExercise {
    pub key: String,
    pub title: String,
    pub sets: u32,
    pub total_reps: u64,
    pub max_weight_kg: f64,
}

impl Snapshot {
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            workout_count: 0,
            workouts: Vec::new(),
            today_count: 0,
            week_count: 0,
            month_count: 0,
            year_count: 0,
            refreshed_at: None,
        }
    }

    pub fn workout(&self, workout_id: &str) -> Option<&NormalizedWorkout> {
        self.workouts.iter().find(|w| w.id == workout_id)
    }
}

impl NormalizedWorkout {
    pub fn exercise(&self, key: &str) -> Option<&NormalizedExercise> {
        self.exercises.iter().find(|e| e.key == key)
    }
}
