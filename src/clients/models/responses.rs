use serde::{Deserialize, Serialize};

use crate::clients::models::common::{Exercise, StartTime};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutResponse {
    pub id: String,
    // The web API calls it `name`, the v1 API `title`.
    #[serde(alias = "name")]
    pub title: String,
    pub start_time: StartTime,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
    #[serde(default)]
    pub estimated_volume_kg: Option<f64>,
}

// Workouts list response from GET /v1/workouts and GET /user_workouts_paged
#[derive(Debug, Deserialize)]
pub struct WorkoutsListResponse {
    #[serde(default)]
    pub workouts: Vec<WorkoutResponse>,
}

// GET /v1/workouts/count and GET /workout_count
#[derive(Debug, Deserialize)]
pub struct WorkoutCountResponse {
    #[serde(default)]
    pub workout_count: u64,
}
