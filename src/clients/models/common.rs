use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    // Web API only; the v1 API identifies exercises by position.
    #[serde(default)]
    pub id: Option<ExerciseId>,
    #[serde(default)]
    pub index: Option<u32>,
    pub title: String,
    #[serde(default)]
    pub sets: Vec<ExerciseSet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseSet {
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub reps: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExerciseId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseId::Number(n) => write!(f, "{}", n),
            ExerciseId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StartTime {
    EpochSeconds(i64),
    FractionalEpochSeconds(f64),
    Iso(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_time_shapes() {
        let iso: StartTime = serde_json::from_str("\"2024-06-10T08:00:00Z\"").unwrap();
        assert_eq!(iso, StartTime::Iso("2024-06-10T08:00:00Z".to_string()));

        let epoch: StartTime = serde_json::from_str("1718006400").unwrap();
        assert_eq!(epoch, StartTime::EpochSeconds(1_718_006_400));

        let fractional: StartTime = serde_json::from_str("1718006400.5").unwrap();
        assert_eq!(fractional, StartTime::FractionalEpochSeconds(1_718_006_400.5));
    }

    #[test]
    fn test_exercise_id_display() {
        let text: ExerciseId = serde_json::from_str("\"abc-1\"").unwrap();
        assert_eq!(text.to_string(), "abc-1");

        let number: ExerciseId = serde_json::from_str("42").unwrap();
        assert_eq!(number.to_string(), "42");
    }

    #[test]
    fn test_set_with_nulls() {
        let set: ExerciseSet =
            serde_json::from_str(r#"{"weight_kg": null, "reps": 8, "rpe": 7.5}"#).unwrap();
        assert_eq!(set.weight_kg, None);
        assert_eq!(set.reps, Some(8));
    }
}
