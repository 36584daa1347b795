use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::services::coordinator::CoordinatorState;
use crate::services::normalizer::within_week;
use crate::services::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKey {
    WorkoutCount,
    TodayCount,
    WeekCount,
    MonthCount,
    YearCount,
    WorkoutToday,
    WorkoutThisWeek,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SensorValue {
    Count(u64),
    Flag(bool),
    Weight(Option<f64>),
    Timestamp(Option<DateTime<Utc>>),
}

#[derive(Debug, Clone, Serialize)]
pub struct SensorState {
    pub unique_id: String,
    pub name: String,
    pub available: bool,
    pub value: SensorValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub attributes: Map<String, Value>,
}

impl SensorKey {
    pub const ALL: [SensorKey; 7] = [
        SensorKey::WorkoutCount,
        SensorKey::TodayCount,
        SensorKey::WeekCount,
        SensorKey::MonthCount,
        SensorKey::YearCount,
        SensorKey::WorkoutToday,
        SensorKey::WorkoutThisWeek,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SensorKey::WorkoutCount => "workout_count",
            SensorKey::TodayCount => "today_count",
            SensorKey::WeekCount => "week_count",
            SensorKey::MonthCount => "month_count",
            SensorKey::YearCount => "year_count",
            SensorKey::WorkoutToday => "workout_today",
            SensorKey::WorkoutThisWeek => "workout_this_week",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SensorKey::WorkoutCount => "Workout Count",
            SensorKey::TodayCount => "Workouts Today",
            SensorKey::WeekCount => "Workouts This Week",
            SensorKey::MonthCount => "Workouts This Month",
            SensorKey::YearCount => "Workouts This Year",
            SensorKey::WorkoutToday => "Workout Today",
            SensorKey::WorkoutThisWeek => "Workout This Week",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }

    pub fn value<Tz: TimeZone>(self, snapshot: Option<&Snapshot>, now: &DateTime<Tz>) -> SensorValue {
        let count = |field: fn(&Snapshot) -> u64| SensorValue::Count(snapshot.map(field).unwrap_or(0));

        match self {
            SensorKey::WorkoutCount => count(|s| s.workout_count),
            SensorKey::TodayCount => count(|s| u64::from(s.today_count)),
            SensorKey::WeekCount => count(|s| u64::from(s.week_count)),
            SensorKey::MonthCount => count(|s| u64::from(s.month_count)),
            SensorKey::YearCount => count(|s| u64::from(s.year_count)),
            SensorKey::WorkoutToday => {
                let today = now.date_naive();
                SensorValue::Flag(any_workout_on(snapshot, now, |date| date == today))
            }
            SensorKey::WorkoutThisWeek => {
                let today = now.date_naive();
                SensorValue::Flag(any_workout_on(snapshot, now, |date| within_week(date, today)))
            }
        }
    }
}

fn any_workout_on<Tz: TimeZone>(
    snapshot: Option<&Snapshot>,
    now: &DateTime<Tz>,
    matches: impl Fn(chrono::NaiveDate) -> bool,
) -> bool {
    let tz = now.timezone();
    snapshot
        .map(|s| {
            s.workouts
                .iter()
                .any(|w| matches(w.start_time.with_timezone(&tz).date_naive()))
        })
        .unwrap_or(false)
}

pub fn sensor_states<Tz: TimeZone>(state: &CoordinatorState, name: &str, now: &DateTime<Tz>) -> Vec<SensorState> {
    let snapshot = state.data.as_deref();

    let mut sensors: Vec<SensorState> = SensorKey::ALL
        .into_iter()
        .map(|key| SensorState {
            unique_id: format!("{}_{}", name, key.as_str()),
            name: format!("{} {}", name, key.display_name()),
            available: state.last_update_success,
            value: key.value(snapshot, now),
            unit: None,
            attributes: Map::new(),
        })
        .collect();

    if let Some(snapshot) = snapshot {
        sensors.extend(workout_sensors(snapshot, name, state.last_update_success));
    }

    sensors
}

pub fn workout_sensors(snapshot: &Snapshot, name: &str, available: bool) -> Vec<SensorState> {
    let mut sensors = Vec::new();

    for workout in &snapshot.workouts {
        sensors.push(SensorState {
            unique_id: format!("{}_{}_date", name, workout.id),
            name: format!("{} Workout Date", name),
            available,
            value: SensorValue::Timestamp(Some(workout.start_time)),
            unit: None,
            attributes: Map::from_iter([("workout".to_string(), json!(workout.title))]),
        });

        for exercise in &workout.exercises {
            let mut attributes = Map::new();
            attributes.insert("sets".to_string(), json!(exercise.sets));
            attributes.insert("total_reps".to_string(), json!(exercise.total_reps));

            sensors.push(SensorState {
                unique_id: format!("{}_{}_{}", name, workout.id, exercise.key),
                name: format!("{} {}", name, exercise.title),
                available,
                value: SensorValue::Weight(Some(exercise.max_weight_kg)),
                unit: (exercise.max_weight_kg > 0.0).then_some("kg"),
                attributes,
            });
        }
    }

    sensors
}
