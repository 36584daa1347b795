use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use thiserror::Error;

use crate::clients::models::common::{Exercise, StartTime};
use crate::clients::models::responses::WorkoutResponse;
use crate::services::snapshot::{NormalizedExercise, NormalizedWorkout, Snapshot};

const DAYS_PER_WEEK: i64 = 7;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("workout {workout_id} has an unreadable start time {value:?}: {reason}")]
    InvalidStartTime {
        workout_id: String,
        value: StartTime,
        reason: String,
    },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PeriodCounts {
    pub today: u32,
    pub week: u32,
    pub month: u32,
    pub year: u32,
}

impl PeriodCounts {
    pub fn record(&mut self, date: NaiveDate, today: NaiveDate) {
        if date == today {
            self.today += 1;
        }
        if within_week(date, today) {
            self.week += 1;
        }
        if date.year() == today.year() && date.month() == today.month() {
            self.month += 1;
        }
        if date.year() == today.year() {
            self.year += 1;
        }
    }
}

/// True for today and the six days before it.
pub fn within_week(date: NaiveDate, today: NaiveDate) -> bool {
    let days = (today - date).num_days();
    (0..DAYS_PER_WEEK).contains(&days)
}

pub fn build_snapshot<Tz: TimeZone>(
    name: &str,
    workout_count: u64,
    workouts: &[WorkoutResponse],
    now: &DateTime<Tz>,
) -> Result<Snapshot, NormalizeError> {
    let today = now.date_naive();
    let tz = now.timezone();

    let mut counts = PeriodCounts::default();
    let mut normalized = Vec::with_capacity(workouts.len());

    for workout in workouts {
        let start_time =
            parse_start_time(&workout.start_time).map_err(|reason| {
                NormalizeError::InvalidStartTime {
                    workout_id: workout.id.clone(),
                    value: workout.start_time.clone(),
                    reason,
                }
            })?;

        counts.record(start_time.with_timezone(&tz).date_naive(), today);

        normalized.push(NormalizedWorkout {
            id: workout.id.clone(),
            title: workout.title.clone(),
            start_time,
            exercises: workout
                .exercises
                .iter()
                .enumerate()
                .map(|(position, exercise)| normalize_exercise(position, exercise))
                .collect(),
            total_volume_kg: workout.estimated_volume_kg,
        });
    }

    Ok(Snapshot {
        name: name.to_string(),
        workout_count,
        workouts: normalized,
        today_count: counts.today,
        week_count: counts.week,
        month_count: counts.month,
        year_count: counts.year,
        refreshed_at: Some(now.with_timezone(&Utc)),
    })
}

pub fn parse_start_time(raw: &StartTime) -> Result<DateTime<Utc>, String> {
    match raw {
        StartTime::EpochSeconds(secs) => DateTime::from_timestamp(*secs, 0)
            .ok_or_else(|| format!("epoch seconds {} out of range", secs)),
        StartTime::FractionalEpochSeconds(secs) => {
            if !secs.is_finite() {
                return Err(format!("epoch seconds {} is not finite", secs));
            }
            let whole = secs.floor();
            let nanos = ((secs - whole) * 1_000_000_000.0).round() as u32;
            DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
                .ok_or_else(|| format!("epoch seconds {} out of range", secs))
        }
        StartTime::Iso(text) => parse_iso(text),
    }
}

fn parse_iso(text: &str) -> Result<DateTime<Utc>, String> {
    let text = text.trim();
    let normalized = match text.strip_suffix('Z').or_else(|| text.strip_suffix('z')) {
        Some(stripped) => format!("{}+00:00", stripped),
        None => text.to_string(),
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(parsed.with_timezone(&Utc));
    }

    // No offset at all: treat as UTC.
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| e.to_string())
}

pub fn normalize_exercise(position: usize, exercise: &Exercise) -> NormalizedExercise {
    let total_reps = exercise
        .sets
        .iter()
        .filter_map(|set| set.reps)
        .map(u64::from)
        .sum();

    let max_weight_kg = exercise
        .sets
        .iter()
        .filter_map(|set| set.weight_kg)
        .fold(None, |max: Option<f64>, weight| {
            Some(max.map_or(weight, |current| current.max(weight)))
        })
        .unwrap_or(0.0);

    NormalizedExercise {
        key: exercise_key(position, exercise),
        title: exercise.title.clone(),
        sets: exercise.sets.len() as u32,
        total_reps,
        max_weight_kg,
    }
}

pub fn exercise_key(position: usize, exercise: &Exercise) -> String {
    match &exercise.id {
        Some(id) => id.to_string(),
        None => {
            let index = exercise
                .index
                .map(|i| i as usize)
                .unwrap_or(position);
            format!("{}_{}", index, exercise.title)
        }
    }
}
