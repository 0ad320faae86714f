//! Training statistics over persisted workout logs

use std::collections::HashSet;

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};

use crate::db::WorkoutLogListItem;

/// Aggregate summary for the dashboard / `stats` command
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutStats {
    pub total_workouts: usize,
    pub total_minutes: u32,
    /// Average rating over rated sessions, one decimal
    pub avg_rating: Option<f32>,
    pub last_workout_at: Option<DateTime<Utc>>,
    /// Consecutive training days ending today or yesterday
    pub current_streak: u32,
}

/// Workout log analytics
pub struct Analytics {
    logs: Vec<WorkoutLogListItem>,
}

impl Analytics {
    /// Expects logs ordered most recent first, as the store returns them
    pub fn new(logs: Vec<WorkoutLogListItem>) -> Self {
        Self { logs }
    }

    pub fn stats(&self) -> WorkoutStats {
        let total_minutes = self.logs.iter().map(|l| l.duration_minutes).sum();

        let ratings: Vec<u8> = self.logs.iter().filter_map(|l| l.rating).collect();
        let avg_rating = if ratings.is_empty() {
            None
        } else {
            let avg = ratings.iter().map(|r| *r as f32).sum::<f32>() / ratings.len() as f32;
            Some((avg * 10.0).round() / 10.0)
        };

        let workout_days: HashSet<NaiveDate> = self
            .logs
            .iter()
            .map(|l| l.started_at.with_timezone(&Local).date_naive())
            .collect();

        WorkoutStats {
            total_workouts: self.logs.len(),
            total_minutes,
            avg_rating,
            last_workout_at: self.logs.first().map(|l| l.started_at),
            current_streak: streak_ending_at(&workout_days, Local::now().date_naive()),
        }
    }

    /// Training frequency (sessions per week)
    pub fn weekly_frequency(&self) -> f64 {
        if self.logs.len() < 2 {
            return 0.0;
        }

        let newest = self.logs.first().unwrap().started_at;
        let oldest = self.logs.last().unwrap().started_at;
        let days = (newest - oldest).num_days() as f64;

        if days == 0.0 {
            return self.logs.len() as f64;
        }

        (self.logs.len() as f64 / days) * 7.0
    }
}

/// Count consecutive workout days walking backwards from `today`.
/// A streak that ended yesterday still counts; one that ended earlier
/// is broken.
fn streak_ending_at(workout_days: &HashSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut check = today;

    if !workout_days.contains(&check) {
        check -= Duration::days(1);
        if !workout_days.contains(&check) {
            return 0;
        }
    }

    let mut streak = 0;
    while workout_days.contains(&check) {
        streak += 1;
        check -= Duration::days(1);
    }
    streak
}
