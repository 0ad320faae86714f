//! Training playback - countdown state machine over a workout plan
//!
//! The session is an explicit state object with one transition method per
//! event (`tick`, `pause`, `resume`, `next`, `previous`, `reset`), so any
//! host (TUI, CLI harness, tests) can drive it. The host owns the 1-second
//! tick source; ticks and user events must be applied from the same loop.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::db::ExerciseLogEntry;
use crate::planner::{WorkoutPlan, WorkoutPlanItem};

/// Playback mode; `Completed` is terminal until `reset`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Running,
    Paused,
    Completed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlayerError {
    #[error("workout plan has no exercises")]
    EmptyPlan,
}

/// Per-item execution tracking used for the completion log
#[derive(Debug, Clone, Default)]
struct ItemProgress {
    actual_seconds: u32,
    completed: bool,
}

/// One run-through of a workout plan
#[derive(Debug, Clone)]
pub struct PlayerSession {
    plan: WorkoutPlan,
    index: usize,
    remaining_seconds: u32,
    mode: Mode,
    total_elapsed_seconds: u32,
    progress: Vec<ItemProgress>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl PlayerSession {
    /// Construct and start playback at the first exercise.
    ///
    /// Fails fast on an empty plan rather than producing a degenerate
    /// state machine.
    pub fn new(plan: WorkoutPlan) -> Result<Self, PlayerError> {
        if plan.exercises.is_empty() {
            return Err(PlayerError::EmptyPlan);
        }

        let remaining = plan.exercises[0].duration_seconds();
        let progress = vec![ItemProgress::default(); plan.exercises.len()];

        Ok(Self {
            plan,
            index: 0,
            remaining_seconds: remaining,
            mode: Mode::Running,
            total_elapsed_seconds: 0,
            progress,
            started_at: Utc::now(),
            completed_at: None,
        })
    }

    /// Advance one second of wall-clock time. Only meaningful while
    /// running; paused and completed sessions ignore ticks.
    ///
    /// When the countdown reaches zero the session moves to the next item
    /// within the same tick, cascading through zero-duration items so they
    /// never stall the player.
    pub fn tick(&mut self) {
        if self.mode != Mode::Running {
            return;
        }

        if self.remaining_seconds > 0 {
            self.remaining_seconds -= 1;
            self.total_elapsed_seconds += 1;
            self.progress[self.index].actual_seconds += 1;
        }

        if self.remaining_seconds == 0 {
            self.advance_expired();
        }
    }

    /// Cascade past the expired current item and any zero-duration
    /// followers; completes the session when nothing is left.
    fn advance_expired(&mut self) {
        loop {
            self.progress[self.index].completed = true;

            if self.index + 1 < self.plan.exercises.len() {
                self.index += 1;
                self.remaining_seconds = self.plan.exercises[self.index].duration_seconds();
                debug!(index = self.index, "advanced to next exercise");
                if self.remaining_seconds > 0 {
                    break;
                }
            } else {
                self.complete();
                break;
            }
        }
    }

    fn complete(&mut self) {
        self.mode = Mode::Completed;
        self.completed_at = Some(Utc::now());
        debug!(
            elapsed = self.total_elapsed_seconds,
            "workout session completed"
        );
    }

    /// Freeze the countdown. Only valid from running.
    pub fn pause(&mut self) {
        if self.mode == Mode::Running {
            self.mode = Mode::Paused;
        }
    }

    /// Continue a paused countdown. Only valid from paused.
    pub fn resume(&mut self) {
        if self.mode == Mode::Paused {
            self.mode = Mode::Running;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.mode {
            Mode::Running => self.pause(),
            Mode::Paused => self.resume(),
            Mode::Completed => {}
        }
    }

    /// Manual skip to the following exercise, valid while running or
    /// paused. At the last index this completes the session, even when
    /// paused. The skipped item counts as completed only if its timer had
    /// already reached zero.
    pub fn next(&mut self) {
        if self.mode == Mode::Completed {
            return;
        }

        self.progress[self.index].completed = self.remaining_seconds == 0;

        if self.index + 1 < self.plan.exercises.len() {
            self.index += 1;
            self.remaining_seconds = self.plan.exercises[self.index].duration_seconds();
        } else {
            self.complete();
        }
    }

    /// Step back to the prior exercise with its full planned duration
    /// restored. No-op at index 0.
    pub fn previous(&mut self) {
        if self.mode == Mode::Completed || self.index == 0 {
            return;
        }

        self.index -= 1;
        self.remaining_seconds = self.plan.exercises[self.index].duration_seconds();
        // The item is being redone; its earlier completion no longer stands
        self.progress[self.index].completed = false;
    }

    /// Restart a completed session from the same plan. No-op unless
    /// completed.
    pub fn reset(&mut self) {
        if self.mode != Mode::Completed {
            return;
        }

        self.index = 0;
        self.remaining_seconds = self.plan.exercises[0].duration_seconds();
        self.mode = Mode::Running;
        self.total_elapsed_seconds = 0;
        self.progress = vec![ItemProgress::default(); self.plan.exercises.len()];
        self.started_at = Utc::now();
        self.completed_at = None;
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_completed(&self) -> bool {
        self.mode == Mode::Completed
    }

    pub fn plan(&self) -> &WorkoutPlan {
        &self.plan
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn total_exercises(&self) -> usize {
        self.plan.exercises.len()
    }

    pub fn current_item(&self) -> &WorkoutPlanItem {
        &self.plan.exercises[self.index]
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn total_elapsed_seconds(&self) -> u32 {
        self.total_elapsed_seconds
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Remaining time as `mm:ss`
    pub fn formatted_time(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_seconds / 60,
            self.remaining_seconds % 60
        )
    }

    /// Progress through the current item, 0-100. A zero-duration item
    /// reads as fully progressed.
    pub fn progress_percent(&self) -> f32 {
        let planned = self.current_item().duration_seconds();
        if planned == 0 {
            return 100.0;
        }
        let done = planned - self.remaining_seconds.min(planned);
        (done as f32 / planned as f32 * 100.0).clamp(0.0, 100.0)
    }

    /// Per-item execution records for building a workout log entry
    pub fn log_entries(&self) -> Vec<ExerciseLogEntry> {
        self.plan
            .exercises
            .iter()
            .zip(&self.progress)
            .map(|(item, progress)| ExerciseLogEntry {
                name: item.exercise.name.clone(),
                exercise_id: Some(item.exercise.id.clone()),
                planned_duration: item.duration_seconds(),
                actual_duration: progress.actual_seconds,
                completed: progress.completed,
                feedback: None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exercises::{Difficulty, Exercise, TargetMuscle};
    use crate::planner::{TrainingGoal, UserPreferences};
    use uuid::Uuid;

    fn timed_item(duration: u32) -> WorkoutPlanItem {
        // sets = 0 leaves the whole duration in rest_seconds, giving the
        // item an arbitrary playback length for timer tests
        WorkoutPlanItem {
            exercise: Exercise {
                id: format!("ex_{duration}"),
                name: format!("Exercise {duration}"),
                description: String::new(),
                target_muscle: TargetMuscle::Core,
                difficulty: Difficulty::Beginner,
                equipment_needed: None,
                video_url: String::new(),
                duration_seconds: duration,
                calories_per_minute: None,
                is_active: true,
                priority_weight: 5,
            },
            sets: 0,
            reps: 0,
            rest_seconds: duration,
        }
    }

    fn plan_with_durations(durations: &[u32]) -> WorkoutPlan {
        let exercises: Vec<_> = durations.iter().map(|d| timed_item(*d)).collect();
        let total: u32 = exercises.iter().map(|i| i.duration_seconds()).sum();
        WorkoutPlan {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            preferences: UserPreferences {
                training_goal: TrainingGoal::General,
                target_muscles: vec![TargetMuscle::Core],
                difficulty: Difficulty::Beginner,
                equipment_available: None,
                available_minutes: 30,
            },
            exercises,
            estimated_duration_minutes: (total as f64 / 60.0).round() as u32,
        }
    }

    fn session(durations: &[u32]) -> PlayerSession {
        PlayerSession::new(plan_with_durations(durations)).unwrap()
    }

    #[test]
    fn test_empty_plan_rejected() {
        let plan = plan_with_durations(&[]);
        assert_eq!(PlayerSession::new(plan).unwrap_err(), PlayerError::EmptyPlan);
    }

    #[test]
    fn test_starts_running_at_first_item() {
        let s = session(&[10, 5]);
        assert_eq!(s.mode(), Mode::Running);
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.remaining_seconds(), 10);
    }

    #[test]
    fn test_tick_counts_down() {
        let mut s = session(&[10, 5]);
        s.tick();
        assert_eq!(s.remaining_seconds(), 9);
        assert_eq!(s.total_elapsed_seconds(), 1);
    }

    #[test]
    fn test_zero_duration_item_auto_advances() {
        let mut s = session(&[10, 0, 5]);

        // The tick that exhausts item 0 passes straight through the
        // zero-duration item 1 and lands on item 2
        for _ in 0..10 {
            s.tick();
        }
        assert_eq!(s.current_index(), 2);
        assert_eq!(s.remaining_seconds(), 5);
        assert_eq!(s.mode(), Mode::Running);

        s.tick();
        assert_eq!(s.remaining_seconds(), 4);
        assert_eq!(s.mode(), Mode::Running);
    }

    #[test]
    fn test_natural_completion() {
        let mut s = session(&[2, 3]);
        for _ in 0..5 {
            s.tick();
        }
        assert_eq!(s.mode(), Mode::Completed);
        assert!(s.completed_at().is_some());
        assert_eq!(s.total_elapsed_seconds(), 5);

        let entries = s.log_entries();
        assert!(entries.iter().all(|e| e.completed));
        assert_eq!(entries[0].actual_duration, 2);
        assert_eq!(entries[1].actual_duration, 3);
    }

    #[test]
    fn test_pause_freezes_time() {
        let mut s = session(&[10]);
        s.tick();
        s.pause();
        assert_eq!(s.mode(), Mode::Paused);

        for _ in 0..5 {
            s.tick();
        }
        assert_eq!(s.remaining_seconds(), 9);

        s.resume();
        s.tick();
        assert_eq!(s.remaining_seconds(), 8);
    }

    #[test]
    fn test_resume_only_from_paused() {
        let mut s = session(&[10]);
        s.resume();
        assert_eq!(s.mode(), Mode::Running);
        s.pause();
        s.pause();
        assert_eq!(s.mode(), Mode::Paused);
    }

    #[test]
    fn test_next_skips_with_timer_reset() {
        let mut s = session(&[10, 7, 5]);
        s.tick();
        s.next();
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.remaining_seconds(), 7);
        assert_eq!(s.mode(), Mode::Running);

        // Skipped early, so item 0 is not completed
        assert!(!s.log_entries()[0].completed);
        assert_eq!(s.log_entries()[0].actual_duration, 1);
    }

    #[test]
    fn test_next_at_last_index_completes() {
        let mut s = session(&[10, 5]);
        s.next();
        assert_eq!(s.current_index(), 1);
        s.next();
        assert_eq!(s.mode(), Mode::Completed);
    }

    #[test]
    fn test_next_from_paused_completes_at_end() {
        let mut s = session(&[10, 5]);
        s.next();
        s.pause();
        s.next();
        assert_eq!(s.mode(), Mode::Completed);
    }

    #[test]
    fn test_next_preserves_pause() {
        let mut s = session(&[10, 5, 3]);
        s.pause();
        s.next();
        assert_eq!(s.current_index(), 1);
        assert_eq!(s.mode(), Mode::Paused);
    }

    #[test]
    fn test_previous_resets_full_duration() {
        let mut s = session(&[10, 7]);
        for _ in 0..3 {
            s.tick();
        }
        s.next();
        s.tick();
        s.previous();

        // Full planned duration, no partial-time restoration
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.remaining_seconds(), 10);
    }

    #[test]
    fn test_previous_at_index_zero_is_noop() {
        let mut s = session(&[10, 7]);
        for _ in 0..3 {
            s.tick();
        }
        s.previous();
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.remaining_seconds(), 7);
        assert_eq!(s.mode(), Mode::Running);
    }

    #[test]
    fn test_reset_after_completion() {
        let mut s = session(&[2, 3]);
        s.next();
        s.next();
        assert_eq!(s.mode(), Mode::Completed);

        s.reset();
        assert_eq!(s.mode(), Mode::Running);
        assert_eq!(s.current_index(), 0);
        assert_eq!(s.remaining_seconds(), 2);
        assert_eq!(s.total_elapsed_seconds(), 0);
        assert!(s.completed_at().is_none());
    }

    #[test]
    fn test_reset_is_noop_before_completion() {
        let mut s = session(&[10, 5]);
        for _ in 0..4 {
            s.tick();
        }
        s.reset();
        assert_eq!(s.remaining_seconds(), 6);
    }

    #[test]
    fn test_formatted_time() {
        let mut s = session(&[95]);
        assert_eq!(s.formatted_time(), "01:35");
        s.tick();
        assert_eq!(s.formatted_time(), "01:34");
    }

    #[test]
    fn test_progress_percent() {
        let mut s = session(&[10]);
        assert_eq!(s.progress_percent(), 0.0);
        for _ in 0..5 {
            s.tick();
        }
        assert_eq!(s.progress_percent(), 50.0);
    }

    #[test]
    fn test_log_entries_shape() {
        let mut s = session(&[4, 6]);
        for _ in 0..4 {
            s.tick();
        }
        s.next();

        let entries = s.log_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].planned_duration, 4);
        assert_eq!(entries[0].actual_duration, 4);
        assert!(entries[0].completed);
        assert!(!entries[1].completed);
    }
}
