//! Workout plan generation - tiered filtering and greedy duration fill

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::exercises::{Difficulty, Exercise, TargetMuscle};

/// Minimum number of exercises in a viable plan
pub const MIN_EXERCISES_COUNT: usize = 3;

/// Assumed seconds per repetition
const SECONDS_PER_REP: u32 = 3;

/// Rest between sets, seconds
const REST_BETWEEN_SETS: u32 = 30;

/// Rest after an exercise, seconds (zeroed for the last item)
const DEFAULT_REST_SECONDS: u32 = 15;

/// What the user is training for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrainingGoal {
    MuscleGain,
    WeightLoss,
    Endurance,
    /// Catch-all for goals the generator does not recognize
    #[serde(other)]
    General,
}

impl TrainingGoal {
    pub fn label(&self) -> &'static str {
        match self {
            TrainingGoal::MuscleGain => "muscle gain",
            TrainingGoal::WeightLoss => "weight loss",
            TrainingGoal::Endurance => "endurance",
            TrainingGoal::General => "general fitness",
        }
    }

    /// Suggested sets for this goal
    fn sets(&self) -> u32 {
        match self {
            TrainingGoal::MuscleGain => 4,
            TrainingGoal::WeightLoss => 3,
            TrainingGoal::Endurance => 3,
            TrainingGoal::General => 3,
        }
    }

    /// Suggested reps per set for this goal
    fn reps(&self) -> u32 {
        match self {
            TrainingGoal::MuscleGain => 10,
            TrainingGoal::WeightLoss => 15,
            TrainingGoal::Endurance => 20,
            TrainingGoal::General => 12,
        }
    }
}

impl fmt::Display for TrainingGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TrainingGoal {
    type Err = std::convert::Infallible;

    /// Unrecognized goals fall back to `General`, never an error
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "muscle_gain" | "muscle-gain" => TrainingGoal::MuscleGain,
            "weight_loss" | "weight-loss" => TrainingGoal::WeightLoss,
            "endurance" => TrainingGoal::Endurance,
            _ => TrainingGoal::General,
        })
    }
}

/// Per-session preferences collected from the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPreferences {
    pub training_goal: TrainingGoal,
    /// Non-empty set of muscles to train
    pub target_muscles: Vec<TargetMuscle>,
    pub difficulty: Difficulty,
    /// Allowed equipment; `None` or empty means no constraint
    pub equipment_available: Option<Vec<String>>,
    /// Available training time, minutes
    pub available_minutes: u32,
}

/// One scheduled exercise within a plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlanItem {
    pub exercise: Exercise,
    pub sets: u32,
    pub reps: u32,
    /// Rest after this exercise; forced to 0 on the last item
    pub rest_seconds: u32,
}

impl WorkoutPlanItem {
    /// Total scheduled time for this item, including rest between sets
    /// and the trailing rest
    pub fn duration_seconds(&self) -> u32 {
        (self.reps * SECONDS_PER_REP + REST_BETWEEN_SETS) * self.sets + self.rest_seconds
    }
}

/// Generated plan: ordered exercises plus the preferences that produced it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub preferences: UserPreferences,
    /// Playback order
    pub exercises: Vec<WorkoutPlanItem>,
    pub estimated_duration_minutes: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("no exercises match the requested muscle groups; adjust the filters and try again")]
    NoMatch,
    #[error(
        "only {found} eligible exercises (minimum {}); \
         increase available time or relax the filters",
        MIN_EXERCISES_COUNT
    )]
    Insufficient { found: usize },
}

/// Generate a workout plan from a catalog snapshot and user preferences.
///
/// Deterministic for identical inputs: candidates are ordered by priority
/// weight descending with name descending as tie-break.
pub fn generate(catalog: &[Exercise], prefs: &UserPreferences) -> Result<WorkoutPlan, PlanError> {
    let filtered = filter_exercises(catalog, prefs)?;

    if filtered.len() < MIN_EXERCISES_COUNT {
        return Err(PlanError::Insufficient {
            found: filtered.len(),
        });
    }

    let mut selected = select_exercises(&filtered, prefs);

    if selected.len() < MIN_EXERCISES_COUNT {
        return Err(PlanError::Insufficient {
            found: selected.len(),
        });
    }

    // The last exercise needs no trailing rest
    if let Some(last) = selected.last_mut() {
        last.rest_seconds = 0;
    }

    // Recompute from the final item list so the stored estimate always
    // matches the sequence, including the zeroed last rest
    let total_seconds: u32 = selected.iter().map(WorkoutPlanItem::duration_seconds).sum();
    let estimated_duration_minutes = (total_seconds as f64 / 60.0).round() as u32;

    debug!(
        exercises = selected.len(),
        minutes = estimated_duration_minutes,
        "generated workout plan"
    );

    Ok(WorkoutPlan {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        preferences: prefs.clone(),
        exercises: selected,
        estimated_duration_minutes,
    })
}

fn equipment_ok(exercise: &Exercise, prefs: &UserPreferences) -> bool {
    match (&prefs.equipment_available, &exercise.equipment_needed) {
        (Some(allowed), Some(needed)) if !allowed.is_empty() => allowed.contains(needed),
        _ => true,
    }
}

fn muscle_ok(exercise: &Exercise, prefs: &UserPreferences) -> bool {
    prefs.target_muscles.contains(&exercise.target_muscle)
}

/// Tiered relaxation: exact match, then adjacent difficulty, then
/// muscle-only. Stops at the first tier yielding the minimum count.
fn filter_exercises<'a>(
    catalog: &'a [Exercise],
    prefs: &UserPreferences,
) -> Result<Vec<&'a Exercise>, PlanError> {
    let exact: Vec<&Exercise> = catalog
        .iter()
        .filter(|e| {
            e.difficulty == prefs.difficulty && muscle_ok(e, prefs) && equipment_ok(e, prefs)
        })
        .collect();

    debug!(count = exact.len(), "exact filter tier");
    if exact.len() >= MIN_EXERCISES_COUNT {
        return Ok(exact);
    }

    let relaxed: Vec<&Exercise> = catalog
        .iter()
        .filter(|e| {
            (e.difficulty == prefs.difficulty || e.difficulty.is_adjacent(prefs.difficulty))
                && muscle_ok(e, prefs)
                && equipment_ok(e, prefs)
        })
        .collect();

    debug!(count = relaxed.len(), "adjacent difficulty tier");
    if relaxed.len() >= MIN_EXERCISES_COUNT {
        return Ok(relaxed);
    }

    let muscle_only: Vec<&Exercise> = catalog.iter().filter(|e| muscle_ok(e, prefs)).collect();

    debug!(count = muscle_only.len(), "muscle-only tier");
    if muscle_only.is_empty() {
        return Err(PlanError::NoMatch);
    }

    Ok(muscle_only)
}

/// Greedy fill toward the target duration with 10% overrun tolerance
fn select_exercises(candidates: &[&Exercise], prefs: &UserPreferences) -> Vec<WorkoutPlanItem> {
    let target_seconds = prefs.available_minutes * 60;
    let limit_seconds = target_seconds + target_seconds / 10;

    let mut ordered: Vec<&Exercise> = candidates.to_vec();
    ordered.sort_by(|a, b| {
        b.priority_weight
            .cmp(&a.priority_weight)
            .then_with(|| b.name.cmp(&a.name))
    });

    let sets = prefs.training_goal.sets();
    let reps = prefs.training_goal.reps();

    let mut selected = Vec::new();
    let mut accumulated = 0u32;

    for exercise in ordered {
        let item = WorkoutPlanItem {
            exercise: (*exercise).clone(),
            sets,
            reps,
            rest_seconds: DEFAULT_REST_SECONDS,
        };
        let exercise_time = item.duration_seconds();

        if accumulated + exercise_time <= limit_seconds {
            accumulated += exercise_time;
            selected.push(item);
        }

        if accumulated >= target_seconds && selected.len() >= MIN_EXERCISES_COUNT {
            break;
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(
        name: &str,
        muscle: TargetMuscle,
        difficulty: Difficulty,
        equipment: Option<&str>,
        priority: i32,
    ) -> Exercise {
        Exercise {
            id: name.to_lowercase().replace(' ', "_"),
            name: name.to_string(),
            description: String::new(),
            target_muscle: muscle,
            difficulty,
            equipment_needed: equipment.map(str::to_string),
            video_url: String::new(),
            duration_seconds: 40,
            calories_per_minute: None,
            is_active: true,
            priority_weight: priority,
        }
    }

    fn prefs(goal: TrainingGoal, muscles: &[TargetMuscle], difficulty: Difficulty) -> UserPreferences {
        UserPreferences {
            training_goal: goal,
            target_muscles: muscles.to_vec(),
            difficulty,
            equipment_available: None,
            available_minutes: 30,
        }
    }

    fn leg_catalog(difficulty: Difficulty, count: usize) -> Vec<Exercise> {
        (0..count)
            .map(|i| {
                exercise(
                    &format!("Leg Drill {i}"),
                    TargetMuscle::Legs,
                    difficulty,
                    None,
                    5,
                )
            })
            .collect()
    }

    #[test]
    fn test_generate_is_deterministic() {
        let catalog = crate::exercises::builtin_exercises();
        let prefs = prefs(
            TrainingGoal::WeightLoss,
            &[TargetMuscle::Legs, TargetMuscle::Core, TargetMuscle::Chest],
            Difficulty::Beginner,
        );

        let a = generate(&catalog, &prefs).unwrap();
        let b = generate(&catalog, &prefs).unwrap();

        let ids_a: Vec<_> = a.exercises.iter().map(|i| i.exercise.id.clone()).collect();
        let ids_b: Vec<_> = b.exercises.iter().map(|i| i.exercise.id.clone()).collect();
        assert_eq!(ids_a, ids_b);
        assert_eq!(a.estimated_duration_minutes, b.estimated_duration_minutes);
    }

    #[test]
    fn test_minimum_exercise_count() {
        let catalog = crate::exercises::builtin_exercises();
        let prefs = prefs(
            TrainingGoal::MuscleGain,
            &[TargetMuscle::Legs, TargetMuscle::Back],
            Difficulty::Beginner,
        );

        let plan = generate(&catalog, &prefs).unwrap();
        assert!(plan.exercises.len() >= MIN_EXERCISES_COUNT);
    }

    #[test]
    fn test_duration_invariant() {
        let catalog = crate::exercises::builtin_exercises();
        let prefs = prefs(
            TrainingGoal::Endurance,
            &[TargetMuscle::Legs, TargetMuscle::Core],
            Difficulty::Beginner,
        );

        let plan = generate(&catalog, &prefs).unwrap();

        // Recompute independently from the item sequence
        let total: u32 = plan
            .exercises
            .iter()
            .map(|item| (item.reps * 3 + 30) * item.sets + item.rest_seconds)
            .sum();
        let expected = (total as f64 / 60.0).round() as u32;
        assert_eq!(plan.estimated_duration_minutes, expected);
    }

    #[test]
    fn test_last_item_rest_is_zero() {
        let catalog = crate::exercises::builtin_exercises();
        let prefs = prefs(
            TrainingGoal::WeightLoss,
            &[TargetMuscle::Legs, TargetMuscle::Chest, TargetMuscle::Core],
            Difficulty::Beginner,
        );

        let plan = generate(&catalog, &prefs).unwrap();
        assert_eq!(plan.exercises.last().unwrap().rest_seconds, 0);
        for item in &plan.exercises[..plan.exercises.len() - 1] {
            assert_eq!(item.rest_seconds, 15);
        }
    }

    #[test]
    fn test_relaxation_selects_only_adjacent_difficulty() {
        // No exact beginner matches; three intermediate (adjacent) and two
        // advanced (two steps away) leg exercises
        let mut catalog = leg_catalog(Difficulty::Intermediate, 3);
        catalog.extend(leg_catalog(Difficulty::Advanced, 2));

        let prefs = prefs(TrainingGoal::General, &[TargetMuscle::Legs], Difficulty::Beginner);
        let plan = generate(&catalog, &prefs).unwrap();

        assert!(plan.exercises.len() >= MIN_EXERCISES_COUNT);
        for item in &plan.exercises {
            assert!(
                item.exercise.difficulty == Difficulty::Intermediate,
                "{} is two difficulty steps from the request",
                item.exercise.name
            );
        }
    }

    #[test]
    fn test_no_match_error() {
        let catalog = leg_catalog(Difficulty::Beginner, 5);
        let prefs = prefs(TrainingGoal::General, &[TargetMuscle::Chest], Difficulty::Beginner);

        assert_eq!(generate(&catalog, &prefs).unwrap_err(), PlanError::NoMatch);
    }

    #[test]
    fn test_insufficient_error() {
        let catalog = leg_catalog(Difficulty::Beginner, 2);
        let prefs = prefs(TrainingGoal::General, &[TargetMuscle::Legs], Difficulty::Beginner);

        assert_eq!(
            generate(&catalog, &prefs).unwrap_err(),
            PlanError::Insufficient { found: 2 }
        );
    }

    #[test]
    fn test_equipment_allow_list() {
        let catalog = vec![
            exercise("Squat", TargetMuscle::Legs, Difficulty::Beginner, None, 5),
            exercise("Goblet Squat", TargetMuscle::Legs, Difficulty::Beginner, Some("kettlebell"), 5),
            exercise("Leg Press", TargetMuscle::Legs, Difficulty::Beginner, Some("machine"), 5),
            exercise("Lunge", TargetMuscle::Legs, Difficulty::Beginner, None, 5),
            exercise("Step-up", TargetMuscle::Legs, Difficulty::Beginner, None, 5),
        ];
        let mut prefs = prefs(TrainingGoal::General, &[TargetMuscle::Legs], Difficulty::Beginner);
        prefs.equipment_available = Some(vec!["kettlebell".to_string()]);

        let plan = generate(&catalog, &prefs).unwrap();
        for item in &plan.exercises {
            assert_ne!(item.exercise.name, "Leg Press");
        }
    }

    #[test]
    fn test_goal_tables() {
        let catalog = leg_catalog(Difficulty::Beginner, 6);

        let cases = [
            (TrainingGoal::MuscleGain, 4, 10),
            (TrainingGoal::WeightLoss, 3, 15),
            (TrainingGoal::Endurance, 3, 20),
            (TrainingGoal::General, 3, 12),
        ];
        for (goal, sets, reps) in cases {
            let prefs = prefs(goal, &[TargetMuscle::Legs], Difficulty::Beginner);
            let plan = generate(&catalog, &prefs).unwrap();
            for item in &plan.exercises {
                assert_eq!((item.sets, item.reps), (sets, reps), "goal {goal:?}");
            }
        }
    }

    #[test]
    fn test_unrecognized_goal_falls_back() {
        let goal: TrainingGoal = "crossfit_prep".parse().unwrap();
        assert_eq!(goal, TrainingGoal::General);
        assert_eq!((goal.sets(), goal.reps()), (3, 12));
    }

    #[test]
    fn test_priority_weight_ordering() {
        // Equal durations, distinct priorities: highest priority first
        let catalog = vec![
            exercise("Alpha", TargetMuscle::Legs, Difficulty::Beginner, None, 1),
            exercise("Bravo", TargetMuscle::Legs, Difficulty::Beginner, None, 9),
            exercise("Charlie", TargetMuscle::Legs, Difficulty::Beginner, None, 5),
            exercise("Delta", TargetMuscle::Legs, Difficulty::Beginner, None, 7),
        ];
        let prefs = prefs(TrainingGoal::General, &[TargetMuscle::Legs], Difficulty::Beginner);

        let plan = generate(&catalog, &prefs).unwrap();
        let names: Vec<_> = plan
            .exercises
            .iter()
            .map(|i| i.exercise.name.as_str())
            .collect();
        assert_eq!(&names[..3], &["Bravo", "Delta", "Charlie"]);
    }

    #[test]
    fn test_overrun_tolerance() {
        // General goal: 213s per item. 15 min target = 900s, limit 990s.
        // Four items would be 852s <= 990, a fifth would be 1065 > 990.
        let catalog = leg_catalog(Difficulty::Beginner, 10);
        let mut prefs = prefs(TrainingGoal::General, &[TargetMuscle::Legs], Difficulty::Beginner);
        prefs.available_minutes = 15;

        let plan = generate(&catalog, &prefs).unwrap();
        assert_eq!(plan.exercises.len(), 4);
    }
}
