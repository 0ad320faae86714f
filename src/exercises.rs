//! Exercise catalog types and the built-in exercise set

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Muscle groups an exercise can target
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TargetMuscle {
    Chest,
    Back,
    Shoulders,
    Arms,
    Core,
    Legs,
    FullBody,
}

impl TargetMuscle {
    pub fn label(&self) -> &'static str {
        match self {
            TargetMuscle::Chest => "chest",
            TargetMuscle::Back => "back",
            TargetMuscle::Shoulders => "shoulders",
            TargetMuscle::Arms => "arms",
            TargetMuscle::Core => "core",
            TargetMuscle::Legs => "legs",
            TargetMuscle::FullBody => "full body",
        }
    }

    /// All muscle groups for iteration
    pub fn all() -> &'static [TargetMuscle] {
        &[
            TargetMuscle::Chest,
            TargetMuscle::Back,
            TargetMuscle::Shoulders,
            TargetMuscle::Arms,
            TargetMuscle::Core,
            TargetMuscle::Legs,
            TargetMuscle::FullBody,
        ]
    }
}

impl fmt::Display for TargetMuscle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TargetMuscle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chest" => Ok(TargetMuscle::Chest),
            "back" => Ok(TargetMuscle::Back),
            "shoulders" => Ok(TargetMuscle::Shoulders),
            "arms" => Ok(TargetMuscle::Arms),
            "core" => Ok(TargetMuscle::Core),
            "legs" => Ok(TargetMuscle::Legs),
            "full_body" | "full-body" | "fullbody" => Ok(TargetMuscle::FullBody),
            other => Err(format!("unknown muscle group: {other}")),
        }
    }
}

/// Exercise difficulty levels, ordered beginner -> advanced
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    fn rank(&self) -> i8 {
        match self {
            Difficulty::Beginner => 0,
            Difficulty::Intermediate => 1,
            Difficulty::Advanced => 2,
        }
    }

    /// Adjacent levels only: beginner<->intermediate<->advanced, no wraparound
    pub fn is_adjacent(&self, other: Difficulty) -> bool {
        (self.rank() - other.rank()).abs() == 1
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Catalog entry for a single exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub description: String,
    pub target_muscle: TargetMuscle,
    pub difficulty: Difficulty,
    /// Required equipment, `None` for bodyweight exercises
    pub equipment_needed: Option<String>,
    pub video_url: String,
    /// Nominal demo duration of the guidance video
    pub duration_seconds: u32,
    pub calories_per_minute: Option<f32>,
    pub is_active: bool,
    pub priority_weight: i32,
}

struct ExerciseDef {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    target_muscle: TargetMuscle,
    difficulty: Difficulty,
    equipment_needed: Option<&'static str>,
    duration_seconds: u32,
    calories_per_minute: f32,
    priority_weight: i32,
}

const BUILTIN_DEFS: &[ExerciseDef] = &[
    ExerciseDef {
        id: "squat",
        name: "Squat",
        description: "Classic lower-body movement strengthening the leg muscles",
        target_muscle: TargetMuscle::Legs,
        difficulty: Difficulty::Beginner,
        equipment_needed: None,
        duration_seconds: 45,
        calories_per_minute: 8.5,
        priority_weight: 10,
    },
    ExerciseDef {
        id: "pushup",
        name: "Push-up",
        description: "Compound movement working chest, shoulders and arms",
        target_muscle: TargetMuscle::Chest,
        difficulty: Difficulty::Beginner,
        equipment_needed: None,
        duration_seconds: 40,
        calories_per_minute: 7.0,
        priority_weight: 9,
    },
    ExerciseDef {
        id: "plank",
        name: "Plank",
        description: "Foundational core stability hold",
        target_muscle: TargetMuscle::Core,
        difficulty: Difficulty::Beginner,
        equipment_needed: None,
        duration_seconds: 60,
        calories_per_minute: 5.0,
        priority_weight: 8,
    },
    ExerciseDef {
        id: "pullup",
        name: "Pull-up",
        description: "Classic back builder on the bar",
        target_muscle: TargetMuscle::Back,
        difficulty: Difficulty::Intermediate,
        equipment_needed: Some("pull-up bar"),
        duration_seconds: 30,
        calories_per_minute: 9.0,
        priority_weight: 9,
    },
    ExerciseDef {
        id: "shoulder_press",
        name: "Shoulder Press",
        description: "Overhead press for shoulder strength",
        target_muscle: TargetMuscle::Shoulders,
        difficulty: Difficulty::Intermediate,
        equipment_needed: Some("dumbbells"),
        duration_seconds: 45,
        calories_per_minute: 6.5,
        priority_weight: 7,
    },
    ExerciseDef {
        id: "bicep_curl",
        name: "Bicep Curl",
        description: "Isolated arm work for the biceps",
        target_muscle: TargetMuscle::Arms,
        difficulty: Difficulty::Beginner,
        equipment_needed: Some("dumbbells"),
        duration_seconds: 40,
        calories_per_minute: 5.5,
        priority_weight: 6,
    },
    ExerciseDef {
        id: "lunge",
        name: "Lunge",
        description: "Single-leg strength and balance work",
        target_muscle: TargetMuscle::Legs,
        difficulty: Difficulty::Intermediate,
        equipment_needed: None,
        duration_seconds: 50,
        calories_per_minute: 7.5,
        priority_weight: 8,
    },
    ExerciseDef {
        id: "glute_bridge",
        name: "Glute Bridge",
        description: "Hip extension from the floor, easy on the knees",
        target_muscle: TargetMuscle::Legs,
        difficulty: Difficulty::Beginner,
        equipment_needed: None,
        duration_seconds: 40,
        calories_per_minute: 5.0,
        priority_weight: 5,
    },
    ExerciseDef {
        id: "burpee",
        name: "Burpee",
        description: "High-intensity full-body conditioning",
        target_muscle: TargetMuscle::FullBody,
        difficulty: Difficulty::Advanced,
        equipment_needed: None,
        duration_seconds: 30,
        calories_per_minute: 12.0,
        priority_weight: 7,
    },
    ExerciseDef {
        id: "dumbbell_row",
        name: "Dumbbell Row",
        description: "Bent-over row for the upper back",
        target_muscle: TargetMuscle::Back,
        difficulty: Difficulty::Beginner,
        equipment_needed: Some("dumbbells"),
        duration_seconds: 45,
        calories_per_minute: 6.0,
        priority_weight: 6,
    },
    ExerciseDef {
        id: "mountain_climber",
        name: "Mountain Climber",
        description: "Dynamic core drill with a cardio component",
        target_muscle: TargetMuscle::Core,
        difficulty: Difficulty::Intermediate,
        equipment_needed: None,
        duration_seconds: 35,
        calories_per_minute: 10.0,
        priority_weight: 7,
    },
    ExerciseDef {
        id: "pike_pushup",
        name: "Pike Push-up",
        description: "Bodyweight pressing with the hips high, shoulder dominant",
        target_muscle: TargetMuscle::Shoulders,
        difficulty: Difficulty::Advanced,
        equipment_needed: None,
        duration_seconds: 35,
        calories_per_minute: 8.0,
        priority_weight: 6,
    },
];

/// Built-in exercise set used when no external catalog is wired up
pub fn builtin_exercises() -> Vec<Exercise> {
    BUILTIN_DEFS
        .iter()
        .map(|def| Exercise {
            id: def.id.to_string(),
            name: def.name.to_string(),
            description: def.description.to_string(),
            target_muscle: def.target_muscle,
            difficulty: def.difficulty,
            equipment_needed: def.equipment_needed.map(str::to_string),
            video_url: format!("https://videos.vcoach.dev/{}.mp4", def.id),
            duration_seconds: def.duration_seconds,
            calories_per_minute: Some(def.calories_per_minute),
            is_active: true,
            priority_weight: def.priority_weight,
        })
        .collect()
}

pub fn find_exercise<'a>(exercises: &'a [Exercise], id: &str) -> Option<&'a Exercise> {
    exercises.iter().find(|e| e.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_exercises_active() {
        let exercises = builtin_exercises();
        assert!(exercises.len() >= 6);
        assert!(exercises.iter().all(|e| e.is_active));
    }

    #[test]
    fn test_builtin_ids_unique() {
        let exercises = builtin_exercises();
        for (i, a) in exercises.iter().enumerate() {
            for b in &exercises[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn test_find_exercise() {
        let exercises = builtin_exercises();
        assert!(find_exercise(&exercises, "squat").is_some());
        assert!(find_exercise(&exercises, "deadlift").is_none());
    }

    #[test]
    fn test_difficulty_adjacency() {
        assert!(Difficulty::Beginner.is_adjacent(Difficulty::Intermediate));
        assert!(Difficulty::Advanced.is_adjacent(Difficulty::Intermediate));
        assert!(!Difficulty::Beginner.is_adjacent(Difficulty::Advanced));
        assert!(!Difficulty::Intermediate.is_adjacent(Difficulty::Intermediate));
    }

    #[test]
    fn test_muscle_from_str() {
        assert_eq!("Legs".parse::<TargetMuscle>().unwrap(), TargetMuscle::Legs);
        assert_eq!(
            "full-body".parse::<TargetMuscle>().unwrap(),
            TargetMuscle::FullBody
        );
        assert!("quads".parse::<TargetMuscle>().is_err());
    }
}
