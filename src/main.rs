//! vcoach - Virtual fitness coach
//!
//! Plan a workout, train through it with the player, review your history.

use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use vcoach::catalog::{BuiltinCatalog, CachedCatalog, ExerciseCatalog};
use vcoach::db::{Database, UpdateWorkoutLogInput, WorkoutLogStore};
use vcoach::exercises::{Difficulty, TargetMuscle};
use vcoach::planner::{self, TrainingGoal, UserPreferences, WorkoutPlan};
use vcoach::session::PlanCache;
use vcoach::stats::Analytics;
use vcoach::tui::App;

/// Catalog cache lifetime
const CATALOG_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Parser)]
#[command(name = "vcoach")]
#[command(author, version, about = "Virtual fitness coach - plan and play workouts")]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Workout log database path
    #[arg(long, env = "VCOACH_DB", default_value = "vcoach.db", global = true)]
    db: String,

    /// Session plan cache path
    #[arg(long, env = "VCOACH_PLAN_CACHE", default_value = ".vcoach-plan.json", global = true)]
    plan_cache: String,

    /// Act as this user instead of guest
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PrefArgs {
    /// Training goal (muscle_gain, weight_loss, endurance; anything else
    /// falls back to a general program)
    #[arg(short, long, default_value = "general")]
    goal: TrainingGoal,

    /// Target muscle group, repeatable (chest, back, shoulders, arms,
    /// core, legs, full_body)
    #[arg(short, long = "muscle")]
    muscles: Vec<TargetMuscle>,

    /// Difficulty level
    #[arg(short, long, default_value = "beginner")]
    difficulty: Difficulty,

    /// Available equipment, repeatable; omit for no constraint
    #[arg(short, long = "equipment")]
    equipment: Vec<String>,

    /// Available training time in minutes
    #[arg(short = 't', long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(15..=90))]
    minutes: u32,
}

impl PrefArgs {
    fn into_preferences(self) -> Result<UserPreferences> {
        if self.muscles.is_empty() {
            anyhow::bail!("at least one --muscle is required");
        }
        Ok(UserPreferences {
            training_goal: self.goal,
            target_muscles: self.muscles,
            difficulty: self.difficulty,
            equipment_available: if self.equipment.is_empty() {
                None
            } else {
                Some(self.equipment)
            },
            available_minutes: self.minutes,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a workout plan and print it
    Plan {
        #[command(flatten)]
        prefs: PrefArgs,
    },

    /// Generate a plan (or resume the cached one) and start the training player
    Play {
        #[command(flatten)]
        prefs: PrefArgs,

        /// Reuse the last generated plan instead of generating a new one
        #[arg(long, conflicts_with_all = ["goal", "muscles", "difficulty", "equipment", "minutes"])]
        resume: bool,
    },

    /// List past workout sessions
    History {
        /// Number of records to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show one workout session in detail
    Show {
        /// Workout log id
        id: String,
    },

    /// Rate a finished session and attach notes
    Rate {
        /// Workout log id
        id: String,

        /// 1-5 stars
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: Option<u8>,

        /// Free-text notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Show training statistics
    Stats,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let plan_cache = PlanCache::new(&cli.plan_cache);

    match cli.command {
        Commands::Plan { prefs } => {
            let plan = generate_plan(prefs.into_preferences()?)?;
            print_plan(&plan);
            plan_cache.save(&plan)?;
            println!("\nPlan cached; start it with: vcoach play --resume");
        }

        Commands::Play { prefs, resume } => {
            let plan = if resume {
                plan_cache
                    .load()
                    .ok_or_else(|| anyhow::anyhow!("no cached plan; run `vcoach plan` first"))?
            } else {
                let plan = generate_plan(prefs.into_preferences()?)?;
                plan_cache.save(&plan)?;
                plan
            };

            let db = Database::open(&cli.db)?;
            let mut app = App::new(plan, db, cli.user.clone())?;
            app.run()?;

            match app.saved_log_id() {
                Some(id) => {
                    plan_cache.clear();
                    println!("Workout complete. Log id: {id}");
                    println!("Rate it with: vcoach rate {id} --rating <1-5>");
                }
                None => println!("Exited without completing; nothing was logged."),
            }
        }

        Commands::History { limit } => {
            let db = Database::open(&cli.db)?;
            let logs = db.list(cli.user.as_deref(), limit, 0)?;

            println!("Recent workouts:");
            println!("{:-<72}", "");
            for log in logs {
                println!(
                    "{} | {} | {:12} | {:2} exercises | {}",
                    log.id,
                    log.started_at.format("%Y-%m-%d %H:%M"),
                    log.goal,
                    log.exercise_count,
                    log.rating.map_or("unrated".to_string(), |r| format!("{r}/5")),
                );
            }
        }

        Commands::Show { id } => {
            let db = Database::open(&cli.db)?;
            match db.get(&id, cli.user.as_deref())? {
                Some(log) => {
                    println!(
                        "{} - {} ({} min, {})",
                        log.started_at.format("%Y-%m-%d %H:%M"),
                        log.settings.goal,
                        log.duration_minutes,
                        log.settings.difficulty,
                    );
                    println!("{:-<60}", "");
                    for entry in &log.exercises {
                        println!(
                            "{:24} | planned {:4}s | actual {:4}s | {}",
                            entry.name,
                            entry.planned_duration,
                            entry.actual_duration,
                            if entry.completed { "done" } else { "skipped" },
                        );
                    }
                    if let Some(notes) = &log.notes {
                        println!("Notes: {notes}");
                    }
                }
                None => println!("No workout log with id {id}"),
            }
        }

        Commands::Rate { id, rating, notes } => {
            let db = Database::open(&cli.db)?;
            let input = UpdateWorkoutLogInput { rating, notes };
            match db.update(&id, cli.user.as_deref(), input)? {
                Some(log) => println!(
                    "Updated {}: {}",
                    log.id,
                    log.rating.map_or("unrated".to_string(), |r| format!("{r}/5")),
                ),
                None => println!("No workout log with id {id}"),
            }
        }

        Commands::Stats => {
            let db = Database::open(&cli.db)?;
            let logs = db.list(cli.user.as_deref(), 10_000, 0)?;
            let analytics = Analytics::new(logs);
            let stats = analytics.stats();

            println!("Training statistics");
            println!("{:-<40}", "");
            println!("Total workouts: {}", stats.total_workouts);
            println!("Total minutes:  {}", stats.total_minutes);
            match stats.avg_rating {
                Some(avg) => println!("Average rating: {avg:.1}/5"),
                None => println!("Average rating: -"),
            }
            if let Some(last) = stats.last_workout_at {
                println!("Last workout:   {}", last.format("%Y-%m-%d %H:%M"));
            }
            println!("Current streak: {} days", stats.current_streak);
            println!("Frequency:      {:.1} sessions/week", analytics.weekly_frequency());
        }
    }

    Ok(())
}

fn generate_plan(prefs: UserPreferences) -> Result<WorkoutPlan> {
    let catalog = CachedCatalog::new(BuiltinCatalog, CATALOG_TTL);
    let exercises = catalog.get_all()?;
    let plan = planner::generate(&exercises, &prefs)?;
    Ok(plan)
}

fn print_plan(plan: &WorkoutPlan) {
    println!(
        "Workout plan - {} - ~{} min",
        plan.preferences.training_goal, plan.estimated_duration_minutes,
    );
    println!("{:-<72}", "");
    for (i, item) in plan.exercises.iter().enumerate() {
        println!(
            "{:2}. {:24} | {}x{:2} | {:12} | {:12} | rest {:2}s",
            i + 1,
            item.exercise.name,
            item.sets,
            item.reps,
            item.exercise.target_muscle,
            item.exercise.difficulty,
            item.rest_seconds,
        );
    }
}
