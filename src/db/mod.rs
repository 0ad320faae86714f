//! Workout log storage - SQLite-backed store for completed sessions
//!
//! `WorkoutLogStore` is the seam between the player host and persistence:
//! the SQLite implementation below covers local (guest) use, and a remote
//! backend would be a second implementation selected by the caller.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::exercises::Difficulty;
use crate::planner::UserPreferences;

/// Qualitative per-exercise feedback captured after a session
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseFeedback {
    TooEasy,
    JustRight,
    TooHard,
}

/// Execution record for one exercise of a finished session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseLogEntry {
    pub name: String,
    pub exercise_id: Option<String>,
    /// Planned playback seconds
    pub planned_duration: u32,
    /// Seconds actually spent
    pub actual_duration: u32,
    /// False when the user skipped ahead before the timer ran out
    pub completed: bool,
    pub feedback: Option<ExerciseFeedback>,
}

/// Snapshot of the preferences a session was generated from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSettings {
    pub goal: String,
    pub difficulty: Difficulty,
    pub equipment: Vec<String>,
    /// Planned total duration, minutes
    pub planned_duration: u32,
}

impl From<&UserPreferences> for WorkoutSettings {
    fn from(prefs: &UserPreferences) -> Self {
        Self {
            goal: prefs.training_goal.label().to_string(),
            difficulty: prefs.difficulty,
            equipment: prefs.equipment_available.clone().unwrap_or_default(),
            planned_duration: prefs.available_minutes,
        }
    }
}

/// One persisted workout session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: String,
    /// `None` for guest sessions
    pub user_id: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub settings: WorkoutSettings,
    pub exercises: Vec<ExerciseLogEntry>,
    /// 1-5 stars, added after the session
    pub rating: Option<u8>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a log; id and bookkeeping timestamps are generated
#[derive(Debug, Clone)]
pub struct CreateWorkoutLogInput {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub settings: WorkoutSettings,
    pub exercises: Vec<ExerciseLogEntry>,
    pub rating: Option<u8>,
    pub notes: Option<String>,
}

/// Post-session feedback update; only rating and notes are mutable
#[derive(Debug, Clone, Default)]
pub struct UpdateWorkoutLogInput {
    pub rating: Option<u8>,
    pub notes: Option<String>,
}

/// Slim row for history listings
#[derive(Debug, Clone)]
pub struct WorkoutLogListItem {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub goal: String,
    pub exercise_count: usize,
    pub rating: Option<u8>,
}

/// Persistence contract for workout logs, scoped per user
/// (`None` = guest)
pub trait WorkoutLogStore {
    fn create(&self, user_id: Option<&str>, input: CreateWorkoutLogInput) -> Result<WorkoutLog>;
    fn update(
        &self,
        log_id: &str,
        user_id: Option<&str>,
        input: UpdateWorkoutLogInput,
    ) -> Result<Option<WorkoutLog>>;
    fn list(
        &self,
        user_id: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<WorkoutLogListItem>>;
    fn get(&self, log_id: &str, user_id: Option<&str>) -> Result<Option<WorkoutLog>>;
    fn delete(&self, log_id: &str, user_id: Option<&str>) -> Result<bool>;
}

/// SQLite database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// In-memory database for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS workout_logs (
                id TEXT PRIMARY KEY,
                user_id TEXT,
                started_at TEXT NOT NULL,
                completed_at TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                settings TEXT NOT NULL,
                exercises TEXT NOT NULL,
                rating INTEGER,
                notes TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

fn parse_date(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn json_column<T: serde::de::DeserializeOwned>(idx: usize, raw: &str) -> rusqlite::Result<T> {
    serde_json::from_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_log(row: &rusqlite::Row<'_>) -> rusqlite::Result<WorkoutLog> {
    let started: String = row.get(2)?;
    let completed: String = row.get(3)?;
    let settings_raw: String = row.get(5)?;
    let exercises_raw: String = row.get(6)?;
    let created: String = row.get(9)?;
    let updated: String = row.get(10)?;

    Ok(WorkoutLog {
        id: row.get(0)?,
        user_id: row.get(1)?,
        started_at: parse_date(&started),
        completed_at: parse_date(&completed),
        duration_minutes: row.get(4)?,
        settings: json_column(5, &settings_raw)?,
        exercises: json_column(6, &exercises_raw)?,
        rating: row.get(7)?,
        notes: row.get(8)?,
        created_at: parse_date(&created),
        updated_at: parse_date(&updated),
    })
}

const LOG_COLUMNS: &str = "id, user_id, started_at, completed_at, duration_minutes, \
                           settings, exercises, rating, notes, created_at, updated_at";

impl WorkoutLogStore for Database {
    fn create(&self, user_id: Option<&str>, input: CreateWorkoutLogInput) -> Result<WorkoutLog> {
        let now = Utc::now();
        let log = WorkoutLog {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.map(str::to_string),
            started_at: input.started_at,
            completed_at: input.completed_at,
            duration_minutes: input.duration_minutes,
            settings: input.settings,
            exercises: input.exercises,
            rating: input.rating,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };

        self.conn.execute(
            "INSERT INTO workout_logs (id, user_id, started_at, completed_at, duration_minutes, \
             settings, exercises, rating, notes, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                log.id,
                log.user_id,
                log.started_at.to_rfc3339(),
                log.completed_at.to_rfc3339(),
                log.duration_minutes,
                serde_json::to_string(&log.settings)?,
                serde_json::to_string(&log.exercises)?,
                log.rating,
                log.notes,
                log.created_at.to_rfc3339(),
                log.updated_at.to_rfc3339(),
            ],
        )?;

        debug!(id = %log.id, "workout log created");
        Ok(log)
    }

    fn update(
        &self,
        log_id: &str,
        user_id: Option<&str>,
        input: UpdateWorkoutLogInput,
    ) -> Result<Option<WorkoutLog>> {
        let Some(mut log) = self.get(log_id, user_id)? else {
            return Ok(None);
        };

        if let Some(rating) = input.rating {
            log.rating = Some(rating);
        }
        if let Some(notes) = input.notes {
            log.notes = Some(notes);
        }
        log.updated_at = Utc::now();

        self.conn.execute(
            "UPDATE workout_logs SET rating = ?1, notes = ?2, updated_at = ?3 \
             WHERE id = ?4 AND user_id IS ?5",
            params![
                log.rating,
                log.notes,
                log.updated_at.to_rfc3339(),
                log_id,
                user_id,
            ],
        )?;

        Ok(Some(log))
    }

    fn list(
        &self,
        user_id: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<WorkoutLogListItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LOG_COLUMNS} FROM workout_logs WHERE user_id IS ?1 \
             ORDER BY started_at DESC LIMIT ?2 OFFSET ?3"
        ))?;

        let items = stmt
            .query_map(params![user_id, limit as i64, offset as i64], row_to_log)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|log| WorkoutLogListItem {
                id: log.id,
                started_at: log.started_at,
                duration_minutes: log.duration_minutes,
                goal: log.settings.goal,
                exercise_count: log.exercises.len(),
                rating: log.rating,
            })
            .collect();

        Ok(items)
    }

    fn get(&self, log_id: &str, user_id: Option<&str>) -> Result<Option<WorkoutLog>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {LOG_COLUMNS} FROM workout_logs WHERE id = ?1 AND user_id IS ?2"
        ))?;

        let mut rows = stmt.query_map(params![log_id, user_id], row_to_log)?;
        Ok(rows.next().transpose()?)
    }

    fn delete(&self, log_id: &str, user_id: Option<&str>) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM workout_logs WHERE id = ?1 AND user_id IS ?2",
            params![log_id, user_id],
        )?;
        Ok(changed > 0)
    }
}
