//! TUI module - Training player with ratatui
//!
//! Hosts the playback state machine: one event loop serializes the
//! 1-second tick against keyboard-triggered transitions.

use std::io::{Stdout, stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

use crate::db::{CreateWorkoutLogInput, Database, WorkoutLogStore, WorkoutSettings};
use crate::planner::WorkoutPlan;
use crate::player::{Mode, PlayerSession};

type Tui = Terminal<CrosstermBackend<Stdout>>;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// App state for the training player
pub struct App {
    session: PlayerSession,
    db: Database,
    user_id: Option<String>,
    last_tick: Instant,
    confirm_exit: bool,
    should_quit: bool,
    /// Log id once the current run has been persisted
    saved_log_id: Option<String>,
}

impl App {
    pub fn new(plan: WorkoutPlan, db: Database, user_id: Option<String>) -> Result<Self> {
        let session = PlayerSession::new(plan)?;
        Ok(Self {
            session,
            db,
            user_id,
            last_tick: Instant::now(),
            confirm_exit: false,
            should_quit: false,
            saved_log_id: None,
        })
    }

    /// Run the training player
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;

        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
            if self.last_tick.elapsed() >= TICK_INTERVAL {
                self.session.tick();
                self.last_tick = Instant::now();
            }
            self.persist_if_completed()?;
        }

        restore_terminal()?;
        Ok(())
    }

    pub fn session(&self) -> &PlayerSession {
        &self.session
    }

    pub fn saved_log_id(&self) -> Option<&str> {
        self.saved_log_id.as_deref()
    }

    /// Write the workout log once per completed run
    fn persist_if_completed(&mut self) -> Result<()> {
        if !self.session.is_completed() || self.saved_log_id.is_some() {
            return Ok(());
        }

        let plan = self.session.plan();
        let input = CreateWorkoutLogInput {
            started_at: self.session.started_at(),
            completed_at: self.session.completed_at().unwrap_or(self.session.started_at()),
            duration_minutes: (self.session.total_elapsed_seconds() as f64 / 60.0).round() as u32,
            settings: WorkoutSettings::from(&plan.preferences),
            exercises: self.session.log_entries(),
            rating: None,
            notes: None,
        };

        let log = self.db.create(self.user_id.as_deref(), input)?;
        self.saved_log_id = Some(log.id);
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        if self.session.is_completed() {
            self.render_completed(frame);
        } else {
            self.render_player(frame);
        }
    }

    fn render_player(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(5),
                Constraint::Length(3),
            ])
            .split(area);

        let plan = self.session.plan();
        let header = Paragraph::new(format!(
            "Exercise {}/{} - {} - ~{} min",
            self.session.current_index() + 1,
            self.session.total_exercises(),
            plan.preferences.training_goal,
            plan.estimated_duration_minutes,
        ))
        .style(Style::default().fg(Color::Cyan).bold())
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        if self.confirm_exit {
            let confirm = Paragraph::new("Exit training?\n\nYour progress will not be saved.\n\ny: exit | n: keep training")
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("Confirm"));
            frame.render_widget(confirm, chunks[1]);
        } else {
            let item = self.session.current_item();
            let mut lines = vec![
                Line::from(item.exercise.name.clone()).style(Style::default().bold()),
                Line::from(format!(
                    "{} sets x {} reps{}",
                    item.sets,
                    item.reps,
                    if item.rest_seconds > 0 {
                        format!(" | rest {}s after", item.rest_seconds)
                    } else {
                        String::new()
                    }
                )),
            ];
            if !item.exercise.description.is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(item.exercise.description.clone()));
            }
            if let Some(equipment) = &item.exercise.equipment_needed {
                lines.push(Line::from(format!("Equipment: {equipment}")));
            }

            let body = Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title("Current exercise"));
            frame.render_widget(body, chunks[1]);
        }

        let timer_title = match self.session.mode() {
            Mode::Paused => "Timer (PAUSED)",
            _ => "Timer",
        };
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(timer_title))
            .gauge_style(Style::default().fg(Color::Green))
            .ratio(f64::from(self.session.progress_percent()) / 100.0)
            .label(self.session.formatted_time());
        frame.render_widget(gauge, chunks[2]);

        let footer = Paragraph::new("space: pause/resume | \u{2190}/\u{2192}: previous/next | q: exit")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[3]);
    }

    fn render_completed(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(3)])
            .split(area);

        let entries = self.session.log_entries();
        let done = entries.iter().filter(|e| e.completed).count();
        let minutes = (self.session.total_elapsed_seconds() as f64 / 60.0).round() as u32;

        let mut lines = vec![
            Line::from("Workout complete!").style(Style::default().fg(Color::Green).bold()),
            Line::from(""),
            Line::from(format!("Exercises finished: {done}/{}", entries.len())),
            Line::from(format!("Time trained: {minutes} min")),
        ];
        if let Some(id) = &self.saved_log_id {
            lines.push(Line::from(format!("Saved to workout log {id}")));
        }

        let summary = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Summary"));
        frame.render_widget(summary, chunks[0]);

        let footer = Paragraph::new("r: restart | q: quit")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[1]);
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            if self.session.is_completed() {
                match key.code {
                    KeyCode::Char('r') => {
                        self.session.reset();
                        self.saved_log_id = None;
                        self.last_tick = Instant::now();
                    }
                    KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                    _ => {}
                }
            } else if self.confirm_exit {
                match key.code {
                    KeyCode::Char('y') => self.should_quit = true,
                    KeyCode::Char('n') | KeyCode::Esc => self.confirm_exit = false,
                    _ => {}
                }
            } else {
                match key.code {
                    KeyCode::Char(' ') => self.session.toggle_pause(),
                    KeyCode::Right => self.session.next(),
                    KeyCode::Left => self.session.previous(),
                    KeyCode::Char('q') | KeyCode::Esc => self.confirm_exit = true,
                    _ => {}
                }
            }
        }
        Ok(())
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
