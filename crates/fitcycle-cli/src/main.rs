//! fitcycle - command-line workout cycle tracker
//!
//! Wires together the components:
//! - Plan loading (built-in default or a TOML file)
//! - Store initialization
//! - Cycle engine (status, logging wizard, rest, metrics, stats)
//! - Backup codec (snapshot export/import, CSV interop)

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fitcycle_backup::{
    export_snapshot, import_snapshot, import_template, metrics_csv, sessions_csv, set_logs_csv,
};
use fitcycle_core::{CycleEngine, StepAdvance, WizardError};
use fitcycle_model::SessionKind;
use fitcycle_plan::{default_plan, load_plan, Plan};
use fitcycle_store::{RecordStore, SqliteStore};
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn default_data_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fitcycle")
}

/// fitcycle - 5+2 weekly workout cycle tracker
#[derive(Parser, Debug)]
#[command(name = "fitcycle")]
#[command(about = "Track a recurring 7-day workout cycle", long_about = None)]
struct Args {
    /// Data directory (or set FITCYCLE_DATA_DIR)
    #[arg(short, long, env = "FITCYCLE_DATA_DIR", default_value_os_t = default_data_dir())]
    data_dir: PathBuf,

    /// Plan file override (TOML); built-in plan when omitted
    #[arg(short, long, env = "FITCYCLE_PLAN")]
    plan: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show cycle status, today's options and stats
    Status,
    /// Log today's workout (interactive, one weight per set)
    Log,
    /// Log a rest day
    Rest,
    /// Record today's bodyweight (lb)
    Weight { pounds: f64 },
    /// Record today's calories
    Calories { kcal: f64 },
    /// Show the active training plan
    Plan,
    /// Export a backup snapshot to a JSON file
    Backup { path: PathBuf },
    /// Replace all data from a backup snapshot
    Restore { path: PathBuf },
    /// Export per-kind CSV tables into a directory
    ExportCsv { dir: PathBuf },
    /// Import the bulk template (date,type,dayNumber,bodyweightLb)
    ImportTemplate { path: PathBuf },
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let plan = match &args.plan {
        Some(path) => load_plan(path)
            .with_context(|| format!("Failed to load plan from {}", path.display()))?,
        None => default_plan(),
    };

    std::fs::create_dir_all(&args.data_dir)
        .with_context(|| format!("Failed to create data directory {}", args.data_dir.display()))?;
    let db_path = args.data_dir.join("fitcycle.db");
    let store: Arc<SqliteStore> = Arc::new(
        SqliteStore::open(&db_path)
            .with_context(|| format!("Failed to open database {}", db_path.display()))?,
    );
    debug!(db_path = %db_path.display(), "Store opened");

    let today = fitcycle_util::today();
    let mut engine = CycleEngine::new(plan, store.clone())?;
    engine.check_expiry(today)?;

    match args.command {
        Command::Status => cmd_status(&engine, store.as_ref(), today),
        Command::Log => cmd_log(&mut engine, today),
        Command::Rest => cmd_rest(&mut engine, today),
        Command::Weight { pounds } => {
            let metric = engine.record_bodyweight(today, pounds)?;
            println!("Bodyweight saved: {} lb on {}", pounds, metric.date);
            Ok(())
        }
        Command::Calories { kcal } => {
            let metric = engine.record_calories(today, kcal)?;
            println!("Calories saved: {} kcal on {}", kcal, metric.date);
            Ok(())
        }
        Command::Plan => cmd_plan(engine.plan()),
        Command::Backup { path } => {
            let snapshot = export_snapshot(store.as_ref())?;
            std::fs::write(&path, snapshot.to_json()?)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Backup written to {} ({} sessions, {} set logs, {} metrics)",
                path.display(),
                snapshot.sessions.len(),
                snapshot.set_logs.len(),
                snapshot.metrics.len()
            );
            Ok(())
        }
        Command::Restore { path } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let summary = import_snapshot(store.as_ref(), &raw, today)?;
            println!(
                "Restored {} sessions, {} set logs, {} metrics (state {:?})",
                summary.sessions, summary.set_logs, summary.metrics, summary.state_source
            );
            Ok(())
        }
        Command::ExportCsv { dir } => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            std::fs::write(
                dir.join("fitcycle_sessions.csv"),
                sessions_csv(&store.list_all_sessions()?)?,
            )?;
            std::fs::write(
                dir.join("fitcycle_setlogs.csv"),
                set_logs_csv(&store.list_all_set_logs()?)?,
            )?;
            std::fs::write(
                dir.join("fitcycle_metrics.csv"),
                metrics_csv(&store.list_all_metrics()?)?,
            )?;
            println!("CSV tables written to {}", dir.display());
            Ok(())
        }
        Command::ImportTemplate { path } => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let summary = import_template(store.as_ref(), &text)?;
            // Imported sessions can contradict the live state; re-derive it.
            engine.rebuild_state(today)?;
            println!(
                "Imported {} sessions ({} duplicates skipped, {} rows invalid), {} metrics updated",
                summary.sessions_added,
                summary.sessions_skipped,
                summary.rows_skipped,
                summary.metrics_updated
            );
            Ok(())
        }
    }
}

fn cmd_status(engine: &CycleEngine, store: &dyn RecordStore, today: chrono::NaiveDate) -> Result<()> {
    let state = engine.state();

    println!("Today: {today}");
    if let Some(start) = state.start_date.filter(|_| state.active) {
        let day_n = fitcycle_util::days_between(start, today) + 1;
        println!("Cycle day {day_n}/7, started {start}");
        println!(
            "Workouts {}/5, rest {}/2",
            state.completed_workout_days.len(),
            state.rest_days_used
        );
        if state.is_complete() {
            println!("Cycle complete. A new one starts with the next Day 1 workout.");
        }
    } else {
        println!("No cycle running. The Day 1 workout starts one.");
    }

    match engine.today_session(today)? {
        Some(session) if session.kind == SessionKind::Rest => {
            println!("Already logged today: rest day");
        }
        Some(session) => {
            println!("Already logged today: workout day {}", session.day_number);
        }
        None => match engine.pending_workout_day() {
            Some(day) => {
                let title = engine
                    .plan()
                    .day(day)
                    .map(|d| d.title.as_str())
                    .unwrap_or("?");
                println!("Next workout: day {day} - {title}");
            }
            None => println!("All workouts done; only rest remains this cycle."),
        },
    }

    let stats = engine.stats_summary(today)?;
    println!();
    println!("Streak: {} day(s)", stats.streak_days);
    println!(
        "Workouts: {} (7d) / {} (30d)",
        stats.workouts_7d, stats.workouts_30d
    );
    if let Some(bw) = stats.latest_bodyweight_lb {
        println!("Bodyweight: {bw} lb");
    }
    if let Some(delta) = stats.weight_change_14d {
        println!("Weight change (14d): {delta:+.1} lb");
    }
    if let Some(cal) = stats.avg_calories_7d {
        println!("Avg calories (7d): {cal:.0}");
    }

    let recent = store.list_recent_sessions(5)?;
    if !recent.is_empty() {
        println!();
        println!("Recent:");
        for session in recent {
            match session.kind {
                SessionKind::Workout => {
                    println!("  {} - Day {} tracked", session.date, session.day_number)
                }
                SessionKind::Rest => println!("  {} - Rest tracked", session.date),
            }
        }
    }

    Ok(())
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn cmd_log(engine: &mut CycleEngine, today: chrono::NaiveDate) -> Result<()> {
    let mut wizard = engine.begin_workout(today)?;
    println!(
        "{} - {} sets, target {} reps per set",
        wizard.day_title(),
        wizard.step_count(),
        wizard.target_reps()
    );
    println!("Enter a weight, press Enter to accept the suggestion, 'b' to go back, 'q' to quit.");

    loop {
        let step = wizard.current();
        let suggestion = step
            .weight
            .map(|w| format!(" [{w}]"))
            .unwrap_or_default();
        let prompt = format!(
            "{} set {} ({} reps){}: ",
            step.exercise_name, step.set_number, step.target_reps, suggestion
        );

        let input = read_line(&prompt)?;
        match input.as_str() {
            "q" => {
                println!("Aborted; nothing was saved.");
                return Ok(());
            }
            "b" => {
                if !wizard.back() {
                    println!("Already at the first set.");
                }
                continue;
            }
            "" => {}
            raw => match raw.parse::<f64>() {
                Ok(weight) => {
                    if let Err(e) = wizard.enter_weight(weight) {
                        println!("{e}");
                        continue;
                    }
                }
                Err(_) => {
                    println!("Enter a number, 'b' or 'q'.");
                    continue;
                }
            },
        }

        match wizard.advance() {
            Ok(StepAdvance::NextSet) => {}
            Ok(StepAdvance::NextExercise { rest_hint }) => {
                println!("  rest ~{}s, then next exercise", rest_hint.as_secs());
            }
            Ok(StepAdvance::Done) => match wizard.finish() {
                Ok(completed) => {
                    let (session, events) = engine.save_workout(&completed, today)?;
                    println!(
                        "Workout saved: day {} on {} ({} sets).",
                        session.day_number,
                        session.date,
                        completed.sets.len()
                    );
                    for event in events {
                        match event {
                            fitcycle_core::CoreEvent::CycleStarted { start_date } => {
                                println!("Cycle started on {start_date}.")
                            }
                            fitcycle_core::CoreEvent::CycleCompleted => {
                                println!("Cycle complete: 5 workouts + 2 rests.")
                            }
                            _ => {}
                        }
                    }
                    return Ok(());
                }
                Err(WizardError::Incomplete {
                    exercise_name,
                    set_number,
                }) => {
                    // finish() repositioned the wizard onto the hole
                    println!("Missing weight: {exercise_name} set {set_number}.");
                }
                Err(e) => println!("{e}"),
            },
            Err(WizardError::WeightRequired) => {
                println!("A positive weight is required before advancing.");
            }
            Err(e) => println!("{e}"),
        }
    }
}

fn cmd_rest(engine: &mut CycleEngine, today: chrono::NaiveDate) -> Result<()> {
    let (session, events) = engine.log_rest(today)?;
    let left = engine.state().rest_days_left();
    println!("Rest logged for {} ({left} rest day(s) left).", session.date);
    if events.contains(&fitcycle_core::CoreEvent::CycleCompleted) {
        println!("Cycle complete: 5 workouts + 2 rests.");
    }
    Ok(())
}

fn cmd_plan(plan: &Plan) -> Result<()> {
    for day in plan.days() {
        println!(
            "Day {} - {} ({} reps)",
            day.number,
            day.title,
            plan.target_reps(day.number)
        );
        for exercise in &day.exercises {
            println!("  {} x{}", exercise.name, exercise.sets);
        }
    }
    Ok(())
}
