mod commands;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use commands::Command;
use recovery_coach::llm::CompletionParams;
use recovery_coach::providers::build_client;
use recovery_coach::{sensation_message, CoachSession, LlmGenerator, MessageKind};
use recovery_core::{
    catalog, CoachConfig, KeyValueStore, LoadOutcome, PainLog, ProgressEvent, ReminderScheduler,
    SystemClock,
};
use recovery_store::SqliteStore;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "recovery-coach", author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "RECOVERY_CONFIG")]
    config: Option<PathBuf>,

    /// Path to the SQLite database (overrides config)
    #[arg(short, long)]
    db: Option<String>,

    /// Model to use (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    /// gemini, openai or mock (overrides config)
    #[arg(long)]
    provider: Option<String>,

    /// Also write logs to a daily-rotated file in this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Do not run the reminder scheduler
    #[arg(long)]
    no_reminders: bool,
}

/// `~/.config/recovery-coach/config.toml`, falling back to the working dir.
fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("recovery-coach").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("recovery-coach.toml"))
}

/// Logs go to stderr (and optionally a file) so they never interleave with
/// the chat on stdout. The returned guard must live until exit.
fn init_logging(args: &Args) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_writer, guard) = match &args.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "recovery-coach.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter);
    if args.log_json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .with(file_writer.map(|w| {
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(w)
                    .with_ansi(false)
            }))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .with(file_writer.map(|w| tracing_subscriber::fmt::layer().with_writer(w).with_ansi(false)))
            .init();
    }
    guard
}

fn prompt() -> Result<()> {
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

fn print_events(events: &[ProgressEvent]) {
    for e in events {
        println!("{}", render::event(e));
    }
}

/// Print only what a cumulative fragment adds to what is already on screen.
fn print_fragment(printed: &mut String, fragment: &str) {
    match fragment.strip_prefix(printed.as_str()) {
        Some(suffix) => print!("{}", suffix),
        None => print!("\n{}", fragment),
    }
    let _ = std::io::stdout().flush();
    *printed = fragment.to_string();
}

async fn chat(session: &mut CoachSession, text: &str, kind: MessageKind) {
    print!("\nCoach: ");
    let _ = std::io::stdout().flush();
    let mut printed = String::new();
    let reply = session
        .send_message(text, kind, |f| print_fragment(&mut printed, f))
        .await;
    if reply.is_none() {
        print!("(sin respuesta)");
    }
    println!("\n");
}

async fn welcome(session: &mut CoachSession, cfg: &CoachConfig) {
    tokio::time::sleep(cfg.coach.welcome_delay()).await;
    if session.seed_welcome().await {
        if let Some(turn) = session.state().chat_history.last() {
            println!("\nCoach: {}\n", turn.text);
        }
    }
}

/// Returns false when the loop should stop.
async fn handle(session: &mut CoachSession, cfg: &CoachConfig, command: Command) -> Result<bool> {
    match command {
        Command::Empty => {}
        Command::Quit => return Ok(false),
        Command::Help => println!("{}", commands::HELP),
        Command::Usage(usage) => println!("Uso: {}", usage),
        Command::Status => println!("{}", render::progress(&session.progress())),
        Command::Plan(None) => {
            println!("{}", render::plan_overview(|id| session.is_completed_today(id)))
        }
        Command::Plan(Some(day_id)) => match catalog::workout(&day_id) {
            Some(day) => {
                let checklist = session.checklist(&day_id).await?;
                println!("{}", render::workout(day, &checklist));
            }
            None => println!("Día desconocido: {}", day_id),
        },
        Command::Check { day_id, n, checked } => {
            let Some(day) = catalog::workout(&day_id) else {
                println!("Día desconocido: {}", day_id);
                return Ok(true);
            };
            let Some(exercise) = day.exercises.get(n - 1) else {
                println!("{} tiene {} ejercicios", day_id, day.exercises.len());
                return Ok(true);
            };
            let update = session.toggle_exercise(&day_id, exercise.name, checked).await?;
            println!("{}", render::workout(day, &update.checklist));
            print_events(&update.events);
        }
        Command::Done(day_id) => {
            let events = session.complete_workout(&day_id).await?;
            if events.is_empty() {
                println!("Ya completaste {} hoy. ¡Vuelve mañana!", day_id);
            }
            print_events(&events);
        }
        Command::Diary { pain, stress, sleep } => {
            if session.has_logged_today() {
                println!("Ya has registrado tu diario hoy.");
                return Ok(true);
            }
            let log = PainLog::new(pain, stress, sleep)?;
            print_events(&session.save_pain_log(log).await);
        }
        Command::History => println!("{}", render::pain_history(session.state())),
        Command::Sense(description) => {
            chat(session, &sensation_message(&description), MessageKind::SensationAnalysis).await
        }
        Command::Reset => {
            session.reset().await?;
            println!("Progreso borrado.");
            welcome(session, cfg).await;
        }
        Command::Chat(text) => chat(session, &text, MessageKind::Coaching).await,
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let _log_guard = init_logging(&args);

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let mut cfg = CoachConfig::load_or_default(&config_path);
    if let Some(db) = &args.db {
        cfg.storage.db_path = db.clone();
    }
    if let Some(model) = &args.model {
        cfg.llm.model = model.clone();
    }
    if let Some(provider) = &args.provider {
        cfg.llm.provider = provider.clone();
    }
    if args.no_reminders {
        cfg.reminders.enabled = false;
    }

    tracing::info!("Opening database at {}", cfg.storage.db_path);
    let store: Arc<dyn KeyValueStore> = Arc::new(
        SqliteStore::new(&cfg.storage.db_path)
            .await
            .with_context(|| format!("Failed to open {}", cfg.storage.db_path))?,
    );
    let clock = Arc::new(SystemClock);
    let client = build_client(&cfg.llm)?;
    let generator = Arc::new(LlmGenerator::new(client, CompletionParams::from(&cfg.llm)));

    let (mut session, outcome) = CoachSession::open(store.clone(), clock.clone(), generator).await?;

    let (reminder_tx, mut reminder_rx) = mpsc::channel(8);
    let scheduler = cfg.reminders.enabled.then(|| {
        ReminderScheduler::new(store.clone(), clock.clone())
            .with_interval(cfg.reminders.tick_interval())
            .spawn(reminder_tx)
    });

    println!("Coach de Recuperación Lumbar. Escribe 'help' para ver los comandos.");
    if outcome != LoadOutcome::Restored {
        welcome(&mut session, &cfg).await;
    }
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match handle(&mut session, &cfg, commands::parse(&line)).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => {
                        tracing::debug!("Command failed: {:#}", e);
                        println!("Error: {}", e);
                    }
                }
                prompt()?;
            }
            Some(reminder) = reminder_rx.recv() => {
                println!("\n{}", render::reminder(&reminder));
                prompt()?;
            }
        }
    }

    if let Some(handle) = scheduler {
        handle.abort();
    }
    println!("¡Hasta pronto! Sigue sumando XP.");
    Ok(())
}
