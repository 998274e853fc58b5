//! Operator CLI for the reminder core.
//!
//! # Responsibility
//! - Inspect and edit a reminder database file.
//! - Replay recorded geofence events through the dispatcher, printing the
//!   notifications that would be shown.

use clap::{Parser, Subcommand};
use georemind_core::{
    init_logging, CoreConfig, GeofenceDispatcher, GeofencingEvent, LogNotifier,
    NotificationPayload, Notifier, Reminder, ReminderDraft, ReminderService, SqliteReminderStore,
};
use log::info;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "georemind")]
#[command(about = "Manage geolocated reminders and replay geofence events")]
struct Args {
    /// Reminder database file (overrides GEOREMIND_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files (overrides GEOREMIND_LOG_DIR)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error (overrides GEOREMIND_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print core linkage info
    Ping,
    /// Create a reminder with a generated id
    Save {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        location: String,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Print one reminder as JSON
    Get { id: String },
    /// Print every reminder as JSON lines
    List,
    /// Delete every reminder
    Clear,
    /// Replay a JSON event (or array of events) through the dispatcher.
    ///
    /// Each notification is printed to stdout as a `notify` JSON line,
    /// followed by one report line per event.
    Dispatch { events: PathBuf },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("georemind: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), String> {
    let mut config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(db) = args.db {
        config.db_path = db;
    }
    if let Some(log_dir) = args.log_dir {
        config.log_dir = Some(log_dir);
    }
    if let Some(level) = args.log_level {
        config.log_level = level;
    }

    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    if let Command::Ping = args.command {
        println!("georemind_core ping={}", georemind_core::ping());
        println!("georemind_core version={}", georemind_core::core_version());
        return Ok(());
    }

    let store = Arc::new(SqliteReminderStore::open(&config.db_path).map_err(|err| {
        format!(
            "failed to open database `{}`: {err}",
            config.db_path.display()
        )
    })?);
    let service = ReminderService::new(Arc::clone(&store));

    match args.command {
        Command::Ping => {}
        Command::Save {
            title,
            description,
            location,
            lat,
            lon,
        } => {
            let reminder = service
                .create_reminder(ReminderDraft {
                    title: Some(title),
                    description,
                    location_name: Some(location),
                    latitude: Some(lat),
                    longitude: Some(lon),
                })
                .map_err(|err| err.to_string())?;
            println!("{}", reminder.id);
        }
        Command::Get { id } => {
            let reminder = service.get_reminder(&id).map_err(|err| err.to_string())?;
            print_reminder(&reminder)?;
        }
        Command::List => {
            for reminder in service.list_reminders().map_err(|err| err.to_string())? {
                print_reminder(&reminder)?;
            }
        }
        Command::Clear => service.delete_all_reminders().map_err(|err| err.to_string())?,
        Command::Dispatch { events } => {
            let events = read_events(&events)?;
            info!(
                "event=cli_dispatch module=cli status=start events={}",
                events.len()
            );
            let dispatcher = GeofenceDispatcher::with_config(
                store,
                Arc::new(StdoutNotifier::default()),
                config.dispatcher(),
            );
            for event in events {
                let report = dispatcher.handle_event(event).await;
                println!(
                    "status={:?} notified={:?} not_found={:?} failed={}",
                    report.status,
                    report.notified,
                    report.not_found,
                    report.failed.len()
                );
            }
        }
    }

    Ok(())
}

/// Prints notifications to stdout and mirrors them to the log file.
///
/// Logging is only initialized with `--log-dir`, so stdout is the channel
/// an operator always sees.
#[derive(Default)]
struct StdoutNotifier {
    log: LogNotifier,
}

impl Notifier for StdoutNotifier {
    fn notify(&self, payload: NotificationPayload) {
        match notification_line(&payload) {
            Ok(line) => println!("{line}"),
            Err(err) => eprintln!(
                "georemind: failed to encode notification `{}`: {err}",
                payload.id
            ),
        }
        self.log.notify(payload);
    }
}

fn notification_line(payload: &NotificationPayload) -> Result<String, serde_json::Error> {
    serde_json::to_string(payload).map(|json| format!("notify {json}"))
}

fn print_reminder(reminder: &Reminder) -> Result<(), String> {
    let line = serde_json::to_string(reminder).map_err(|err| err.to_string())?;
    println!("{line}");
    Ok(())
}

/// Accepts either a single event object or an array of events.
fn read_events(path: &Path) -> Result<Vec<GeofencingEvent>, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .map_err(|err| format!("invalid JSON in `{}`: {err}", path.display()))?;

    let parsed = match value {
        serde_json::Value::Array(_) => serde_json::from_value::<Vec<GeofencingEvent>>(value),
        other => serde_json::from_value::<GeofencingEvent>(other).map(|event| vec![event]),
    };
    parsed.map_err(|err| format!("invalid geofence event in `{}`: {err}", path.display()))
}
