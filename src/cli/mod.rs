pub mod commands;
pub mod menu;
pub mod output;
pub mod prompt;

use std::{io::IsTerminal, path::PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use commands::{add_habit, check_in_habit, delete_habit, list_habits};
use menu::Menu;
use prompt::Prompter;
use tokio::io::BufReader;
use tracing::{info, level_filters::LevelFilter, warn};

use crate::{
    storage::{
        entities::{Frequency, Habit},
        habit_storage::JsonHabitStorage,
    },
    utils::{
        clock::{Clock, DefaultClock},
        dir::{HABITS_FILE_NAME, create_application_default_path},
        logging::{CLI_PREFIX, LogSettings, enable_logging},
        time::parse_check_in_date,
    },
};

#[derive(Parser, Debug)]
#[command(name = "Habitual", version, long_about = None)]
#[command(about = "Track daily and weekly habits", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Option<Commands>,
    #[arg(
        long,
        help = "File with habits. By default uses habits.json in $XDG_STATE_HOME/habitual or $HOME/.local/state/habitual"
    )]
    file: Option<PathBuf>,
    #[arg(long, help = "Enable trace logging")]
    log: bool,
    #[arg(long = "log-filter", help = "Log level. Overrides --log and RUST_LOG")]
    log_filter: Option<LevelFilter>,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console")]
    log_console: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Interactive menu. Used when no command is given")]
    Menu,
    #[command(about = "Show all habits with their completion rate")]
    List,
    #[command(about = "Add a new habit")]
    Add {
        id: String,
        name: String,
        #[arg(value_enum)]
        frequency: Frequency,
        #[arg(allow_negative_numbers = true, help = "Number of times to complete per period")]
        target: i64,
    },
    #[command(about = "Check in a habit, for today unless --date is given")]
    CheckIn {
        id: String,
        #[arg(
            long,
            short,
            help = "Date of the check-in. Examples are \"2024-01-31\", \"yesterday\", \"3 days ago\""
        )]
        date: Option<String>,
        #[arg(long, help = "Record the day as not completed")]
        missed: bool,
    },
    #[command(about = "Delete a habit")]
    Delete { id: String },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();
    let app_dir = create_application_default_path();

    let settings = LogSettings {
        level: args
            .log_filter
            .or_else(|| args.log.then_some(LevelFilter::TRACE)),
        console: args.log_console,
    };
    let log_dir = app_dir.as_ref().ok().map(|v| v.join("logs"));
    if let Err(e) = enable_logging(CLI_PREFIX, log_dir.as_deref(), settings) {
        eprintln!("{e:#}");
    }
    if let Err(e) = &app_dir {
        warn!("Application directory is unavailable, file logging is skipped: {e:#}");
    }

    let storage = JsonHabitStorage::new(habits_path(args.file, app_dir)?);
    info!("Using habits from {:?}", storage.path());
    let mut stdout = std::io::stdout();

    match args.commands.unwrap_or(Commands::Menu) {
        Commands::Menu => {
            let styled = stdout.is_terminal();
            let prompter = Prompter::new(BufReader::new(tokio::io::stdin()), stdout, styled);
            Menu::new(storage, prompter, Box::new(DefaultClock))
                .run()
                .await
        }
        Commands::List => list_habits(&storage, &mut stdout).await,
        Commands::Add {
            id,
            name,
            frequency,
            target,
        } => {
            let id = non_empty_arg("id", id)?;
            let name = non_empty_arg("name", name)?;
            add_habit(&storage, Habit::new(id, name, frequency, target), &mut stdout).await
        }
        Commands::CheckIn { id, date, missed } => {
            let date = resolve_date(date, &DefaultClock)?;
            check_in_habit(&storage, id.trim(), date, !missed, &mut stdout).await
        }
        Commands::Delete { id } => delete_habit(&storage, id.trim(), &mut stdout).await,
    }
}

/// `--file` wins; the application directory is only needed without it.
fn habits_path(file: Option<PathBuf>, app_dir: Result<PathBuf>) -> Result<PathBuf> {
    match file {
        Some(v) => Ok(v),
        None => Ok(app_dir
            .context("Pass --file or set HOME/XDG_STATE_HOME for the default habits file")?
            .join(HABITS_FILE_NAME)),
    }
}

fn non_empty_arg(name: &str, value: String) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Habit {name} cannot be empty"),
            )
            .into());
    }
    Ok(value.to_string())
}

fn resolve_date(date: Option<String>, clock: &dyn Clock) -> Result<NaiveDate> {
    let now = clock.now();
    match date.map(|s| parse_check_in_date(&s, now)) {
        Some(Ok(v)) => Ok(v),
        Some(Err(e)) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate check-in date {e}"),
            )
            .into()),
        None => Ok(now.date_naive()),
    }
}
