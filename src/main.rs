mod tui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use fincalc::logging::{self, LogSink};
use fincalc::{script, Settings};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "fincalc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "RPN financial calculator for the terminal", long_about = None)]
struct Cli {
    /// TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Press a sequence of keys without opening the keypad, e.g. `run 7 ENTER 3 +`
    Run {
        /// Print the whole calculator state as JSON instead of the display
        #[arg(long)]
        json: bool,

        /// Key labels, separated by spaces
        #[arg(required = true, allow_hyphen_values = true, trailing_var_arg = true)]
        keys: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Some(Command::Run { json, keys }) => {
            logging::init(&settings.log, LogSink::Stderr)?;
            run_script(&keys, json)
        }
        None => {
            logging::init(&settings.log, LogSink::File(settings.log.file.clone()))?;
            run_keypad(settings)
        }
    }
}

fn run_script(tokens: &[String], json: bool) -> Result<()> {
    let keys = script::parse(tokens)?;
    let calculator = script::run(&keys);
    if json {
        println!("{}", script::to_json(&calculator)?);
    } else {
        println!("{}", calculator.display());
    }
    Ok(())
}

fn run_keypad(settings: Settings) -> Result<()> {
    info!("starting keypad");
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let app = tui::App::new(settings.ui);
    let res = tui::run_app(&mut terminal, app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    close_keypad(res)
}

/// Log how the session ended and hand the event-loop result back to `main`.
fn close_keypad(res: Result<()>) -> Result<()> {
    match &res {
        Ok(()) => info!("keypad closed"),
        Err(err) => error!(error = %err, "keypad closed with error"),
    }
    res
}
