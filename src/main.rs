use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{bail, Context as _, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing_subscriber::EnvFilter;

use attendance_dash::app::{App, Destination, StatusLevel};
use attendance_dash::config::{self, Config};
use attendance_dash::domain::{Session, SessionGate, StalePolicy, User};
use attendance_dash::infrastructure::{Collaborators, HttpBackend, RuntimeBridge, RuntimeCommand};
use attendance_dash::ui;

#[derive(Debug, Parser)]
#[command(
    name = "attendance-dash",
    version,
    about = "Instructor dashboard for the attendance backend"
)]
struct Args {
    /// Backend base URL (e.g. http://localhost:3000/api)
    #[arg(long)]
    api: Option<String>,

    /// Session file written at login
    #[arg(long)]
    session: Option<PathBuf>,

    /// Bearer token, instead of a session file
    #[arg(long, requires = "user")]
    token: Option<String>,

    /// Display name used with --token
    #[arg(long)]
    user: Option<String>,

    /// Drop statistics responses overtaken by a newer request
    #[arg(long)]
    discard_stale: bool,

    /// Log file (the terminal is taken by the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (mut config, config_error) = match config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(err)),
    };
    if let Some(api) = args.api.as_deref() {
        config.api.base_url = config::normalize_base_url(api);
    }

    init_logging(&args, &config)?;
    if let Some(err) = &config_error {
        tracing::warn!(error = %format!("{err:#}"), "ignoring invalid config file, using defaults");
    }

    let (session, source) = resolve_session(&args, &config)?;
    tracing::info!(user = %session.user.display_name, api = %config.api.base_url, "starting dashboard");

    let policy = if args.discard_stale || config.stats.discard_stale {
        StalePolicy::LatestOnly
    } else {
        StalePolicy::LastWriteWins
    };

    let backend = HttpBackend::new(&config.api)?;
    let runtime = RuntimeBridge::new(Collaborators::from_backend(backend), session.clone())?;
    let mut app = App::new(SessionGate::new(session, source), policy);
    if config_error.is_some() {
        app.set_status("Invalid config file, using defaults", StatusLevel::Warn);
    }

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, &runtime);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match res {
        Ok(Destination::SignedOut { warning }) => {
            println!("Signed out.");
            if let Some(warning) = warning {
                eprintln!("warning: {warning}");
            }
        }
        Ok(Destination::Quit) => {}
        Err(err) => eprintln!("{err:?}"),
    }

    Ok(())
}

fn init_logging(args: &Args, config: &Config) -> Result<()> {
    let Some(path) = args.log_file.clone().or_else(|| config.log_path()) else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// CLI token beats the session file
fn resolve_session(args: &Args, config: &Config) -> Result<(Session, Option<PathBuf>)> {
    if let (Some(token), Some(user)) = (args.token.as_ref(), args.user.as_ref()) {
        let session = Session {
            token: token.clone(),
            user: User::named(user.clone()),
        };
        return Ok((session, None));
    }

    let Some(path) = args.session.clone().or_else(|| config.session_path()) else {
        bail!("no session found: pass --session or --token/--user");
    };
    if !path.exists() {
        bail!(
            "no session at {}: sign in first or pass --token/--user",
            path.display()
        );
    }
    let session = Session::load(&path)?;
    Ok((session, Some(path)))
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: &RuntimeBridge,
) -> Result<Destination> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, runtime);
        terminal.draw(|f| ui::draw(f, &mut app))?;
        if let Some(destination) = app.exit.take() {
            let _ = runtime.send(RuntimeCommand::Shutdown);
            return Ok(destination);
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        pump_background(&mut app, runtime);
    }
}

fn pump_background(app: &mut App, runtime: &RuntimeBridge) {
    for event in runtime.poll_events() {
        app.apply_event(event);
    }
    for cmd in app.drain_commands() {
        if let Err(err) = runtime.send(cmd.clone()) {
            tracing::error!(error = %err, "runtime worker is gone");
            app.command_failed(cmd, err.to_string());
        }
    }
}
