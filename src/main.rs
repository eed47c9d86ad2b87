//! user-center-tui binary entry point.
//!
//! Parses flags, sets up file logging, loads the config files, logs in when
//! credentials are given, then runs the TUI event loop and restores the
//! terminal state on exit.
//!
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use user_center_tui::api::HttpUserApi;
use user_center_tui::app::config::{self, ConsoleConfig};
use user_center_tui::app::keymap::Keymap;
use user_center_tui::app::{self as app, ActiveTab, AppState, Theme};

#[derive(Parser, Debug)]
#[command(name = "user-center-tui", version, about = "Terminal console for the user-center backend")]
struct Args {
    /// Backend root, e.g. http://localhost:8080
    #[arg(long, env = "USER_CENTER_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "USER_CENTER_ACCOUNT")]
    account: Option<String>,

    #[arg(long, env = "USER_CENTER_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Rows per page on the user list
    #[arg(long)]
    page_size: Option<u32>,

    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Directory holding console.conf, theme.conf and keybinds.conf
    #[arg(long)]
    config_dir: Option<PathBuf>,

    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// Route `tracing` output to a file; the terminal belongs to the UI.
fn init_logging(path: &std::path::Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .try_init()
        .context("install tracing subscriber")?;
    Ok(())
}

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) {
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture).ok();
    terminal.show_cursor().ok();
}

fn main() -> Result<()> {
    let args = Args::parse();

    let dir = args.config_dir.clone().unwrap_or_else(config::config_dir);
    std::fs::create_dir_all(&dir).with_context(|| format!("create config dir {}", dir.display()))?;
    init_logging(&args.log_file.clone().unwrap_or_else(|| dir.join("user-center-tui.log")))?;

    let mut console = ConsoleConfig::load_or_init(&dir.join("console.conf"));
    if let Some(url) = args.base_url {
        console.base_url = url;
    }
    if let Some(n) = args.page_size {
        console.page_size = n.max(1);
    }
    if let Some(n) = args.timeout_secs {
        console.timeout_secs = n.max(1);
    }
    info!(base_url = %console.base_url, page_size = console.page_size, "starting");

    let api = HttpUserApi::new(&console.base_url, Duration::from_secs(console.timeout_secs))
        .with_context(|| format!("backend url {}", console.base_url))?;
    let theme = Theme::load_or_init(&dir.join("theme.conf").to_string_lossy());
    let keymap = Keymap::load_or_init(&dir.join("keybinds.conf").to_string_lossy());

    let mut state = AppState::new(Box::new(api), theme, keymap, console.page_size);
    match (args.account.as_deref(), args.password.as_deref()) {
        (Some(account), Some(password)) => {
            state.login(account, password);
        }
        (Some(_), None) | (None, Some(_)) => warn!("both --account and --password are needed to log in"),
        (None, None) => {}
    }
    state.enter_tab(ActiveTab::Profile);

    let mut terminal = init_terminal().context("init terminal")?;
    let res = app::run(&mut terminal, &mut state);
    restore_terminal(&mut terminal);

    if let Err(err) = res {
        eprintln!("application error: {err:#}");
    }
    Ok(())
}
