//! ttywm - a floating window manager inside one terminal
//!
//! ttywm opens shells as bordered windows over a tiled background. Windows
//! can be moved, resized, raised, renamed and spread over eight workspaces.
//! Session output is shown as plain text; keystrokes are never forwarded to
//! the shells.
//!
//! # Quick Start
//!
//! ```text
//! ttywm                  # Start with $SHELL
//! ttywm -s /bin/zsh      # Start windows with zsh
//! ```
//!
//! # Keybindings
//!
//! | Key | Action |
//! |-----|--------|
//! | Alt+Enter | Spawn window at cursor |
//! | Alt+w/a/s/d | Move cursor (or window, or window edge) |
//! | Alt+e / Alt+r | Toggle move / resize mode |
//! | Alt+z / Alt+q | Raise / close window under cursor |
//! | Alt+c, Enter | Rename window under cursor |
//! | Alt+1..8 | Toggle workspace |
//! | Alt+b | Cycle background |
//! | Alt+Esc | Quit |

mod app;
mod config;
mod core;
mod ui;
mod wm;

#[cfg(test)]
mod test_utils;

use std::env;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as TermEvent, KeyEventKind};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::app::{App, Event, Flow};
use crate::config::Config;
use crate::core::ShellLauncher;
use crate::ui::{KeyMapper, Renderer, UptimeProvider};

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the log filter
const LOG_ENV: &str = "TTYWM_LOG";

/// Command line options
#[derive(Debug, Default)]
struct Args {
    /// Shell command, overriding the config file
    shell: Option<String>,
    /// Config file path, overriding `~/.ttywm/config.toml`
    config: Option<PathBuf>,
}

fn print_version() {
    eprintln!("ttywm {}", VERSION);
}

fn print_help() {
    eprintln!("ttywm {} - a floating window manager for the terminal", VERSION);
    eprintln!();
    eprintln!("Usage: ttywm [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --shell <CMD>     Shell started in new windows");
    eprintln!("  -c, --config <PATH>   Configuration file");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("Keybindings:");
    eprintln!("  Alt+Enter             Spawn window at cursor");
    eprintln!("  Alt+w/a/s/d           Up/left/down/right");
    eprintln!("  Alt+e                 Toggle move mode");
    eprintln!("  Alt+r                 Toggle resize mode");
    eprintln!("  Alt+z                 Raise window");
    eprintln!("  Alt+q                 Close window");
    eprintln!("  Alt+c                 Rename window (Enter commits, Esc cancels)");
    eprintln!("  Alt+1..8              Toggle workspace");
    eprintln!("  Alt+b                 Cycle background");
    eprintln!("  Alt+Esc               Quit");
    eprintln!();
    eprintln!("Configuration: ~/.ttywm/config.toml");
    eprintln!("Log file:      ~/.ttywm/ttywm.log (filter with {})", LOG_ENV);
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-s" | "--shell" => {
                i += 1;
                let shell = args.get(i).ok_or("Missing shell argument")?;
                parsed.shell = Some(shell.clone());
            }
            "-c" | "--config" => {
                i += 1;
                let path = args.get(i).ok_or("Missing config path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(parsed)
}

/// Send tracing output to `~/.ttywm/ttywm.log`. The screen belongs to the
/// compositor, so nothing is logged if the file cannot be opened.
fn init_logging() {
    let log_path = config::data_dir().join("ttywm.log");

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let args = match parse_args(&args) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    init_logging();
    info!("ttywm {} starting...", VERSION);

    if let Err(e) = run(args) {
        tracing::error!("Fatal: {:#}", e);
        eprintln!("ttywm: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load_or_default(path),
        None => Config::load(),
    };
    if args.shell.is_some() {
        config.shell = args.shell;
    }
    let shell = config.shell_command();
    info!("Shell: {}", shell);

    let launcher = ShellLauncher {
        shell,
        queue_capacity: config.drain.queue_capacity,
    };
    let mut app = App::new(&config, Box::new(launcher), Box::new(UptimeProvider));

    let mut renderer = Renderer::new();
    renderer.init()?;

    let (cols, rows) = Renderer::size()?;
    info!("Terminal size: {}x{}", cols, rows);
    app.update(Event::Resize(cols, rows));

    let result = run_main_loop(&mut app, &mut renderer);

    renderer.cleanup()?;
    result
}

/// Main event loop: relay session output, tick the clock, draw when the
/// state changed, then wait briefly for terminal input.
fn run_main_loop(app: &mut App, renderer: &mut Renderer) -> anyhow::Result<()> {
    let poll_timeout = Duration::from_millis(10);
    let tick_interval = Duration::from_secs(1);
    let mut last_tick: Option<Instant> = None;

    loop {
        app.drain_output();

        if last_tick.map_or(true, |t| t.elapsed() >= tick_interval) {
            app.update(Event::Tick(chrono::Local::now().time()));
            last_tick = Some(Instant::now());
        }

        if app.take_dirty() {
            renderer.draw(&app.view())?;
        }

        if !event::poll(poll_timeout)? {
            continue;
        }
        let flow = match event::read()? {
            TermEvent::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                match KeyMapper::map(&key_event, app.is_editing()) {
                    Some(cmd) => app.update(Event::Command(cmd)),
                    None => Flow::Continue,
                }
            }
            TermEvent::Resize(cols, rows) => app.update(Event::Resize(cols, rows)),
            _ => Flow::Continue,
        };
        if flow == Flow::Quit {
            info!("ttywm exiting");
            return Ok(());
        }
    }
}
