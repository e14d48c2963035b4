//! Entry point for the **multitray** daemon.
//!
//! Creates the named pipe, spawns the
//! [`CommandSource`](multitray::traits::CommandSource) on a background
//! thread, and processes incoming commands on the main thread, which also
//! advances blink timers between commands.

use clap::{ArgAction, Parser};
use log::{debug, error, info, warn};
use multitray::command::Command;
use multitray::config::Config;
use multitray::ipc::fifo::{self, FifoSource};
use multitray::registry::TrayRegistry;
use multitray::traits::{CommandSource, TrayBackend};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

/// Drive multiple system tray icons from a named pipe.
#[derive(Debug, Parser)]
#[command(name = "multitray", version)]
struct Cli {
    /// Path of the FIFO to create and read commands from.
    #[arg(short, long)]
    pipepath: Option<PathBuf>,

    /// Path of the JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Raise log verbosity (repeat for more).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Map the `-v` count to a log filter.  `RUST_LOG` still wins when set.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Error,
        1 => log::LevelFilter::Warn,
        2 => log::LevelFilter::Info,
        3 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/multitray`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("multitray")
}

/// Load the config file, falling back to compiled-in defaults.
///
/// Without `--config` the default location
/// `$XDG_CONFIG_HOME/multitray/config.json` is tried; a missing file there
/// is normal and only logged at info level.
fn load_config(cli_path: Option<&Path>) -> Config {
    let path = cli_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config_dir().join("config.json"));
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) if cli_path.is_some() => {
            warn!("config file unusable ({}), using defaults", e);
            Config::default()
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

/// Default pipe path when neither the CLI nor the config names one.
fn default_pipe_path() -> PathBuf {
    PathBuf::from("multitray.fifo")
}

//  Logging-only backend (built without `tray-sni`) 

#[cfg(not(feature = "tray-sni"))]
mod null_tray {
    use log::info;
    use multitray::traits::{TrayBackend, TrayWidget};
    use std::path::Path;

    /// Stands in for a real tray when no tray feature is compiled in;
    /// every call is just logged.
    pub struct NullBackend;

    #[derive(Debug, thiserror::Error)]
    #[error("null backend")]
    pub struct NullError;

    pub struct NullWidget {
        name: String,
    }

    impl TrayBackend for NullBackend {
        type Widget = NullWidget;
        type Error = NullError;

        fn create(&mut self, name: &str) -> Result<NullWidget, NullError> {
            info!("[null] create {}", name);
            Ok(NullWidget {
                name: name.to_string(),
            })
        }
    }

    impl TrayWidget for NullWidget {
        type Error = NullError;

        fn set_icon(&mut self, path: &Path) -> Result<(), NullError> {
            info!("[null] {}: set icon {}", self.name, path.display());
            Ok(())
        }

        fn clear_icon(&mut self) {
            info!("[null] {}: clear icon", self.name);
        }

        fn restore_icon(&mut self) {
            info!("[null] {}: restore icon", self.name);
        }

        fn set_tooltip(&mut self, text: &str) {
            info!("[null] {}: set tooltip {:?}", self.name, text);
        }

        fn set_visible(&mut self, visible: bool) {
            info!("[null] {}: visible = {}", self.name, visible);
        }

        fn destroy(self) {
            info!("[null] {}: destroy", self.name);
        }
    }
}

#[cfg(feature = "tray-sni")]
fn make_backend() -> multitray::sni::backend::SniBackend {
    multitray::sni::backend::SniBackend::new()
}

#[cfg(not(feature = "tray-sni"))]
fn make_backend() -> null_tray::NullBackend {
    null_tray::NullBackend
}

//  Main 

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run_daemon(cli);
}

fn run_daemon(cli: Cli) {
    let config = load_config(cli.config.as_deref());

    let pipe_path = cli
        .pipepath
        .or_else(|| config.pipe.path.clone())
        .unwrap_or_else(default_pipe_path);
    info!("starting (pipe: {})", pipe_path.display());

    let stop = Arc::new(AtomicBool::new(false));

    // Create the pipe before anything else so an unusable path aborts here.
    let source = match FifoSource::create(&pipe_path, stop.clone()) {
        Ok(s) => s,
        Err(e) => {
            error!("cannot set up pipe at {}: {}", pipe_path.display(), e);
            std::process::exit(1);
        }
    };

    {
        let stop = stop.clone();
        if let Err(e) = ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst)) {
            error!("cannot install signal handler: {}", e);
            std::process::exit(1);
        }
    }

    let mut registry = TrayRegistry::new(make_backend());
    registry.set_blink_interval(Duration::from_millis(config.timing.blink_interval_ms));

    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
    spawn_command_source(source, cmd_tx);

    run_event_loop(
        &mut registry,
        cmd_rx,
        &stop,
        Duration::from_millis(config.timing.tick_ms),
    );

    info!("shutting down");
    stop.store(true, Ordering::SeqCst);
    // Wake a reader parked in open; harmless if none is.
    if fifo::nudge(&pipe_path).is_err() {
        debug!("no parked reader to wake");
    }
    registry.shutdown();
    if let Err(e) = std::fs::remove_file(&pipe_path) {
        warn!("could not remove {}: {}", pipe_path.display(), e);
    }
    info!("stopped");
}

//  Event loop 

/// Drain commands and advance blink timers until the interrupt flag is set
/// or the command source is gone.
fn run_event_loop<B: TrayBackend>(
    registry: &mut TrayRegistry<B>,
    cmd_rx: mpsc::Receiver<Command>,
    stop: &AtomicBool,
    tick: Duration,
) {
    info!("multitray running");
    loop {
        if stop.load(Ordering::SeqCst) {
            info!("interrupt received, stopping");
            break;
        }
        match cmd_rx.recv_timeout(tick) {
            Ok(cmd) => {
                if let Err(e) = registry.handle(cmd) {
                    error!("command error: {}", e);
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                info!("command source closed, stopping");
                break;
            }
        }
        registry.tick(Instant::now());
    }
}

//  Helpers 

fn spawn_command_source(mut source: FifoSource, tx: mpsc::Sender<Command>) {
    std::thread::spawn(move || {
        if let Err(e) = source.run(tx) {
            error!("pipe reader error: {}", e);
        }
    });
}
