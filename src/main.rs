//! Entry point for **i3pomo**.
//!
//! `i3pomo daemon` connects to the session bus and the window manager,
//! spawns both listeners and blocks until one of them stops.  The other
//! subcommands are one-shot requests to the timer.

use clap::{Parser, Subcommand, ValueEnum};
use i3pomo::config::{default_config_path, Config};
use i3pomo::control::{self, TimerCommand};
use i3pomo::daemon::{Daemon, NotificationSync};
use i3pomo::dbus::notifications::DunstGate;
use i3pomo::dbus::pomodoro::GnomePomodoro;
use i3pomo::format::{StatusFormatter, StatusOptions};
use i3pomo::guard::WorkspaceGuard;
use i3pomo::i3::events::I3FocusSource;
use i3pomo::i3::ipc::socket_path_from_env;
use i3pomo::i3::wm::I3Wm;
use i3pomo::nagbar::Nagbar;
use i3pomo::policy::WorkspacePolicy;
use i3pomo::traits::TimerService;
use log::{error, info};
use std::fmt::Display;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "i3pomo", version, about = "GNOME Pomodoro helper for i3 and sway")]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/i3pomo/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Waybar,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current timer state for a status bar
    Status {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Show the icon even when no pomodoro is running
        #[arg(long)]
        always: bool,
        /// Label for pomodoros and the idle icon
        #[arg(long)]
        icon_text: Option<String>,
        /// Show minutes only
        #[arg(long)]
        no_seconds: bool,
    },
    /// Pause the current pomodoro
    Pause,
    /// Resume a paused pomodoro
    Resume,
    /// Start a pomodoro
    Start,
    /// Stop the current pomodoro
    Stop,
    /// Skip the current activity
    Skip,
    /// Reset the timer
    Reset,
    /// Pause when running, resume when paused
    Toggle,
    /// Start a pomodoro when idle, stop the running one
    StartStop,
    /// Restrict workspaces and pause notifications during pomodoros
    Daemon {
        /// Workspace numbers disabled during a pomodoro
        workspaces: Vec<i32>,
        /// Show a nagbar when a workspace switch is denied
        #[arg(long, overrides_with = "no_nagbar")]
        nagbar: bool,
        #[arg(long, overrides_with = "nagbar")]
        no_nagbar: bool,
    },
}

/// Load the config file, falling back to compiled-in defaults.
fn load_config(path: &Path) -> Config {
    match Config::load(path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

/// Unwrap `result`, or log `what` with the error and exit with status 1.
fn or_exit<T, E: Display>(result: Result<T, E>, what: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            error!("{}: {}", what, e);
            std::process::exit(1);
        }
    }
}

fn connect_timer() -> GnomePomodoro {
    or_exit(GnomePomodoro::connect(), "cannot connect to the session bus")
}

//  Main

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let path = cli.config.unwrap_or_else(default_config_path);
    let mut config = load_config(&path);

    match cli.command {
        Commands::Status {
            format,
            always,
            icon_text,
            no_seconds,
        } => {
            let mut options: StatusOptions = config.status.into();
            options.always |= always;
            options.show_seconds &= !no_seconds;
            if let Some(text) = icon_text {
                options.icon_text = text;
            }
            print_status(format, options);
        }
        Commands::Pause => send(TimerCommand::Pause),
        Commands::Resume => send(TimerCommand::Resume),
        Commands::Start => send(TimerCommand::Start),
        Commands::Stop => send(TimerCommand::Stop),
        Commands::Skip => send(TimerCommand::Skip),
        Commands::Reset => send(TimerCommand::Reset),
        Commands::Toggle => send_derived(|s| Some(control::toggle(s))),
        Commands::StartStop => send_derived(control::start_stop),
        Commands::Daemon {
            workspaces,
            nagbar,
            no_nagbar,
        } => {
            if !workspaces.is_empty() {
                config.daemon.restricted_workspaces = workspaces;
            }
            if nagbar {
                config.daemon.nagbar = true;
            } else if no_nagbar {
                config.daemon.nagbar = false;
            }
            run_daemon(config);
        }
    }
}

//  One-shot commands

fn print_status(format: OutputFormat, options: StatusOptions) {
    let snapshot = or_exit(connect_timer().snapshot(), "cannot query the timer");
    let formatter = StatusFormatter::new(options);
    match format {
        OutputFormat::Text => println!("{}", formatter.text(&snapshot)),
        OutputFormat::Waybar => {
            let json = or_exit(
                formatter.waybar_json(&snapshot),
                "failed to encode waybar output",
            );
            println!("{}", json);
        }
    }
}

fn send(command: TimerCommand) {
    or_exit(connect_timer().send(command), &format!("{} failed", command));
}

/// Pick a command from the current state and send it.
fn send_derived(pick: impl FnOnce(&i3pomo::event::TimerSnapshot) -> Option<TimerCommand>) {
    let timer = connect_timer();
    let snapshot = or_exit(timer.snapshot(), "cannot query the timer");
    match pick(&snapshot) {
        Some(command) => or_exit(timer.send(command), &format!("{} failed", command)),
        None => info!("nothing to do in state {}", snapshot.state),
    }
}

//  Daemon

fn run_daemon(config: Config) {
    let timer = connect_timer();
    // Reachability only; the timer listener re-reads the state once it has
    // subscribed.
    let snapshot = or_exit(timer.snapshot(), "cannot reach the pomodoro timer");
    info!("timer reachable, currently {}", snapshot.state);

    let socket = match config.i3.socket_path.clone() {
        Some(path) => path,
        None => or_exit(socket_path_from_env(), "no window manager socket"),
    };

    let policy = WorkspacePolicy::new(config.daemon.restricted_workspaces.iter().copied());
    info!(
        "restricting workspaces {:?} during pomodoros",
        policy.restricted()
    );

    let guard: WorkspaceGuard<_, _, Nagbar> = or_exit(
        WorkspaceGuard::start(timer.clone(), I3Wm::new(&socket), policy),
        "cannot reach the window manager",
    );
    let guard = if config.daemon.nagbar {
        let nagbar = match config.nagbar.program {
            Some(program) => Nagbar::new(program),
            None => Nagbar::detect(),
        };
        info!("denials will be shown with {}", nagbar.program());
        guard.with_warnings(nagbar)
    } else {
        guard
    };

    let gate = DunstGate::new(timer.connection().clone());
    let daemon = Daemon::new(guard, NotificationSync::new(gate));

    let exit = daemon.run(timer.state_changes(), I3FocusSource::new(&socket));
    error!("{} listener terminated: {}", exit.listener, exit.reason);
    std::process::exit(exit.exit_code());
}
