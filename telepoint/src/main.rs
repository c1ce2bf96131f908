mod app;
mod command;
mod core;
mod ipc;
mod macos;
mod platform;
mod teleport;

use anyhow::{bail, Result};
use argh::FromArgs;
use ipc::IpcClient;
use tracing_subscriber::EnvFilter;

use telepoint_ipc::{Command, Response};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Telepoint - remembers where your cursor rests and teleports it back
#[derive(FromArgs)]
struct Cli {
    #[argh(subcommand)]
    command: Option<SubCommand>,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum SubCommand {
    Start(StartCmd),
    Version(VersionCmd),
    Save(SaveCmd),
    Teleport(TeleportCmd),
    Position(PositionCmd),
    Settings(SettingsCmd),
    SetInterval(SetIntervalCmd),
    Bind(BindCmd),
    Unbind(UnbindCmd),
    Quit(QuitCmd),
}

/// Start the telepoint daemon
#[derive(FromArgs)]
#[argh(subcommand, name = "start")]
struct StartCmd {}

/// Show version information
#[derive(FromArgs)]
#[argh(subcommand, name = "version")]
struct VersionCmd {}

/// Save the current cursor position immediately
#[derive(FromArgs)]
#[argh(subcommand, name = "save")]
struct SaveCmd {}

/// Teleport the cursor to the saved position
#[derive(FromArgs)]
#[argh(subcommand, name = "teleport")]
struct TeleportCmd {}

/// Print the saved cursor position
#[derive(FromArgs)]
#[argh(subcommand, name = "position")]
struct PositionCmd {}

/// Print the current settings
#[derive(FromArgs)]
#[argh(subcommand, name = "settings")]
struct SettingsCmd {}

/// Set how long the cursor must rest before its position is saved
#[derive(FromArgs)]
#[argh(subcommand, name = "set-interval")]
struct SetIntervalCmd {
    /// stationary time in seconds (e.g. 5.0)
    #[argh(positional)]
    seconds: f64,
}

/// Bind the teleport shortcut (e.g. cmd-shift-f1)
#[derive(FromArgs)]
#[argh(subcommand, name = "bind")]
struct BindCmd {
    /// hotkey (e.g., cmd-shift-f1, alt-space)
    #[argh(positional)]
    key: String,
}

/// Remove the teleport shortcut
#[derive(FromArgs)]
#[argh(subcommand, name = "unbind")]
struct UnbindCmd {}

/// Quit the telepoint daemon
#[derive(FromArgs)]
#[argh(subcommand, name = "quit")]
struct QuitCmd {}

fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    match cli.command {
        None => {
            // No subcommand - show help (simulate --help)
            let args: Vec<&str> = vec!["telepoint", "--help"];
            match Cli::from_args(&args[..1], &args[1..]) {
                Ok(_) => {}
                Err(e) => {
                    println!("{}", e.output);
                }
            }
            Ok(())
        }
        Some(SubCommand::Start(_)) => {
            // Start daemon
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env())
                .init();

            tracing::info!("telepoint starting");
            app::App::run()
        }
        Some(SubCommand::Version(_)) => {
            println!("telepoint {}", VERSION);
            Ok(())
        }
        Some(subcmd) => run_cli(subcmd),
    }
}

fn run_cli(subcmd: SubCommand) -> Result<()> {
    let cmd = to_command(subcmd)?;
    let mut client = IpcClient::connect()?;
    let response = client.send(&cmd)?;

    match response {
        Response::Ok => {}
        Response::Error { message } => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
        Response::Position { position } => match position {
            Some(p) => println!("{}, {}", p.x, p.y),
            None => {
                eprintln!("No position saved yet");
                std::process::exit(1);
            }
        },
        Response::Settings { settings } => {
            println!("Save interval: {}s", settings.save_interval);
            match settings.shortcut {
                Some(key) => println!("Shortcut: {}", key),
                None => println!("Shortcut: (none)"),
            }
        }
    }

    Ok(())
}

fn to_command(subcmd: SubCommand) -> Result<Command> {
    match subcmd {
        SubCommand::Start(_) | SubCommand::Version(_) => {
            unreachable!("handled in main")
        }
        SubCommand::Save(_) => Ok(Command::Save),
        SubCommand::Teleport(_) => Ok(Command::Teleport),
        SubCommand::Position(_) => Ok(Command::GetPosition),
        SubCommand::Settings(_) => Ok(Command::GetSettings),
        SubCommand::SetInterval(cmd) => {
            if !cmd.seconds.is_finite() || cmd.seconds <= 0.0 {
                bail!("Save interval must be a positive number of seconds");
            }
            Ok(Command::SetInterval {
                seconds: cmd.seconds,
            })
        }
        SubCommand::Bind(cmd) => {
            // Validate locally so typos fail before reaching the daemon
            if let Err(e) = macos::parse_shortcut(&cmd.key) {
                bail!("{}", e);
            }
            Ok(Command::SetShortcut { key: cmd.key })
        }
        SubCommand::Unbind(_) => Ok(Command::ClearShortcut),
        SubCommand::Quit(_) => Ok(Command::Quit),
    }
}
