use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pomovault::cli::{
    handle_reset_command, handle_settings_command, handle_setup_command, handle_status_command,
    handle_task_command, handle_unlock_command, open_session, SettingsCommands, SetupCommands,
    TaskCommands,
};
use pomovault::config::{paths::VaultPaths, settings::Settings};

#[derive(Parser)]
#[command(
    name = "pomovault",
    version,
    about = "Pomodoro task list with encryption at rest",
    long_about = "pomovault keeps your task list, backlog and settings encrypted \
                  on disk. Protect them with a numeric PIN, or let pomovault manage \
                  a local key for you (auto mode)."
)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Current PIN, for PIN mode (prompted for if omitted)
    #[arg(long, global = true, env = "POMOVAULT_PIN", hide_env_values = true)]
    pin: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show security mode, lock state and stored data
    Status,

    /// Configure encryption, or switch between PIN and auto mode
    #[command(subcommand)]
    Setup(SetupCommands),

    /// Check the PIN
    Unlock,

    /// Delete all data and start over (the only way back from a lost PIN)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Task list and backlog
    #[command(subcommand)]
    Task(TaskCommands),

    /// Encrypted in-app settings
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Show paths and application settings
    Config,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = VaultPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    let pin = cli.pin.as_deref();

    let Some(command) = cli.command else {
        println!("pomovault - Pomodoro task list with encryption at rest");
        println!();
        println!("Run 'pomovault --help' for usage information.");
        println!("Run 'pomovault setup auto' or 'pomovault setup pin' to get started.");
        return Ok(());
    };

    // Config never opens the data directory
    let session = || open_session(&paths, &settings);

    match command {
        Commands::Status => handle_status_command(&session()?)?,
        Commands::Setup(cmd) => handle_setup_command(&session()?, pin, cmd)?,
        Commands::Unlock => handle_unlock_command(&session()?, pin)?,
        Commands::Reset { yes } => handle_reset_command(&session()?, yes)?,
        Commands::Task(cmd) => handle_task_command(&session()?, pin, cmd)?,
        Commands::Settings(cmd) => handle_settings_command(&session()?, pin, cmd)?,
        Commands::Config => {
            println!("pomovault Configuration");
            println!("=======================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  KDF iterations: {}", settings.kdf_iterations);
            println!("  PIN length:     {}", settings.pin_length);
        }
    }

    Ok(())
}
