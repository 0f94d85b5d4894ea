use anyhow::Result;
use clap::{Parser, Subcommand};
use dialogq::Settings;
use std::path::PathBuf;
use tracing::debug;

use super::{CheckCommand, DemoCommand};

/// dialogq - prioritized dialogs with fades, button bars and auto-click countdowns
#[derive(Parser)]
#[command(
    name = "dialogq",
    version,
    about = "Prioritized dialog queue with a terminal demo",
    long_about = r#"dialogq queues dialogs by priority and shows at most one at a time.

Examples:
  dialogq                              # Run the demo with built-in dialogs
  dialogq demo --file dialogs.json     # Run the demo with your own dialogs
  dialogq check --file dialogs.json    # Validate and print resolved definitions
  dialogq --log-file dialogq.log demo  # Keep log output off the terminal"#
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    /// Write logs to a file instead of stderr
    #[arg(long = "log-file", global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the interactive terminal demo
    Demo(DemoCommand),

    /// Validate a definitions file and print the resolved dialogs
    Check(CheckCommand),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }

        let settings = Settings::init()?;
        debug!("Settings initialized: {:?}", settings);

        match self.command {
            Some(Commands::Check(check_cmd)) => check_cmd.execute(&settings),
            Some(Commands::Demo(demo_cmd)) => demo_cmd.execute(settings).await,
            None => DemoCommand::default().execute(settings).await,
        }
    }
}
