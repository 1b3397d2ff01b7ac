mod app;
mod cache;
mod catalog;
mod config;
mod logging;
mod store;
#[cfg(test)]
mod test_support;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "holocron")]
#[command(about = "A caching client for the Star Wars film catalog")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/holocron/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Don't read or write the persisted cache
  #[arg(long)]
  no_persist: bool,

  #[command(subcommand)]
  command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
  /// List all films
  Films,
  /// Show a film and its characters
  Film {
    /// Film id, e.g. 1
    id: String,
    /// Then show the character at this position in the film's list
    #[arg(long, value_name = "N")]
    open_character: Option<usize>,
  },
  /// Show a character and the films they appear in
  Character {
    /// Character id, e.g. 1
    id: String,
  },
  /// Show what the cache holds
  Status,
}

impl From<CliCommand> for app::Command {
  fn from(command: CliCommand) -> Self {
    match command {
      CliCommand::Films => app::Command::Films,
      CliCommand::Film { id, open_character } => app::Command::Film { id, open_character },
      CliCommand::Character { id } => app::Command::Character { id },
      CliCommand::Status => app::Command::Status,
    }
  }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Held until exit so buffered log lines are flushed
  let _log_guard = logging::init()?;

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  let app = app::App::new(config, !args.no_persist)?;
  app.run(args.command.into()).await?;

  Ok(())
}
