//! Plots CLI - List, search and page through plots
//!
//! Usage:
//!   plots                          - Start interactive mode
//!   plots list mine                - List your plots
//!   plots list fuzzy castle 2      - Search plots, page 2
//!   plots list <player|world> [#]  - Plots of a player or in a world
//!   plots complete <prefix>        - Completions for the list argument

use clap::{Parser, Subcommand};
use cli::commands::{CompleteCommand, ListCommand};
use cli::interactive::InteractiveCli;
use cli::session::SessionArgs;

#[derive(Parser)]
#[command(name = "plots")]
#[command(about = "Plots - List, search and page through plots")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    session: SessionArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// List plots
    List(ListCommand),
    /// Complete the first list argument
    Complete(CompleteCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let session = cli.session.build()?;

    match cli.command {
        Some(Commands::List(cmd)) => cmd.run(&session).await,
        Some(Commands::Complete(cmd)) => cmd.run(&session),
        None => {
            // No subcommand - start interactive mode
            let mut interactive = InteractiveCli::new(session);
            interactive.run().await
        }
    }
}
