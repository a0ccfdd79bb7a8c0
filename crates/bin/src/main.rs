mod backend;
mod cli;
mod commands;
mod output;
mod session;
mod templates;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, FilesCommands, UserCommands};
use output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG wins over the default directive
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("docshare=info"))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let format = OutputFormat::from_json_flag(cli.json);

    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::run(&args).await,
        Some(Commands::Health(args)) => commands::health::run(&args).await,
        Some(Commands::User(UserCommands::Add(args))) => commands::user::add(&args, format).await,
        Some(Commands::User(UserCommands::List(args))) => {
            commands::user::list(&args, format).await
        }
        Some(Commands::Files(FilesCommands::List(args))) => {
            commands::files::list(&args, format).await
        }
        None => {
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
