use clap::Parser;
use isbn_matcher::{
    cli::commands::{
        extract::ExtractCommand, fill::FillCommand, init::InitCommand, resolve::ResolveCommand,
        CommandHandler,
    },
    cli::{Cli, Commands, LogLevel},
    Result,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Logs go to stderr so stdout only carries command output
fn initialize_tracing(log_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(cli.log_level);

    debug!("Running {} command", cli.command.name());

    let handler: Box<dyn CommandHandler> = match cli.command {
        Commands::Fill {
            db,
            catalog_db,
            dry_run,
            limit,
            account,
            profile,
            checkpoint,
            config,
            format,
        } => Box::new(FillCommand {
            db,
            catalog_db,
            dry_run,
            limit,
            account,
            profile,
            checkpoint,
            config,
            format,
        }),
        Commands::Resolve {
            title,
            catalog_db,
            profile,
            config,
            format,
        } => Box::new(ResolveCommand {
            title,
            catalog_db,
            profile,
            config,
            format,
        }),
        Commands::Extract {
            title,
            profile,
            config,
            format,
        } => Box::new(ExtractCommand {
            title,
            profile,
            config,
            format,
        }),
        Commands::Init { output, force } => Box::new(InitCommand::new(output, force)),
    };

    handler.execute()
}
