//! CLI entry point - the composition root.
//!
//! Command dispatch routes to handlers, which receive a fully composed
//! [`CliContext`](moltreader_cli::CliContext).

use clap::Parser;
use tracing_subscriber::EnvFilter;

use moltreader_cli::{Cli, CliConfig, Commands, bootstrap, handlers};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads `env` fallbacks
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(command) = cli.command.clone() else {
        // No command provided - show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    // Bootstrap the CLI context (composition root)
    let ctx = bootstrap(CliConfig::from_cli(&cli))?;

    let result = match command {
        Commands::Read {
            url,
            segments,
            backend,
            speech_program,
            no_autoplay,
        } => {
            let args = handlers::read::ReadArgs {
                url,
                segments,
                backend,
                speech_program,
                autoplay: !no_autoplay,
            };
            handlers::read::execute(&ctx, args).await
        }
        Commands::Serve { port } => handlers::serve::execute(&ctx, port).await,
        Commands::Voices {
            backend,
            speech_program,
            json,
        } => handlers::voices::execute(&ctx, backend, speech_program, json).await,
    };

    if let Err(err) = result {
        if let Some(cli_err) = err.downcast_ref::<moltreader_cli::CliError>() {
            eprintln!("Error: {cli_err}");
            std::process::exit(cli_err.exit_code());
        }
        return Err(err);
    }
    Ok(())
}
