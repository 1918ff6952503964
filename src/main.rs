use clap::Parser;
use tickwatch::cli::args::{Cli, Commands, RunArgs};
use tickwatch::cli::{check, run};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let result = match &cli.command {
        Some(Commands::Check) => check::execute(&cli.config),
        Some(Commands::Run(args)) => run::execute(&cli, args).await,
        None => run::execute(&cli, &RunArgs::default()).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
