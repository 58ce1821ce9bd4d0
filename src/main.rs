//! ifacegen CLI entry point.

use clap::Parser;
use ifacegen::cli::{self, Cli, Commands, EXIT_ERROR};

fn main() {
    let cli = Cli::parse();
    cli::init_tracing(cli.verbose);

    let exit_code = match cli.command {
        Commands::Generate(args) => match cli::run_generate(&args) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {}", e);
                EXIT_ERROR
            }
        },
        Commands::Init(args) => match cli::run_init(&args) {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {}", e);
                EXIT_ERROR
            }
        },
    };

    std::process::exit(exit_code);
}
