mod cli;

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let settings = cli.load_settings();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&settings.log_level))
        .init();

    let result = match cli.command {
        Commands::Import {
            file,
            output,
            show_diagnostics,
            json,
        } => cli::import::run(&settings, &file, output.as_deref(), show_diagnostics, json),
        Commands::Detect { file } => cli::detect::run(&settings, &file),
        Commands::Handlers => cli::handlers::list(&settings),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
