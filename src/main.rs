//! SMB Latency Profiler - command-line entry point

use clap::{error::ErrorKind, Parser};
use smb_latency_profiler::{
    app::App,
    cli::{Cli, HelpSystem},
    config::EnvManager,
    error::{ErrorReporter, USAGE_EXIT_CODE},
};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(smb_latency_profiler::AppError::internal("panic").exit_code());
    }));

    // Must precede argument parsing: .env values back the env-based defaults
    if let Err(e) = EnvManager::load_env_file(false) {
        ErrorReporter::default().report_error(&e);
        process::exit(e.exit_code());
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                eprintln!("Invalid usage!");
                eprintln!("{}", e);
                eprint!("{}", HelpSystem::new().usage());
                process::exit(USAGE_EXIT_CODE);
            }
        },
    };

    if cli.should_show_topic_help() {
        println!("{}", cli.display_help());
        return;
    }

    let app = App::new(cli);
    if let Err(e) = app.run().await {
        app.report_failure(&e).await;
        process::exit(e.exit_code());
    }
}
