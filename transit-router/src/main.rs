use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use transit_router::batch::run_batch;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: transit-router <batch.json>");
        return ExitCode::from(2);
    };

    match run_batch(&path) {
        Ok(summary) => {
            println!(
                "Answered {} queries ({} routes found)",
                summary.queries, summary.found
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
