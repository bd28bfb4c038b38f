use clap::Parser;
use mmul_bench::{run, Config};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let config = Config::parse();

    // RUST_LOG wins over -v; logs go to stderr so stdout stays the report.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let stdout = std::io::stdout();
    match run(&config, &mut stdout.lock()) {
        Ok(summary) => {
            tracing::info!(
                n = summary.n,
                adapter = %summary.adapter,
                gpu_tflops = summary.gpu.tflops,
                "benchmark finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
