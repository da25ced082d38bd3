use ironpawn::cli;
use ironpawn::config::EngineConfig;

fn main() {
    // Structured logging to stderr; stdout belongs to the CLI/UCI protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ironpawn=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = EngineConfig::from_env();
    tracing::info!("ironpawn v{} starting", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    std::process::exit(cli::run(&args, config));
}
