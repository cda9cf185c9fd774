mod cli;

use clap::Parser;
use cli::Cli;
use std::process;
use tracing_subscriber::EnvFilter;
use waitfor::{Context, Runner};

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();
    let ctx = match cli.timeout() {
        Some(timeout) => Context::with_timeout(timeout),
        None => Context::background(),
    };

    let runner = Runner::builder()
        .register(waitfor_mysql::resource_config())
        .build();

    match runner.test(&ctx, &cli.urls).await {
        Ok(()) => tracing::info!(count = cli.urls.len(), "all resources are ready"),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Initialize logging; `RUST_LOG` overrides the default filter
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("waitfor_mysql=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
