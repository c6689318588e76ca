//! Worker entry point.
//!
//! The host launches this binary with the loopback port it is listening
//! on; the worker dials back, performs the pid handshake, and serves
//! commands until told to shut down or the connection drops.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use gridlink::WorkerBuilder;

#[derive(Debug, Parser)]
#[command(name = "gridlink-worker", version, about)]
struct Args {
    /// Loopback port the host is listening on.
    port: u16,

    /// Pass `debug` to enable verbose diagnostics.
    mode: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    let default_level = if args.mode.as_deref() == Some("debug") {
        "gridlink=debug"
    } else {
        "gridlink=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let worker = match WorkerBuilder::new().connect(args.port).await {
        Ok(worker) => worker,
        Err(e) => {
            tracing::error!(port = args.port, error = %e, "failed to connect to host");
            std::process::exit(1);
        }
    };

    if let Err(e) = worker.run().await {
        tracing::error!(error = %e, "worker terminated abnormally");
        std::process::exit(1);
    }
}
