//! Elasticsearch Dump Main Entry Point
//!
//! Streams one index to stdout as NDJSON. Logs go to stderr so that the
//! output can be piped straight into another tool.

use dotenv::dotenv;
use elastic_dump::{dump_index, Dependencies, DumpError};
use std::env;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("elastic_dump=info,elastic_client=info"));

    let json_logs = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    info!(
        service_name = "elastic-dump",
        service_version = env!("CARGO_PKG_VERSION"),
        json = json_logs,
        "Tracing initialized"
    );
}

#[tokio::main]
async fn main() -> Result<(), DumpError> {
    // Load environment variables from .env file
    dotenv().ok();

    init_tracing();

    let deps = match Dependencies::new().await {
        Ok(deps) => deps,
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let mut stdout = tokio::io::stdout();
    let config = deps.config;
    match dump_index(
        &deps.client,
        &config.index,
        &config.doctype,
        config.query.clone(),
        &mut stdout,
    )
    .await
    {
        Ok(summary) => {
            info!(
                documents = summary.documents,
                released = summary.released,
                "Dump finished successfully"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Dump failed");
            Err(e)
        }
    }
}
