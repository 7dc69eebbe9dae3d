use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use items_client::{AnalysisLog, ClientArgs, Runner, Transport};
use items_core::config::{database_url_from_env, redact_dsn};
use items_core::ItemClient;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = ClientArgs::parse();

    let filter = if args.verbose {
        EnvFilter::new("items_client=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let log = if args.log_analysis {
        let dsn = database_url_from_env().context("database configuration")?;
        info!(dsn = %redact_dsn(&dsn), "connecting analysis log");
        Some(AnalysisLog::connect(&dsn).context("connecting analysis log")?)
    } else {
        None
    };

    let client = ItemClient::new(&args.url);
    let transport = Transport::new(args.timeout());
    let mut runner = Runner::new(&client, &transport);
    if let Some(log) = &log {
        runner = runner.with_sink(log);
    }

    info!(url = client.base_url(), "running call sequence");
    for report in runner.run(&args.plan()) {
        println!("{report}");
    }

    if let Some(log) = log {
        log.close();
    }
    Ok(())
}
