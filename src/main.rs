use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use clap::Parser;
use fire_calc::api::{Cli, Command, inflation_command, plan_command, run_http_server};

const BIND_HOST_ENV: &str = "FIRE_BIND_HOST";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { port } => {
            let addr = bind_addr(port)?;
            run_http_server(addr).await.context("HTTP server error")?;
        }
        Command::Plan(args) => {
            let response = plan_command(args)?;
            let json = serde_json::to_string_pretty(&response).context("failed to encode plan")?;
            println!("{json}");
        }
        Command::Inflation(args) => {
            let report = inflation_command(args)?;
            let json =
                serde_json::to_string_pretty(&report).context("failed to encode inflation report")?;
            println!("{json}");
        }
    }

    Ok(())
}

fn bind_addr(port: u16) -> Result<SocketAddr> {
    let host = std::env::var(BIND_HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
    let ip: IpAddr = host
        .parse()
        .with_context(|| format!("{BIND_HOST_ENV} must be an IP address, got {host:?}"))?;
    Ok(SocketAddr::new(ip, port))
}
