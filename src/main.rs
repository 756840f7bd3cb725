use std::env;
use std::io::Read;

use anyhow::{Context, Result};
use netsuite_lead_relay::oauth::parse_authorization_header;
use netsuite_lead_relay::{RelayConfig, RestletClient};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "netsuite_lead_relay=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let program = env::args().next().unwrap_or_default();
    let args: Vec<String> = env::args().skip(1).collect();
    let dry_run = args.iter().any(|a| a == "--dry-run");
    let Some(source) = args.iter().find(|a| *a != "--dry-run") else {
        eprintln!("Usage: {} [--dry-run] <payload.json | ->", program);
        eprintln!("  payload.json: lead JSON to forward, or - to read stdin");
        eprintln!("  --dry-run: print the signed request instead of sending it");
        eprintln!("  NetSuite settings are read from the environment (NETSUITE_ACCOUNT, ...)");
        std::process::exit(1);
    };

    let raw = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read payload from {}", source))?
    };
    serde_json::from_str::<serde::de::IgnoredAny>(&raw).context("Payload is not valid JSON")?;
    let raw = raw.trim();

    let config = RelayConfig::from_env().context("Invalid NetSuite configuration")?;
    let client = RestletClient::new(&config).context("Failed to initialize RESTlet client")?;

    if dry_run {
        let header = client.authorize().context("Failed to sign request")?;
        println!("POST {}", client.endpoint().url());
        println!("Content-Type: application/json");
        println!("Authorization ({}):", client.signer().method());
        for (key, value) in parse_authorization_header(header.as_str()).unwrap_or_default() {
            println!("  {}: {}", key, value);
        }
        println!("{}", raw);
        return Ok(());
    }

    let response = client.submit(raw.as_bytes()).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);

    Ok(())
}
