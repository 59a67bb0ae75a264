use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

use status_relay::commands::{handlers, CommandRegistry};
use status_relay::config::load_config;
use status_relay::discord::{DiscordClient, DiscordError};
use status_relay::health::ExternalReport;
use status_relay::probe::{McStatusProbe, ServerAddress, StatusProbe};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Operator CLI for the Minecraft status relay", long_about = None)]
struct Cli {
    /// Optional TOML config file; environment variables override it.
    #[arg(short, long, env = "STATUS_RELAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register the slash commands with Discord
    RegisterCommands,
    /// Push a status report to the relay webhook
    Push {
        /// One of up, down, testing
        state: String,

        #[arg(short, long, default_value = "http://localhost:3000")]
        url: String,

        #[arg(short, long, env = "STATUS_SECRET")]
        secret: String,
    },
    /// Probe the configured server once
    Probe,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::RegisterCommands => {
            let config = load_config(cli.config.as_deref())?;
            let application_id = config
                .discord
                .application_id
                .clone()
                .ok_or(DiscordError::MissingApplicationId)?;
            let registry = CommandRegistry::standard(config.machine.url.is_some());
            let client = DiscordClient::new(&config.discord)?;

            println!("Started refreshing application (/) commands.");
            let registered = client
                .overwrite_global_commands(&application_id, &registry.definitions())
                .await?;
            println!(
                "Successfully reloaded {} application (/) commands.",
                registered.len()
            );
        }
        Commands::Push { state, url, secret } => {
            // Fail locally on a typo rather than round-tripping a 400.
            let report: ExternalReport = state.parse()?;

            let mut headers = HeaderMap::new();
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", secret))?,
            );
            let res = reqwest::Client::new()
                .post(format!("{}/status/{}", url.trim_end_matches('/'), report.as_str()))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Probe => {
            let config = load_config(cli.config.as_deref())?;
            let probe = McStatusProbe::new(
                &config.target.api_base,
                Duration::from_millis(config.monitor.probe_timeout_ms),
            )?;
            let address = ServerAddress::new(config.target.host.clone(), config.target.port);
            let result = probe.check(&address).await;
            println!("{}", handlers::format_liveness(&result));
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Webhook returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Err(format!("webhook rejected the report with status {status}").into());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
