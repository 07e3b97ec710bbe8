use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "budget-cli")]
#[command(about = "Management CLI for the retry budget service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current budget for a service
    Budget { service: String },
    /// Force a budget recalculation
    Calculate { service: String },
    /// Ask whether a retry would be allowed
    Check { service: String },
    /// Spend one unit of a service's budget
    Consume { service: String },
    /// Recalculate every known service
    UpdateAll,
    /// Show the metrics snapshot for a service
    Metrics { service: String },
    /// Show latency statistics for a service
    Latency { service: String },
    /// Record one request outcome
    Record {
        service: String,
        latency_ms: u64,
        #[arg(long)]
        failed: bool,
    },
    /// Reset a service's metrics
    Reset { service: String },
    /// Show recent request logs, for one service or all of them
    Logs { service: Option<String> },
    /// Clear every request log
    ClearLogs,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Budget { service } => {
            client.get(format!("{}/api/budget/{}", base, service)).send().await?
        }
        Commands::Calculate { service } => {
            client.post(format!("{}/api/budget/calculate/{}", base, service)).send().await?
        }
        Commands::Check { service } => {
            client.get(format!("{}/api/budget/check/{}", base, service)).send().await?
        }
        Commands::Consume { service } => {
            client.post(format!("{}/api/budget/consume/{}", base, service)).send().await?
        }
        Commands::UpdateAll => {
            client.post(format!("{}/api/budget/update-all", base)).send().await?
        }
        Commands::Metrics { service } => {
            client.get(format!("{}/api/metrics/{}", base, service)).send().await?
        }
        Commands::Latency { service } => {
            client.get(format!("{}/api/metrics/latency/{}", base, service)).send().await?
        }
        Commands::Record { service, latency_ms, failed } => {
            client
                .post(format!("{}/api/metrics/record", base))
                .json(&json!({
                    "service_name": service,
                    "latency_ms": latency_ms,
                    "success": !failed,
                }))
                .send()
                .await?
        }
        Commands::Reset { service } => {
            client.delete(format!("{}/api/metrics/{}", base, service)).send().await?
        }
        Commands::Logs { service: Some(service) } => {
            client.get(format!("{}/api/logs/{}", base, service)).send().await?
        }
        Commands::Logs { service: None } => {
            client.get(format!("{}/api/logs", base)).send().await?
        }
        Commands::ClearLogs => {
            client.delete(format!("{}/api/logs", base)).send().await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    if status == reqwest::StatusCode::NO_CONTENT {
        println!("OK");
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
