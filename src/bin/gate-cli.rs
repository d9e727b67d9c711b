use clap::{Parser, Subcommand};
use serde_json::Value;

use request_gate::authority::DecisionClient;
use request_gate::config::AuthorityConfig;
use request_gate::gate::RequestContext;
use request_gate::inspection;

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Operator CLI for the request gate", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a value against the local signatures
    Scan {
        value: String,
    },
    /// Send a decision query to an authority and show the fail-open outcome
    Decide {
        #[arg(short, long, default_value = "http://localhost:5050")]
        url: String,
        #[arg(short, long, env = "REQUEST_GATE_API_KEY")]
        key: String,
        #[arg(long, default_value = "127.0.0.1")]
        ip: String,
        #[arg(long, default_value = "/")]
        endpoint: String,
        #[arg(long, default_value = "GET")]
        method: String,
        #[arg(long, default_value_t = 2000)]
        timeout_ms: u64,
    },
    /// Query a running gate's status endpoint
    Status {
        #[arg(short, long, default_value = "http://localhost:8080/gate/check")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan { value } => {
            let categories: Vec<&str> = inspection::classify(&value)
                .iter()
                .map(|c| c.as_str())
                .collect();
            println!("{}", serde_json::json!({ "value": value, "threats": categories }));
        }
        Commands::Decide {
            url,
            key,
            ip,
            endpoint,
            method,
            timeout_ms,
        } => {
            let config = AuthorityConfig {
                base_url: url,
                api_key: key,
                decision_timeout_ms: timeout_ms,
                ..AuthorityConfig::default()
            };
            let client = DecisionClient::new(&config)?;
            let ctx = RequestContext::new(ip, method, endpoint);

            let raw = client.query(&ctx).await;
            if let Err(e) = &raw {
                eprintln!("Authority unavailable ({}), gate would fail open", e);
            }
            let decision = raw.unwrap_or_default();
            println!(
                "{}",
                serde_json::json!({ "blocked": decision.blocked, "reason": decision.reason })
            );
        }
        Commands::Status { url } => {
            let res = reqwest::Client::new().get(url).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gate returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
