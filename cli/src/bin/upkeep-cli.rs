//! Upkeep CLI - Manage a running session daemon

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "upkeep-cli")]
#[command(about = "Upkeep session management tool", version)]
struct Cli {
    /// API endpoint
    #[arg(short, long, default_value = "http://localhost:24180")]
    api: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show session status
    Status,

    /// Reset the balance to its starting value
    ResetMoney,

    /// Apply one decay tick immediately
    Decay,

    /// Update the decay amount and/or interval
    SetDecay {
        /// New decay amount
        #[arg(long)]
        amount: Option<f64>,

        /// New decay interval in seconds
        #[arg(long)]
        interval: Option<f64>,
    },

    /// Restart the phase timer
    ResetTimer {
        /// Reset even while the timer is still running
        #[arg(long)]
        force: bool,
    },

    /// Delete all saved session data
    ClearSave,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Status => {
            let response: Value = client
                .get(format!("{}/status", cli.api))
                .send()
                .await?
                .json()
                .await?;

            println!("\n📊 Upkeep Session Status");
            println!("═══════════════════════════════════");
            if let Some(balance) = response["balance"].as_f64() {
                println!("Balance:           {:.0}", balance);
            }
            if let Some(elapsed) = response["timer"]["elapsed_secs"].as_f64() {
                println!("Timer elapsed:     {:.1}s", elapsed);
            }
            if let Some(running) = response["timer"]["running"].as_bool() {
                println!("Timer running:     {}", running);
            }
            if let Some(first) = response["timer"]["first_mark_done"].as_bool() {
                println!("First mark done:   {}", first);
            }
            if let Some(restart) = response["restart_available"].as_bool() {
                println!("Restart available: {}", restart);
            }
            if let Some(amount) = response["decay_amount"].as_f64() {
                println!("Decay amount:      {:.0}", amount);
            }
            if let Some(interval) = response["decay_interval_secs"].as_f64() {
                println!("Decay interval:    {:.0}s", interval);
            }
            if let Some(next) = response["decay_remaining_secs"].as_f64() {
                println!("Next decay in:     {:.1}s", next);
            }
            if let Some(states) = response["toggle_states"].as_array() {
                if !states.is_empty() {
                    let rendered: Vec<String> = states
                        .iter()
                        .map(|s| {
                            if s.as_bool().unwrap_or(false) {
                                "on".to_string()
                            } else {
                                "off".to_string()
                            }
                        })
                        .collect();
                    println!("Toggles:           {}", rendered.join(", "));
                }
            }
            println!();
        }

        Commands::ResetMoney => {
            let body = post(&client, format!("{}/money/reset", cli.api), None).await?;
            if let Some(balance) = body["balance"].as_f64() {
                println!("✅ Balance reset to {:.0}", balance);
            }
        }

        Commands::Decay => {
            let body = post(&client, format!("{}/money/decay", cli.api), None).await?;
            if let Some(balance) = body["balance"].as_f64() {
                println!("✅ Decay applied; balance now {:.0}", balance);
            }
        }

        Commands::SetDecay { amount, interval } => {
            if amount.is_none() && interval.is_none() {
                println!("⚠️  Nothing to change; pass --amount and/or --interval");
                return Ok(());
            }
            let request = json!({
                "amount": amount,
                "interval_secs": interval,
            });
            let body = post(
                &client,
                format!("{}/money/config", cli.api),
                Some(request),
            )
            .await?;
            println!(
                "✅ Decay set to {} every {}s",
                body["decay_amount"],
                body["decay_interval_secs"]
            );
        }

        Commands::ResetTimer { force } => {
            let url = if force {
                format!("{}/timer/reset?force=true", cli.api)
            } else {
                format!("{}/timer/reset", cli.api)
            };
            let body = post(&client, url, None).await?;
            if let Some(elapsed) = body["elapsed_secs"].as_f64() {
                println!("✅ Timer restarted at {:.1}s", elapsed);
            }
        }

        Commands::ClearSave => {
            post(&client, format!("{}/save/clear", cli.api), None).await?;
            println!("🧹 Saved session data cleared");
        }
    }

    Ok(())
}

/// POST to the daemon, printing the API's error message on failure.
async fn post(
    client: &reqwest::Client,
    url: String,
    body: Option<Value>,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request = client.post(&url);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let response = request.send().await?;
    let status = response.status();
    let payload: Value = response.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        let message = payload["message"].as_str().unwrap_or("request failed");
        println!("❌ {} ({})", message, status);
        std::process::exit(1);
    }

    Ok(payload)
}
