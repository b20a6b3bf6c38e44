use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::path::PathBuf;

use portfolio_server::content::{sanitize, RawContent};

#[derive(Parser)]
#[command(name = "portfolio-cli")]
#[command(about = "Management CLI for the portfolio server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Session token of a signed-in editor.
    #[arg(short, long, env = "PORTFOLIO_TOKEN", default_value = "")]
    token: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server status
    Status,
    /// Print the current portfolio content
    Get,
    /// Replace the portfolio content with a JSON file
    Put { file: PathBuf },
    /// Remove the stored portfolio content
    Clear,
    /// Show the identity behind the token
    Whoami,
    /// Validate and sanitize a JSON file locally
    Validate { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if !cli.token.is_empty() {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", cli.token))?,
        );
    }

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/api/status", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Get => {
            let res = client.get(format!("{}/api/content", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Put { file } => {
            let body = std::fs::read(&file)?;
            let res = client
                .put(format!("{}/api/content", cli.url))
                .headers(headers)
                .header(CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Clear => {
            let res = client
                .delete(format!("{}/api/content", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Whoami => {
            let res = client
                .get(format!("{}/auth/session", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Validate { file } => {
            let bytes = std::fs::read(&file)?;
            match RawContent::from_slice(&bytes).and_then(RawContent::validate) {
                Ok(validated) => {
                    println!("{}", serde_json::to_string_pretty(&sanitize(validated))?);
                }
                Err(report) => {
                    eprintln!("Invalid data:");
                    for error in &report.errors {
                        eprintln!("  - {}", error);
                    }
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
