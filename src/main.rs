//! `dealdesk` command line.
//!
//! ```text
//! dealdesk "Which deals have gone silent?"   one question, envelope JSON on stdout
//! dealdesk --stdio                           JSON request per line in, response per line out
//! dealdesk --seed                            load sample data into the configured database
//! ```
//!
//! Logs go to stderr so stdout stays machine-readable. Set `RUST_LOG` to tune.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use dealdesk_lib::commands::{handle_raw_request, QueryResponse};
use dealdesk_lib::devtools::seed_sample_data;
use dealdesk_lib::handlers::QueryRouter;
use dealdesk_lib::state::AppState;

const USAGE: &str = "usage: dealdesk \"<question>\" | --stdio | --seed";

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run().await {
        log::error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        None | Some("-h") | Some("--help") => {
            println!("{}", USAGE);
            Ok(())
        }
        Some("--seed") => seed(),
        Some("--stdio") => {
            let state = AppState::new()?;
            serve_stdio(state.router.clone()).await
        }
        Some(_) => {
            let question = args.join(" ");
            let state = AppState::new()?;
            let request = serde_json::json!({ "query": question }).to_string();
            let response = handle_raw_request(state.router.clone(), &request).await;
            print_response(&response)
        }
    }
}

fn seed() -> Result<(), String> {
    let state = AppState::new()?;
    let db = state.store.db();
    let db = db.lock();
    let summary = seed_sample_data(&db, chrono::Utc::now()).map_err(|e| e.to_string())?;
    if summary.skipped {
        println!("Database already has data; nothing seeded.");
    } else {
        println!(
            "Seeded {} customers, {} recruits and {} competitors.",
            summary.customers, summary.recruits, summary.competitors
        );
    }
    Ok(())
}

fn print_response(response: &QueryResponse) -> Result<(), String> {
    let json = serde_json::to_string_pretty(&response.body)
        .map_err(|e| format!("Failed to serialize response: {}", e))?;
    println!("{}", json);
    Ok(())
}

/// One request per line until EOF. Blank lines are skipped.
async fn serve_stdio(router: Arc<QueryRouter>) -> Result<(), String> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    log::info!("Reading JSON requests from stdin");
    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| format!("Failed to read stdin: {}", e))?
    {
        if line.trim().is_empty() {
            continue;
        }
        let response = handle_raw_request(router.clone(), &line).await;
        let mut out = serde_json::to_string(&response)
            .map_err(|e| format!("Failed to serialize response: {}", e))?;
        out.push('\n');
        stdout
            .write_all(out.as_bytes())
            .await
            .map_err(|e| format!("Failed to write stdout: {}", e))?;
        stdout
            .flush()
            .await
            .map_err(|e| format!("Failed to write stdout: {}", e))?;
    }
    Ok(())
}
