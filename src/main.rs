use std::error::Error;
use std::sync::Arc;

use ai_llm_service::{LlmService, config::default_config::config_from_env, telemetry};
use herbal_chain::{ChainConfig, ChatRequest, DiagnosisRequest, DiagnosisService};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::{Level, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: herbal-diagnosis-backend [diagnose | chat | history <userId> | status | health]\n\
                     diagnose and chat read one JSON request from stdin";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine; an unreadable or malformed one is not.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("warn", Level::INFO))
        .with(telemetry::layer())
        .init();

    let llm = Arc::new(LlmService::new(
        config_from_env()?,
        env_u64("LLM_HEALTH_TIMEOUT_SECS"),
    )?);
    let svc = DiagnosisService::new(ChainConfig::from_env(), Arc::clone(&llm));

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "diagnose".to_string());
    info!(command = %command, "starting");

    match command.as_str() {
        "diagnose" => {
            let req: DiagnosisRequest = serde_json::from_str(&read_stdin().await?)?;
            print_json(&svc.diagnose(req).await?)?;
        }
        "chat" => {
            let req: ChatRequest = serde_json::from_str(&read_stdin().await?)?;
            print_json(&svc.chat(req).await?)?;
        }
        "history" => {
            let user_id = args.next().ok_or(USAGE)?;
            print_json(&svc.history(&user_id).await?)?;
        }
        "status" => {
            svc.initialize().await;
            print_json(&svc.status())?;
        }
        "health" => print_json(&llm.health().await)?,
        _ => return Err(USAGE.into()),
    }

    Ok(())
}

async fn read_stdin() -> std::io::Result<String> {
    let mut buf = String::new();
    tokio::io::stdin().read_to_string(&mut buf).await?;
    Ok(buf)
}

fn print_json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
