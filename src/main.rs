use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use triviaquest::api::{self, BankState};
use triviaquest::import::{parse_jsonl, sample_questions};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "triviaquest=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting question bank server...");

    let bank_path =
        std::env::var("QUESTION_BANK").unwrap_or_else(|_| "questions.jsonl".to_string());

    let records = match std::fs::read_to_string(&bank_path) {
        Ok(text) => {
            let batch = parse_jsonl(&text);
            if batch.malformed_skipped > 0 {
                tracing::warn!(
                    skipped = batch.malformed_skipped,
                    "Skipped malformed question lines"
                );
            }
            tracing::info!(
                path = %bank_path,
                records = batch.records.len(),
                "Loaded question bank"
            );
            batch.records
        }
        Err(e) => {
            tracing::warn!(
                path = %bank_path,
                "Question bank not readable ({}), serving the bundled sample set",
                e
            );
            sample_questions()
        }
    };

    let state = Arc::new(BankState::new(records));
    tracing::info!(questions = state.len(), "Serving question bank");

    let app = api::router(state)
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port = std::env::var("API_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
