//! MeetScribe web server.
//!
//! `GET /` serves the upload page; `POST /analyze` accepts a multipart
//! video upload and responds with the structured analysis plus the PDF
//! report as base64.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
};
use clap::Parser;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meetscribe_core::{Config, GeminiClient, MeetingAnalysis, PollPolicy, analyze_meeting};

/// Largest accepted upload, in bytes.
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "meetscribe-server")]
#[command(about = "Analyze uploaded meeting videos and serve PDF reports")]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 5000)]
    port: u16,
}

struct AppState {
    config: Config,
    client: GeminiClient,
    poll: PollPolicy,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meetscribe_server=info,meetscribe_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            error!("create a .env file in this directory with GEMINI_API_KEY=your_api_key_here");
            std::process::exit(1);
        }
    };
    std::fs::create_dir_all(&config.upload_dir)?;

    let client = GeminiClient::new(&config)?;
    let state = Arc::new(AppState {
        config,
        client,
        poll: PollPolicy::default(),
    });

    let app = Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), cli.port)).await?;
    info!("MeetScribe server listening on http://{}:{}", cli.host, cli.port);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn index() -> Html<&'static str> {
    Html(include_str!("../templates/index.html"))
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    let upload = match read_video_field(&mut multipart).await {
        Ok(upload) => upload,
        Err(message) => {
            return (StatusCode::BAD_REQUEST, Json(json!({ "error": message })));
        }
    };
    info!(name = %upload.file_name, bytes = upload.bytes.len(), "received upload");

    match run_analysis(&state, upload).await {
        Ok(analysis) => (
            StatusCode::OK,
            Json(json!({
                "report_data": analysis.report_data,
                "pdf_data": analysis.pdf_data,
            })),
        ),
        Err(e) => {
            error!("analysis failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}

struct VideoUpload {
    file_name: String,
    bytes: Vec<u8>,
}

async fn read_video_field(multipart: &mut Multipart) -> std::result::Result<VideoUpload, String> {
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        if field.name() != Some("video") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        if file_name.is_empty() {
            return Err("No selected file".to_string());
        }
        let bytes = field.bytes().await.map_err(|e| e.to_string())?.to_vec();
        return Ok(VideoUpload { file_name, bytes });
    }
    Err("No video file provided".to_string())
}

async fn run_analysis(state: &AppState, upload: VideoUpload) -> Result<MeetingAnalysis> {
    // Spool the upload to disk under the configured upload directory. The
    // temp file keeps the original extension (the pipeline derives the MIME
    // type from it) and is removed when the handle drops, on success and
    // error alike.
    let suffix = Path::new(&upload.file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let mut spool = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&suffix)
        .tempfile_in(&state.config.upload_dir)?;
    spool.write_all(&upload.bytes)?;
    info!(path = %spool.path().display(), "spooled upload");

    let analysis = analyze_meeting(&state.client, &state.poll, spool.path()).await?;
    Ok(analysis)
}
