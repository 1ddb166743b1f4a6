//! End-to-end meeting analysis.
//!
//! One call takes media from disk (or memory) through upload, remote
//! ingestion, model analysis, parsing, and PDF rendering. The staged
//! remote copy is released on every exit path.

use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tokio::fs;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{MeetScribeError, Result};
use crate::gemini::{AnalysisService, FileState, MEETING_ANALYSIS_PROMPT, RemoteFile};
use crate::parser::parse_analysis;
use crate::report::{encode_pdf_base64, render_pdf};
use crate::types::AnalysisRecord;

/// How to wait for remote media ingestion.
///
/// Callers pass this in; the pipeline never hardcodes its waiting
/// behavior. `max_wait` bounds the total time spent polling so a stuck
/// remote job cannot hold a request forever.
#[derive(Clone, Copy, Debug)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(600),
        }
    }
}

/// Outcome of a successful analysis: the structured record plus the
/// rendered report, transport-encoded.
#[derive(Debug, Clone, Serialize)]
pub struct MeetingAnalysis {
    pub report_data: AnalysisRecord,
    pub pdf_data: String,
}

/// Analyze a meeting video on disk.
pub async fn analyze_meeting<S: AnalysisService>(
    service: &S,
    policy: &PollPolicy,
    video_path: &Path,
) -> Result<MeetingAnalysis> {
    let media = fs::read(video_path).await?;
    let mime_type = video_mime_type(video_path);
    analyze_media(service, policy, media, mime_type).await
}

/// Analyze media bytes already in memory.
pub async fn analyze_media<S: AnalysisService>(
    service: &S,
    policy: &PollPolicy,
    media: Vec<u8>,
    mime_type: &str,
) -> Result<MeetingAnalysis> {
    let file = service.upload(media, mime_type).await?;
    info!(file = %file.name, mime = mime_type, "uploaded media for analysis");

    let outcome = analyze_staged(service, policy, &file).await;

    // Release the remote copy no matter how the analysis went.
    if let Err(e) = service.delete(&file.name).await {
        warn!(file = %file.name, error = %e, "failed to delete remote file");
    }

    outcome
}

async fn analyze_staged<S: AnalysisService>(
    service: &S,
    policy: &PollPolicy,
    file: &RemoteFile,
) -> Result<MeetingAnalysis> {
    wait_until_active(service, policy, file).await?;

    let raw = service.generate(MEETING_ANALYSIS_PROMPT, file).await?;
    info!(chars = raw.len(), "received model response");

    let record = parse_analysis(&raw)?;
    let pdf_data = encode_pdf_base64(&render_pdf(&record)?);
    info!(items = record.action_items.len(), "report rendered");

    Ok(MeetingAnalysis {
        report_data: record,
        pdf_data,
    })
}

async fn wait_until_active<S: AnalysisService>(
    service: &S,
    policy: &PollPolicy,
    file: &RemoteFile,
) -> Result<()> {
    let mut state = file.state;
    let mut waited = Duration::ZERO;
    loop {
        match state {
            FileState::Active => return Ok(()),
            FileState::Failed => {
                return Err(MeetScribeError::RemoteService {
                    reason: "file processing failed on the server".to_string(),
                });
            }
            FileState::Processing => {
                if waited >= policy.max_wait {
                    return Err(MeetScribeError::RemoteService {
                        reason: format!("file still processing after {:.0?}", policy.max_wait),
                    });
                }
                sleep(policy.interval).await;
                waited += policy.interval;
                state = service.file_state(&file.name).await?;
            }
        }
    }
}

/// Best-effort MIME type for a local video file, by extension.
pub fn video_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        _ => "video/mp4",
    }
}
