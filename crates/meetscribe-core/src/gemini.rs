//! Gemini Files + generateContent client.
//!
//! The remote side stages uploaded media, chews on it for a while, and only
//! then accepts a generate call referencing the staged file. The pipeline
//! consumes that lifecycle through the [`AnalysisService`] trait so tests
//! can script it without the network.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{MeetScribeError, Result};

const BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Video analysis can legitimately take minutes.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(1000);

/// Instructions sent to the model along with the uploaded meeting video.
pub const MEETING_ANALYSIS_PROMPT: &str = r#"
You are "MeetScribe," an expert meeting analyst. You will be given a video file of a meeting.
Your task is to analyze the entire video and audio and return a clean, valid JSON object.
Do not, under any circumstances, wrap the JSON in markdown (```json ... ```).
The JSON object must have exactly these three top-level keys:

1.  "summary": A concise, one-paragraph summary of the meeting's purpose, key discussions, and final outcomes.
2.  "action_items": A list of objects. Each object must have:
    - "task": (string) The specific action item.
    - "owner": (string) The person or group assigned. Default to "Unassigned" if not mentioned.
    - "deadline": (string) The due date. Default to "Not specified" if not mentioned.
3.  "sentiment": A brief, 2-3 sentence analysis of the team's overall sentiment (e.g., optimistic, concerned, collaborative), based on tone of voice and language.
"#;

/// Ingestion state of a staged file.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    Processing,
    Active,
    Failed,
}

/// Handle to a file staged on the remote service.
#[derive(Clone, Debug, Deserialize)]
pub struct RemoteFile {
    pub name: String,
    pub uri: String,
    #[serde(default, rename = "mimeType")]
    pub mime_type: Option<String>,
    pub state: FileState,
}

/// Remote media-analysis service consumed by the pipeline.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Stage media bytes on the remote side, returning a handle.
    async fn upload(&self, media: Vec<u8>, mime_type: &str) -> Result<RemoteFile>;

    /// Report the ingestion state of a staged file.
    async fn file_state(&self, name: &str) -> Result<FileState>;

    /// Run the model over a staged file with the given instructions.
    async fn generate(&self, instructions: &str, file: &RemoteFile) -> Result<String>;

    /// Release the remote copy of a staged file.
    async fn delete(&self, name: &str) -> Result<()>;
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{BASE_URL}{path}?key={}", self.api_key)
    }
}

#[async_trait]
impl AnalysisService for GeminiClient {
    async fn upload(&self, media: Vec<u8>, mime_type: &str) -> Result<RemoteFile> {
        let url = format!("{BASE_URL}/upload/v1beta/files?key={}", self.api_key);
        let response = self
            .http
            .post(&url)
            .header("X-Goog-Upload-Protocol", "raw")
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(media)
            .send()
            .await?;

        let upload: UploadResponse = check_status(response).await?.json().await?;
        Ok(upload.file)
    }

    async fn file_state(&self, name: &str) -> Result<FileState> {
        let url = self.url(&format!("/v1beta/{name}"));
        let response = self.http.get(&url).send().await?;
        let file: RemoteFile = check_status(response).await?.json().await?;
        Ok(file.state)
    }

    async fn generate(&self, instructions: &str, file: &RemoteFile) -> Result<String> {
        let url = self.url(&format!("/v1beta/models/{}:generateContent", self.model));
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: instructions.to_string(),
                    },
                    Part::FileData {
                        file_data: FileData {
                            mime_type: file
                                .mime_type
                                .clone()
                                .unwrap_or_else(|| "video/mp4".to_string()),
                            file_uri: file.uri.clone(),
                        },
                    },
                ],
            }],
        };

        let response = self.http.post(&url).json(&request).send().await?;
        let reply: GenerateResponse = check_status(response).await?.json().await?;

        if let Some(error) = reply.error {
            return Err(MeetScribeError::RemoteService {
                reason: format!("Gemini API error: {}", error.message),
            });
        }

        reply
            .candidates
            .and_then(|candidates| candidates.into_iter().next())
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| MeetScribeError::RemoteService {
                reason: "empty model response".to_string(),
            })
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let url = self.url(&format!("/v1beta/{name}"));
        let response = self.http.delete(&url).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(MeetScribeError::RemoteService {
        reason: format!("HTTP {status}: {body}"),
    })
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: RemoteFile,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    FileData { file_data: FileData },
}

#[derive(Debug, Serialize)]
struct FileData {
    mime_type: String,
    file_uri: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_state_deserializes_wire_values() {
        for (wire, expected) in [
            ("\"PROCESSING\"", FileState::Processing),
            ("\"ACTIVE\"", FileState::Active),
            ("\"FAILED\"", FileState::Failed),
        ] {
            let state: FileState = serde_json::from_str(wire).unwrap();
            assert_eq!(state, expected);
        }
    }

    #[test]
    fn test_remote_file_deserializes() {
        let json = r#"{
            "name": "files/abc123",
            "uri": "https://generativelanguage.googleapis.com/v1beta/files/abc123",
            "mimeType": "video/mp4",
            "state": "PROCESSING"
        }"#;

        let file: RemoteFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.name, "files/abc123");
        assert_eq!(file.mime_type.as_deref(), Some("video/mp4"));
        assert_eq!(file.state, FileState::Processing);
    }

    #[test]
    fn test_upload_response_unwraps_file_envelope() {
        let json = r#"{"file": {"name": "files/x", "uri": "u", "state": "ACTIVE"}}"#;
        let response: UploadResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.file.name, "files/x");
        assert_eq!(response.file.state, FileState::Active);
    }

    #[test]
    fn test_generate_request_serializes_both_part_kinds() {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: "prompt".to_string(),
                    },
                    Part::FileData {
                        file_data: FileData {
                            mime_type: "video/mp4".to_string(),
                            file_uri: "https://example/files/x".to_string(),
                        },
                    },
                ],
            }],
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"text\":\"prompt\""));
        assert!(json.contains("\"file_data\""));
        assert!(json.contains("\"file_uri\":\"https://example/files/x\""));
    }

    #[test]
    fn test_generate_response_deserializes() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "{\"summary\": \"ok\"}"}]}
            }]
        }"#;

        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        let text = response
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap();
        assert!(text.contains("summary"));
    }

    #[test]
    fn test_prompt_names_the_three_keys() {
        assert!(MEETING_ANALYSIS_PROMPT.contains("\"summary\""));
        assert!(MEETING_ANALYSIS_PROMPT.contains("\"action_items\""));
        assert!(MEETING_ANALYSIS_PROMPT.contains("\"sentiment\""));
    }
}
